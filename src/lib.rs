//! nashlogin - browser login automation for nashanyanya.ru
//!
//! Drives a real Chromium over the DevTools Protocol: navigate to the
//! homepage, click the login entry point, fill credentials, submit, wait for
//! a post-login marker, and persist cookies/localStorage to a session file
//! that later runs can reuse to skip logging in.
//!
//! # Architecture
//!
//! - **Core**: configuration, selectors, credentials, and error handling
//! - **Browser**: managed Chromium session (launch, navigate, waits, clicks)
//! - **Login**: the linear login action sequence
//! - **Session**: storage-state capture and persistence

pub mod browser;
pub mod core;
pub mod login;
pub mod session;

// Re-export commonly used items
pub use browser::BrowserSession;
pub use core::{Config, Credentials, NashError, Result};
pub use session::SessionState;
