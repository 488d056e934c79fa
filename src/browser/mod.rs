//! Browser automation module
//!
//! Drives a local Chromium over the DevTools Protocol via chromiumoxide.

mod chrome;
mod session;

pub use chrome::find_chrome;
pub use session::BrowserSession;
