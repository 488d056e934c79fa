//! Core module - shared infrastructure for nashlogin
//!
//! This module contains configuration and error handling used throughout
//! the application.

pub mod config;
pub mod error;

pub use config::{Config, Credentials, Selectors};
pub use error::{NashError, Result};
