//! Custom error types for nashlogin
//!
//! Provides a unified error handling system across all modules, plus the
//! process exit codes the tool reports for well-known failure modes.

use thiserror::Error;

/// Main error type for nashlogin operations
#[derive(Error, Debug)]
pub enum NashError {
    /// Credentials missing from environment/.env
    #[error("Missing NASH_USER or NASH_PASS in the environment (or .env)")]
    MissingCredentials,

    /// A required selector has not been filled in
    #[error("Selector missing: {0}. Open Chrome DevTools on the site and fill it in the config")]
    MissingSelector(String),

    /// An element never became visible within its timeout
    #[error("Timed out waiting for selector to become visible: {0}")]
    SelectorTimeout(String),

    /// A page load never settled within the default timeout
    #[error("Timed out navigating to {0}")]
    NavigationTimeout(String),

    /// The post-login marker never appeared; login likely failed
    #[error("Login may have failed: post-login marker '{0}' not found. Re-check selectors/credentials")]
    MarkerTimeout(String),

    /// Browser launch or interaction errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// CDP transport errors
    #[error("Browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session file read/write errors
    #[error("Session error: {0}")]
    Session(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for nashlogin operations
pub type Result<T> = std::result::Result<T, NashError>;

impl NashError {
    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a session error
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Process exit code for this error.
    ///
    /// Codes are stable so wrapper scripts can branch on them:
    /// 1 = missing credentials (or any other error), 2 = selector not filled
    /// in, 4 = post-login marker never appeared.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingCredentials => 1,
            Self::MissingSelector(_) => 2,
            Self::MarkerTimeout(_) => 4,
            _ => 1,
        }
    }
}
