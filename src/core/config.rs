//! Configuration management for nashlogin
//!
//! Supports environment variables, config files, and CLI overrides.
//! Selectors are site-specific and editable via the config file.
//!
//! Config file location: ~/.config/nashlogin/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{NashError, Result};

/// Main configuration for nashlogin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target site and its selectors
    pub site: SiteConfig,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Session storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Homepage URL the flow starts from
    pub base_url: String,
    /// Page element locators
    #[serde(default)]
    pub selectors: Selectors,
}

/// Locators for the elements the login flow interacts with.
///
/// `username` and `password` are candidate lists: the configured
/// site-specific selector first, then progressively looser fallbacks. The
/// first candidate that becomes visible wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selectors {
    /// Cookie-banner accept button (optional)
    #[serde(default)]
    pub cookie_accept: Option<String>,
    /// Login entry point in the site header (optional; skipped when the
    /// start URL already lands on the login form)
    #[serde(default)]
    pub login_button: Option<String>,
    /// Username/email input candidates
    pub username: Vec<String>,
    /// Password input candidates
    pub password: Vec<String>,
    /// Submit button
    pub submit: String,
    /// Element that only exists once logged in
    pub postlogin_marker: String,
}

/// Browser launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Whether to run headless (visible window helps when selectors drift)
    pub headless: bool,
    /// Default timeout for navigation and element waits, in ms
    pub timeout_ms: u64,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path the storage state is written to
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            browser: BrowserConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("NASH_BASE_URL")
                .unwrap_or_else(|_| "https://nashanyanya.ru".to_string()),
            selectors: Selectors::default(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        // Copied from DevTools on nashanyanya.ru (Angular Material app, so
        // the input ids are generated and may drift between deploys).
        Self {
            cookie_accept: None,
            login_button: Some(
                "body > nn-nanny-app > div > nn-common-header > header > div > div > div > \
                 div.header__service > nn-header-auth-state > button > span.mdc-button__label > \
                 span.m-hide"
                    .to_string(),
            ),
            username: vec![
                "#mat-input-5".to_string(),
                "input[type=\"email\"]".to_string(),
                "input[name=\"email\"]".to_string(),
                "input[name*=\"email\" i]".to_string(),
                "input[type=\"text\"]".to_string(),
            ],
            password: vec![
                "#mat-input-6".to_string(),
                "input[type=\"password\"]".to_string(),
                "input[name*=\"pass\" i]".to_string(),
            ],
            submit: "[data-test-id=\"email-password-submit-button\"]".to_string(),
            postlogin_marker: "body > nn-nanny-app > div > main > ng-component > div > \
                 div.layout__aside > nn-account-navigation > div > nn-user-info > div > \
                 div.user__content > div > div"
                .to_string(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: env::var("NASHLOGIN_HEADLESS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            timeout_ms: 20_000,
            width: 1280,
            height: 960,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/session.json"),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nashlogin")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Try to load from config file
        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(NashError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| NashError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| NashError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }
}

impl Selectors {
    /// Reject selectors that were never filled in.
    ///
    /// Placeholder values come from copying the config template without
    /// visiting the site in DevTools first.
    pub fn require<'a>(name: &str, value: &'a str) -> Result<&'a str> {
        let value = value.trim();
        if value.is_empty() || value == "REPLACE_ME" {
            return Err(NashError::MissingSelector(name.to_string()));
        }
        Ok(value)
    }

    /// Like [`Selectors::require`] for candidate lists
    pub fn require_candidates<'a>(name: &str, values: &'a [String]) -> Result<&'a [String]> {
        if values.is_empty() || values.iter().all(|v| Self::require(name, v).is_err()) {
            return Err(NashError::MissingSelector(name.to_string()));
        }
        Ok(values)
    }
}

/// Login credentials, loaded from the environment only.
///
/// Never serialized into the config file.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Read NASH_USER / NASH_PASS from the environment (after .env loading)
    pub fn from_env() -> Result<Self> {
        let username = env::var("NASH_USER").unwrap_or_default();
        let password = env::var("NASH_PASS").unwrap_or_default();

        if username.trim().is_empty() || password.is_empty() {
            return Err(NashError::MissingCredentials);
        }

        Ok(Self {
            username: username.trim().to_string(),
            password,
        })
    }
}
