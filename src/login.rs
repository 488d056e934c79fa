//! The login flow
//!
//! A linear sequence of browser actions: open the homepage, get past the
//! cookie banner, reach the login form, fill credentials, submit, and wait
//! for an element that only exists once logged in. On success the session
//! state is written to disk.

use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::browser::BrowserSession;
use crate::core::config::{Config, Credentials, Selectors};
use crate::core::error::{NashError, Result};
use crate::session::SessionState;

/// Cookie banners either show up quickly or not at all
const COOKIE_BANNER_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-field wait when cycling through locator candidates
const CANDIDATE_TIMEOUT: Duration = Duration::from_secs(8);

/// Run the full login sequence and persist the session state.
///
/// Returns the captured state so the caller can report on it.
pub async fn run(config: &Config, credentials: &Credentials) -> Result<SessionState> {
    let selectors = &config.site.selectors;

    // Fail on unfilled selectors before paying for a browser launch.
    Selectors::require("login.submit", &selectors.submit)?;
    Selectors::require("postlogin.marker", &selectors.postlogin_marker)?;
    Selectors::require_candidates("login.username", &selectors.username)?;
    Selectors::require_candidates("login.password", &selectors.password)?;

    let base_url = normalize_base_url(&config.site.base_url)?;
    let mut session = BrowserSession::launch(&config.browser).await?;
    let timeout = session.default_timeout();

    let state = drive(&session, config, credentials, &base_url, timeout).await;

    // Close the browser whether the flow succeeded or not.
    session.close().await?;
    state
}

async fn drive(
    session: &BrowserSession,
    config: &Config,
    credentials: &Credentials,
    base_url: &str,
    timeout: Duration,
) -> Result<SessionState> {
    let selectors = &config.site.selectors;

    println!("── Open page ──");
    session.goto(base_url).await?;

    // Optional cookie banner; a miss is fine.
    if let Some(accept) = selectors.cookie_accept.as_deref() {
        match session.click(accept, COOKIE_BANNER_TIMEOUT).await {
            Ok(()) => println!("✅ Cookie banner closed"),
            Err(NashError::SelectorTimeout(_)) => {}
            Err(e) => return Err(e),
        }
    }

    // Optional login entry point; tolerate a timeout since the start URL may
    // already land on the login form.
    if let Some(button) = selectors.login_button.as_deref() {
        if Selectors::require("nav.login_button", button).is_ok() {
            println!("── Click Login ──");
            match session.click(button, timeout).await {
                Ok(()) => {}
                Err(NashError::SelectorTimeout(_)) => {
                    warn!("Login button not clickable; continuing (already on login page?)");
                }
                Err(e) => return Err(e),
            }
        }
    }

    println!("── Fill credentials ──");
    session
        .fill_first(&selectors.username, &credentials.username, CANDIDATE_TIMEOUT)
        .await?;
    session
        .fill_first(&selectors.password, &credentials.password, CANDIDATE_TIMEOUT)
        .await?;

    session.click(&selectors.submit, CANDIDATE_TIMEOUT).await?;

    println!("── Wait for post-login marker ──");
    session
        .wait_for(&selectors.postlogin_marker, timeout)
        .await
        .map_err(|e| match e {
            NashError::SelectorTimeout(sel) => NashError::MarkerTimeout(sel),
            other => other,
        })?;

    let state = SessionState::capture(session.page()).await?;
    state.save(&config.storage.path)?;

    Ok(state)
}

/// Normalize the homepage URL: must parse, and always ends with a slash.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| NashError::config(format!("Invalid base URL '{}': {}", raw, e)))?;
    if !url.has_host() {
        return Err(NashError::config(format!(
            "Base URL '{}' has no host",
            raw
        )));
    }
    Ok(format!("{}/", trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://nashanyanya.ru").unwrap(),
            "https://nashanyanya.ru/"
        );
        assert_eq!(
            normalize_base_url("https://nashanyanya.ru///").unwrap(),
            "https://nashanyanya.ru/"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8080").unwrap(),
            "http://localhost:8080/"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_garbage() {
        assert!(normalize_base_url("not a url").is_err());
        assert!(normalize_base_url("").is_err());
    }
}
