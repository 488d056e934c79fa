//! Session state persistence
//!
//! Captures cookies and localStorage from a logged-in page and writes them
//! to a JSON file so later runs can skip the login flow entirely.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chromiumoxide::Page;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::{NashError, Result};

/// Sessions older than this are reported as likely expired by `--check`
const MAX_SESSION_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Serialized browser session: cookies plus per-origin localStorage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub cookies: Vec<StoredCookie>,
    pub origins: Vec<OriginState>,
    /// Unix timestamp of capture
    pub captured_at: i64,
}

/// One cookie, with enough attributes to restore it later
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

/// localStorage contents for one origin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginState {
    pub origin: String,
    pub local_storage: Vec<LocalStorageEntry>,
}

/// A single localStorage key/value pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageEntry {
    pub name: String,
    pub value: String,
}

impl SessionState {
    /// Capture cookies and localStorage from the page's current origin.
    pub async fn capture(page: &Page) -> Result<Self> {
        let cookies = page
            .get_cookies()
            .await?
            .into_iter()
            .map(|cookie| StoredCookie {
                name: cookie.name,
                value: cookie.value,
                domain: cookie.domain,
                path: cookie.path,
                secure: cookie.secure,
                http_only: cookie.http_only,
                same_site: cookie.same_site.map(|s| format!("{s:?}")),
            })
            .collect::<Vec<_>>();

        let origin = capture_local_storage(page).await?;
        debug!(
            cookies = cookies.len(),
            local_storage = origin.local_storage.len(),
            "Captured session state"
        );

        Ok(Self {
            cookies,
            origins: vec![origin],
            captured_at: unix_now(),
        })
    }

    /// Write the session state as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    NashError::session(format!(
                        "Failed to create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .map_err(|e| NashError::session(format!("Failed to write {}: {}", path.display(), e)))?;

        info!(path = %path.display(), cookies = self.cookies.len(), "Session saved");
        Ok(())
    }

    /// Load a previously saved session state.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| NashError::session(format!("Failed to read {}: {}", path.display(), e)))?;
        let state: SessionState = serde_json::from_str(&content)?;
        Ok(state)
    }

    /// Seconds since this session was captured
    pub fn age_secs(&self) -> i64 {
        (unix_now() - self.captured_at).max(0)
    }

    /// Whether the session is old enough that the site has likely expired it
    pub fn is_stale(&self) -> bool {
        self.age_secs() > MAX_SESSION_AGE_SECS
    }

    /// Look up a cookie by name
    pub fn cookie(&self, name: &str) -> Option<&StoredCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Deserialize)]
struct CapturedStorage {
    origin: String,
    entries: Vec<LocalStorageEntry>,
}

async fn capture_local_storage(page: &Page) -> Result<OriginState> {
    let js = r#"(function() {
  const entries = [];
  for (let i = 0; i < localStorage.length; i++) {
    const name = localStorage.key(i);
    entries.push({ name, value: localStorage.getItem(name) });
  }
  return { origin: window.location.origin, entries };
})()"#;

    let captured: CapturedStorage = page.evaluate(js).await?.into_value()?;
    Ok(OriginState {
        origin: captured.origin,
        local_storage: captured.entries,
    })
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state(captured_at: i64) -> SessionState {
        SessionState {
            cookies: vec![StoredCookie {
                name: "sid".to_string(),
                value: "abc123".to_string(),
                domain: ".nashanyanya.ru".to_string(),
                path: "/".to_string(),
                secure: true,
                http_only: true,
                same_site: Some("Lax".to_string()),
            }],
            origins: vec![OriginState {
                origin: "https://nashanyanya.ru".to_string(),
                local_storage: vec![LocalStorageEntry {
                    name: "token".to_string(),
                    value: "xyz".to_string(),
                }],
            }],
            captured_at,
        }
    }

    #[test]
    fn test_cookie_lookup() {
        let state = sample_state(unix_now());
        assert!(state.cookie("sid").is_some());
        assert!(state.cookie("missing").is_none());
    }

    #[test]
    fn test_staleness() {
        let fresh = sample_state(unix_now());
        assert!(!fresh.is_stale());
        assert!(fresh.age_secs() < 5);

        let old = sample_state(unix_now() - MAX_SESSION_AGE_SECS - 60);
        assert!(old.is_stale());
    }

    #[test]
    fn test_json_shape() {
        let state = sample_state(1_700_000_000);
        let json = serde_json::to_string_pretty(&state).unwrap();
        assert!(json.contains("\"cookies\""));
        assert!(json.contains("\"origins\""));
        assert!(json.contains("\"local_storage\""));

        let parsed: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.cookies[0].name, "sid");
        assert_eq!(parsed.origins[0].origin, "https://nashanyanya.ru");
        assert_eq!(parsed.captured_at, 1_700_000_000);
    }

    #[test]
    fn test_same_site_omitted_when_absent() {
        let mut state = sample_state(unix_now());
        state.cookies[0].same_site = None;
        let json = serde_json::to_string(&state).unwrap();
        assert!(!json.contains("same_site"));
    }
}
