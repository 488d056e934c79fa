//! Login flow integration tests
//!
//! Browser-backed tests are ignored by default since they need a local
//! Chrome/Chromium install.

use std::time::Duration;

use nashlogin::browser::BrowserSession;
use nashlogin::core::config::{BrowserConfig, Config};
use nashlogin::core::error::NashError;

fn test_browser_config() -> BrowserConfig {
    BrowserConfig {
        headless: true,
        timeout_ms: 10_000,
        width: 1280,
        height: 960,
    }
}

#[test]
fn flow_rejects_unfilled_selectors_before_launching() {
    let mut config = Config::default();
    config.site.selectors.submit = "REPLACE_ME".to_string();

    let credentials = nashlogin::Credentials {
        username: "user@example.com".to_string(),
        password: "hunter2".to_string(),
    };

    // No browser needed: the selector check runs first, so this completes
    // immediately even on machines without Chrome.
    let err = tokio_test::block_on(nashlogin::login::run(&config, &credentials)).unwrap_err();
    assert!(matches!(err, NashError::MissingSelector(_)));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium to be installed
async fn browser_launch_navigate_and_wait() {
    let mut session = match BrowserSession::launch(&test_browser_config()).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    session.goto("https://example.com/").await.unwrap();
    session
        .wait_for("h1", Duration::from_secs(10))
        .await
        .unwrap();

    // A selector that cannot exist should time out, not hang.
    let err = session
        .wait_for("#definitely-not-present", Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(matches!(err, NashError::SelectorTimeout(_)));

    session.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium to be installed
async fn fill_first_replaces_prefilled_value() {
    let mut session = match BrowserSession::launch(&test_browser_config()).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    // A form the browser has already filled in, as autofill would.
    session
        .goto("data:text/html,<input id=\"user\" type=\"text\" value=\"stale@autofill\">")
        .await
        .unwrap();

    let candidates = vec!["#user".to_string()];
    session
        .fill_first(&candidates, "user@example.com", Duration::from_secs(5))
        .await
        .unwrap();

    let value: String = session
        .page()
        .evaluate("document.querySelector('#user').value")
        .await
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(value, "user@example.com");

    session.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium to be installed
async fn goto_times_out_on_stalled_navigation() {
    let mut config = test_browser_config();
    config.timeout_ms = 3_000;

    let mut session = match BrowserSession::launch(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    // Non-routable address: the TCP connect hangs, so the load never settles.
    let err = session.goto("http://10.255.255.1/").await.unwrap_err();
    assert!(matches!(err, NashError::NavigationTimeout(_)));

    session.close().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium to be installed
async fn first_visible_prefers_earlier_candidates() {
    let mut session = match BrowserSession::launch(&test_browser_config()).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    session.goto("https://example.com/").await.unwrap();

    let candidates = vec!["#missing".to_string(), "h1".to_string(), "p".to_string()];
    let (selector, _) = session
        .first_visible(&candidates, Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(selector, "h1");

    session.close().await.unwrap();
}
