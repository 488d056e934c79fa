//! Browser session management
//!
//! Provides a managed Chromium instance with automatic lifecycle handling.
//! All element waits poll for presence *and* visibility, mirroring a
//! "wait until visible" locator model.

use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::browser::chrome::find_chrome;
use crate::core::config;
use crate::core::error::{NashError, Result};

/// How often element waits re-check the page
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Managed browser session with a single page
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
    default_timeout: Duration,
}

impl BrowserSession {
    /// Launch Chromium and open a blank page.
    pub async fn launch(config: &config::BrowserConfig) -> Result<Self> {
        let chrome_path = find_chrome().ok_or_else(|| {
            NashError::browser("Chrome/Chromium not found. Install Chrome or Chromium first")
        })?;

        info!(
            headless = config.headless,
            chrome = %chrome_path,
            "Launching browser"
        );

        let mut builder = BrowserConfig::builder()
            .chrome_executable(std::path::PathBuf::from(&chrome_path))
            .window_size(config.width, config.height)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder
            .build()
            .map_err(|e| NashError::browser(format!("Failed to configure browser: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;

        // The handler stream must be drained for CDP messages to flow.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            browser,
            handler_task,
            page,
            default_timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    /// The session's page
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Default timeout applied to waits that don't specify their own
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Navigate to a URL and wait for the load to settle, bounded by the
    /// default timeout so a stalled navigation cannot hang the run.
    pub async fn goto(&self, url: &str) -> Result<()> {
        info!(%url, "Navigating");
        let navigate = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok(())
        };
        match tokio::time::timeout(self.default_timeout, navigate).await {
            Ok(result) => result,
            Err(_) => Err(NashError::NavigationTimeout(url.to_string())),
        }
    }

    /// Wait until `selector` matches a visible element, up to `timeout`.
    pub async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Element> {
        debug!(%selector, ?timeout, "Waiting for element");
        let deadline = Instant::now() + timeout;

        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                if self.is_visible(selector).await.unwrap_or(false) {
                    return Ok(element);
                }
            }

            if Instant::now() >= deadline {
                return Err(NashError::SelectorTimeout(selector.to_string()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Return the first candidate selector that becomes visible.
    ///
    /// Candidates are polled round-robin against a shared deadline rather
    /// than sequentially, so a late match on an early candidate still wins.
    pub async fn first_visible(
        &self,
        candidates: &[String],
        timeout: Duration,
    ) -> Result<(String, Element)> {
        debug!(?candidates, ?timeout, "Waiting for first visible candidate");
        let deadline = Instant::now() + timeout;

        loop {
            for selector in candidates {
                if selector.trim().is_empty() {
                    continue;
                }
                if let Ok(element) = self.page.find_element(selector.as_str()).await {
                    if self.is_visible(selector).await.unwrap_or(false) {
                        return Ok((selector.clone(), element));
                    }
                }
            }

            if Instant::now() >= deadline {
                return Err(NashError::SelectorTimeout(candidates.join(", ")));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Wait for `selector` to become visible, then click it
    pub async fn click(&self, selector: &str, timeout: Duration) -> Result<()> {
        let element = self.wait_for(selector, timeout).await?;
        element.click().await?;
        debug!(%selector, "Clicked");
        Ok(())
    }

    /// Fill the first visible candidate input with `text`.
    ///
    /// Replaces the field's contents: anything already present (browser
    /// autofill, a previous attempt) is cleared before typing.
    pub async fn fill_first(
        &self,
        candidates: &[String],
        text: &str,
        timeout: Duration,
    ) -> Result<String> {
        let (selector, element) = self.first_visible(candidates, timeout).await?;
        element.click().await?;
        self.clear_value(&selector).await?;
        element.type_str(text).await?;
        debug!(%selector, chars = text.len(), "Filled input");
        Ok(selector)
    }

    /// Empty an input's value in the page, firing the events frameworks
    /// listen for.
    async fn clear_value(&self, selector: &str) -> Result<()> {
        let quoted = serde_json::to_string(selector)?;
        let js = format!(
            r#"(function() {{
  const el = document.querySelector({quoted});
  if (!el) return false;
  el.value = '';
  try {{ el.dispatchEvent(new Event('input', {{ bubbles: true }})); }} catch (_) {{}}
  try {{ el.dispatchEvent(new Event('change', {{ bubbles: true }})); }} catch (_) {{}}
  return true;
}})()"#
        );
        self.page.evaluate(js).await?;
        Ok(())
    }

    /// Visibility check via bounding rect, evaluated in the page.
    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let quoted = serde_json::to_string(selector)?;
        let js = format!(
            r#"(function() {{
  const el = document.querySelector({quoted});
  if (!el || !el.getBoundingClientRect) return false;
  const r = el.getBoundingClientRect();
  return r.width > 0 && r.height > 0;
}})()"#
        );
        let visible: bool = self.page.evaluate(js).await?.into_value()?;
        Ok(visible)
    }

    /// Close the browser. Best-effort; the handler task stops when the
    /// CDP stream ends.
    pub async fn close(&mut self) -> Result<()> {
        info!("Closing browser session");
        if let Err(e) = self.browser.close().await {
            warn!("Browser did not close cleanly: {}", e);
        }
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
