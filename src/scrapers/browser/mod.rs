//! Browser session used to reveal content that only appears after clicks.
//!
//! Uses chromiumoxide (CDP). One session owns one browser and one page for the
//! duration of a run; callers close it explicitly on every exit path, and the
//! browser process is killed on drop as a last resort.

mod launch;

use std::time::Duration;

#[cfg(feature = "browser")]
use std::time::Instant;

#[cfg(feature = "browser")]
use chromiumoxide::element::Element;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, Page};
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

use crate::config::BrowserEngineConfig;
use crate::error::RevealError;

/// Interval between element lookups while waiting for a control.
#[cfg(feature = "browser")]
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Evaluated on an element: true when it is rendered, visible and enabled.
#[cfg(feature = "browser")]
const CLICKABLE_JS: &str = "function() { \
    const rect = this.getBoundingClientRect(); \
    const style = window.getComputedStyle(this); \
    return rect.width > 0 && rect.height > 0 \
        && style.visibility !== 'hidden' && style.display !== 'none' \
        && !this.disabled; }";

/// Whether a value returned from `CLICKABLE_JS` means the element can be clicked.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn is_clickable_result(value: Option<&serde_json::Value>) -> bool {
    matches!(value, Some(serde_json::Value::Bool(true)))
}

/// Result of trying to click a control that may no longer exist.
#[derive(Debug)]
pub enum ClickOutcome {
    /// The control was found and clicked.
    Clicked,
    /// The control did not appear, or stayed hidden, within the wait.
    NotFound,
    /// The control was found but scrolling or clicking it failed.
    Failed(RevealError),
}

/// A launched (or connected) browser with a single working page.
#[cfg(feature = "browser")]
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    /// Connected to someone else's browser; close only our page.
    remote: bool,
}

#[cfg(feature = "browser")]
impl BrowserSession {
    /// Launch or connect to a browser and open a blank page.
    pub async fn launch(config: &BrowserEngineConfig) -> Result<Self, RevealError> {
        let (browser, handler) = match config.remote_url.as_deref() {
            Some(url) => launch::connect_remote(url).await?,
            None => launch::launch_local(config).await?,
        };

        let page = browser.new_page("about:blank").await?;

        Ok(Self {
            browser,
            page,
            handler,
            remote: config.remote_url.is_some(),
        })
    }

    /// Navigate the page to `url`.
    pub async fn goto(&self, url: &str) -> Result<(), RevealError> {
        info!("Navigating to {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    /// Current page markup.
    pub async fn content(&self) -> Result<String, RevealError> {
        Ok(self.page.content().await?)
    }

    /// Current page URL, if the browser reports one.
    pub async fn url(&self) -> Result<Option<String>, RevealError> {
        Ok(self.page.url().await?)
    }

    /// Poll for `selector` until it is present and clickable or `timeout` passes.
    ///
    /// A control that exists but stays hidden counts as absent.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Option<Element> {
        let deadline = Instant::now() + timeout;
        loop {
            let reason = match self.page.find_element(selector).await {
                Ok(element) => {
                    if is_clickable(&element).await {
                        return Some(element);
                    }
                    "present but not clickable".to_string()
                }
                Err(e) => e.to_string(),
            };

            if Instant::now() >= deadline {
                debug!("Gave up waiting for {}: {}", selector, reason);
                return None;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Click `selector` as soon as it is present and accepts a click.
    ///
    /// Fails with `RevealError::Timeout` if no click succeeds within `timeout`.
    pub async fn click_when_ready(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), RevealError> {
        let deadline = Instant::now() + timeout;
        loop {
            let attempt = match self.page.find_element(selector).await {
                Ok(element) => element.click().await.map(|_| ()),
                Err(e) => Err(e),
            };

            match attempt {
                Ok(()) => return Ok(()),
                Err(e) if Instant::now() >= deadline => {
                    debug!("Last click attempt on {} failed: {}", selector, e);
                    return Err(RevealError::Timeout {
                        selector: selector.to_string(),
                        secs: timeout.as_secs(),
                    });
                }
                Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }

    /// Wait for `selector`, scroll it to the middle of the viewport, pause, then click.
    pub async fn click_centered(
        &self,
        selector: &str,
        timeout: Duration,
        pause: Duration,
    ) -> ClickOutcome {
        let Some(element) = self.wait_for(selector, timeout).await else {
            return ClickOutcome::NotFound;
        };

        if let Err(e) = element
            .call_js_fn(
                "function() { this.scrollIntoView({block: 'center'}); }",
                false,
            )
            .await
        {
            return ClickOutcome::Failed(e.into());
        }

        tokio::time::sleep(pause).await;

        match element.click().await {
            Ok(_) => ClickOutcome::Clicked,
            Err(e) => ClickOutcome::Failed(e.into()),
        }
    }

    /// Close the browser and wait for it to exit.
    pub async fn close(mut self) {
        if self.remote {
            if let Err(e) = self.page.clone().close().await {
                warn!("Failed to close page: {}", e);
            }
            return;
        }

        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Browser wait failed: {}", e);
        }
        info!("Browser closed");
    }
}

#[cfg(feature = "browser")]
async fn is_clickable(element: &Element) -> bool {
    match element.call_js_fn(CLICKABLE_JS, false).await {
        Ok(returns) => is_clickable_result(returns.result.value.as_ref()),
        Err(e) => {
            debug!("Clickability check failed: {}", e);
            false
        }
    }
}

#[cfg(feature = "browser")]
impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserSession {
    _private: (),
}

#[cfg(not(feature = "browser"))]
impl BrowserSession {
    pub async fn launch(_config: &BrowserEngineConfig) -> Result<Self, RevealError> {
        Err(RevealError::Unsupported)
    }

    pub async fn goto(&self, _url: &str) -> Result<(), RevealError> {
        Err(RevealError::Unsupported)
    }

    pub async fn content(&self) -> Result<String, RevealError> {
        Err(RevealError::Unsupported)
    }

    pub async fn url(&self) -> Result<Option<String>, RevealError> {
        Err(RevealError::Unsupported)
    }

    pub async fn click_when_ready(
        &self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<(), RevealError> {
        Err(RevealError::Unsupported)
    }

    pub async fn click_centered(
        &self,
        _selector: &str,
        _timeout: Duration,
        _pause: Duration,
    ) -> ClickOutcome {
        ClickOutcome::Failed(RevealError::Unsupported)
    }

    pub async fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_only_true_means_clickable() {
        assert!(is_clickable_result(Some(&json!(true))));
        assert!(!is_clickable_result(Some(&json!(false))));
        assert!(!is_clickable_result(Some(&json!("true"))));
        assert!(!is_clickable_result(None));
    }
}
