//! Locating, launching and connecting to Chrome.

#![cfg_attr(not(feature = "browser"), allow(dead_code))]

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::RevealError;

#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;

#[cfg(feature = "browser")]
use crate::config::BrowserEngineConfig;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

/// Executable names searched in `PATH` when no well-known path exists.
const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// Find a Chrome or Chromium executable.
pub fn find_chrome() -> Result<PathBuf, RevealError> {
    if let Some(path) = CHROME_PATHS.iter().map(Path::new).find(|p| p.exists()) {
        info!("Found Chrome at: {}", path.display());
        return Ok(path.to_path_buf());
    }

    if let Some(path) = CHROME_COMMANDS.iter().find_map(|cmd| which::which(cmd).ok()) {
        info!("Found Chrome in PATH: {}", path.display());
        return Ok(path);
    }

    Err(RevealError::Launch(
        "Chrome/Chromium not found. Please install it:\n\
         - Arch/Manjaro: sudo pacman -S chromium\n\
         - Ubuntu/Debian: sudo apt install chromium-browser\n\
         - Fedora: sudo dnf install chromium\n\
         - Or set BROWSER_URL to a running Chrome (ws://host:9222)"
            .to_string(),
    ))
}

/// Drive the CDP event stream until the connection ends.
#[cfg(feature = "browser")]
fn spawn_handler(mut handler: chromiumoxide::handler::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}

/// Launch a local Chrome instance.
#[cfg(feature = "browser")]
pub async fn launch_local(
    config: &BrowserEngineConfig,
) -> Result<(Browser, JoinHandle<()>), RevealError> {
    info!("Launching browser (headless={})", config.headless);

    let chrome_path = find_chrome()?;
    let (width, height) = config.window_size;

    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .window_size(width, height);

    // Set headless mode (with_head means NOT headless, confusingly)
    if !config.headless {
        builder = builder.with_head();
    }

    builder = builder
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
        .arg("--disable-gpu");

    for arg in &config.chrome_args {
        builder = builder.arg(arg);
    }

    let browser_config = builder
        .build()
        .map_err(|e| RevealError::Launch(format!("Failed to build browser config: {}", e)))?;

    let (browser, handler) = Browser::launch(browser_config).await?;

    Ok((browser, spawn_handler(handler)))
}

/// Connect to a remote Chrome instance.
#[cfg(feature = "browser")]
pub async fn connect_remote(url: &str) -> Result<(Browser, JoinHandle<()>), RevealError> {
    info!("Connecting to remote browser at {}", url);

    let ws_url = websocket_url(url).await?;
    info!("Connecting to WebSocket: {}", ws_url);

    let (browser, handler) = Browser::connect(ws_url).await?;

    Ok((browser, spawn_handler(handler)))
}

/// Resolve the DevTools WebSocket URL from the `/json/version` endpoint.
#[cfg(feature = "browser")]
async fn websocket_url(url: &str) -> Result<String, RevealError> {
    let version_url = version_endpoint(url);
    let connect_err = |e: reqwest::Error| {
        RevealError::Launch(format!("Failed to connect to remote browser: {}", e))
    };

    let resp: serde_json::Value = reqwest::Client::new()
        .get(&version_url)
        .send()
        .await
        .map_err(connect_err)?
        .json()
        .await
        .map_err(connect_err)?;

    resp.get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| RevealError::Launch("No webSocketDebuggerUrl in response".to_string()))
}

/// `/json/version` URL for a DevTools address given as ws:// or http://.
fn version_endpoint(url: &str) -> String {
    let http_url = url
        .replace("ws://", "http://")
        .replace("wss://", "https://");
    format!("{}/json/version", http_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_endpoint_from_ws() {
        assert_eq!(
            version_endpoint("ws://localhost:9222/"),
            "http://localhost:9222/json/version"
        );
    }

    #[test]
    fn test_version_endpoint_from_wss() {
        assert_eq!(
            version_endpoint("wss://chrome.internal:443"),
            "https://chrome.internal:443/json/version"
        );
    }
}
