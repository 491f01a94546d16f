//! Plain HTTP fetching of detail pages.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::FetchError;

/// User agent sent when the config does not name one.
pub const USER_AGENT: &str = concat!("awo-directory/", env!("CARGO_PKG_VERSION"));

/// Source of raw HTML documents by URL.
#[async_trait]
pub trait DocumentFetcher {
    /// Fetch `url` and return the response body as text.
    ///
    /// A non-2xx response is an error, so the page is skipped rather than
    /// parsed into an empty record.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP client for detail pages.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent(config))
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

fn user_agent(config: &HttpConfig) -> &str {
    config.user_agent.as_deref().unwrap_or(USER_AGENT)
}

/// Reject anything but a 2xx status for `url`.
fn check_status(url: &str, status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpClient {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        check_status(url, response.status())?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent() {
        let config = HttpConfig::default();
        assert_eq!(user_agent(&config), USER_AGENT);
        assert!(USER_AGENT.starts_with("awo-directory/"));
    }

    #[test]
    fn test_configured_user_agent() {
        let config = HttpConfig {
            user_agent: Some("MyBot/1.0".to_string()),
            ..Default::default()
        };
        assert_eq!(user_agent(&config), "MyBot/1.0");
    }

    #[test]
    fn test_success_status_passes() {
        assert!(check_status("https://awo-ol.de/a", StatusCode::OK).is_ok());
    }

    #[test]
    fn test_not_found_is_an_error() {
        let err = check_status("https://awo-ol.de/a", StatusCode::NOT_FOUND).unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(err.to_string().contains("https://awo-ol.de/a"));
    }
}
