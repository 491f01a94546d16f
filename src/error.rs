//! Error types for extraction, page reveal, fetching and export.

use std::path::PathBuf;

use thiserror::Error;

/// Structural problems found while extracting a record from markup.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector {selector}: {reason}")]
    Selector { selector: String, reason: String },
    #[error("Missing element: {0}")]
    MissingElement(&'static str),
    #[error("Address block has {len} children, expected one at index {index}")]
    MissingChild { index: usize, len: usize },
    #[error("Child at index {0} is not an element")]
    NotAnElement(usize),
    #[error("Invalid link {href}: {reason}")]
    InvalidLink { href: String, reason: String },
}

/// Failures while driving the browser.
#[derive(Debug, Error)]
pub enum RevealError {
    #[error("Browser launch failed: {0}")]
    Launch(String),
    #[cfg(feature = "browser")]
    #[error("Browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
    #[error("Timed out after {secs}s waiting for {selector}")]
    Timeout { selector: String, secs: u64 },
    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    Unsupported,
}

/// Failures while fetching a single document over HTTP.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Failures while writing output files.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
