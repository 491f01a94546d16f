//! Scrapers for the AWO facility directories.
//!
//! `sachsen` and `weser` hold the per-site reveal and extraction steps;
//! `browser` and `http_client` are the two ways pages are obtained.

pub mod browser;
pub mod http_client;
pub mod sachsen;
pub mod weser;

pub use browser::{BrowserSession, ClickOutcome};
pub use http_client::{DocumentFetcher, HttpClient};
