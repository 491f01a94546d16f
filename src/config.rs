//! Run settings.
//!
//! Every value has a built-in default matching the live sites, so a run needs
//! no configuration at all. An optional TOML file overlays the defaults and a
//! few environment variables override the browser section.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "awo.toml";

/// Top-level settings for one invocation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sachsen: SachsenConfig,
    pub weser: WeserConfig,
    pub browser: BrowserEngineConfig,
    pub http: HttpConfig,
}

/// AWO Sachsen search page and its district filters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SachsenConfig {
    pub search_url: String,
    /// Number of district checkboxes, named `entry_landkreis_filter[i][i]`
    /// for `i` in `1..=filter_count`.
    pub filter_count: usize,
    pub wait_timeout_secs: u64,
    /// Pause after each filter click.
    pub settle_delay_secs: u64,
    /// Pause after the last filter click, before reading the page.
    pub final_delay_secs: u64,
    /// Where the revealed page markup is saved for offline extraction.
    pub snapshot_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for SachsenConfig {
    fn default() -> Self {
        Self {
            search_url: "https://einrichtungen.awo-sachsen.de/index.php?search_term=&listMode=detail"
                .to_string(),
            filter_count: 13,
            wait_timeout_secs: 10,
            settle_delay_secs: 3,
            final_delay_secs: 5,
            snapshot_path: PathBuf::from("page_source.html"),
            output_path: PathBuf::from("data/scraped_sachsen.csv"),
        }
    }
}

/// AWO Weser-Ems location list and its detail pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeserConfig {
    pub listing_url: String,
    pub wait_timeout_secs: u64,
    /// Pause between scrolling the "view more" button into view and clicking it.
    pub scroll_delay_secs: u64,
    /// Pause after each "view more" click.
    pub settle_delay_secs: u64,
    pub output_path: PathBuf,
}

impl Default for WeserConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://awo-ol.de/meine-awo-karriere/awo-weser-ems/standorte-leistungen"
                .to_string(),
            wait_timeout_secs: 10,
            scroll_delay_secs: 1,
            settle_delay_secs: 3,
            output_path: PathBuf::from("data/scraped_weser.csv"),
        }
    }
}

/// Browser engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserEngineConfig {
    /// Run in headless mode.
    pub headless: bool,
    /// Viewport width and height; large enough that the filter panel is not collapsed.
    pub window_size: (u32, u32),
    /// Additional Chrome arguments.
    pub chrome_args: Vec<String>,
    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    pub remote_url: Option<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1920, 1080),
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

impl BrowserEngineConfig {
    /// Apply `BROWSER_URL` and `BROWSER_HEADLESS` from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("BROWSER_URL") {
            if !url.is_empty() {
                self.remote_url = Some(url);
            }
        }

        if let Ok(val) = env::var("BROWSER_HEADLESS") {
            self.headless = !(val == "0" || val.eq_ignore_ascii_case("false"));
        }

        self
    }
}

/// Plain HTTP client used for detail pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Custom user agent; the crate name and version when unset.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text; missing keys keep their defaults.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from `path`, or from `awo.toml` if present, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        let mut settings = match candidate {
            Some(path) => {
                let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::from_toml(&text, &path)?
            }
            None => Self::default(),
        };

        settings.browser = settings.browser.with_env_overrides();
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_live_sites() {
        let settings = Settings::default();

        assert_eq!(settings.sachsen.filter_count, 13);
        assert_eq!(settings.sachsen.wait_timeout_secs, 10);
        assert_eq!(settings.sachsen.settle_delay_secs, 3);
        assert_eq!(settings.sachsen.final_delay_secs, 5);
        assert_eq!(settings.sachsen.output_path, PathBuf::from("data/scraped_sachsen.csv"));
        assert_eq!(settings.weser.output_path, PathBuf::from("data/scraped_weser.csv"));
        assert!(settings.weser.listing_url.starts_with("https://awo-ol.de/"));
        assert!(settings.browser.headless);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            [sachsen]
            filter_count = 2
            output_path = "out/sachsen.csv"

            [browser]
            headless = false
        "#;

        let settings = Settings::from_toml(text, Path::new("test.toml")).unwrap();

        assert_eq!(settings.sachsen.filter_count, 2);
        assert_eq!(settings.sachsen.output_path, PathBuf::from("out/sachsen.csv"));
        assert_eq!(settings.sachsen.settle_delay_secs, 3);
        assert!(!settings.browser.headless);
        assert_eq!(settings.weser.scroll_delay_secs, 1);
        assert_eq!(settings.http.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let err =
            Settings::from_toml("[sachsen\nfilter_count = ", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("awo.toml");
        std::fs::write(&path, "[weser]\nsettle_delay_secs = 7\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.weser.settle_delay_secs, 7);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let err = Settings::load(Some(Path::new("/nonexistent/awo.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
