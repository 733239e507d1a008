//! Configuration
//!
//! Layered configuration built with the `config` crate. Precedence, lowest to
//! highest: built-in defaults, the global file
//! (`$XDG_CONFIG_HOME/backdrop/config.toml`), an explicit `--config` file, and
//! `BACKDROP__SECTION__KEY` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::background::{Legend, ModernFormats};
use crate::constraint::breakpoints::{STANDARD_HEIGHTS, STANDARD_WIDTHS};
use crate::constraint::BreakpointSet;
use crate::error::BackdropError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use url::Url;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackdropConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub breakpoints: BreakpointConfig,

    #[serde(default)]
    pub formats: FormatConfig,

    #[serde(default)]
    pub fallback: FallbackConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BackdropConfig {
    pub fn validate(&self) -> Result<(), BackdropError> {
        self.endpoint.base_url()?;
        if self.endpoint.timeout_secs == 0 {
            return Err(BackdropError::Config(
                "endpoint.timeout_secs must be positive".to_string(),
            ));
        }
        if self.cache.capacity == 0 {
            return Err(BackdropError::Config(
                "cache.capacity must be at least 1".to_string(),
            ));
        }
        self.breakpoint_set()?;
        Ok(())
    }

    pub fn breakpoint_set(&self) -> Result<BreakpointSet, BackdropError> {
        BreakpointSet::from_lengths(&self.breakpoints.widths, &self.breakpoints.heights)
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_catalog_path() -> String {
    "images/".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Image endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL images and the catalog are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Catalog path relative to the base URL
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EndpointConfig {
    /// Parsed base URL, always ending in `/` so relative joins stay beneath it.
    pub fn base_url(&self) -> Result<Url, BackdropError> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|e| {
            BackdropError::Config(format!("Invalid endpoint.base_url '{}': {}", self.base_url, e))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(BackdropError::Config(format!(
                "Unsupported endpoint.base_url scheme '{}' (must be http or https)",
                other
            ))),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            catalog_path: default_catalog_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_capacity() -> usize {
    32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached variants
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

fn default_widths() -> Vec<u32> {
    STANDARD_WIDTHS.to_vec()
}

fn default_heights() -> Vec<u32> {
    STANDARD_HEIGHTS.to_vec()
}

/// Ascending breakpoint lengths per orientation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakpointConfig {
    #[serde(default = "default_widths")]
    pub widths: Vec<u32>,

    #[serde(default = "default_heights")]
    pub heights: Vec<u32>,
}

impl Default for BreakpointConfig {
    fn default() -> Self {
        Self {
            widths: default_widths(),
            heights: default_heights(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatConfig {
    /// auto, always, never
    #[serde(default)]
    pub modern: ModernFormats,
}

fn default_main_color() -> String {
    "#000000".to_string()
}

/// Legend shown when headers are missing or no image could be fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_main_color")]
    pub main_color: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub date: String,
}

impl FallbackConfig {
    pub fn legend(&self) -> Legend {
        Legend {
            main_color: self.main_color.clone(),
            location: self.location.clone(),
            date: self.date.clone(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            main_color: default_main_color(),
            location: String::new(),
            date: String::new(),
        }
    }
}
