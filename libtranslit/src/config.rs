//! Service-side configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All widget options from `libtranslit_core::Config` (flattened via serde)
//! - Which endpoint answers lookups
//! - Request timeout and lookup caching
//!
//! # Example
//!
//! ```rust
//! use libtranslit::TranslitConfig;
//!
//! let config = TranslitConfig::from_toml_str("lang = \"hi\"\ncache_enabled = false\n").unwrap();
//! assert_eq!(config.base().lang, "hi");
//! assert!(!config.cache_enabled);
//! ```

use crate::cloud::{CloudProvider, DEFAULT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslitConfig {
    /// Widget configuration (language, limit, debounce, metrics, ...)
    #[serde(flatten)]
    pub base: libtranslit_core::Config,

    /// Custom suggestion endpoint; Google Input Tools when absent
    pub endpoint: Option<String>,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// Cache lookups by word/lang/limit (capacity is `max_cache_size`)
    pub cache_enabled: bool,
}

impl Default for TranslitConfig {
    fn default() -> Self {
        Self {
            base: libtranslit_core::Config::default(),
            endpoint: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cache_enabled: true,
        }
    }
}

impl TranslitConfig {
    /// Convert into the base config used by the widget.
    pub fn into_base(self) -> libtranslit_core::Config {
        self.base
    }

    /// Get a reference to the base config
    pub fn base(&self) -> &libtranslit_core::Config {
        &self.base
    }

    /// Get a mutable reference to the base config
    pub fn base_mut(&mut self) -> &mut libtranslit_core::Config {
        &mut self.base
    }

    /// Provider selected by `endpoint`.
    pub fn provider(&self) -> CloudProvider {
        match self.endpoint.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => CloudProvider::Custom(url.to_string()),
            _ => CloudProvider::InputTools,
        }
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
