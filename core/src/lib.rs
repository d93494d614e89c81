//! libtranslit-core
//!
//! Host-agnostic building blocks for a transliterating text input: as the
//! user types a Latin-script word, a floating list of target-script
//! candidates is shown under the caret, navigated with the keyboard or
//! pointer, and the accepted candidate replaces only the word being typed.
//!
//! Public API:
//! - `word` - Current-word extraction and candidate replacement
//! - `TextBuffer` - Widget text with a character-offset caret
//! - `CaretEstimator` / `MirrorEstimator` - Caret pixel position by layout mirroring
//! - `SuggestionFetcher` - Debounced, de-duplicated lookup scheduling
//! - `SuggestionLookup` / `CachedLookup` - Remote lookup boundary and LRU cache
//! - `TransliterationWidget` - The controller tying everything together
//! - `Config` - Configuration (TOML)
use serde::{Deserialize, Serialize};

pub mod word;
pub use word::{apply_candidate, current_word, Replacement};

pub mod input_buffer;
pub use input_buffer::TextBuffer;

pub mod candidate;
pub use candidate::{normalize_suggestions, CandidateList, RawSuggestion};

pub mod caret;
pub use caret::{
    BoxSizing, CaretEstimator, CaretPosition, CellMetrics, EdgeInsets, FontSpec, GlyphMetrics,
    LineHeight, MeasureError, MeasuringSurface, MirrorEstimator, WhiteSpace, WidgetMetrics,
    WordWrap,
};

pub mod lookup;
pub use lookup::{CachedLookup, FnLookup, LookupError, SuggestionLookup};

pub mod fetcher;
pub use fetcher::{FetchState, FetchTicket, SuggestionFetcher, DEFAULT_DEBOUNCE};

pub mod context;
pub use context::{CaretRestore, WidgetContext};

pub mod widget;
pub use widget::{FetchRequest, KeyEvent, KeyResult, TransliterationWidget, WidgetProps};

/// Input-tool tag for Telugu, the default target script.
pub const DEFAULT_LANG: &str = "te-t-i0-und";

/// Widget configuration.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Target language tag passed to the lookup (e.g. "te-t-i0-und")
    pub lang: String,

    /// Maximum number of suggestions shown
    pub limit: usize,

    /// Quiet period after the last edit before a lookup is issued
    pub debounce_ms: u64,

    /// Distance from the caret top to the overlay top, in pixels
    pub overlay_line_offset: f32,

    /// Maximum number of entries in the word -> suggestions cache
    pub max_cache_size: usize,

    /// Text shown while the widget is empty
    pub placeholder: String,

    /// Computed style of the host text control
    pub metrics: WidgetMetrics,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            limit: 5,
            debounce_ms: 140,
            // Roughly one line below the caret
            overlay_line_offset: 30.0,
            max_cache_size: 256,
            placeholder: "Type here...".to_string(),
            metrics: WidgetMetrics::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_widget_contract() {
        let cfg = Config::default();
        assert_eq!(cfg.lang, "te-t-i0-und");
        assert_eq!(cfg.limit, 5);
        assert_eq!(cfg.debounce_ms, 140);
        assert_eq!(
            std::time::Duration::from_millis(cfg.debounce_ms),
            DEFAULT_DEBOUNCE
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = Config::from_toml_str("limit = 8\nlang = \"hi-t-i0-und\"\n").unwrap();
        assert_eq!(cfg.limit, 8);
        assert_eq!(cfg.lang, "hi-t-i0-und");
        assert_eq!(cfg.debounce_ms, 140);
        assert_eq!(cfg.metrics, WidgetMetrics::default());
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let mut cfg = Config::default();
        cfg.limit = 3;
        cfg.metrics.width = 480.0;
        let path = std::env::temp_dir().join(format!("libtranslit_cfg_{}.toml", std::process::id()));
        cfg.save_toml(&path).unwrap();
        let loaded = Config::load_toml(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, cfg);
    }
}
