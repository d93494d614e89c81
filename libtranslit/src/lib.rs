//! libtranslit crate root
//!
//! This crate connects the host-agnostic widget from `libtranslit-core` to
//! the remote transliteration service and provides a factory that builds a
//! ready-to-use widget from configuration.
//!
//! Public API exported here:
//! - `CloudInput` and `CloudProvider` from `cloud`
//! - `TranslitConfig` from `config`
//! - language code helpers from `languages`
//! - `create_widget` / `create_lookup`

pub mod cloud;
pub mod config;
pub mod languages;

// Re-export widget components from core.
pub use libtranslit_core::{
    CachedLookup, CandidateList, CaretEstimator, CaretPosition, CaretRestore, Config, FetchRequest,
    FetchState, FetchTicket, KeyEvent, KeyResult, LookupError, MirrorEstimator, RawSuggestion,
    SuggestionLookup, TextBuffer, TransliterationWidget, WidgetContext, WidgetMetrics, WidgetProps,
};

// Convenience re-exports for common types used by callers.
pub use cloud::{parse_input_tools_response, CloudInput, CloudProvider};
pub use config::TranslitConfig;
pub use languages::{input_tool_tag, language_name, resolve_lang};

/// Widget type produced by [`create_widget`].
pub type Widget = TransliterationWidget<Box<dyn SuggestionLookup>, MirrorEstimator>;

/// Build the remote lookup described by `config`.
///
/// The cloud client is wrapped in an LRU cache of `max_cache_size` entries
/// unless caching is disabled.
pub fn create_lookup(config: &TranslitConfig) -> Box<dyn SuggestionLookup> {
    let mut cloud = CloudInput::new(config.provider());
    cloud.set_timeout(config.timeout_ms);

    if config.cache_enabled {
        Box::new(CachedLookup::new(cloud, config.base().max_cache_size))
    } else {
        Box::new(cloud)
    }
}

/// Build a widget wired to the remote lookup and the mirror estimator.
///
/// Short language codes in `lang` (e.g. `te`) are resolved to input-tool
/// tags.
pub fn create_widget(config: &TranslitConfig) -> Widget {
    let mut base = config.base().clone();
    base.lang = resolve_lang(&base.lang);
    TransliterationWidget::new(create_lookup(config), MirrorEstimator::default(), &base)
}
