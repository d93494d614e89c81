//! Remote transliteration lookup.
//!
//! Queries Google Input Tools (or a user-deployed endpoint speaking a
//! simpler JSON protocol) for the target-script spellings of a Latin word.
//!
//! Uses `reqwest` blocking client for simplicity - no async runtime needed!
//! Hosts that cannot block drive the widget with `poll_request`/`resolve`
//! and run [`CloudInput::lookup`] on a worker thread.

use libtranslit_core::{LookupError, RawSuggestion, SuggestionLookup};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Google Input Tools request endpoint.
pub const INPUT_TOOLS_URL: &str = "https://inputtools.google.com/request";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Remote lookup provider options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CloudProvider {
    /// Google Input Tools transliteration API
    #[default]
    InputTools,
    /// Custom endpoint URL for a user-deployed suggestion server
    Custom(String),
}

/// Client for the remote transliteration service.
#[derive(Debug, Clone)]
pub struct CloudInput {
    provider: CloudProvider,
    enabled: bool,
    timeout_ms: u64,
}

impl CloudInput {
    /// Create a new, enabled client for the given provider.
    pub fn new(provider: CloudProvider) -> Self {
        Self {
            provider,
            enabled: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn provider(&self) -> &CloudProvider {
        &self.provider
    }

    /// Enable or disable remote lookups.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the request timeout in milliseconds.
    pub fn set_timeout(&mut self, timeout_ms: u64) {
        self.timeout_ms = timeout_ms;
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Build the Input Tools query URL for one word.
    pub fn input_tools_url(word: &str, lang: &str, limit: usize) -> String {
        format!(
            "{}?text={}&itc={}&num={}&cp=0&cs=1&ie=utf-8&oe=utf-8&app=demopage",
            INPUT_TOOLS_URL,
            urlencoding::encode(word),
            urlencoding::encode(lang),
            limit
        )
    }

    fn client(&self) -> Result<reqwest::blocking::Client, LookupError> {
        reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(self.timeout_ms))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))
    }

    /// Query Google Input Tools.
    ///
    /// Response shape: `["SUCCESS", [[word, [candidates...], ...]]]`
    fn query_input_tools(
        &self,
        word: &str,
        lang: &str,
        limit: usize,
    ) -> Result<Vec<RawSuggestion>, LookupError> {
        let url = Self::input_tools_url(word, lang, limit);
        let response = self
            .client()?
            .get(&url)
            .send()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| LookupError::Network(e.to_string()))?;
        parse_input_tools_response(&body)
    }

    /// Query custom endpoint.
    ///
    /// Expected request format:
    /// POST to custom URL with JSON body: {"text": "nam", "lang": "te-t-i0-und", "limit": 5}
    ///
    /// Expected response format:
    /// JSON array of strings or tuples: ["నమ", ["నమ్మ", "namma"], ...]
    fn query_custom(
        &self,
        url: &str,
        word: &str,
        lang: &str,
        limit: usize,
    ) -> Result<Vec<RawSuggestion>, LookupError> {
        let body = serde_json::json!({
            "text": word,
            "lang": lang,
            "limit": limit,
        });

        let response = self
            .client()?
            .post(url)
            .json(&body)
            .send()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        response
            .json::<Vec<RawSuggestion>>()
            .map_err(|e| LookupError::Malformed(e.to_string()))
    }
}

impl Default for CloudInput {
    fn default() -> Self {
        Self::new(CloudProvider::default())
    }
}

impl SuggestionLookup for CloudInput {
    fn lookup(
        &self,
        word: &str,
        lang: &str,
        limit: usize,
    ) -> Result<Vec<RawSuggestion>, LookupError> {
        if !self.enabled {
            return Err(LookupError::Disabled);
        }
        if word.is_empty() {
            return Ok(Vec::new());
        }

        debug!(word, lang, limit, provider = ?self.provider, "remote lookup");
        match &self.provider {
            CloudProvider::InputTools => self.query_input_tools(word, lang, limit),
            CloudProvider::Custom(url) => self.query_custom(url, word, lang, limit),
        }
    }
}

/// Parse an Input Tools response body into raw suggestions.
///
/// Anything other than a `"SUCCESS"` status with a candidate array for the
/// first word is reported as malformed.
pub fn parse_input_tools_response(body: &str) -> Result<Vec<RawSuggestion>, LookupError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    let status = value.get(0).and_then(Value::as_str);
    if status != Some("SUCCESS") {
        return Err(LookupError::Malformed(format!(
            "status {}",
            status.unwrap_or("missing")
        )));
    }

    let candidates = value
        .get(1)
        .and_then(|results| results.get(0))
        .and_then(|entry| entry.get(1))
        .and_then(Value::as_array)
        .ok_or_else(|| LookupError::Malformed("missing candidate list".into()))?;

    candidates
        .iter()
        .map(|c| {
            serde_json::from_value::<RawSuggestion>(c.clone())
                .map_err(|e| LookupError::Malformed(e.to_string()))
        })
        .collect()
}
