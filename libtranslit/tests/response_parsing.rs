//! Input Tools responses through to display candidates, and the widget
//! factory.

use libtranslit::{
    create_widget, parse_input_tools_response, CloudProvider, KeyEvent, LookupError,
    TranslitConfig,
};
use libtranslit_core::normalize_suggestions;
use std::time::Instant;

#[test]
fn test_response_to_candidates() {
    // Duplicates after NFC and a non-string entry are dropped
    let body = r#"["SUCCESS",[["ela",["ఎలా","ఏలా","ఎలా",7,""],[],{}]]]"#;
    let raw = parse_input_tools_response(body).unwrap();
    assert_eq!(normalize_suggestions(&raw, 5), vec!["ఎలా", "ఏలా"]);
}

#[test]
fn test_limit_applies_after_normalization() {
    let body = r#"["SUCCESS",[["a",["1","1","2","3","4"]]]]"#;
    let raw = parse_input_tools_response(body).unwrap();
    assert_eq!(normalize_suggestions(&raw, 2), vec!["1", "2"]);
}

#[test]
fn test_empty_candidate_list_is_not_an_error() {
    let raw = parse_input_tools_response(r#"["SUCCESS",[["zzz",[]]]]"#).unwrap();
    assert!(raw.is_empty());
}

#[test]
fn test_malformed_bodies() {
    for body in [
        "",
        "null",
        r#"{"status":"SUCCESS"}"#,
        r#"["SUCCESS"]"#,
        r#"["SUCCESS",[["nam","నమ"]]]"#,
        r#"["ERROR",[["nam",["నమ"]]]]"#,
    ] {
        assert!(
            matches!(parse_input_tools_response(body), Err(LookupError::Malformed(_))),
            "{body:?} should be malformed"
        );
    }
}

#[test]
fn test_factory_resolves_short_language_code() {
    let config = TranslitConfig::from_toml_str("lang = \"kn\"\nlimit = 3\n").unwrap();
    let widget = create_widget(&config);
    assert_eq!(widget.lang(), "kn-t-i0-und");
    assert_eq!(widget.limit(), 3);
    assert!(widget.is_editing());
    assert!(widget.suggestions().is_empty());
}

#[test]
fn test_factory_widget_survives_unreachable_endpoint() {
    let mut config = TranslitConfig::default();
    config.endpoint = Some("http://127.0.0.1:1/suggest".into());
    config.timeout_ms = 200;
    assert!(matches!(config.provider(), CloudProvider::Custom(_)));

    let mut widget = create_widget(&config);
    let t0 = Instant::now();
    widget.handle_change("nam", 3, t0);
    let due = widget.next_deadline().unwrap();

    // Network failure clears suggestions instead of surfacing an error
    assert!(widget.tick(due));
    assert!(widget.suggestions().is_empty());
    assert_eq!(widget.context().overlay, None);
    assert_eq!(
        widget.process_key(KeyEvent::Enter),
        libtranslit::KeyResult::NotHandled
    );
    assert_eq!(widget.text(), "nam");
}
