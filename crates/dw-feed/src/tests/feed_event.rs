use crate::{FeedError, FeedEvent};

use serde_json::json;

#[test]
fn given_full_record_when_parsed_then_accessors_expose_fields() {
    // Given
    let text = r#"{
        "label": "marketplace",
        "url": "http://example.onion/item",
        "title": "Listing",
        "timestamp": "2024-05-01T12:00:00Z",
        "risk_score": 0.42,
        "csam_flag": false,
        "entities": {"emails": ["a@x.org"], "btc": ["1abc", "1def", "1ghi", "1jkl"]},
        "crawler_id": 7
    }"#;

    // When
    let event = FeedEvent::parse(text).unwrap();

    // Then
    assert_eq!(event.label(), Some("marketplace"));
    assert_eq!(event.url(), Some("http://example.onion/item"));
    assert_eq!(event.title(), Some("Listing"));
    assert_eq!(event.timestamp(), Some("2024-05-01T12:00:00Z"));
    assert_eq!(event.risk_score(), Some(0.42));
    assert!(!event.csam_flag());
    assert_eq!(event.get("crawler_id"), Some(&json!(7)));
    assert!(!event.is_critical());
}

#[test]
fn given_sparse_record_when_parsed_then_accessors_return_none() {
    let event = FeedEvent::parse("{}").unwrap();

    assert!(event.label().is_none());
    assert!(event.risk_score().is_none());
    assert!(!event.csam_flag());
    assert!(event.entity_tags(3).is_empty());
}

#[test]
fn given_entity_groups_when_tags_requested_then_capped_per_group() {
    let event = FeedEvent::parse(
        r#"{"entities": {"btc": ["b1", "b2", "b3", "b4"], "emails": ["e1"], "bad": "x"}}"#,
    )
    .unwrap();

    let tags = event.entity_tags(3);

    assert_eq!(tags, vec!["b1", "b2", "b3", "e1"]);
}

#[test]
fn given_high_risk_or_csam_when_checked_then_critical() {
    let risky = FeedEvent::parse(r#"{"risk_score": 0.81}"#).unwrap();
    let boundary = FeedEvent::parse(r#"{"risk_score": 0.8}"#).unwrap();
    let flagged = FeedEvent::parse(r#"{"risk_score": 0.1, "csam_flag": true}"#).unwrap();

    assert!(risky.is_critical());
    assert!(!boundary.is_critical());
    assert!(flagged.is_critical());
}

#[test]
fn given_invalid_json_when_parsed_then_parse_error() {
    let err = FeedEvent::parse("{not json").unwrap_err();

    assert!(matches!(err, FeedError::Parse { .. }));
}

#[test]
fn given_non_object_json_when_parsed_then_parse_error() {
    for text in ["[1, 2]", "42", "\"hello\"", "null", "true"] {
        let err = FeedEvent::parse(text).unwrap_err();
        assert!(matches!(err, FeedError::Parse { .. }), "{text}");
    }
}

#[test]
fn given_event_when_serialized_then_fields_pass_through() {
    let original = json!({"title": "t", "extra": {"nested": [1, 2]}});
    let event: FeedEvent = serde_json::from_value(original.clone()).unwrap();

    assert_eq!(serde_json::to_value(&event).unwrap(), original);
}
