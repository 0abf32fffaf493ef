use super::*;
use chrono::Datelike as _;
use serde_json::json;

fn doc(v: serde_json::Value) -> RawDocument {
    serde_json::from_value(v).unwrap()
}

#[test]
fn deserializes_triples_per_test() {
    let d = doc(json!({
        "21_03_14": [
            [["alpha", 120, "abc"], ["beta", 80, "def"]],
            [["alpha", 30, "abc"]]
        ]
    }));
    let tests = &d.dates["21_03_14"];
    assert_eq!(tests.len(), 2);
    assert_eq!(tests[0][1].team(), "beta");
    assert_eq!(tests[0][1].time(), 80.0);
    assert_eq!(tests[0][1].commit(), "def");
    assert!(d.validate().is_ok());
}

#[test]
fn date_keys_use_two_digit_years() {
    let dt = parse_date_key("21_03_14").unwrap();
    assert_eq!((dt.year(), dt.month(), dt.day()), (2021, 3, 14));
    let dt = parse_date_key("99_12_31").unwrap();
    assert_eq!(dt.year(), 1999);
}

#[test]
fn rejects_bad_date_key() {
    let d = doc(json!({ "2021-03-14": [[["alpha", 1, "c"]]] }));
    let err = d.validate().unwrap_err();
    assert!(matches!(err, BarRaceError::Document(_)));
    assert!(err.to_string().contains("2021-03-14"));
}

#[test]
fn rejects_empty_document_and_missing_tests() {
    assert!(doc(json!({})).validate().is_err());
    let err = doc(json!({ "21_03_14": [] })).validate().unwrap_err();
    assert!(err.to_string().contains("no test result lists"));
}

#[test]
fn rejects_negative_time_and_blank_team() {
    let err = doc(json!({ "21_03_14": [[["alpha", -1, "c"]]] }))
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("time must be finite"));

    let err = doc(json!({ "21_03_14": [[["", 1, "c"]]] }))
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("empty team id"));
}

#[test]
fn rejects_control_characters_in_team_id() {
    let err = doc(json!({ "21_03_14": [[["al\u{1}pha", 1, "c"]]] }))
        .validate()
        .unwrap_err();
    assert!(matches!(err, BarRaceError::Document(_)));
    assert!(err.to_string().contains("control characters"));
}

#[test]
fn malformed_triple_is_a_serde_error() {
    let err = RawDocument::from_json_str(r#"{"21_03_14": [[["alpha", "fast", "c"]]]}"#)
        .unwrap_err();
    assert!(matches!(err, BarRaceError::Serde(_)));
}

#[test]
fn results_iterates_in_document_order() {
    let d = doc(json!({
        "21_03_15": [[["c", 1, "x"]]],
        "21_03_14": [[["a", 1, "x"]], [["b", 1, "x"]]]
    }));
    let teams: Vec<&str> = d.results().map(|r| r.team()).collect();
    assert_eq!(teams, vec!["a", "b", "c"]);
}
