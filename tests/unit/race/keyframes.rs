use super::*;
use crate::data::document::{RawDocument, parse_date_key};
use crate::data::parse::{RosterPolicy, parse_records};
use serde_json::json;

fn date(key: &str) -> NaiveDateTime {
    parse_date_key(key).unwrap()
}

fn record(team: &str, key: &str, tests: u32, time: f64) -> PerformanceRecord {
    PerformanceRecord {
        team: team.to_owned(),
        date: date(key),
        commit: "c".to_owned(),
        value: Value::new(tests, time),
    }
}

#[test]
fn grouping_sorts_dates_and_keeps_first_duplicate() {
    let records = vec![
        record("a", "21_03_15", 1, 10.0),
        record("a", "21_03_14", 2, 20.0),
        record("a", "21_03_14", 3, 30.0),
    ];
    let grouped = group_by_date(&records);
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].date, date("21_03_14"));
    assert_eq!(grouped[0].values["a"], Value::new(2, 20.0));
    assert_eq!(grouped[1].date, date("21_03_15"));
}

#[test]
fn midpoint_frame_blends_time_and_takes_later_tests() {
    let records = vec![
        record("a", "21_03_14", 2, 100.0),
        record("a", "21_03_15", 2, 200.0),
    ];
    let teams = TeamSet::from_records(&records);
    let kfs = build_keyframes(&group_by_date(&records), &teams, 10, 15).unwrap();
    assert_eq!(kfs.len(), 11);

    let mid = &kfs[5];
    assert_eq!(mid.entries[0].value.total_time, 150.0);
    assert_eq!(mid.entries[0].value.tests_passed, 2);
    assert_eq!(mid.date, date("21_03_14") + chrono::Duration::hours(12));
}

#[test]
fn tests_passed_jumps_to_later_value_on_first_step() {
    let records = vec![
        record("a", "21_03_14", 1, 100.0),
        record("a", "21_03_15", 4, 100.0),
    ];
    let teams = TeamSet::from_records(&records);
    let kfs = build_keyframes(&group_by_date(&records), &teams, 4, 15).unwrap();
    assert_eq!(kfs[0].date, date("21_03_14"));
    assert!(kfs.iter().all(|k| k.entries[0].value.tests_passed == 4));
}

#[test]
fn final_frame_uses_raw_last_values() {
    let records = vec![
        record("a", "21_03_14", 1, 100.0),
        record("b", "21_03_14", 1, 50.0),
        record("a", "21_03_15", 2, 300.0),
    ];
    let teams = TeamSet::from_records(&records);
    let kfs = build_keyframes(&group_by_date(&records), &teams, 10, 15).unwrap();
    let last = kfs.last().unwrap();
    assert_eq!(last.date, date("21_03_15"));
    assert_eq!(last.entry("a").unwrap().value, Value::new(2, 300.0));
    assert_eq!(last.entry("b").unwrap().value, Value::new(0, 0.0));
}

#[test]
fn absent_team_blends_towards_zero() {
    let records = vec![
        record("a", "21_03_14", 1, 100.0),
        record("b", "21_03_14", 1, 80.0),
        record("a", "21_03_15", 1, 100.0),
    ];
    let teams = TeamSet::from_records(&records);
    let kfs = build_keyframes(&group_by_date(&records), &teams, 2, 15).unwrap();
    let b_mid = kfs[1].entry("b").unwrap();
    assert_eq!(b_mid.value, Value::new(0, 40.0));
}

#[test]
fn single_date_yields_single_raw_frame() {
    let records = vec![record("a", "21_03_14", 3, 12.0)];
    let teams = TeamSet::from_records(&records);
    let kfs = build_keyframes(&group_by_date(&records), &teams, 10, 15).unwrap();
    assert_eq!(kfs.len(), 1);
    assert_eq!(kfs[0].entries[0].value, Value::new(3, 12.0));
}

#[test]
fn rejects_zero_steps_and_empty_input() {
    let teams = TeamSet::default();
    assert!(build_keyframes(&[], &teams, 10, 15).is_err());
    let records = vec![record("a", "21_03_14", 3, 12.0)];
    assert!(build_keyframes(&group_by_date(&records), &teams, 0, 15).is_err());
}

#[test]
fn display_rows_resolution() {
    let records = vec![
        record("a", "21_03_14", 1, 1.0),
        record("b", "21_03_14", 1, 1.0),
        record("c", "21_03_14", 1, 1.0),
        record("a", "21_03_15", 1, 1.0),
        record("b", "21_03_15", 1, 1.0),
    ];
    let grouped = group_by_date(&records);
    assert_eq!(resolve_display_rows(DisplayRows::Fixed(15), &grouped), 15);
    assert_eq!(
        resolve_display_rows(DisplayRows::FinalDateTeamCount, &grouped),
        2
    );
}

#[test]
fn document_to_keyframes_is_deterministic() {
    let doc: RawDocument = serde_json::from_value(json!({
        "21_03_14": [[["a", 10, "c"], ["b", 12, "c"]], [["b", 3, "c"]]],
        "21_03_16": [[["b", 9, "c"], ["a", 8, "c"]], [["a", 1, "c"]]]
    }))
    .unwrap();
    let build = || {
        let records = parse_records(&doc, RosterPolicy::FirstTest).unwrap();
        let teams = TeamSet::from_document(&doc);
        build_keyframes(&group_by_date(&records), &teams, 10, 15).unwrap()
    };
    assert_eq!(build(), build());
}
