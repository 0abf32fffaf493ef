use super::*;
use crate::data::document::RawDocument;
use serde_json::json;

fn teams(names: &[&str]) -> TeamSet {
    let results: Vec<serde_json::Value> = names.iter().map(|n| json!([n, 1, "c"])).collect();
    let doc: RawDocument = serde_json::from_value(json!({ "21_01_01": [results] })).unwrap();
    TeamSet::from_document(&doc)
}

#[test]
fn more_tests_beat_faster_time() {
    let t = teams(&["slow", "fast"]);
    let ranked = rank_teams(&t, 15, |team| match team {
        "slow" => Some(Value::new(3, 900.0)),
        _ => Some(Value::new(2, 10.0)),
    });
    assert_eq!(ranked[0].name, "slow");
    assert_eq!(ranked[0].rank, 0);
    assert_eq!(ranked[1].name, "fast");
    assert_eq!(ranked[1].rank, 1);
}

#[test]
fn equal_tests_rank_by_lower_time() {
    let t = teams(&["a", "b"]);
    let ranked = rank_teams(&t, 15, |team| match team {
        "a" => Some(Value::new(2, 200.0)),
        _ => Some(Value::new(2, 100.0)),
    });
    assert_eq!(ranked[0].name, "b");
}

#[test]
fn missing_values_sort_last_with_zero_value() {
    let t = teams(&["ghost", "a"]);
    let ranked = rank_teams(&t, 15, |team| match team {
        "a" => Some(Value::new(0, 500.0)),
        _ => None,
    });
    assert_eq!(ranked[1].name, "ghost");
    assert_eq!(ranked[1].value, Value::default());
}

#[test]
fn ties_keep_team_set_order() {
    let t = teams(&["c", "a", "b"]);
    let ranked = rank_teams(&t, 15, |_| Some(Value::new(1, 1.0)));
    let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn ranks_clamp_to_display_limit() {
    let t = teams(&["a", "b", "c", "d", "e"]);
    let ranked = rank_teams(&t, 2, |team| {
        let time = match team {
            "a" => 1.0,
            "b" => 2.0,
            "c" => 3.0,
            "d" => 4.0,
            _ => 5.0,
        };
        Some(Value::new(1, time))
    });
    let ranks: Vec<usize> = ranked.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![0, 1, 2, 2, 2]);
    assert_eq!(ranked.len(), 5);
}
