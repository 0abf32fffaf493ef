use super::*;
use crate::config::chart::DisplayRows;
use crate::race::model::Value;
use serde_json::json;

fn doc() -> RawDocument {
    serde_json::from_value(json!({
        "21_03_14": [[["a", 100, "c"], ["b", 50, "c"], ["c", 70, "c"]]],
        "21_03_15": [[["a", 200, "c"], ["b", 60, "c"]], [["a", 5, "c"]]]
    }))
    .unwrap()
}

#[test]
fn prepares_keyframes_and_links() {
    let race = Race::from_document(&doc(), &KeyframeConfig::default()).unwrap();
    assert_eq!(race.teams().len(), 3);
    assert_eq!(race.len(), 11);
    assert_eq!(race.rows(), 15);
    assert_eq!(race.date_values().len(), 2);

    let last = race.keyframes().last().unwrap();
    assert_eq!(last.entries[0].name, "a");
    assert_eq!(last.entries[0].value, Value::new(2, 205.0));

    let key = EntryKey { frame: 1, slot: 0 };
    let prev = race.prev_or_self(key).unwrap();
    assert_eq!(prev.name, race.entry(key).unwrap().name);
}

#[test]
fn final_date_team_count_sets_rows() {
    let cfg = KeyframeConfig {
        display_rows: DisplayRows::FinalDateTeamCount,
        ..KeyframeConfig::default()
    };
    let race = Race::from_document(&doc(), &cfg).unwrap();
    assert_eq!(race.rows(), 2);
    assert!(race.keyframes().iter().flat_map(|k| &k.entries).all(|e| e.rank <= 2));
}

#[test]
fn zero_rows_is_rejected() {
    let cfg = KeyframeConfig {
        display_rows: DisplayRows::Fixed(0),
        ..KeyframeConfig::default()
    };
    assert!(Race::from_document(&doc(), &cfg).is_err());
}
