use super::*;
use crate::race::model::{RankedEntry, Value};

fn kf(order: &[&str]) -> Keyframe {
    Keyframe {
        date: chrono::NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        entries: order
            .iter()
            .enumerate()
            .map(|(i, n)| RankedEntry {
                name: (*n).to_owned(),
                value: Value::default(),
                rank: i,
            })
            .collect(),
    }
}

#[test]
fn links_follow_team_across_reorders() {
    let kfs = vec![kf(&["a", "b"]), kf(&["b", "a"]), kf(&["a", "b"])];
    let idx = TransitionIndex::build(&kfs);

    let a1 = EntryKey { frame: 1, slot: 1 };
    assert_eq!(idx.prev(a1), Some(EntryKey { frame: 0, slot: 0 }));
    assert_eq!(idx.next(a1), Some(EntryKey { frame: 2, slot: 0 }));

    let b0 = EntryKey { frame: 0, slot: 1 };
    assert_eq!(idx.next(b0), Some(EntryKey { frame: 1, slot: 0 }));
    assert_eq!(idx.len(), 4);
}

#[test]
fn endpoints_fall_back_to_self() {
    let kfs = vec![kf(&["a"]), kf(&["a"])];
    let idx = TransitionIndex::build(&kfs);
    let first = EntryKey { frame: 0, slot: 0 };
    let last = EntryKey { frame: 1, slot: 0 };
    assert_eq!(idx.prev(first), None);
    assert_eq!(idx.prev_or_self(first), first);
    assert_eq!(idx.next(last), None);
    assert_eq!(idx.next_or_self(last), last);
}

#[test]
fn empty_sequence_has_no_links() {
    assert!(TransitionIndex::build(&[]).is_empty());
}
