use std::collections::{BTreeMap, HashMap};

use crate::race::model::Keyframe;

/// Address of one [`RankedEntry`](crate::RankedEntry) inside a keyframe sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey {
    /// Keyframe index.
    pub frame: usize,
    /// Position inside that keyframe's `entries`.
    pub slot: usize,
}

/// Chronological neighbours of every entry, per team.
///
/// Built once from the full keyframe sequence and read-only afterwards. A missing neighbour
/// means the entry is the team's first (or last) appearance; callers fall back to the entry
/// itself.
#[derive(Clone, Debug, Default)]
pub struct TransitionIndex {
    prev: HashMap<EntryKey, EntryKey>,
    next: HashMap<EntryKey, EntryKey>,
}

impl TransitionIndex {
    /// Group entries by team name across all keyframes and link consecutive ones.
    pub fn build(keyframes: &[Keyframe]) -> Self {
        let mut by_name: BTreeMap<&str, Vec<EntryKey>> = BTreeMap::new();
        for (frame, kf) in keyframes.iter().enumerate() {
            for (slot, entry) in kf.entries.iter().enumerate() {
                by_name
                    .entry(entry.name.as_str())
                    .or_default()
                    .push(EntryKey { frame, slot });
            }
        }

        let mut prev = HashMap::new();
        let mut next = HashMap::new();
        for keys in by_name.values() {
            for pair in keys.windows(2) {
                next.insert(pair[0], pair[1]);
                prev.insert(pair[1], pair[0]);
            }
        }
        Self { prev, next }
    }

    /// The same team's entry in the preceding keyframe that lists it.
    pub fn prev(&self, key: EntryKey) -> Option<EntryKey> {
        self.prev.get(&key).copied()
    }

    /// The same team's entry in the following keyframe that lists it.
    pub fn next(&self, key: EntryKey) -> Option<EntryKey> {
        self.next.get(&key).copied()
    }

    /// [`Self::prev`], or `key` itself when there is none.
    pub fn prev_or_self(&self, key: EntryKey) -> EntryKey {
        self.prev(key).unwrap_or(key)
    }

    /// [`Self::next`], or `key` itself when there is none.
    pub fn next_or_self(&self, key: EntryKey) -> EntryKey {
        self.next(key).unwrap_or(key)
    }

    /// Number of linked pairs.
    pub fn len(&self) -> usize {
        self.next.len()
    }

    /// `true` when no entry has a neighbour.
    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/race/transition.rs"]
mod tests;
