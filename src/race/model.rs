use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::data::document::RawDocument;

/// A team's standing at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Value {
    /// Number of tests the team's submission passed.
    pub tests_passed: u32,
    /// Sum of elapsed times over the passed tests, in milliseconds.
    pub total_time: f64,
}

impl Value {
    /// Build a value.
    pub fn new(tests_passed: u32, total_time: f64) -> Self {
        Self {
            tests_passed,
            total_time,
        }
    }
}

/// A team's aggregated result on one date.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PerformanceRecord {
    /// Team identifier.
    pub team: String,
    /// Date of the results.
    pub date: NaiveDateTime,
    /// Commit from the team's first-test result.
    pub commit: String,
    /// Aggregated standing.
    pub value: Value,
}

/// The fixed set of teams known to a race, in first-appearance order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TeamSet {
    names: Vec<String>,
}

impl TeamSet {
    /// Collect every team id appearing in any test result of the document.
    pub fn from_document(doc: &RawDocument) -> Self {
        Self::from_names(doc.results().map(|r| r.team()))
    }

    /// Collect the teams named by a list of records.
    pub fn from_records(records: &[PerformanceRecord]) -> Self {
        Self::from_names(records.iter().map(|r| r.team.as_str()))
    }

    fn from_names<'a>(names: impl Iterator<Item = &'a str>) -> Self {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for name in names {
            if seen.insert(name) {
                out.push(name.to_owned());
            }
        }
        Self { names: out }
    }

    /// Team ids in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of teams.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` when no team is known.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `true` when `team` is part of the set.
    pub fn contains(&self, team: &str) -> bool {
        self.names.iter().any(|n| n == team)
    }
}

/// A team's ranked position inside one keyframe.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RankedEntry {
    /// Team identifier.
    pub name: String,
    /// Standing used for ordering and bar length.
    pub value: Value,
    /// Zero-based display slot, clamped to the display row count.
    pub rank: usize,
}

/// One animation tick: a date and every known team, ranked.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Real or interpolated date of this tick.
    pub date: NaiveDateTime,
    /// Entries sorted by rank, one per known team.
    pub entries: Vec<RankedEntry>,
}

impl Keyframe {
    /// Entries drawn when `rows` bars are visible.
    pub fn visible(&self, rows: usize) -> &[RankedEntry] {
        &self.entries[..rows.min(self.entries.len())]
    }

    /// Position of `team` in `entries`.
    pub fn slot_of(&self, team: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == team)
    }

    /// Entry for `team`, if known.
    pub fn entry(&self, team: &str) -> Option<&RankedEntry> {
        self.entries.iter().find(|e| e.name == team)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/race/model.rs"]
mod tests;
