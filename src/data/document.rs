use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;
use chrono::{NaiveDate, NaiveDateTime};

use crate::foundation::error::{BarRaceError, BarRaceResult};

/// Date key layout used by the results document (`21_03_14`).
pub const DATE_KEY_FORMAT: &str = "%y_%m_%d";

/// One `(team, time, commit)` triple from a single test's result list.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawResult(pub String, pub f64, pub String);

impl RawResult {
    /// Team identifier.
    pub fn team(&self) -> &str {
        &self.0
    }

    /// Elapsed time reported for this test, in milliseconds.
    pub fn time(&self) -> f64 {
        self.1
    }

    /// Commit the result was produced from.
    pub fn commit(&self) -> &str {
        &self.2
    }
}

/// Results of one test on one date.
pub type TestResults = Vec<RawResult>;

/// The results document: date key to one result list per test.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RawDocument {
    /// Date key (`YY_MM_DD`) to per-test result lists, in test order.
    pub dates: BTreeMap<String, Vec<TestResults>>,
}

impl RawDocument {
    /// Read and parse a document from a JSON file.
    pub fn from_path(path: &Path) -> BarRaceResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open results document '{}'", path.display()))?;
        let doc: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            BarRaceError::serde(format!(
                "parse results document '{}': {e}",
                path.display()
            ))
        })?;
        Ok(doc)
    }

    /// Parse a document from a JSON string.
    pub fn from_json_str(s: &str) -> BarRaceResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Check the document shape before any processing.
    pub fn validate(&self) -> BarRaceResult<()> {
        if self.dates.is_empty() {
            return Err(BarRaceError::document("document contains no dates"));
        }
        for (key, tests) in &self.dates {
            parse_date_key(key)?;
            if tests.is_empty() {
                return Err(BarRaceError::document(format!(
                    "date '{key}' has no test result lists"
                )));
            }
            for (ti, test) in tests.iter().enumerate() {
                for (ri, r) in test.iter().enumerate() {
                    if r.team().is_empty() {
                        return Err(BarRaceError::document(format!(
                            "date '{key}' test {ti} result {ri}: empty team id"
                        )));
                    }
                    if r.team().chars().any(|c| c.is_control()) {
                        return Err(BarRaceError::document(format!(
                            "date '{key}' test {ti} result {ri}: team id {:?} contains control characters",
                            r.team()
                        )));
                    }
                    if !r.time().is_finite() || r.time() < 0.0 {
                        return Err(BarRaceError::document(format!(
                            "date '{key}' test {ti} result {ri}: time must be finite and >= 0, got {}",
                            r.time()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Every result triple in document order (date key, then test, then result).
    pub fn results(&self) -> impl Iterator<Item = &RawResult> {
        self.dates.values().flatten().flatten()
    }
}

/// Parse a `YY_MM_DD` key into midnight of that date.
///
/// Two-digit years 69..=99 land in the 1900s and 00..=68 in the 2000s.
pub fn parse_date_key(key: &str) -> BarRaceResult<NaiveDateTime> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .map(|d| d.and_time(chrono::NaiveTime::default()))
        .map_err(|e| BarRaceError::document(format!("invalid date key '{key}': {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/data/document.rs"]
mod tests;
