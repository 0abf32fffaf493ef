use std::collections::HashSet;

use crate::data::document::{RawDocument, TestResults, parse_date_key};
use crate::foundation::error::{BarRaceError, BarRaceResult};
use crate::race::model::{PerformanceRecord, Value};

/// Which teams are considered present on a given date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterPolicy {
    /// Only teams listed in the date's first test results. A team missing from the first test
    /// is ignored for that date even if later tests list it.
    #[default]
    FirstTest,
    /// Every team listed in any of the date's tests.
    AllTests,
}

/// Flatten a results document into one record per roster team per date.
///
/// For each roster team, `tests_passed` counts the tests whose results list the team and
/// `total_time` sums the team's time over those tests (first occurrence per test).
#[tracing::instrument(skip(doc), fields(dates = doc.dates.len()))]
pub fn parse_records(
    doc: &RawDocument,
    policy: RosterPolicy,
) -> BarRaceResult<Vec<PerformanceRecord>> {
    doc.validate()?;

    let mut out = Vec::new();
    for (key, tests) in &doc.dates {
        let date = parse_date_key(key)?;
        for (team, commit) in roster(tests, policy) {
            let mut tests_passed = 0u32;
            let mut total_time = 0.0;
            for test in tests {
                if let Some(r) = test.iter().find(|r| r.team() == team) {
                    tests_passed += 1;
                    total_time += r.time();
                }
            }
            if !total_time.is_finite() {
                return Err(BarRaceError::document(format!(
                    "date '{key}' team '{team}': total time overflows"
                )));
            }
            out.push(PerformanceRecord {
                team: team.to_owned(),
                date,
                commit: commit.to_owned(),
                value: Value::new(tests_passed, total_time),
            });
        }
    }

    tracing::debug!(records = out.len(), "parsed performance records");
    Ok(out)
}

fn roster(tests: &[TestResults], policy: RosterPolicy) -> Vec<(&str, &str)> {
    match policy {
        RosterPolicy::FirstTest => tests
            .first()
            .map(|first| first.iter().map(|r| (r.team(), r.commit())).collect())
            .unwrap_or_default(),
        RosterPolicy::AllTests => {
            let mut seen = HashSet::new();
            tests
                .iter()
                .flatten()
                .filter(|r| seen.insert(r.team()))
                .map(|r| (r.team(), r.commit()))
                .collect()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/parse.rs"]
mod tests;
