use std::cmp::Ordering;

use crate::race::model::{RankedEntry, TeamSet, Value};

/// Default number of bar slots shown.
pub const DEFAULT_DISPLAY_ROWS: usize = 15;

/// Race ordering: more tests passed first, then lower total time. Missing values sort last.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => b
            .tests_passed
            .cmp(&a.tests_passed)
            .then_with(|| a.total_time.total_cmp(&b.total_time)),
    }
}

/// Rank every team of `teams` by the value `value_of` reports for it.
///
/// Ties keep team-set order. Each entry's `rank` is its sorted position clamped to
/// `display_limit`, so teams past the last visible slot share that slot instead of vanishing.
/// Teams with no value rank last and carry a zero value.
pub fn rank_teams<F>(teams: &TeamSet, display_limit: usize, mut value_of: F) -> Vec<RankedEntry>
where
    F: FnMut(&str) -> Option<Value>,
{
    let mut rows: Vec<(&str, Option<Value>)> =
        teams.iter().map(|team| (team, value_of(team))).collect();
    rows.sort_by(|a, b| compare_values(a.1.as_ref(), b.1.as_ref()));

    rows.into_iter()
        .enumerate()
        .map(|(i, (name, value))| RankedEntry {
            name: name.to_owned(),
            value: value.unwrap_or_default(),
            rank: i.min(display_limit),
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/race/rank.rs"]
mod tests;
