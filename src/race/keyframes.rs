use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, NaiveDateTime};

use crate::config::chart::DisplayRows;
use crate::foundation::error::{BarRaceError, BarRaceResult};
use crate::foundation::math::lerp_f64;
use crate::race::model::{Keyframe, PerformanceRecord, TeamSet, Value};
use crate::race::rank::rank_teams;

/// Default number of synthetic frames between two real dates.
pub const DEFAULT_INTERPOLATION_STEPS: usize = 10;

/// All team values observed on one real date.
#[derive(Clone, Debug, PartialEq)]
pub struct DateValues {
    /// The real date.
    pub date: NaiveDateTime,
    /// Team id to value. The first record wins when a team repeats.
    pub values: HashMap<String, Value>,
}

impl DateValues {
    fn tests_passed(&self, team: &str) -> u32 {
        self.values.get(team).map_or(0, |v| v.tests_passed)
    }

    fn total_time(&self, team: &str) -> f64 {
        self.values.get(team).map_or(0.0, |v| v.total_time)
    }
}

/// Group records by date then team, sorted by ascending date.
pub fn group_by_date(records: &[PerformanceRecord]) -> Vec<DateValues> {
    let mut by_date: Vec<DateValues> = Vec::new();
    let mut slot_of: HashMap<NaiveDateTime, usize> = HashMap::new();

    for r in records {
        let slot = *slot_of.entry(r.date).or_insert_with(|| {
            by_date.push(DateValues {
                date: r.date,
                values: HashMap::new(),
            });
            by_date.len() - 1
        });
        if let Entry::Vacant(v) = by_date[slot].values.entry(r.team.clone()) {
            v.insert(r.value);
        }
    }

    by_date.sort_by_key(|d| d.date);
    by_date
}

/// Resolve the display row count once for a dataset.
pub fn resolve_display_rows(rows: DisplayRows, date_values: &[DateValues]) -> usize {
    match rows {
        DisplayRows::Fixed(n) => n,
        DisplayRows::FinalDateTeamCount => date_values.last().map_or(0, |d| d.values.len()),
    }
}

/// Expand real dates into the ranked, interpolated keyframe sequence.
///
/// Between each pair of consecutive dates `steps` frames are emitted at `t = i / steps`. The
/// date and `total_time` blend linearly, while `tests_passed` takes the later date's value
/// immediately. A final frame carries the last date's raw values.
#[tracing::instrument(skip(date_values, teams), fields(dates = date_values.len(), teams = teams.len()))]
pub fn build_keyframes(
    date_values: &[DateValues],
    teams: &TeamSet,
    steps: usize,
    rows: usize,
) -> BarRaceResult<Vec<Keyframe>> {
    if steps == 0 {
        return Err(BarRaceError::validation("interpolation steps must be >= 1"));
    }
    let Some(last) = date_values.last() else {
        return Err(BarRaceError::document("no dated records to build keyframes from"));
    };

    let mut keyframes = Vec::with_capacity(date_values.len().saturating_sub(1) * steps + 1);
    for pair in date_values.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ka = a.date.and_utc().timestamp_millis() as f64;
        let kb = b.date.and_utc().timestamp_millis() as f64;

        for i in 0..steps {
            let t = i as f64 / steps as f64;
            let date = date_from_millis(lerp_f64(ka, kb, t))?;
            let entries = rank_teams(teams, rows, |team| {
                Some(Value::new(
                    b.tests_passed(team),
                    lerp_f64(a.total_time(team), b.total_time(team), t),
                ))
            });
            keyframes.push(Keyframe { date, entries });
        }
    }

    let entries = rank_teams(teams, rows, |team| {
        Some(Value::new(last.tests_passed(team), last.total_time(team)))
    });
    keyframes.push(Keyframe {
        date: last.date,
        entries,
    });

    tracing::debug!(keyframes = keyframes.len(), "built keyframes");
    Ok(keyframes)
}

fn date_from_millis(ms: f64) -> BarRaceResult<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms.trunc() as i64)
        .map(|d| d.naive_utc())
        .ok_or_else(|| BarRaceError::document(format!("interpolated timestamp {ms} out of range")))
}

#[cfg(test)]
#[path = "../../tests/unit/race/keyframes.rs"]
mod tests;
