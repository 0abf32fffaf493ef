use crate::config::chart::KeyframeConfig;
use crate::data::document::RawDocument;
use crate::data::parse::parse_records;
use crate::foundation::error::{BarRaceError, BarRaceResult};
use crate::race::keyframes::{DateValues, build_keyframes, group_by_date, resolve_display_rows};
use crate::race::model::{Keyframe, PerformanceRecord, RankedEntry, TeamSet};
use crate::race::transition::{EntryKey, TransitionIndex};

/// Everything derived from a results document at load time.
///
/// Immutable after construction. The renderer and the playback drivers only read from it.
#[derive(Clone, Debug)]
pub struct Race {
    teams: TeamSet,
    date_values: Vec<DateValues>,
    keyframes: Vec<Keyframe>,
    transitions: TransitionIndex,
    rows: usize,
}

impl Race {
    /// Parse, group, rank and index a results document.
    #[tracing::instrument(skip(doc, cfg))]
    pub fn from_document(doc: &RawDocument, cfg: &KeyframeConfig) -> BarRaceResult<Self> {
        let records = parse_records(doc, cfg.roster)?;
        Self::from_records(&records, TeamSet::from_document(doc), cfg)
    }

    /// Build from already parsed records and a team set.
    pub fn from_records(
        records: &[PerformanceRecord],
        teams: TeamSet,
        cfg: &KeyframeConfig,
    ) -> BarRaceResult<Self> {
        cfg.validate()?;
        let date_values = group_by_date(records);
        let rows = resolve_display_rows(cfg.display_rows, &date_values);
        if rows == 0 {
            return Err(BarRaceError::validation("display rows resolved to 0"));
        }
        let keyframes = build_keyframes(&date_values, &teams, cfg.interpolation_steps, rows)?;
        let transitions = TransitionIndex::build(&keyframes);

        tracing::info!(
            teams = teams.len(),
            dates = date_values.len(),
            keyframes = keyframes.len(),
            rows,
            "race prepared"
        );
        Ok(Self {
            teams,
            date_values,
            keyframes,
            transitions,
            rows,
        })
    }

    /// Known teams.
    pub fn teams(&self) -> &TeamSet {
        &self.teams
    }

    /// Real dates with their grouped values, ascending.
    pub fn date_values(&self) -> &[DateValues] {
        &self.date_values
    }

    /// The full keyframe sequence.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Keyframe at `index`.
    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Always `false` for a successfully built race.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Number of visible bar rows (`n`).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Previous/next lookups.
    pub fn transitions(&self) -> &TransitionIndex {
        &self.transitions
    }

    /// Resolve an entry address.
    pub fn entry(&self, key: EntryKey) -> Option<&RankedEntry> {
        self.keyframes.get(key.frame)?.entries.get(key.slot)
    }

    /// Preceding entry of the same team, or the entry itself.
    pub fn prev_or_self(&self, key: EntryKey) -> Option<&RankedEntry> {
        self.entry(self.transitions.prev_or_self(key))
    }

    /// Following entry of the same team, or the entry itself.
    pub fn next_or_self(&self, key: EntryKey) -> Option<&RankedEntry> {
        self.entry(self.transitions.next_or_self(key))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/race/prepared.rs"]
mod tests;
