use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::animation::ease::Ease;
use crate::data::parse::RosterPolicy;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{BarRaceError, BarRaceResult};
use crate::race::keyframes::DEFAULT_INTERPOLATION_STEPS;
use crate::race::rank::DEFAULT_DISPLAY_ROWS;

/// How many bar rows are shown (`n`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayRows {
    /// A fixed number of rows.
    Fixed(usize),
    /// As many rows as teams reported on the last date.
    FinalDateTeamCount,
}

impl Default for DisplayRows {
    fn default() -> Self {
        Self::Fixed(DEFAULT_DISPLAY_ROWS)
    }
}

/// Top-level configuration document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    /// Keyframe building.
    pub keyframes: KeyframeConfig,
    /// Geometry.
    pub layout: LayoutConfig,
    /// Colours, fonts and text.
    pub style: StyleConfig,
    /// Per-keyframe transition.
    pub transition: TransitionConfig,
    /// Output video settings.
    pub video: VideoConfig,
}

impl ChartConfig {
    /// Load a config from a JSON file.
    pub fn from_path(path: &Path) -> BarRaceResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            BarRaceError::serde(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON string.
    pub fn from_json_str(s: &str) -> BarRaceResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> BarRaceResult<()> {
        self.keyframes.validate()?;
        self.layout.validate()?;
        self.style.validate()?;
        Fps::new(self.video.fps.num, self.video.fps.den)?;
        Ok(())
    }
}

/// Keyframe building settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyframeConfig {
    /// Synthetic frames between two real dates (K).
    pub interpolation_steps: usize,
    /// Visible row count.
    pub display_rows: DisplayRows,
    /// Which teams count as present on a date.
    pub roster: RosterPolicy,
}

impl Default for KeyframeConfig {
    fn default() -> Self {
        Self {
            interpolation_steps: DEFAULT_INTERPOLATION_STEPS,
            display_rows: DisplayRows::default(),
            roster: RosterPolicy::default(),
        }
    }
}

impl KeyframeConfig {
    /// Reject zero steps or a fixed zero row count.
    pub fn validate(&self) -> BarRaceResult<()> {
        if self.interpolation_steps == 0 {
            return Err(BarRaceError::validation(
                "keyframes.interpolation_steps must be >= 1",
            ));
        }
        if self.display_rows == DisplayRows::Fixed(0) {
            return Err(BarRaceError::validation(
                "keyframes.display_rows must be >= 1",
            ));
        }
        Ok(())
    }
}

/// Margins around the plot area, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Margin {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            left: 140,
            top: 20,
            right: 10,
            bottom: 20,
        }
    }
}

/// Chart geometry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Height of one bar row in pixels.
    pub bar_size: u32,
    /// Plot margins.
    pub margin: Margin,
    /// Horizontal pixels per axis tick (tick count is `width / tick_spacing`).
    pub tick_spacing: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 960,
            bar_size: 48,
            margin: Margin::default(),
            tick_spacing: 160,
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> BarRaceResult<()> {
        if self.bar_size == 0 {
            return Err(BarRaceError::validation("layout.bar_size must be > 0"));
        }
        if self.tick_spacing == 0 {
            return Err(BarRaceError::validation("layout.tick_spacing must be > 0"));
        }
        let horizontal = self
            .margin
            .left
            .checked_add(self.margin.right)
            .ok_or_else(|| BarRaceError::validation("layout.margin left + right overflows"))?;
        if horizontal >= self.width {
            return Err(BarRaceError::validation(
                "layout.width must exceed left + right margins",
            ));
        }
        Ok(())
    }

    /// Canvas size for `rows` visible bars.
    pub fn canvas(&self, rows: usize) -> Canvas {
        let rows = u32::try_from(rows).unwrap_or(u32::MAX);
        Canvas {
            width: self.width,
            height: self
                .margin
                .top
                .saturating_add(self.bar_size.saturating_mul(rows))
                .saturating_add(self.margin.bottom),
        }
    }
}

/// Colours, fonts and text decorations. Colours are any SVG paint string.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Bar fills indexed by tests passed (1 = first entry).
    pub palette: Vec<String>,
    pub background: String,
    /// Fill opacity of the bar layer.
    pub bar_opacity: f64,
    /// Stroke for every gridline after the first.
    pub gridline_color: String,
    pub text_color: String,
    pub font_family: String,
    /// Glyph repeated once per passed test in label readouts.
    pub star_glyph: String,
    /// Ticker date pattern (d3 time-format directives).
    pub date_format: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            palette: vec![
                "lightgrey".to_owned(),
                "#ffcc00".to_owned(),
                "green".to_owned(),
                "#002060".to_owned(),
            ],
            background: "white".to_owned(),
            bar_opacity: 0.6,
            gridline_color: "white".to_owned(),
            text_color: "black".to_owned(),
            font_family: "Inter, sans-serif".to_owned(),
            star_glyph: "\u{2605}".to_owned(),
            date_format: "%B %d, %Y".to_owned(),
        }
    }
}

impl StyleConfig {
    fn validate(&self) -> BarRaceResult<()> {
        if self.palette.is_empty() {
            return Err(BarRaceError::validation("style.palette must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.bar_opacity) {
            return Err(BarRaceError::validation(
                "style.bar_opacity must be within [0, 1]",
            ));
        }
        Ok(())
    }

    /// Bar fill for a team that passed `tests_passed` tests.
    ///
    /// 1 maps to the first palette entry, 0 reuses it, and larger counts wrap around.
    pub fn fill_for(&self, tests_passed: u32) -> &str {
        let len = self.palette.len();
        if len == 0 {
            return "black";
        }
        let i = (tests_passed.saturating_sub(1) as usize) % len;
        &self.palette[i]
    }
}

/// Per-keyframe transition settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    pub duration_ms: u64,
    pub ease: Ease,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 150,
            ease: Ease::Linear,
        }
    }
}

impl TransitionConfig {
    /// Transition length.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Output video settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    pub fps: Fps,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: Fps { num: 60, den: 1 },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/chart.rs"]
mod tests;
