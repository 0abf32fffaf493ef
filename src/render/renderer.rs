use std::collections::HashMap;
use std::time::Duration;

use crate::animation::ease::Ease;
use crate::animation::tween::{Lerp, Tween};
use crate::config::chart::{ChartConfig, LayoutConfig, StyleConfig, TransitionConfig};
use crate::format::locale::TimeLocale;
use crate::format::number::{format_grouped_int, format_tick};
use crate::foundation::core::{Canvas, Point, Rect, Vec2};
use crate::foundation::error::{BarRaceError, BarRaceResult};
use crate::foundation::math::lerp_f64;
use crate::race::model::RankedEntry;
use crate::race::prepared::Race;
use crate::race::transition::EntryKey;
use crate::render::scale::{BandScale, LinearScale};
use crate::render::scene::{
    AxisScene, AxisTick, BarLayer, BarShape, LabelLayer, LabelShape, Scene, TickerScene,
};

const BAND_PADDING: f64 = 0.1;
const TICKER_INSET: f64 = 6.0;

/// How a keyframe change animates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub duration: Duration,
    pub ease: Ease,
}

impl Transition {
    pub fn new(duration: Duration, ease: Ease) -> Self {
        Self { duration, ease }
    }

    pub fn from_config(cfg: &TransitionConfig) -> Self {
        Self::new(cfg.duration(), cfg.ease)
    }

    /// Jump straight to the target state.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Ease::Linear)
    }

    pub fn is_instant(&self) -> bool {
        self.duration.is_zero()
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::from_config(&TransitionConfig::default())
    }
}

/// Pixel geometry shared by every frame of a race.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartLayout {
    canvas: Canvas,
    x_range: [f64; 2],
    y: BandScale,
    top: f64,
    bar_size: f64,
    tick_count: f64,
    grid_len: f64,
    ticker_anchor: Point,
}

impl ChartLayout {
    /// Geometry for `rows` visible bars. Bands cover ranks `0..=rows` so the clamped overflow
    /// slot sits just below the plot.
    pub fn new(layout: &LayoutConfig, rows: usize) -> Self {
        let width = f64::from(layout.width);
        let top = f64::from(layout.margin.top);
        let bar = f64::from(layout.bar_size);
        let n = rows as f64;
        Self {
            canvas: layout.canvas(rows),
            x_range: [
                f64::from(layout.margin.left),
                width - f64::from(layout.margin.right),
            ],
            y: BandScale::new(
                rows + 1,
                [top, top + bar * (n + 1.0 + BAND_PADDING)],
                BAND_PADDING,
                true,
            ),
            top,
            bar_size: bar,
            tick_count: width / f64::from(layout.tick_spacing.max(1)),
            grid_len: bar * (n + BAND_PADDING),
            ticker_anchor: Point::new(width - TICKER_INSET, top + bar * (n - 0.45)),
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Horizontal scale for a domain of `[0, max]`.
    pub fn x_scale(&self, max: f64) -> LinearScale {
        LinearScale::new([0.0, domain_max(max)], self.x_range)
    }

    pub fn y(&self) -> &BandScale {
        &self.y
    }

    fn bar_geom(&self, x: &LinearScale, entry: &RankedEntry) -> BarGeom {
        BarGeom {
            y: self.y.position(entry.rank),
            width: x.apply(entry.value.total_time) - x.apply(0.0),
        }
    }

    fn label_anchor(&self, x: &LinearScale, entry: &RankedEntry) -> Vec2 {
        Vec2::new(x.apply(entry.value.total_time), self.y.position(entry.rank))
    }
}

fn domain_max(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 { max } else { 1.0 }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BarGeom {
    y: f64,
    width: f64,
}

impl Lerp for BarGeom {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            y: lerp_f64(a.y, b.y, t),
            width: lerp_f64(a.width, b.width, t),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct BarNode {
    name: String,
    datum: EntryKey,
    fill: String,
    geom: Tween<BarGeom>,
    exiting: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct LabelNode {
    name: String,
    datum: EntryKey,
    pos: Tween<Vec2>,
    readout: Tween<f64>,
    stars: u32,
    exiting: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct TickerNode {
    text: String,
    pending: Option<String>,
}

/// Live elements carried from one `render` call to the next.
#[derive(Clone, Debug, PartialEq)]
pub struct RendererState {
    bars: Vec<BarNode>,
    labels: Vec<LabelNode>,
    axis_max: Tween<f64>,
    ticker: TickerNode,
    keyframe: Option<usize>,
}

impl RendererState {
    fn new(ticker: String) -> Self {
        Self {
            bars: Vec::new(),
            labels: Vec::new(),
            axis_max: Tween::hold(1.0),
            ticker: TickerNode {
                text: ticker,
                pending: None,
            },
            keyframe: None,
        }
    }

    /// Keyframe passed to the latest `render` call.
    pub fn keyframe(&self) -> Option<usize> {
        self.keyframe
    }

    /// Names of live bars, exiting ones included.
    pub fn bar_names(&self) -> impl Iterator<Item = &str> {
        self.bars.iter().map(|b| b.name.as_str())
    }

    pub fn exiting_bars(&self) -> usize {
        self.bars.iter().filter(|b| b.exiting).count()
    }

    /// Date currently shown by the ticker.
    pub fn ticker_text(&self) -> &str {
        &self.ticker.text
    }

    fn freeze(&mut self, t: f64) {
        self.bars.retain(|b| !b.exiting);
        self.labels.retain(|l| !l.exiting);
        for b in &mut self.bars {
            b.geom = Tween::hold(b.geom.at(t));
        }
        for l in &mut self.labels {
            l.pos = Tween::hold(l.pos.at(t));
            l.readout = Tween::hold(l.readout.at(t));
        }
        self.axis_max = Tween::hold(self.axis_max.at(t));
        self.ticker.pending = None;
    }

    fn settle(&mut self) {
        self.bars.retain(|b| !b.exiting);
        self.labels.retain(|l| !l.exiting);
        for b in &mut self.bars {
            b.geom.settle();
        }
        for l in &mut self.labels {
            l.pos.settle();
            l.readout.settle();
        }
        self.axis_max.settle();
        if let Some(text) = self.ticker.pending.take() {
            self.ticker.text = text;
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveTransition {
    transition: Transition,
    progress: f64,
}

impl ActiveTransition {
    fn eased(&self) -> f64 {
        self.transition.ease.apply(self.progress)
    }
}

/// Retained-mode bar chart renderer.
///
/// `render` joins a keyframe against the live elements and starts a transition. `seek` or
/// `advance` move that transition forward and `scene` samples the current frame. Both the
/// autoplay loop and the scrubber drive the chart through this one type.
pub struct Renderer<'a> {
    race: &'a Race,
    style: &'a StyleConfig,
    locale: &'a TimeLocale,
    layout: ChartLayout,
    state: RendererState,
    active: Option<ActiveTransition>,
}

impl<'a> Renderer<'a> {
    pub fn new(race: &'a Race, cfg: &'a ChartConfig, locale: &'a TimeLocale) -> BarRaceResult<Self> {
        cfg.validate()?;
        let first = race
            .keyframe(0)
            .ok_or_else(|| BarRaceError::render("race has no keyframes"))?;
        let ticker = locale.format(&first.date, &cfg.style.date_format);
        Ok(Self {
            race,
            style: &cfg.style,
            locale,
            layout: ChartLayout::new(&cfg.layout, race.rows()),
            state: RendererState::new(ticker),
            active: None,
        })
    }

    pub fn race(&self) -> &'a Race {
        self.race
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn state(&self) -> &RendererState {
        &self.state
    }

    /// `true` while a transition has not reached its end.
    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    /// Linear progress of the running transition, `1.0` when idle.
    pub fn progress(&self) -> f64 {
        self.active.map_or(1.0, |a| a.progress)
    }

    /// Show keyframe `index`, animating from whatever is on screen now.
    ///
    /// A transition still in flight is interrupted: live elements keep their sampled position,
    /// its exits are dropped and its ticker update never lands.
    pub fn render(&mut self, index: usize, transition: Transition) -> BarRaceResult<()> {
        let race = self.race;
        let kf = race.keyframe(index).ok_or_else(|| {
            BarRaceError::render(format!(
                "keyframe index {index} out of range (len {})",
                race.len()
            ))
        })?;

        match self.active.take() {
            Some(a) if a.progress < 1.0 => self.state.freeze(a.eased()),
            Some(_) => self.state.settle(),
            None => {}
        }

        let visible = kf.visible(race.rows());
        let max = visible
            .iter()
            .map(|e| e.value.total_time)
            .fold(0.0, f64::max);
        let from_max = self.state.axis_max.to;
        self.state.axis_max = Tween::new(from_max, domain_max(max));
        let x = self.layout.x_scale(max);

        self.join_bars(index, visible, &x);
        self.join_labels(index, visible, &x);
        self.state.ticker.pending = Some(self.locale.format(&kf.date, &self.style.date_format));
        self.state.keyframe = Some(index);

        tracing::trace!(index, visible = visible.len(), "render keyframe");
        self.active = Some(ActiveTransition {
            transition,
            progress: 0.0,
        });
        if transition.is_instant() {
            self.complete();
        }
        Ok(())
    }

    fn join_bars(&mut self, frame: usize, visible: &[RankedEntry], x: &LinearScale) {
        let race = self.race;
        let mut old: HashMap<String, BarNode> = self
            .state
            .bars
            .drain(..)
            .map(|b| (b.name.clone(), b))
            .collect();

        let mut joined = Vec::with_capacity(visible.len());
        for (slot, entry) in visible.iter().enumerate() {
            let key = EntryKey { frame, slot };
            let target = self.layout.bar_geom(x, entry);
            let fill = self.style.fill_for(entry.value.tests_passed).to_owned();
            let node = match old.remove(&entry.name) {
                Some(mut node) => {
                    node.geom = Tween::new(node.geom.to, target);
                    node.datum = key;
                    node.fill = fill;
                    node
                }
                None => {
                    let from = race.prev_or_self(key).unwrap_or(entry);
                    BarNode {
                        name: entry.name.clone(),
                        datum: key,
                        fill,
                        geom: Tween::new(self.layout.bar_geom(x, from), target),
                        exiting: false,
                    }
                }
            };
            joined.push(node);
        }

        let mut exits: Vec<BarNode> = old.into_values().collect();
        exits.sort_by_key(|b| b.datum);
        for node in &mut exits {
            if let Some(to) = race.next_or_self(node.datum) {
                node.geom = Tween::new(node.geom.to, self.layout.bar_geom(x, to));
            }
            node.exiting = true;
        }
        exits.append(&mut joined);
        self.state.bars = exits;
    }

    fn join_labels(&mut self, frame: usize, visible: &[RankedEntry], x: &LinearScale) {
        let race = self.race;
        let mut old: HashMap<String, LabelNode> = self
            .state
            .labels
            .drain(..)
            .map(|l| (l.name.clone(), l))
            .collect();

        let mut joined = Vec::with_capacity(visible.len());
        for (slot, entry) in visible.iter().enumerate() {
            let key = EntryKey { frame, slot };
            let prev = race.prev_or_self(key).unwrap_or(entry);
            let target = self.layout.label_anchor(x, entry);
            let readout = Tween::new(prev.value.total_time, entry.value.total_time);
            let node = match old.remove(&entry.name) {
                Some(mut node) => {
                    node.pos = Tween::new(node.pos.to, target);
                    node.readout = readout;
                    node.stars = entry.value.tests_passed;
                    node.datum = key;
                    node
                }
                None => LabelNode {
                    name: entry.name.clone(),
                    datum: key,
                    pos: Tween::new(self.layout.label_anchor(x, prev), target),
                    readout,
                    stars: entry.value.tests_passed,
                    exiting: false,
                },
            };
            joined.push(node);
        }

        let mut exits: Vec<LabelNode> = old.into_values().collect();
        exits.sort_by_key(|l| l.datum);
        for node in &mut exits {
            let (Some(from), Some(to)) = (race.entry(node.datum), race.next_or_self(node.datum))
            else {
                node.exiting = true;
                continue;
            };
            node.pos = Tween::new(node.pos.to, self.layout.label_anchor(x, to));
            node.readout = Tween::new(from.value.total_time, to.value.total_time);
            node.stars = to.value.tests_passed;
            node.exiting = true;
        }
        exits.append(&mut joined);
        self.state.labels = exits;
    }

    /// Jump the running transition to linear progress `p` (clamped to `[0, 1]`).
    ///
    /// Reaching `1` completes it.
    pub fn seek(&mut self, p: f64) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.progress = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        if active.progress >= 1.0 {
            self.complete();
        }
    }

    /// Move the running transition forward by `dt` of wall time.
    pub fn advance(&mut self, dt: Duration) {
        let Some(active) = self.active else {
            return;
        };
        let d = active.transition.duration.as_secs_f64();
        let p = if d > 0.0 {
            active.progress + dt.as_secs_f64() / d
        } else {
            1.0
        };
        self.seek(p);
    }

    /// Finish the running transition: settle every element, remove exits, update the ticker.
    pub fn complete(&mut self) {
        if self.active.take().is_some() {
            self.state.settle();
        }
    }

    /// Sample the chart at the current transition progress.
    pub fn scene(&self) -> Scene {
        let t = self.active.map_or(1.0, |a| a.eased());
        let layout = &self.layout;
        let style = self.style;

        let x = layout.x_scale(self.state.axis_max.at(t));
        let step = x.tick_step(layout.tick_count);
        let ticks = x
            .ticks(layout.tick_count)
            .into_iter()
            .enumerate()
            .map(|(i, v)| AxisTick {
                x: x.apply(v),
                label: (i > 0).then(|| format_tick(v, step)),
                stroke: if i == 0 {
                    style.text_color.clone()
                } else {
                    style.gridline_color.clone()
                },
            })
            .collect();

        let bandwidth = layout.y.bandwidth();
        let x0 = layout.x_range[0];
        let bars = self
            .state
            .bars
            .iter()
            .map(|b| {
                let g = b.geom.at(t);
                BarShape {
                    name: b.name.clone(),
                    rect: Rect::new(x0, g.y, x0 + g.width, g.y + bandwidth),
                    fill: b.fill.clone(),
                }
            })
            .collect();

        let labels = self
            .state
            .labels
            .iter()
            .map(|l| {
                let p = l.pos.at(t);
                LabelShape {
                    name: l.name.clone(),
                    anchor: Point::new(p.x, p.y),
                    readout: format!(
                        "{}ms {}",
                        format_grouped_int(l.readout.at(t)),
                        style.star_glyph.repeat(l.stars as usize)
                    ),
                }
            })
            .collect();

        Scene {
            canvas: layout.canvas,
            background: style.background.clone(),
            font_family: style.font_family.clone(),
            text_color: style.text_color.clone(),
            axis: AxisScene {
                top: layout.top,
                grid_len: layout.grid_len,
                ticks,
            },
            bars: BarLayer {
                opacity: style.bar_opacity,
                bars,
            },
            labels: LabelLayer {
                baseline: bandwidth / 2.0,
                labels,
            },
            ticker: TickerScene {
                text: self.state.ticker.text.clone(),
                anchor: layout.ticker_anchor,
                font_size: layout.bar_size,
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
