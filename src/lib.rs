//! barrace renders a "bar chart race" of per-team test results over time.
//!
//! The pipeline is load-time derivation followed by playback:
//!
//! - Parse a results document ([`RawDocument`]) into [`PerformanceRecord`]s
//! - Build the ranked, interpolated [`Keyframe`] sequence and its [`TransitionIndex`] ([`Race`])
//! - Drive a retained [`Renderer`] either straight through ([`play_through`]) or from a
//!   [`Scrubber`] ([`play_scrubbed`])
//! - Rasterize sampled [`Scene`]s and stream them into a [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod config;
pub(crate) mod data;
pub(crate) mod encode;
pub(crate) mod format;
pub(crate) mod playback;
pub(crate) mod race;
pub(crate) mod render;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{BarRaceError, BarRaceResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::tween::Lerp;
pub use crate::config::chart::{
    ChartConfig, DisplayRows, KeyframeConfig, LayoutConfig, Margin, StyleConfig,
    TransitionConfig, VideoConfig,
};
pub use crate::data::document::{
    DATE_KEY_FORMAT, RawDocument, RawResult, TestResults, parse_date_key,
};
pub use crate::data::parse::{RosterPolicy, parse_records};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig, ensure_parent_dir};
pub use crate::format::locale::TimeLocale;
pub use crate::format::number::{format_grouped_int, format_tick};
pub use crate::playback::scrubber::{Schedule, Scrubber, ScrubberOptions};
pub use crate::playback::session::{PlaybackOptions, PlaybackSummary, frame_time, play_scrubbed};
pub use crate::race::keyframes::{
    DEFAULT_INTERPOLATION_STEPS, DateValues, build_keyframes, group_by_date, resolve_display_rows,
};
pub use crate::race::model::{Keyframe, PerformanceRecord, RankedEntry, TeamSet, Value};
pub use crate::race::prepared::Race;
pub use crate::race::rank::{DEFAULT_DISPLAY_ROWS, compare_values, rank_teams};
pub use crate::race::transition::{EntryKey, TransitionIndex};
pub use crate::render::pipeline::{
    FrameEmitter, RenderStats, RenderThreading, frames_per_keyframe, play_through, scene_at,
};
pub use crate::render::raster::{FrameRGBA, SvgRasterizer};
pub use crate::render::renderer::{ChartLayout, Renderer, RendererState, Transition};
pub use crate::render::scale::{BandScale, LinearScale, tick_increment, ticks};
pub use crate::render::scene::{
    AxisScene, AxisTick, BarLayer, BarShape, LabelLayer, LabelShape, Scene, TickerScene,
};
