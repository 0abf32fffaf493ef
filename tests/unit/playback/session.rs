use super::*;
use crate::animation::ease::Ease;
use crate::config::chart::{ChartConfig, DisplayRows, KeyframeConfig, LayoutConfig};
use crate::data::document::RawDocument;
use crate::encode::sink::{InMemorySink, SinkConfig};
use crate::format::locale::TimeLocale;
use crate::playback::scrubber::Schedule;
use crate::race::prepared::Race;
use crate::render::pipeline::RenderThreading;
use crate::render::raster::SvgRasterizer;
use serde_json::json;

const FPS: Fps = Fps { num: 60, den: 1 };

fn small_chart() -> ChartConfig {
    ChartConfig {
        keyframes: KeyframeConfig {
            interpolation_steps: 1,
            display_rows: DisplayRows::Fixed(2),
            ..KeyframeConfig::default()
        },
        layout: LayoutConfig {
            width: 200,
            bar_size: 10,
            ..LayoutConfig::default()
        },
        ..ChartConfig::default()
    }
}

fn race(cfg: &ChartConfig) -> Race {
    let doc: RawDocument = serde_json::from_value(json!({
        "21_03_14": [[["a", 100, "x"], ["b", 50, "x"]]],
        "21_03_15": [[["a", 20, "x"], ["b", 30, "x"]]]
    }))
    .unwrap();
    Race::from_document(&doc, &cfg.keyframes).unwrap()
}

fn run(opts: PlaybackOptions) -> (BarRaceResult<PlaybackSummary>, usize, String) {
    let cfg = small_chart();
    let race = race(&cfg);
    let locale = TimeLocale::default();
    let mut renderer = Renderer::new(&race, &cfg, &locale).unwrap();
    let canvas = renderer.layout().canvas();

    let mut sink = InMemorySink::new();
    let mut emitter = FrameEmitter::begin(
        &mut sink,
        SvgRasterizer::new(&[]),
        RenderThreading::default(),
        SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: FPS,
        },
    )
    .unwrap();
    let res = play_scrubbed(&mut renderer, opts, &mut emitter);
    emitter.finish().unwrap();
    (
        res,
        sink.frames().len(),
        renderer.state().ticker_text().to_owned(),
    )
}

fn opts(scrubber: ScrubberOptions, max_frames: Option<u64>) -> PlaybackOptions {
    PlaybackOptions {
        scrubber,
        transition: Transition::new(Duration::from_millis(40), Ease::Linear),
        fps: FPS,
        max_frames,
    }
}

#[test]
fn frame_time_handles_rational_rates() {
    let ntsc = Fps {
        num: 30_000,
        den: 1001,
    };
    assert_eq!(frame_time(ntsc, FrameIndex(30)), Duration::from_millis(1001));
    assert_eq!(frame_time(FPS, FrameIndex(6)), Duration::from_millis(100));
}

#[test]
fn per_frame_run_stops_after_last_transition() {
    let scrubber = ScrubberOptions {
        looping: false,
        ..ScrubberOptions::default()
    };
    let (res, frames, ticker) = run(opts(scrubber, None));
    let summary = res.unwrap();
    assert_eq!(summary.frames, 5);
    assert_eq!(summary.renders, 2);
    assert_eq!(summary.final_index, 1);
    assert_eq!(frames, 5);
    assert_eq!(ticker, "March 15, 2021");
}

#[test]
fn interval_schedule_waits_between_steps() {
    let scrubber = ScrubberOptions {
        looping: false,
        schedule: Schedule::Interval(Duration::from_millis(100)),
        ..ScrubberOptions::default()
    };
    let summary = run(opts(scrubber, None)).0.unwrap();
    assert_eq!(summary.renders, 2);
    assert_eq!(summary.frames, 13);
}

#[test]
fn looping_is_capped_by_max_frames() {
    let (res, frames, _) = run(opts(ScrubberOptions::default(), Some(10)));
    let summary = res.unwrap();
    assert_eq!(summary.frames, 10);
    assert_eq!(frames, 10);
    assert!(summary.renders > 2);
}

#[test]
fn looping_without_cap_is_rejected() {
    let (res, frames, _) = run(opts(ScrubberOptions::default(), None));
    assert!(res.is_err());
    assert_eq!(frames, 0);
}

#[test]
fn stopped_scrubber_renders_initial_keyframe_only() {
    let scrubber = ScrubberOptions {
        autoplay: false,
        initial: 1,
        ..ScrubberOptions::default()
    };
    let (res, _, ticker) = run(opts(scrubber, None));
    let summary = res.unwrap();
    assert_eq!(summary.renders, 1);
    assert_eq!(summary.final_index, 1);
    assert_eq!(ticker, "March 15, 2021");
}
