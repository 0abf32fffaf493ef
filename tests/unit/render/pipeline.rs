use std::time::Duration;

use super::*;
use crate::animation::ease::Ease;
use crate::config::chart::{ChartConfig, DisplayRows, KeyframeConfig, LayoutConfig};
use crate::data::document::RawDocument;
use crate::encode::sink::InMemorySink;
use crate::format::locale::TimeLocale;
use crate::race::prepared::Race;
use serde_json::json;

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

fn sink_cfg(cfg: &ChartConfig, rows: usize) -> SinkConfig {
    let canvas = cfg.layout.canvas(rows);
    SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: Fps { num: 60, den: 1 },
    }
}

#[test]
fn frames_per_keyframe_follows_duration() {
    let fps = Fps { num: 60, den: 1 };
    assert_eq!(frames_per_keyframe(&Transition::default(), fps), 9);
    assert_eq!(frames_per_keyframe(&Transition::instant(), fps), 1);
    let t = Transition::new(Duration::from_millis(1), Ease::Linear);
    assert_eq!(frames_per_keyframe(&t, fps), 1);
}

#[test]
fn play_through_emits_every_frame_in_order() {
    let cfg = small_chart();
    let race = race(&cfg);
    let locale = TimeLocale::default();
    let mut renderer = Renderer::new(&race, &cfg, &locale).unwrap();
    let transition = Transition::new(Duration::from_millis(50), Ease::Linear);

    let mut sink = InMemorySink::new();
    let mut emitter = FrameEmitter::begin(
        &mut sink,
        SvgRasterizer::new(&[]),
        RenderThreading {
            chunk_size: 4,
            ..RenderThreading::default()
        },
        sink_cfg(&cfg, race.rows()),
    )
    .unwrap();
    play_through(&mut renderer, transition, Fps { num: 60, den: 1 }, &mut emitter).unwrap();
    assert_eq!(emitter.frames_pushed(), 6);
    let stats = emitter.finish().unwrap();

    assert_eq!(stats.frames_total, 6);
    assert_eq!(stats.frames_rendered, 6);
    assert!(sink.ended());
    let frames = sink.frames();
    assert_eq!(frames.len(), 6);
    for (i, (idx, frame)) in frames.iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!((frame.width, frame.height), (200, 60));
    }
    assert_eq!(renderer.state().ticker_text(), "March 15, 2021");
}

#[test]
fn identical_scenes_are_rasterized_once() {
    let cfg = small_chart();
    let race = race(&cfg);
    let locale = TimeLocale::default();
    let mut renderer = Renderer::new(&race, &cfg, &locale).unwrap();
    renderer.render(1, Transition::instant()).unwrap();
    let scene = renderer.scene();

    let mut sink = InMemorySink::new();
    let mut emitter = FrameEmitter::begin(
        &mut sink,
        SvgRasterizer::new(&[]),
        RenderThreading {
            static_frame_elision: true,
            ..RenderThreading::default()
        },
        sink_cfg(&cfg, race.rows()),
    )
    .unwrap();
    for _ in 0..4 {
        emitter.push(&scene).unwrap();
    }
    let stats = emitter.finish().unwrap();

    assert_eq!(
        stats,
        RenderStats {
            frames_total: 4,
            frames_rendered: 1,
            frames_elided: 3,
        }
    );
    assert_eq!(sink.frames().len(), 4);
    assert_eq!(sink.frames()[0].1, sink.frames()[3].1);
}

#[test]
fn zero_threads_is_rejected() {
    let mut sink = InMemorySink::new();
    let res = FrameEmitter::begin(
        &mut sink,
        SvgRasterizer::new(&[]),
        RenderThreading {
            parallel: true,
            threads: Some(0),
            ..RenderThreading::default()
        },
        SinkConfig {
            width: 2,
            height: 2,
            fps: Fps { num: 30, den: 1 },
        },
    );
    assert!(res.is_err());
}

#[test]
fn scene_at_samples_mid_transition() {
    let cfg = small_chart();
    let race = race(&cfg);
    let locale = TimeLocale::default();
    let mut renderer = Renderer::new(&race, &cfg, &locale).unwrap();

    let mid = scene_at(&mut renderer, 1, 0.5, Transition::default()).unwrap();
    assert_eq!(mid.ticker.text, "March 14, 2021");
    let end = scene_at(&mut renderer, 1, 1.0, Transition::default()).unwrap();
    assert_eq!(end.ticker.text, "March 15, 2021");
}
