use std::time::Duration;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{BarRaceError, BarRaceResult};
use crate::playback::scrubber::{Scrubber, ScrubberOptions};
use crate::render::pipeline::FrameEmitter;
use crate::render::renderer::{Renderer, Transition};

/// Settings for a scrubber-driven run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackOptions {
    pub scrubber: ScrubberOptions,
    pub transition: Transition,
    pub fps: Fps,
    /// Hard cap on emitted frames. Required when looping.
    pub max_frames: Option<u64>,
}

/// What a playback run did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub frames: u64,
    /// Change events delivered to the renderer, the initial selection included.
    pub renders: u64,
    pub final_index: usize,
}

/// Start time of frame `f`.
pub fn frame_time(fps: Fps, f: FrameIndex) -> Duration {
    let nanos = u128::from(f.0) * u128::from(fps.den) * 1_000_000_000 / u128::from(fps.num.max(1));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Drive the renderer from scrubber change events on a virtual clock.
///
/// Every output frame first advances the running transition, then delivers any scrubber
/// events due at that instant, then samples the chart. The run ends once the scrubber has
/// stopped and the last transition has settled, or at `max_frames`.
#[tracing::instrument(skip_all, fields(keyframes = renderer.race().len()))]
pub fn play_scrubbed(
    renderer: &mut Renderer<'_>,
    opts: PlaybackOptions,
    emitter: &mut FrameEmitter<'_>,
) -> BarRaceResult<PlaybackSummary> {
    Fps::new(opts.fps.num, opts.fps.den)?;
    if opts.scrubber.looping && opts.scrubber.autoplay && opts.max_frames.is_none() {
        return Err(BarRaceError::validation(
            "looping playback needs a max frame count",
        ));
    }

    let mut scrubber = Scrubber::new(renderer.race().len(), opts.scrubber, Duration::ZERO)?;
    renderer.render(scrubber.index(), opts.transition)?;
    let mut summary = PlaybackSummary {
        renders: 1,
        ..PlaybackSummary::default()
    };

    let mut prev_time = Duration::ZERO;
    loop {
        if opts.max_frames.is_some_and(|max| summary.frames >= max) {
            break;
        }
        let now = frame_time(opts.fps, FrameIndex(summary.frames));
        renderer.advance(now.saturating_sub(prev_time));
        prev_time = now;

        while let Some(index) = scrubber.poll(now) {
            tracing::trace!(index, "scrubber change");
            renderer.render(index, opts.transition)?;
            summary.renders += 1;
        }

        emitter.push(&renderer.scene())?;
        summary.frames += 1;

        if !scrubber.is_running() && !renderer.is_transitioning() {
            break;
        }
    }

    summary.final_index = scrubber.index();
    tracing::debug!(
        frames = summary.frames,
        renders = summary.renders,
        final_index = summary.final_index,
        "playback finished"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "../../tests/unit/playback/session.rs"]
mod tests;
