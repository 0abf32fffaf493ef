use std::collections::HashMap;

use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{BarRaceError, BarRaceResult};
use crate::render::raster::{FrameRGBA, SvgRasterizer};
use crate::render::renderer::{Renderer, Transition};
use crate::render::scene::{Scene, fingerprint_svg};

#[derive(Clone, Debug)]
/// Threading and chunking controls for multi-frame rendering.
pub struct RenderThreading {
    /// Rasterize each chunk on a rayon pool when `true`.
    pub parallel: bool,
    /// Chunk size in frames for batched scheduling.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
    /// Rasterize identical scenes only once per chunk.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Aggregated rendering counters.
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames that were actually rasterized.
    pub frames_rendered: u64,
    /// Frames reused via static-frame elision.
    pub frames_elided: u64,
}

/// Buffers scenes into chunks, rasterizes them and pushes the frames to a sink in order.
///
/// Scene production stays on the caller's thread; only rasterization fans out.
pub struct FrameEmitter<'s> {
    sink: &'s mut dyn FrameSink,
    rasterizer: SvgRasterizer,
    threading: RenderThreading,
    pool: Option<rayon::ThreadPool>,
    chunk: Vec<String>,
    chunk_size: usize,
    next: FrameIndex,
    stats: RenderStats,
}

impl<'s> FrameEmitter<'s> {
    /// Start the sink and prepare the worker pool.
    pub fn begin(
        sink: &'s mut dyn FrameSink,
        rasterizer: SvgRasterizer,
        threading: RenderThreading,
        cfg: SinkConfig,
    ) -> BarRaceResult<Self> {
        let pool = if threading.parallel {
            Some(build_thread_pool(threading.threads)?)
        } else {
            None
        };
        sink.begin(cfg)?;
        let chunk_size = normalized_chunk_size(threading.chunk_size);
        Ok(Self {
            sink,
            rasterizer,
            threading,
            pool,
            chunk: Vec::with_capacity(chunk_size),
            chunk_size,
            next: FrameIndex(0),
            stats: RenderStats::default(),
        })
    }

    /// Queue one frame.
    pub fn push(&mut self, scene: &Scene) -> BarRaceResult<()> {
        self.chunk.push(scene.to_svg());
        if self.chunk.len() >= self.chunk_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Frames queued or written so far.
    pub fn frames_pushed(&self) -> u64 {
        self.stats.frames_total + self.chunk.len() as u64
    }

    /// Flush the last chunk and close the sink.
    pub fn finish(mut self) -> BarRaceResult<RenderStats> {
        self.flush()?;
        self.sink.end()?;
        tracing::info!(
            frames = self.stats.frames_total,
            rendered = self.stats.frames_rendered,
            elided = self.stats.frames_elided,
            "frames emitted"
        );
        Ok(self.stats)
    }

    fn flush(&mut self) -> BarRaceResult<()> {
        if self.chunk.is_empty() {
            return Ok(());
        }
        let svgs = std::mem::take(&mut self.chunk);

        let mut unique_indices = Vec::<usize>::with_capacity(svgs.len());
        let mut frame_to_unique = Vec::<usize>::with_capacity(svgs.len());
        if self.threading.static_frame_elision {
            let mut first = HashMap::<u64, usize>::new();
            for (idx, svg) in svgs.iter().enumerate() {
                let fingerprint = fingerprint_svg(svg);
                if let Some(existing) = first.get(&fingerprint).copied() {
                    frame_to_unique.push(existing);
                } else {
                    let slot = unique_indices.len();
                    unique_indices.push(idx);
                    first.insert(fingerprint, slot);
                    frame_to_unique.push(slot);
                }
            }
        } else {
            for idx in 0..svgs.len() {
                frame_to_unique.push(idx);
                unique_indices.push(idx);
            }
        }

        let rasterizer = &self.rasterizer;
        let rendered: Vec<BarRaceResult<FrameRGBA>> = match &self.pool {
            Some(pool) => pool.install(|| {
                unique_indices
                    .par_iter()
                    .map(|&i| rasterizer.rasterize(&svgs[i]))
                    .collect()
            }),
            None => unique_indices
                .iter()
                .map(|&i| rasterizer.rasterize(&svgs[i]))
                .collect(),
        };
        let frames = rendered.into_iter().collect::<BarRaceResult<Vec<_>>>()?;

        for &u in &frame_to_unique {
            let frame = frames.get(u).ok_or_else(|| {
                BarRaceError::render("internal error: unique frame index out of range")
            })?;
            self.sink.push_frame(self.next, frame)?;
            self.next = FrameIndex(self.next.0 + 1);
        }

        let total = svgs.len() as u64;
        let rendered_count = unique_indices.len() as u64;
        self.stats.frames_total += total;
        self.stats.frames_rendered += rendered_count;
        self.stats.frames_elided += total.saturating_sub(rendered_count);
        tracing::debug!(frames = total, rendered = rendered_count, "chunk flushed");
        Ok(())
    }
}

/// Output frames spent on one keyframe transition.
pub fn frames_per_keyframe(transition: &Transition, fps: Fps) -> u64 {
    if transition.is_instant() {
        1
    } else {
        fps.frames_for(transition.duration)
    }
}

/// Autoplay: render every keyframe in order, sampling each transition at the video rate.
///
/// Keyframe `k` produces `frames_per_keyframe` frames at progress `1/F, 2/F, .., 1`, so the
/// last frame of each keyframe shows its settled state and updated ticker.
#[tracing::instrument(skip_all, fields(keyframes = renderer.race().len()))]
pub fn play_through(
    renderer: &mut Renderer<'_>,
    transition: Transition,
    fps: Fps,
    emitter: &mut FrameEmitter<'_>,
) -> BarRaceResult<()> {
    let per_keyframe = frames_per_keyframe(&transition, fps);
    for k in 0..renderer.race().len() {
        renderer.render(k, transition)?;
        for f in 1..=per_keyframe {
            renderer.seek(f as f64 / per_keyframe as f64);
            emitter.push(&renderer.scene())?;
        }
    }
    Ok(())
}

/// Sample keyframe `index` at linear progress `progress`, starting from the settled state of
/// the keyframe before it.
pub fn scene_at(
    renderer: &mut Renderer<'_>,
    index: usize,
    progress: f64,
    transition: Transition,
) -> BarRaceResult<Scene> {
    if let Some(prev) = index.checked_sub(1) {
        renderer.render(prev, Transition::instant())?;
    }
    renderer.render(index, transition)?;
    renderer.seek(progress);
    Ok(renderer.scene())
}

fn build_thread_pool(threads: Option<usize>) -> BarRaceResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(BarRaceError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| BarRaceError::render(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
