use std::ffi::OsString;
use std::io::{BufRead as _, BufReader, Write as _};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameSink, SinkConfig, ensure_parent_dir};
use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba8Premul};
use crate::foundation::error::{BarRaceError, BarRaceResult};
use crate::render::raster::FrameRGBA;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Replace an existing file instead of failing.
    pub overwrite: bool,
    /// Opaque colour shown through translucent pixels.
    pub background: Rgba8Premul,
}

impl FfmpegSinkOpts {
    /// Overwriting output over a white background.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Rgba8Premul::from_straight_rgba(255, 255, 255, 255),
        }
    }
}

/// Encodes the race to an H.264 MP4 through the system `ffmpeg`.
///
/// Frames must arrive premultiplied, as [`crate::SvgRasterizer`] produces them, with
/// contiguous indices starting at 0.
#[derive(Debug)]
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    running: Option<Running>,
}

#[derive(Debug)]
struct Running {
    encoder: Encoder,
    canvas: Canvas,
    next: FrameIndex,
    opaque: Vec<u8>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            running: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> BarRaceResult<()> {
        if self.running.is_some() {
            return Err(BarRaceError::encode("ffmpeg sink already started"));
        }
        check_encodable(&cfg)?;
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(BarRaceError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(BarRaceError::encode(
                "MP4 output needs `ffmpeg` on PATH; use --frames-dir for PNG output instead",
            ));
        }

        let encoder = Encoder::spawn(encoder_args(&cfg, &self.opts))?;
        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "ffmpeg started"
        );
        self.running = Some(Running {
            encoder,
            canvas: cfg.canvas(),
            next: FrameIndex(0),
            opaque: vec![0; cfg.frame_len()],
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> BarRaceResult<()> {
        let Some(run) = self.running.as_mut() else {
            return Err(BarRaceError::encode("ffmpeg sink not started"));
        };
        if idx != run.next {
            return Err(BarRaceError::encode(format!(
                "ffmpeg sink expected frame {} but got {}",
                run.next.0, idx.0
            )));
        }
        if (frame.width, frame.height) != (run.canvas.width, run.canvas.height)
            || frame.data.len() != run.opaque.len()
        {
            return Err(BarRaceError::validation(format!(
                "frame is {}x{}, chart canvas is {}x{}",
                frame.width, frame.height, run.canvas.width, run.canvas.height
            )));
        }
        if !frame.premultiplied {
            return Err(BarRaceError::validation(
                "ffmpeg sink expects premultiplied frames",
            ));
        }

        flatten_onto(&mut run.opaque, &frame.data, self.opts.background);
        run.encoder.write(&run.opaque)?;
        run.next = FrameIndex(idx.0 + 1);
        Ok(())
    }

    fn end(&mut self) -> BarRaceResult<()> {
        let run = self
            .running
            .take()
            .ok_or_else(|| BarRaceError::encode("ffmpeg sink not started"))?;
        run.encoder.finish()?;
        tracing::info!(
            out = %self.opts.out_path.display(),
            frames = run.next.0,
            "mp4 written"
        );
        Ok(())
    }
}

/// yuv420p needs even dimensions.
fn check_encodable(cfg: &SinkConfig) -> BarRaceResult<()> {
    Fps::new(cfg.fps.num, cfg.fps.den)?;
    let Canvas { width, height } = cfg.canvas();
    if width == 0 || height == 0 || !width.is_multiple_of(2) || !height.is_multiple_of(2) {
        return Err(BarRaceError::validation(format!(
            "MP4 output needs a non-empty canvas with even sides, chart is {width}x{height}; \
             adjust layout.bar_size or the margins"
        )));
    }
    Ok(())
}

/// Raw RGBA on stdin to an H.264/yuv420p MP4 without audio.
fn encoder_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Vec<OsString> {
    let size = format!("{}x{}", cfg.width, cfg.height);
    let rate = format!("{}/{}", cfg.fps.num, cfg.fps.den);
    let overwrite = if opts.overwrite { "-y" } else { "-n" };
    let mut args: Vec<OsString> = [
        overwrite,
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        size.as_str(),
        "-r",
        rate.as_str(),
        "-i",
        "pipe:0",
        "-an",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-movflags",
        "+faststart",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(opts.out_path.clone().into_os_string());
    args
}

/// Composite premultiplied `src` over `bg` into opaque `dst`.
fn flatten_onto(dst: &mut [u8], src: &[u8], bg: Rgba8Premul) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if let Some(px) = Rgba8Premul::from_slice(s) {
            d.copy_from_slice(&px.over_opaque(bg).to_array());
        }
    }
}

/// A running `ffmpeg` child fed on stdin.
#[derive(Debug)]
struct Encoder {
    child: Child,
    stdin: ChildStdin,
    log: JoinHandle<Vec<String>>,
}

impl Encoder {
    fn spawn(args: Vec<OsString>) -> BarRaceResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BarRaceError::encode(format!("failed to spawn ffmpeg: {e}")))?;
        let (Some(stdin), Some(stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            return Err(BarRaceError::encode("ffmpeg pipes were not captured"));
        };

        // Read stderr while frames stream in so ffmpeg never blocks on a full pipe.
        let log = std::thread::spawn(move || {
            BufReader::new(stderr)
                .lines()
                .map_while(Result::ok)
                .inspect(|line| tracing::warn!(target: "ffmpeg", "{line}"))
                .collect::<Vec<String>>()
        });
        Ok(Self { child, stdin, log })
    }

    fn write(&mut self, frame: &[u8]) -> BarRaceResult<()> {
        self.stdin
            .write_all(frame)
            .map_err(|e| BarRaceError::encode(format!("failed to write frame to ffmpeg: {e}")))
    }

    fn finish(self) -> BarRaceResult<()> {
        let Self {
            mut child,
            stdin,
            log,
        } = self;
        drop(stdin);
        let status = child
            .wait()
            .map_err(|e| BarRaceError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let lines = log.join().unwrap_or_default();
        if !status.success() {
            return Err(BarRaceError::encode(format!(
                "ffmpeg exited with {status}: {}",
                lines.join("\n")
            )));
        }
        Ok(())
    }
}

/// `true` when `ffmpeg -version` runs.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
