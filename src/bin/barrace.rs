use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use barrace::{
    ChartConfig, FfmpegSink, FfmpegSinkOpts, Fps, FrameEmitter, FrameSink, PlaybackOptions,
    PngSequenceSink, Race, RawDocument, RenderThreading, Renderer, Schedule, ScrubberOptions,
    SinkConfig, SvgRasterizer, TimeLocale, Transition, ensure_parent_dir, play_scrubbed,
    play_through, scene_at, write_png,
};

#[derive(Parser, Debug)]
#[command(name = "barrace", version, about = "Render a bar chart race of team test results")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump the ranked keyframe sequence as JSON.
    Keyframes(KeyframesArgs),
    /// Render one sampled frame as PNG (or SVG when `--out` ends in `.svg`).
    Frame(FrameArgs),
    /// Render the whole race as an MP4 (requires `ffmpeg` on PATH) or a PNG sequence.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input results JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Chart configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// d3 time-locale JSON used for the date ticker.
    #[arg(long)]
    locale: Option<PathBuf>,

    /// Extra directory of `ttf`/`otf`/`ttc` fonts (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct KeyframesArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output JSON path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Keyframe index (0-based).
    #[arg(long)]
    keyframe: usize,

    /// Transition progress into the keyframe, 0 to 1.
    #[arg(long, default_value_t = 1.0)]
    progress: f64,

    /// Output PNG or SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["out", "frames_dir"])))]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Write numbered PNG frames into this directory instead of an MP4.
    #[arg(long)]
    frames_dir: Option<PathBuf>,
    /// Fail instead of overwriting an existing MP4.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// Override the configured frame rate (integer fps).
    #[arg(long)]
    fps: Option<u32>,

    /// Rasterize frames in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,
    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
    /// Render chunk size in frames.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
    /// Rasterize identical frames once per chunk.
    #[arg(long, default_value_t = false)]
    static_frame_elision: bool,

    /// Drive keyframes from the scrubber instead of one transition per keyframe.
    #[arg(long, default_value_t = false)]
    scrub: bool,
    /// Scrubber step delay; one step per frame when omitted. Implies `--scrub`.
    #[arg(long)]
    scrub_delay_ms: Option<u64>,
    /// Wrap around at the end (scrubber only; needs `--max-frames`).
    #[arg(long = "loop", default_value_t = false)]
    looping: bool,
    /// Reverse direction at each end (scrubber only).
    #[arg(long, default_value_t = false)]
    alternate: bool,
    /// Pause before wrapping around (scrubber only).
    #[arg(long)]
    loop_delay_ms: Option<u64>,
    /// Stop after this many frames (scrubber only).
    #[arg(long)]
    max_frames: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Keyframes(args) => cmd_keyframes(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

struct Loaded {
    cfg: ChartConfig,
    locale: TimeLocale,
    race: Race,
}

fn load(input: &InputArgs) -> anyhow::Result<Loaded> {
    let cfg = match &input.config {
        Some(p) => ChartConfig::from_path(p)?,
        None => ChartConfig::default(),
    };
    let locale = match &input.locale {
        Some(p) => TimeLocale::from_path(p)?,
        None => TimeLocale::default(),
    };
    let doc = RawDocument::from_path(&input.in_path)?;
    let race = Race::from_document(&doc, &cfg.keyframes)
        .with_context(|| format!("prepare race from '{}'", input.in_path.display()))?;
    Ok(Loaded { cfg, locale, race })
}

fn cmd_keyframes(args: KeyframesArgs) -> anyhow::Result<()> {
    let loaded = load(&args.input)?;
    let json = serde_json::to_string_pretty(loaded.race.keyframes())?;
    match &args.out {
        Some(out) => {
            ensure_parent_dir(out)?;
            std::fs::write(out, json).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let loaded = load(&args.input)?;
    let mut renderer = Renderer::new(&loaded.race, &loaded.cfg, &loaded.locale)?;
    let scene = scene_at(
        &mut renderer,
        args.keyframe,
        args.progress,
        Transition::from_config(&loaded.cfg.transition),
    )?;

    let is_svg = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        ensure_parent_dir(&args.out)?;
        std::fs::write(&args.out, scene.to_svg())
            .with_context(|| format!("write svg '{}'", args.out.display()))?;
    } else {
        let frame = SvgRasterizer::new(&args.input.font_dirs).rasterize(&scene.to_svg())?;
        write_png(&args.out, &frame)?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let loaded = load(&args.input)?;
    let fps = match args.fps {
        Some(n) => Fps::new(n, 1)?,
        None => loaded.cfg.video.fps,
    };
    let transition = Transition::from_config(&loaded.cfg.transition);
    let mut renderer = Renderer::new(&loaded.race, &loaded.cfg, &loaded.locale)?;

    let mut sink: Box<dyn FrameSink> = match (&args.frames_dir, &args.out) {
        (Some(dir), _) => Box::new(PngSequenceSink::new(dir)),
        (None, Some(out)) => Box::new(FfmpegSink::new(FfmpegSinkOpts {
            overwrite: !args.no_overwrite,
            ..FfmpegSinkOpts::new(out)
        })),
        (None, None) => anyhow::bail!("render needs --out or --frames-dir"),
    };

    let threading = RenderThreading {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        static_frame_elision: args.static_frame_elision,
    };
    let mut emitter = FrameEmitter::begin(
        sink.as_mut(),
        SvgRasterizer::new(&args.input.font_dirs),
        threading,
        SinkConfig::new(renderer.layout().canvas(), fps),
    )?;

    if args.scrub || args.scrub_delay_ms.is_some() {
        let schedule = match args.scrub_delay_ms {
            Some(ms) => Schedule::Interval(Duration::from_millis(ms)),
            None => Schedule::PerFrame,
        };
        let summary = play_scrubbed(
            &mut renderer,
            PlaybackOptions {
                scrubber: ScrubberOptions {
                    schedule,
                    looping: args.looping,
                    alternate: args.alternate,
                    loop_delay: args.loop_delay_ms.map(Duration::from_millis),
                    ..ScrubberOptions::default()
                },
                transition,
                fps,
                max_frames: args.max_frames,
            },
            &mut emitter,
        )?;
        tracing::info!(
            frames = summary.frames,
            renders = summary.renders,
            "scrubbed playback done"
        );
    } else {
        play_through(&mut renderer, transition, fps, &mut emitter)?;
    }
    let stats = emitter.finish()?;

    let target = args.frames_dir.as_ref().or(args.out.as_ref());
    if let Some(target) = target {
        eprintln!(
            "wrote {} ({} frames, {} elided)",
            target.display(),
            stats.frames_total,
            stats.frames_elided
        );
    }
    Ok(())
}
