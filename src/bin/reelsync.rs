use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reelsync::{
    AudioSynchronizer, EngineConfig, DefaultAudioDecoder, FfmpegRecorder, FfmpegRecorderConfig,
    FrameCompositor, FrameEvent, FsMediaFetcher, ImageCache, PlaybackSession, ProjectState,
    ProjectTimingContext, SessionParts, SoftwareAudioBackend, SteppedScheduler, TextRenderer,
};

#[derive(Parser, Debug)]
#[command(name = "reelsync", version)]
struct Cli {
    /// Engine config JSON. `REELSYNC_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved scene windows and total duration.
    Timings(ProjectArgs),
    /// Render the frame at one time as a PNG.
    Frame(FrameArgs),
    /// Export the timeline as video (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Render every audio track into one WAV file.
    Mixdown(MixdownArgs),
}

#[derive(Parser, Debug)]
struct ProjectArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Directory media URLs are resolved against. Defaults to the project file's directory.
    #[arg(long)]
    assets_root: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: ProjectArgs,

    /// Timeline position in seconds.
    #[arg(long)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    input: ProjectArgs,

    /// Output path; the extension follows the negotiated container.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct MixdownArgs {
    #[command(flatten)]
    input: ProjectArgs,

    /// Output WAV path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Timings(args) => cmd_timings(&cfg, args),
        Command::Frame(args) => cmd_frame(&cfg, args),
        Command::Export(args) => cmd_export(&cfg, args),
        Command::Mixdown(args) => cmd_mixdown(&cfg, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let mut cfg = match path {
        Some(p) => EngineConfig::from_file(p)?,
        None => EngineConfig::default(),
    };
    cfg.apply_env();
    cfg.validate()?;
    Ok(cfg)
}

fn read_project(args: &ProjectArgs) -> anyhow::Result<(ProjectState, PathBuf)> {
    let json = std::fs::read_to_string(&args.project)
        .with_context(|| format!("read project '{}'", args.project.display()))?;
    let project = ProjectState::from_json(&json)?;
    project.validate()?;
    let root = match &args.assets_root {
        Some(r) => r.clone(),
        None => args
            .project
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    Ok((project, root))
}

fn cmd_timings(cfg: &EngineConfig, args: ProjectArgs) -> anyhow::Result<()> {
    let (project, _) = read_project(&args)?;
    let timing = ProjectTimingContext::for_project(&project, &cfg.timing);
    if let Some(end) = timing.intro_end {
        println!("intro      0.000 .. {end:>8.3}");
    }
    for w in &timing.windows {
        println!(
            "scene {:>3} {:>8.3} .. {:>8.3}  ({})",
            w.scene_index,
            w.start,
            w.end,
            w.voiceover_id.as_deref().unwrap_or("fallback")
        );
    }
    if let Some(start) = timing.outro_start {
        println!("outro  {start:>8.3} .. {:>8.3}", timing.total_duration);
    }
    for id in &timing.unpaired_voiceovers {
        println!("unpaired   {id}");
    }
    println!("total      {:.3}", timing.total_duration);
    Ok(())
}

fn build_session(
    cfg: &EngineConfig,
    project: ProjectState,
    root: PathBuf,
) -> anyhow::Result<(PlaybackSession, SoftwareAudioBackend)> {
    let mut compositor = FrameCompositor::new(cfg.compositor_options())?;
    if let Some(text) = load_text_renderer(cfg) {
        compositor = compositor.with_text(text);
    }
    let backend = SoftwareAudioBackend::default();
    let parts = SessionParts {
        fps: cfg.fps,
        timing: cfg.timing,
        compositor,
        images: ImageCache::new(Arc::new(FsMediaFetcher::new(root))),
        audio: AudioSynchronizer::new(Box::new(backend.clone()), cfg.drift_tolerance_secs)?,
        scheduler: Box::new(SteppedScheduler),
    };
    let mut session = PlaybackSession::new(project, parts)?;
    if !session.preload_images(cfg.image_wait()) {
        tracing::warn!("some images were still loading; they render as placeholders");
    }
    Ok((session, backend))
}

fn load_text_renderer(cfg: &EngineConfig) -> Option<TextRenderer> {
    let path = cfg.font_path.clone().or_else(reelsync::find_system_font)?;
    match TextRenderer::from_font_file(&path) {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::warn!(font = %path.display(), error = %e, "font unavailable; text is skipped");
            None
        }
    }
}

fn cmd_frame(cfg: &EngineConfig, args: FrameArgs) -> anyhow::Result<()> {
    let (project, root) = read_project(&args.input)?;
    let (mut session, _) = build_session(cfg, project, root)?;
    let png = session.render_at(args.time).to_png()?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png).with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(cfg: &EngineConfig, args: ExportArgs) -> anyhow::Result<()> {
    let (project, root) = read_project(&args.input)?;
    let recorder = FfmpegRecorder::create(FfmpegRecorderConfig {
        canvas: cfg.canvas,
        fps: cfg.fps,
        out_path: args.out.clone(),
        bitrate_bps: cfg.export.bitrate_bps,
        preference: cfg.export.containers.clone(),
        overwrite: cfg.export.overwrite,
    })?;
    let (mut session, backend) = build_session(cfg, project, root)?;
    let clock = backend.clock();
    let step = cfg.fps.frame_duration_secs();

    session.start_export(Box::new(recorder), Instant::now())?;
    let artifact = loop {
        clock.advance(step);
        if let FrameEvent::Finished { artifact, .. } = session.on_frame(Instant::now())? {
            break artifact;
        }
    };
    let artifact = artifact.context("export finished without an artifact")?;
    match &artifact.path {
        Some(p) => eprintln!("wrote {} ({}, {} frames)", p.display(), artifact.mime, artifact.frames),
        None => eprintln!("captured {} frames ({})", artifact.frames, artifact.mime),
    }
    Ok(())
}

fn cmd_mixdown(cfg: &EngineConfig, args: MixdownArgs) -> anyhow::Result<()> {
    let (project, root) = read_project(&args.input)?;
    let timing = ProjectTimingContext::for_project(&project, &cfg.timing);
    let fetcher = FsMediaFetcher::new(root);
    let wav = reelsync::render_mixdown(
        &project,
        &timing,
        &fetcher,
        &DefaultAudioDecoder,
        cfg.mixdown_options(),
    )?;
    reelsync::write_mixdown_file(&wav, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
