use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use puzzle_reveal::encode::ffmpeg::detect_codec;
use puzzle_reveal::encode::recorder::DEFAULT_READY_TIMEOUT;
use puzzle_reveal::finale::phase::{EXPLODE_AT_MS, PAUSE_MS};
use puzzle_reveal::{
    CueTrack, FfmpegSink, FfmpegSinkOpts, FrameIndex, Material, MotionProfile, OutputNames,
    PieceShape, RevealConfig, RevealSession, SourceImage,
};

#[derive(Parser, Debug)]
#[command(name = "puzzle-reveal", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a piece set and print a JSON summary.
    Pieces(CommonArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Record the full reveal with thumbnail and metadata (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Report the video codec `ffmpeg` offers.
    Probe,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,

    /// Reveal config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the piece shape.
    #[arg(long, value_enum)]
    shape: Option<PieceShape>,

    /// Override the material.
    #[arg(long, value_enum)]
    material: Option<Material>,

    /// Override the motion profile.
    #[arg(long, value_enum)]
    motion: Option<MotionProfile>,

    /// Override the piece count.
    #[arg(long)]
    pieces: Option<u32>,

    /// Override the RNG seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Playback time of the frame.
    #[arg(long)]
    elapsed_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory receiving the video, thumbnail and metadata.
    #[arg(long)]
    out_dir: PathBuf,

    /// Skip the synthesized cue track.
    #[arg(long, default_value_t = false)]
    no_audio: bool,
}

#[derive(serde::Serialize)]
struct PiecesSummary {
    requested: u32,
    built: usize,
    renderable: usize,
    rows: u32,
    cols: u32,
    shape: PieceShape,
    material: Material,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Pieces(args) => cmd_pieces(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Probe => cmd_probe(),
    }
}

fn load_config(args: &CommonArgs) -> anyhow::Result<RevealConfig> {
    let mut cfg = match &args.config {
        Some(path) => RevealConfig::from_path(path)?,
        None => RevealConfig::default(),
    };
    if let Some(shape) = args.shape {
        cfg.shape = shape;
    }
    if let Some(material) = args.material {
        cfg.material = material;
    }
    if let Some(motion) = args.motion {
        cfg.motion = motion;
    }
    if let Some(pieces) = args.pieces {
        cfg.piece_count = pieces;
    }
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn ready_session(args: &CommonArgs) -> anyhow::Result<RevealSession> {
    let cfg = load_config(args)?;
    let image = SourceImage::open(&args.image)?;
    let mut session = RevealSession::with_defaults(cfg)?;
    session.load_image(image);

    let mut last_pct = -1i32;
    session.build_pieces(&mut |p| {
        let pct = (p * 100.0).round() as i32;
        if pct / 10 != last_pct / 10 {
            tracing::info!(progress = pct, "building pieces");
            last_pct = pct;
        }
    })?;
    Ok(session)
}

fn cmd_pieces(args: CommonArgs) -> anyhow::Result<()> {
    let session = ready_session(&args)?;
    let set = session
        .pieces()
        .context("piece set missing after build")?;
    let summary = PiecesSummary {
        requested: session.config().piece_count,
        built: set.len(),
        renderable: set.renderable_count(),
        rows: set.dims().rows,
        cols: set.dims().cols,
        shape: set.shape(),
        material: set.material(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut session = ready_session(&args.common)?;
    let fps = session.config().frame_rate()?;
    let target = args.elapsed_ms.max(0.0);

    // Physics is stateful, so play the explosion up to the requested time.
    let explode_at = session.config().total_duration_ms + EXPLODE_AT_MS;
    if target > explode_at {
        let first = fps.frames_for_ms(explode_at);
        let mut f = first;
        while fps.frame_to_ms(FrameIndex(f)) < target {
            session.render_at(fps.frame_to_ms(FrameIndex(f)));
            f += 1;
        }
    }
    let report = session.render_at(target);
    tracing::info!(phase = ?report.phase, completion = report.stats.completion_percent, "rendered frame");

    let frame = session.frame();
    write_png(&args.out, &frame.to_opaque_rgba8(), frame.width, frame.height)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let codec = detect_codec().context("ffmpeg with libx264 or libvpx-vp9 is required")?;
    let mut session = ready_session(&args.common)?;
    let names = OutputNames::today(&session.config().title);
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let audio_path = OutputNames::in_dir(&args.out_dir, &names.audio());
    let audio = if args.no_audio {
        None
    } else {
        let mut track = CueTrack::new(session.config().seed);
        session.record_cues(&mut track)?;
        Some(track.write_f32le(&audio_path, session.duration_ms())?)
    };

    let video_path = OutputNames::in_dir(&args.out_dir, &names.video(codec.extension()));
    let sink = FfmpegSink::new(FfmpegSinkOpts::new(&video_path, codec));
    let recording = session.render_video(sink, audio, DEFAULT_READY_TIMEOUT)?;
    if audio_path.exists() {
        std::fs::remove_file(&audio_path)
            .with_context(|| format!("remove cue track '{}'", audio_path.display()))?;
    }
    eprintln!("wrote {} ({} frames)", video_path.display(), recording.frames);

    session.render_at(session.config().total_duration_ms + PAUSE_MS / 2.0);
    let thumb = OutputNames::in_dir(&args.out_dir, &names.thumbnail());
    puzzle_reveal::encode::export::write_thumbnail(&session.frame(), &thumb, 90)?;
    eprintln!("wrote {}", thumb.display());

    let renderable = session.pieces().map_or(0, |s| s.renderable_count());
    let meta_path = OutputNames::in_dir(&args.out_dir, &names.metadata());
    puzzle_reveal::encode::export::write_metadata(&session.config().metadata(renderable), &meta_path)?;
    eprintln!("wrote {}", meta_path.display());
    Ok(())
}

fn cmd_probe() -> anyhow::Result<()> {
    match detect_codec() {
        Some(codec) => println!("{} (.{})", codec.encoder(), codec.extension()),
        None => println!("none"),
    }
    Ok(())
}

fn write_png(path: &Path, rgba: &[u8], width: u32, height: u32) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        rgba,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
