use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use gifcomp::{ComposerOpts, FrameSource, GifFrameSource, Player};

#[derive(Parser, Debug)]
#[command(name = "gifcomp", version)]
struct Cli {
    /// Log composition events (debug level).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print canvas and per-frame metadata of a GIF.
    Info(InfoArgs),
    /// Play a GIF headlessly and write every displayed frame as a PNG.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for `frame_NNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of displayed frames to write.
    #[arg(long, default_value_t = 16)]
    ticks: u32,

    /// Composer options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let source = GifFrameSource::from_path(&args.in_path)
        .with_context(|| format!("load gif '{}'", args.in_path.display()))?;

    let canvas = source.canvas();
    let bg = source.background();
    println!("canvas: {}x{}", canvas.width, canvas.height);
    println!("background: rgba({}, {}, {}, {})", bg.r, bg.g, bg.b, bg.a);
    println!("frames: {}", source.frame_count());
    println!("loop: {} ms", source.loop_duration_ms());
    for (i, meta) in source.frame_metas().enumerate() {
        let r = meta.rect;
        println!(
            "  #{i:<4} rect {}x{}+{}+{}  delay {:>5} ms  dispose {}",
            r.width, r.height, r.x, r.y, meta.delay_ms, meta.disposal
        );
    }
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let opts = match &args.opts {
        Some(p) => ComposerOpts::from_path(p)?,
        None => ComposerOpts::default(),
    };
    let source = GifFrameSource::from_path(&args.in_path)
        .with_context(|| format!("load gif '{}'", args.in_path.display()))?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut player = Player::new(source, opts);
    player.start().context("start playback")?;

    let mut written = 0u32;
    while written < args.ticks {
        if player.paint()? {
            write_png(&args.out_dir, written, &player)?;
            written += 1;
        }
        let Some(delay) = player.next_delay_ms() else {
            break;
        };
        if let Err(e) = player.advance(delay) {
            tracing::warn!(error = %e, "tick failed, retrying on the next one");
        }
    }

    eprintln!("wrote {written} frame(s) to {}", args.out_dir.display());
    Ok(())
}

fn write_png<F: FrameSource>(dir: &Path, n: u32, player: &Player<F>) -> anyhow::Result<()> {
    let frame = player.framebuffer();
    let path = dir.join(format!("frame_{n:04}.png"));
    image::save_buffer_with_format(
        &path,
        &frame.to_straight_rgba(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
