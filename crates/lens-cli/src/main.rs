//! lens - radial lens distortion for PNG images
//!
//! Renders through a bounded-memory region cache, so memory use does not
//! grow with the input size beyond the decoded image itself.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "lens")]
#[command(author, version, about = "Radial lens distortion with cached cubic resampling")]
#[command(long_about = "
Applies a polynomial radial lens distortion to an image.

Parameters use the range -100..100. Negative values need '=' or a space
after the flag, e.g. --main=-30.

Examples:
  lens info photo.png
  lens distort photo.png -o out.png --main 30 --edge -10
  lens distort photo.png -o out.png --preset wide.yaml --zoom 15 --stats
  lens preview photo.png -o thumb.png --size 256 --main 40
  lens -vv distort photo.png -o out.png --regions 8 --region-width 64
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display image information and cache footprint
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Apply lens distortion to a full image
    #[command(visible_alias = "d")]
    Distort(DistortArgs),

    /// Render a quick distortion preview from a thumbnail
    #[command(visible_alias = "p")]
    Preview(PreviewArgs),
}

/// Lens parameters; each overrides the preset value when given.
#[derive(Args, Clone, Default)]
pub struct LensArgs {
    /// YAML preset with `params:` and `cache:` sections
    #[arg(long)]
    pub preset: Option<PathBuf>,

    /// Horizontal centre shift (-100..100)
    #[arg(long, allow_negative_numbers = true)]
    pub centre_x: Option<f64>,

    /// Vertical centre shift (-100..100)
    #[arg(long, allow_negative_numbers = true)]
    pub centre_y: Option<f64>,

    /// Main (r²) distortion amount (-100..100)
    #[arg(long, allow_negative_numbers = true)]
    pub main: Option<f64>,

    /// Edge (r⁴) distortion amount (-100..100)
    #[arg(long, allow_negative_numbers = true)]
    pub edge: Option<f64>,

    /// Zoom (-100..100)
    #[arg(long, allow_negative_numbers = true)]
    pub zoom: Option<f64>,

    /// Brightness compensation; negative brightens where distortion is positive
    #[arg(long, allow_negative_numbers = true)]
    pub brighten: Option<f64>,
}

/// Region cache geometry overrides.
#[derive(Args, Clone, Default)]
pub struct CacheArgs {
    /// Number of cached regions
    #[arg(long)]
    pub regions: Option<usize>,

    /// Region width in pixels
    #[arg(long)]
    pub region_width: Option<u32>,

    /// Region height in pixels
    #[arg(long)]
    pub region_height: Option<u32>,
}

/// Arguments for the `info` command.
#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,
}

/// Arguments for the `distort` command.
#[derive(Args)]
struct DistortArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    lens: LensArgs,

    #[command(flatten)]
    cache: CacheArgs,

    /// Print cache statistics after rendering
    #[arg(long)]
    stats: bool,
}

/// Arguments for the `preview` command.
#[derive(Args)]
struct PreviewArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Longest side of the preview thumbnail
    #[arg(short, long, default_value = "256")]
    size: u32,

    /// Render every n-th preview pixel
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    step: u32,

    #[command(flatten)]
    lens: LensArgs,

    #[command(flatten)]
    cache: CacheArgs,
}

/// Installs the console subscriber and, with `log_file`, a non-blocking file writer.
///
/// `RUST_LOG` overrides the level chosen by `verbose`. The returned guard
/// must live until exit so buffered file output is flushed.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log filter")?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Log file has no name: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Logger initialization failed")?;

    Ok(guard)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Distort(args) => commands::distort::run(args, cli.verbose),
        Commands::Preview(args) => commands::preview::run(args, cli.verbose),
    }
}
