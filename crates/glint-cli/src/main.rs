//! glint - render and inspect looks from the command line
//!
//! Examples:
//!   glint render -i photo.jpg -l look.json -o preview.png
//!   glint render -i photo.jpg -l look.json --solo exposure,hsl_red -o solo.png
//!   glint render -i photo.jpg -l look.json --lut film.png --cpu -o out.png
//!   glint predict --histogram base.json -l look.json
//!   glint stages

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "glint")]
#[command(author, version, about = "Real-time look preview, offline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an image through a look
    #[command(visible_alias = "r")]
    Render(RenderArgs),

    /// Predict the histogram a look would produce
    #[command(visible_alias = "p")]
    Predict(PredictArgs),

    /// List the pipeline stages in execution order
    Stages,
}

#[derive(Args)]
struct RenderArgs {
    /// Source image
    #[arg(short, long)]
    image: PathBuf,

    /// Look file (strict look JSON or a loose recommendation payload)
    #[arg(short, long)]
    look: PathBuf,

    /// Comma-separated layers to isolate, e.g. `exposure,hsl_red`; empty renders neutral
    #[arg(short, long)]
    solo: Option<String>,

    /// Let soloed grading zones carry the authored balance
    #[arg(long, requires = "solo")]
    follow_balance: bool,

    /// Tiled-cube LUT image (path or file:// URL)
    #[arg(long)]
    lut: Option<String>,

    /// Output image
    #[arg(short, long)]
    out: PathBuf,

    /// Use the CPU reference instead of the GPU
    #[arg(long)]
    cpu: bool,

    /// GPU adapter preference: low or high
    #[arg(long, value_parser = parse_power)]
    power: Option<glint_gpu::config::PowerPreference>,
}

#[derive(Args)]
struct PredictArgs {
    /// Base histogram JSON (four arrays of 256 bins: red, green, blue, luma)
    #[arg(long, required_unless_present = "image", conflicts_with = "image")]
    histogram: Option<PathBuf>,

    /// Compute the base histogram from this image instead
    #[arg(long)]
    image: Option<PathBuf>,

    /// Look file
    #[arg(short, long)]
    look: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn parse_power(s: &str) -> Result<glint_gpu::config::PowerPreference, String> {
    glint_gpu::config::parse_power_preference(s)
        .ok_or_else(|| format!("unknown power preference {s:?}; expected low or high"))
}

/// `RUST_LOG` wins, then `GLINT_LOG`, then the verbosity flag.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("GLINT_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render(args) => commands::render::run(args).await,
        Commands::Predict(args) => commands::predict::run(args),
        Commands::Stages => commands::stages::run(),
    }
}
