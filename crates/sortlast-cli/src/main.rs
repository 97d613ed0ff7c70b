//! sortlast - a sort-last parallel image compositing miniapp.
//!
//! Every rank rasterizes its share of a synthetic triangle scene into a
//! private framebuffer; the framebuffers are then merged with binary swap
//! (or direct send) and gathered onto rank 0, which writes the result as
//! a PPM image and optionally a YAML timing report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sortlast_core::{Encoding, EncodingKind, RgbaF32, RgbaU8, RgbaU8Z, RgbF32Z};
use sortlast_paint::Distribution;

mod ppm;
mod run;
mod timing;

use run::{Algorithm, Config};
use timing::TimingReport;

/// Pixel encoding selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EncodingArg {
    /// 8-bit RGBA color with depth (z-buffer compositing).
    Rgba8z,
    /// Float RGB color with depth.
    Rgbf32z,
    /// 8-bit RGBA color only (alpha-over compositing).
    Rgba8,
    /// Float RGBA color only.
    Rgbaf32,
}

impl EncodingArg {
    fn kind(self) -> EncodingKind {
        match self {
            Self::Rgba8z => EncodingKind::RgbaU8Z,
            Self::Rgbf32z => EncodingKind::RgbF32Z,
            Self::Rgba8 => EncodingKind::RgbaU8,
            Self::Rgbaf32 => EncodingKind::RgbaF32,
        }
    }
}

/// Composition algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CompositorArg {
    /// Pairwise halving exchange, log2(P) rounds.
    BinarySwap,
    /// Everything to rank 0, then strip redistribution.
    DirectSend,
}

/// Geometry distribution selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DistributionArg {
    /// Whole mesh per rank, offset into a rank grid.
    Duplicate,
    /// Contiguous triangle slice per rank.
    Partition,
}

#[derive(Parser)]
#[command(name = "sortlast")]
#[command(author, version, about = "Sort-last parallel image compositing miniapp")]
struct Cli {
    /// Framebuffer width in pixels, uniform across ranks
    #[arg(long, default_value_t = 1100)]
    width: u32,

    /// Framebuffer height in pixels, uniform across ranks
    #[arg(long, default_value_t = 900)]
    height: u32,

    /// Number of ranks (one thread per rank)
    #[arg(short = 'n', long, default_value_t = 4)]
    ranks: usize,

    /// Pixel encoding
    #[arg(long, value_enum, default_value = "rgba8z")]
    encoding: EncodingArg,

    /// Composition algorithm
    #[arg(long, value_enum, default_value = "binary-swap")]
    compositor: CompositorArg,

    /// Geometry distribution mode
    #[arg(long, value_enum, default_value = "duplicate")]
    distribution: DistributionArg,

    /// Face opacity of the synthetic box scene
    #[arg(long, default_value_t = 1.0)]
    opacity: f32,

    /// Fail instead of falling back to direct send when the rank count
    /// is not a power of two
    #[arg(long)]
    strict: bool,

    /// Output image path (binary PPM)
    #[arg(short, long, default_value = "composite.ppm")]
    output: PathBuf,

    /// Write a YAML timing report to this path
    #[arg(long)]
    timing: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Initialize tracing based on verbosity level.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.encoding {
        EncodingArg::Rgba8z => execute::<RgbaU8Z>(&cli),
        EncodingArg::Rgbf32z => execute::<RgbF32Z>(&cli),
        EncodingArg::Rgba8 => execute::<RgbaU8>(&cli),
        EncodingArg::Rgbaf32 => execute::<RgbaF32>(&cli),
    }
}

fn execute<E: Encoding>(cli: &Cli) -> Result<()> {
    let algorithm = match cli.compositor {
        CompositorArg::BinarySwap => Algorithm::BinarySwap { strict: cli.strict },
        CompositorArg::DirectSend => Algorithm::DirectSend,
    };
    let distribution = match cli.distribution {
        DistributionArg::Duplicate => Distribution::Duplicate,
        DistributionArg::Partition => Distribution::Partition,
    };
    let config = Config {
        width: cli.width,
        height: cli.height,
        ranks: cli.ranks,
        algorithm,
        distribution,
        opacity: cli.opacity,
    };

    let started = std::time::Instant::now();
    let (image, phases) = run::run::<E>(&config)?;
    let total_seconds = started.elapsed().as_secs_f64();

    ppm::write_ppm(&cli.output, &image)
        .with_context(|| format!("writing image {}", cli.output.display()))?;
    info!(
        output = %cli.output.display(),
        total_seconds,
        "composited {}x{} over {} ranks",
        cli.width,
        cli.height,
        cli.ranks
    );

    if let Some(path) = &cli.timing {
        let report = TimingReport {
            width: cli.width,
            height: cli.height,
            ranks: cli.ranks,
            encoding: cli.encoding.kind().name().to_string(),
            compositor: algorithm.name().to_string(),
            distribution: format!("{distribution:?}").to_lowercase(),
            paint_seconds: phases.paint,
            compose_seconds: phases.compose,
            gather_seconds: phases.gather,
            total_seconds,
        };
        timing::write_report(path, &report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_the_standard_run() {
        let cli = Cli::parse_from(["sortlast"]);
        assert_eq!(cli.width, 1100);
        assert_eq!(cli.height, 900);
        assert_eq!(cli.ranks, 4);
        assert_eq!(cli.encoding, EncodingArg::Rgba8z);
        assert_eq!(cli.compositor, CompositorArg::BinarySwap);
        assert!(!cli.strict);
    }

    #[test]
    fn test_encoding_arg_maps_to_kind() {
        assert_eq!(EncodingArg::Rgba8z.kind().name(), "rgba8z");
        assert_eq!(EncodingArg::Rgbaf32.kind().name(), "rgbaf32");
        assert!(EncodingArg::Rgba8.kind().order_dependent());
    }
}
