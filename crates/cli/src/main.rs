//! qamask CLI - QA band decoding for Landsat 8 and MODIS

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use qamask_algorithms::qa::{
    count_set, ConditionLevel, Confidence, MatchMode, Mask, ModisQuality, QaMasker,
    Sensor,
};
use qamask_core::io::{read_geotiff, write_geotiff, GeoTiffOptions};
use qamask_core::Raster;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "qamask")]
#[command(author, version, about = "Masks from Landsat 8 and MODIS quality assessment bands", long_about = None)]
struct Cli {
    /// Source type
    #[arg(value_enum)]
    source: Source,

    /// Input QA band (GeoTIFF)
    input: PathBuf,

    /// Output mask (GeoTIFF, 8-bit 0/1)
    output: PathBuf,

    /// Collection number of the Landsat image
    #[arg(short = 'C', long, value_parser = clap::value_parser!(u8).range(0..=1))]
    collection: Option<u8>,

    /// Level of confidence that a condition exists in a Landsat image
    #[arg(short = 'c', long, value_enum)]
    confidence: Option<ConfidenceArg>,

    /// Numeric confidence level, -1 for none
    #[arg(
        long = "confidence_value",
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i8).range(-1..=3)
    )]
    confidence_value: Option<i8>,

    /// Target Landsat mask
    #[arg(short, long, value_enum)]
    mask: Option<MaskArg>,

    /// Level of data quality of MODIS land products at each pixel
    #[arg(short, long, value_enum)]
    quality: Option<QualityArg>,

    /// Match the given confidence level or higher
    #[arg(long)]
    cumulative: bool,

    /// Image index inside a multi-image TIFF (0-based)
    #[arg(short, long)]
    band: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Source {
    Landsat,
    Modis,
}

impl Source {
    fn identifier(self) -> &'static str {
        match self {
            Source::Landsat => "landsat",
            Source::Modis => "modis",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConfidenceArg {
    High,
    Medium,
    Low,
    Undefined,
    None,
}

impl ConfidenceArg {
    fn level(self) -> ConditionLevel {
        match self {
            ConfidenceArg::High => Confidence::High.into(),
            ConfidenceArg::Medium => Confidence::Medium.into(),
            ConfidenceArg::Low => Confidence::Low.into(),
            ConfidenceArg::Undefined => Confidence::Undefined.into(),
            ConfidenceArg::None => ConditionLevel::NotRequested,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "snake_case")]
enum MaskArg {
    NoCloud,
    Cloud,
    CloudShadow,
    Cirrus,
    Water,
    Snow,
    Fill,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "snake_case")]
enum QualityArg {
    High,
    Medium,
    Low,
    LowCloud,
}

impl From<QualityArg> for ModisQuality {
    fn from(q: QualityArg) -> Self {
        match q {
            QualityArg::High => ModisQuality::High,
            QualityArg::Medium => ModisQuality::Medium,
            QualityArg::Low => ModisQuality::Low,
            QualityArg::LowCloud => ModisQuality::LowCloud,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set up logging")?;
    Ok(())
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_band(path: &PathBuf, band: Option<usize>) -> Result<Raster<u32>> {
    let pb = spinner("Reading QA band...");
    let raster: Raster<u32> = read_geotiff(path, band)
        .with_context(|| format!("Failed to read QA band from {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    if let Some(crs) = raster.crs() {
        debug!("CRS: {}", crs);
    }
    Ok(raster)
}

fn write_mask(mask: &Mask, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing mask...");
    write_geotiff(mask, path, Some(GeoTiffOptions::default()))
        .with_context(|| format!("Failed to write mask to {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

/// `--confidence` wins over `--confidence_value`
fn requested_level(cli: &Cli) -> ConditionLevel {
    match (cli.confidence, cli.confidence_value) {
        (Some(c), _) => c.level(),
        (None, Some(v)) => ConditionLevel::from_code(i32::from(v)).unwrap_or_default(),
        (None, None) => ConditionLevel::NotRequested,
    }
}

/// What to decode, checked before the band is read
#[derive(Debug, Clone, Copy)]
enum Target {
    Landsat(MaskArg),
    Modis(ModisQuality),
}

fn resolve_target(cli: &Cli) -> Result<(Sensor, Target)> {
    let sensor = Sensor::from_identifier(cli.source.identifier(), cli.collection)
        .with_context(|| format!("Cannot configure source '{}'", cli.source.identifier()))?;

    let target = match sensor {
        Sensor::Landsat8(_) => {
            let Some(kind) = cli.mask else {
                bail!("--mask is required for Landsat images");
            };
            Target::Landsat(kind)
        }
        Sensor::Modis => {
            let Some(quality) = cli.quality else {
                bail!("--quality is required for MODIS images");
            };
            Target::Modis(quality.into())
        }
    };

    for flag in ignored_flags(cli, target) {
        warn!("{} is ignored for this mask", flag);
    }

    Ok((sensor, target))
}

/// Flags given on the command line that `target` does not use
fn ignored_flags(cli: &Cli, target: Target) -> Vec<&'static str> {
    let level_given = cli.confidence.is_some() || cli.confidence_value.is_some();
    let mut ignored = Vec::new();

    match target {
        Target::Landsat(kind) => {
            if cli.quality.is_some() {
                ignored.push("--quality");
            }
            if matches!(kind, MaskArg::Fill | MaskArg::NoCloud) {
                if level_given {
                    ignored.push("--confidence");
                }
                if cli.cumulative {
                    ignored.push("--cumulative");
                }
            }
        }
        Target::Modis(_) => {
            if cli.collection.is_some() {
                ignored.push("--collection");
            }
            if cli.mask.is_some() {
                ignored.push("--mask");
            }
            if level_given {
                ignored.push("--confidence");
            }
            if cli.cumulative {
                ignored.push("--cumulative");
            }
        }
    }

    ignored
}

fn build_mask(cli: &Cli, band: &Raster<u32>, sensor: Sensor, target: Target) -> Result<(&'static str, Mask)> {
    let masker = QaMasker::new(band, sensor);
    let level = requested_level(cli);
    let mode = MatchMode::from_cumulative(cli.cumulative);

    let (name, result) = match target {
        Target::Landsat(kind) => {
            debug!("Profile: {}, mask: {:?}, level: {}, mode: {:?}", sensor, kind, level, mode);
            match kind {
                MaskArg::NoCloud => ("No-cloud mask", masker.no_cloud_mask()),
                MaskArg::Cloud => ("Cloud mask", masker.cloud_mask(level, mode)),
                MaskArg::CloudShadow => ("Cloud shadow mask", masker.cloud_shadow_mask(level, mode)),
                MaskArg::Cirrus => ("Cirrus mask", masker.cirrus_mask(level, mode)),
                MaskArg::Water => ("Water mask", masker.water_mask(level, mode)),
                MaskArg::Snow => ("Snow mask", masker.snow_mask(level, mode)),
                MaskArg::Fill => ("Fill mask", masker.fill_mask()),
            }
        }
        Target::Modis(quality) => {
            debug!("Profile: {}, quality: {}", sensor, quality.name());
            ("Quality mask", masker.quality_mask(quality))
        }
    };

    let mask = result.with_context(|| format!("Cannot build {} for {}", name.to_lowercase(), sensor))?;
    Ok((name, mask))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let (sensor, target) = resolve_target(&cli)?;

    let start = Instant::now();
    let band = read_band(&cli.input, cli.band)?;
    let (name, mask) = build_mask(&cli, &band, sensor, target)?;

    info!("Masked pixels: {} of {}", count_set(&mask), mask.len());
    write_mask(&mask, &cli.output)?;
    done(name, &cli.output, start.elapsed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from([&["qamask"], args].concat()).unwrap()
    }

    #[test]
    fn test_ignored_flags_for_modis() {
        let cli = parse(&["modis", "in.tif", "out.tif", "-q", "low", "-m", "cloud", "-c", "high", "--cumulative"]);
        let (sensor, target) = resolve_target(&cli).unwrap();
        assert_eq!(sensor, Sensor::Modis);
        assert_eq!(ignored_flags(&cli, target), vec!["--mask", "--confidence", "--cumulative"]);
    }

    #[test]
    fn test_ignored_flags_for_landsat_fill() {
        let cli = parse(&["landsat", "in.tif", "out.tif", "-C", "1", "-m", "fill", "--confidence_value", "2", "--cumulative", "-q", "high"]);
        let (_, target) = resolve_target(&cli).unwrap();
        assert_eq!(ignored_flags(&cli, target), vec!["--quality", "--confidence", "--cumulative"]);
    }

    #[test]
    fn test_no_ignored_flags_for_leveled_mask() {
        let cli = parse(&["landsat", "in.tif", "out.tif", "-C", "0", "-m", "cloud", "-c", "high", "--cumulative"]);
        let (_, target) = resolve_target(&cli).unwrap();
        assert!(ignored_flags(&cli, target).is_empty());
    }

    #[test]
    fn test_missing_collection_is_a_configuration_error() {
        let cli = parse(&["landsat", "in.tif", "out.tif", "-m", "cloud"]);
        let err = resolve_target(&cli).unwrap_err();
        let cause = err.downcast_ref::<qamask_core::Error>().unwrap();
        assert_eq!(cause.kind(), qamask_core::ErrorKind::Configuration);
    }
}
