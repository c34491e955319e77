//! sobelmap: turn a photograph into a binary Sobel edge map.
//!
//! Loads an image, median-filters it, computes the Sobel gradient
//! magnitude of its channel-mean grayscale, thresholds the magnitudes,
//! and writes the result as an 8-bit PNG.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin sobelmap -- [OPTIONS] [INPUT]
//! ```
//!
//! Progress is logged to stderr; set `RUST_LOG=debug` for per-stage
//! detail. Nothing is written unless the whole pipeline succeeds.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use sobelmap_pipeline::diagnostics::{Clock, process_pixels_with_diagnostics};
use sobelmap_pipeline::{Histogram, PipelineConfig, ThresholdPolicy};

/// Sobel edge detection for color photographs.
///
/// Writes a black image with white pixels where the gradient magnitude
/// exceeds the chosen threshold.
#[derive(Parser)]
#[command(name = "sobelmap", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    #[arg(default_value = "orig_img.jpg")]
    input: PathBuf,

    /// Where to write the edge map.
    #[arg(short, long, default_value = "edge_detection_result.png")]
    output: PathBuf,

    /// Median filter radius in pixels (0 disables denoising).
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MEDIAN_RADIUS)]
    median_radius: u32,

    /// How magnitudes become the output image.
    #[arg(long, value_enum, default_value_t = Mode::Percentile)]
    threshold_mode: Mode,

    /// Percentile cutoff for `--threshold-mode percentile` (0-100).
    #[arg(long, default_value_t = ThresholdPolicy::DEFAULT_PERCENTILE)]
    percentile: f64,

    /// Magnitude cutoff for `--threshold-mode fixed`.
    #[arg(long)]
    threshold: Option<f64>,

    /// Pipeline config as a JSON file.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    #[arg(long, conflicts_with = "config_json")]
    config: Option<PathBuf>,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Write the magnitude histogram as JSON to this path.
    #[arg(long)]
    histogram: Option<PathBuf>,

    /// Number of histogram bins.
    #[arg(long, default_value_t = Histogram::DEFAULT_BINS, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    bins: usize,

    /// Print a text rendering of the magnitude histogram to stdout.
    #[arg(long)]
    show_histogram: bool,

    /// Also write the median-filtered image to this path.
    #[arg(long)]
    save_denoised: Option<PathBuf>,

    /// Print a per-stage timing report to stdout.
    #[arg(long)]
    report: bool,

    /// Print diagnostics as JSON to stdout.
    #[arg(long, conflicts_with = "report")]
    json: bool,
}

/// Threshold policy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Cut at a percentile of the magnitude distribution.
    Percentile,
    /// Cut at a fixed magnitude.
    Fixed,
    /// Min-max rescale to 0-255 without binarizing.
    Rescale,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// `--config-json` wins over `--config`, which wins over the
/// individual flags.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }
    if let Some(ref path) = cli.config {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
        return serde_json::from_str(&text)
            .map_err(|e| format!("Error parsing {}: {e}", path.display()));
    }

    let threshold = match cli.threshold_mode {
        Mode::Percentile => ThresholdPolicy::Percentile {
            percentile: cli.percentile,
        },
        Mode::Fixed => ThresholdPolicy::Fixed {
            threshold: cli
                .threshold
                .ok_or("--threshold-mode fixed requires --threshold")?,
        },
        Mode::Rescale => ThresholdPolicy::Rescale,
    };
    Ok(PipelineConfig {
        median_radius: cli.median_radius,
        threshold,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            // Printed directly so a restrictive RUST_LOG cannot hide it.
            eprintln!("{msg}");
            tracing::error!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = config_from_cli(cli)?;

    tracing::info!(input = %cli.input.display(), "loading image");
    let pixels = sobelmap_io::load_image(&cli.input).map_err(|e| format!("{e}"))?;
    tracing::info!(
        width = pixels.width(),
        height = pixels.height(),
        "image loaded"
    );

    tracing::info!(
        median_radius = config.median_radius,
        policy = config.threshold.name(),
        "detecting edges"
    );
    let (staged, diagnostics) = process_pixels_with_diagnostics(pixels, &config, &StdClock)
        .map_err(|e| format!("Pipeline error: {e}"))?;
    if let Some(threshold) = staged.output.threshold() {
        tracing::info!(threshold, "applied threshold");
    }

    let histogram = (cli.histogram.is_some() || cli.show_histogram)
        .then(|| Histogram::from_magnitudes(&staged.magnitude, cli.bins));

    // Every fallible computation is done; only writes remain.
    save(&cli.output, "edge map", || {
        sobelmap_io::save_gray_image(&cli.output, staged.output.image())
    })?;
    if let Some(ref path) = cli.save_denoised {
        save(path, "denoised image", || {
            sobelmap_io::save_pixels(path, &staged.denoised)
        })?;
    }
    if let (Some(path), Some(hist)) = (&cli.histogram, &histogram) {
        save(path, "histogram", || {
            sobelmap_io::write_json(path, "histogram", hist)
        })?;
    }

    if cli.show_histogram
        && let Some(ref hist) = histogram
    {
        println!("{}", hist.render(32, 50));
    }
    if cli.json {
        let json = serde_json::to_string_pretty(&diagnostics)
            .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
        println!("{json}");
    } else if cli.report {
        println!("{}", diagnostics.report());
    }

    Ok(())
}

fn save(
    path: &Path,
    what: &str,
    write: impl FnOnce() -> Result<(), sobelmap_io::IoError>,
) -> Result<(), String> {
    write().map_err(|e| format!("{e}"))?;
    tracing::info!(path = %path.display(), "wrote {what}");
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("sobelmap").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_need_no_arguments() {
        let cli = parse(&[]);
        assert_eq!(cli.input, PathBuf::from("orig_img.jpg"));
        assert_eq!(cli.output, PathBuf::from("edge_detection_result.png"));
        assert_eq!(config_from_cli(&cli).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn fixed_mode_requires_threshold() {
        let cli = parse(&["--threshold-mode", "fixed"]);
        assert!(config_from_cli(&cli).is_err());

        let cli = parse(&["--threshold-mode", "fixed", "--threshold", "120"]);
        assert_eq!(
            config_from_cli(&cli).unwrap().threshold,
            ThresholdPolicy::Fixed { threshold: 120.0 }
        );
    }

    #[test]
    fn flags_build_config() {
        let cli = parse(&[
            "in.png",
            "-o",
            "out.png",
            "--median-radius",
            "1",
            "--percentile",
            "75",
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.median_radius, 1);
        assert_eq!(
            config.threshold,
            ThresholdPolicy::Percentile { percentile: 75.0 }
        );
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = parse(&[
            "--median-radius",
            "5",
            "--config-json",
            r#"{"median_radius": 0, "threshold": {"kind": "rescale"}}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.median_radius, 0);
        assert_eq!(config.threshold, ThresholdPolicy::Rescale);
    }

    #[test]
    fn bad_config_json_is_reported() {
        let cli = parse(&["--config-json", "{not json"]);
        let err = config_from_cli(&cli).unwrap_err();
        assert!(err.contains("--config-json"));
    }

    #[test]
    fn zero_bins_rejected() {
        let result = Cli::try_parse_from(["sobelmap", "--bins", "0"]);
        assert!(result.is_err());
    }

    /// Fresh scratch directory for one test.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sobelmap-cli-{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write a dark-left, bright-right RGB PNG and return its path.
    fn write_step_png(dir: &Path, width: u32, height: u32) -> PathBuf {
        let img = sobelmap_pipeline::RgbImage::from_fn(width, height, |x, _y| {
            if x < width / 2 {
                image::Rgb([10, 10, 10])
            } else {
                image::Rgb([240, 240, 240])
            }
        });
        let path = dir.join("step.png");
        let pixels = sobelmap_pipeline::PixelArray::from_rgb_image(&img).unwrap();
        sobelmap_io::save_pixels(&path, &pixels).unwrap();
        path
    }

    fn arg(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn missing_input_fails_without_writing() {
        let dir = scratch_dir("missing-input");
        let output = dir.join("edges.png");
        let histogram = dir.join("hist.json");
        let cli = parse(&[
            arg(&dir.join("nope.jpg")),
            "-o",
            arg(&output),
            "--histogram",
            arg(&histogram),
        ]);
        let err = run(&cli).unwrap_err();
        assert!(err.contains("nope.jpg"));
        assert!(!output.exists());
        assert!(!histogram.exists());
    }

    #[test]
    fn invalid_config_fails_without_writing() {
        let dir = scratch_dir("invalid-config");
        let input = write_step_png(&dir, 12, 12);
        let output = dir.join("edges.png");
        let cli = parse(&[arg(&input), "-o", arg(&output), "--percentile", "150"]);
        assert!(run(&cli).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn run_writes_binary_edge_map_and_extras() {
        let dir = scratch_dir("full-run");
        let input = write_step_png(&dir, 24, 16);
        let output = dir.join("edges.png");
        let denoised = dir.join("denoised.png");
        let histogram = dir.join("hist.json");
        let cli = parse(&[
            arg(&input),
            "-o",
            arg(&output),
            "--threshold-mode",
            "fixed",
            "--threshold",
            "100",
            "--save-denoised",
            arg(&denoised),
            "--histogram",
            arg(&histogram),
        ]);
        run(&cli).unwrap();

        let edges = image::open(&output).unwrap();
        assert_eq!(edges.color(), image::ColorType::L8);
        let edges = edges.to_luma8();
        assert_eq!(edges.dimensions(), (24, 16));
        assert!(edges.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert!(edges.pixels().any(|p| p.0[0] == 255));

        let denoised = sobelmap_io::load_image(&denoised).unwrap();
        assert_eq!(denoised.view().dim(), (16, 24, 3));

        let text = std::fs::read_to_string(&histogram).unwrap();
        let hist: Histogram = serde_json::from_str(&text).unwrap();
        assert_eq!(hist.counts.len(), Histogram::DEFAULT_BINS);
        assert_eq!(hist.total(), 24 * 16);
    }

    #[test]
    fn config_file_drives_the_run() {
        let dir = scratch_dir("config-file");
        let input = write_step_png(&dir, 12, 12);
        let output = dir.join("edges.png");
        let config = dir.join("config.json");
        std::fs::write(
            &config,
            r#"{"median_radius": 0, "threshold": {"kind": "fixed", "threshold": 1.0e9}}"#,
        )
        .unwrap();
        let cli = parse(&[arg(&input), "-o", arg(&output), "--config", arg(&config)]);
        assert_eq!(
            config_from_cli(&cli).unwrap(),
            PipelineConfig {
                median_radius: 0,
                threshold: ThresholdPolicy::Fixed { threshold: 1.0e9 },
            }
        );
        run(&cli).unwrap();

        // Nothing exceeds the cutoff, so the map is empty.
        let edges = image::open(&output).unwrap().to_luma8();
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn unreadable_config_file_is_reported() {
        let dir = scratch_dir("missing-config");
        let cli = parse(&["--config", arg(&dir.join("absent.json"))]);
        let err = config_from_cli(&cli).unwrap_err();
        assert!(err.contains("absent.json"));
    }

    #[test]
    fn clock_measures_forward() {
        let start = StdClock.now();
        assert!(StdClock.elapsed(&start) >= Duration::ZERO);
    }
}
