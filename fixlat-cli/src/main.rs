use anyhow::Result;
use clap::{Parser, Subcommand};
use schemars::schema_for;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fixlat_core::{align_series, compare_series, Alignment};

mod config;
mod discover;
mod report;
mod runner;

use config::ProfileConfig;
use report::BatchReport;

/// Fixlat: windowed latency report tool
///
/// Aggregates timestamped latency logs into tumbling time windows and
/// reports per-window and whole-file statistics for comparing sources.
///
/// Example usage:
///   fixlat report -P profiles/daily.toml
///   fixlat report -P profiles/daily.toml -w 10 --csv-dir out/
///   fixlat compare gateway-a/delay.log gateway-b/delay.log -w 1
#[derive(Parser)]
#[command(name = "fixlat")]
#[command(version, about = "Latency log aggregation and comparison", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce a batch latency summary over every discovered source
    Report {
        /// Path to TOML profile configuration file (REQUIRED)
        #[arg(short = 'P', long, required = true)]
        profile: PathBuf,

        /// Override the profile's window size in seconds
        #[arg(short = 'w', long)]
        window_size_seconds: Option<u32>,

        /// Write the summary as pretty JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write summary and per-window CSV files into this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },

    /// Compare two latency logs over their common windows
    Compare {
        /// First log file
        file_a: PathBuf,

        /// Second log file
        file_b: PathBuf,

        /// Tumbling window size in seconds
        #[arg(short = 'w', long, default_value_t = 1)]
        window_size_seconds: u32,

        /// IANA zone id the log timestamps are interpreted in
        #[arg(long, default_value = "America/Argentina/Buenos_Aires")]
        timezone: String,
    },

    /// Generate JSON Schema for profile configuration files
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Report { profile, window_size_seconds, json, csv_dir } => {
            run_report(&profile, window_size_seconds, json, csv_dir)
        }
        Commands::Compare { file_a, file_b, window_size_seconds, timezone } => {
            run_compare(&file_a, &file_b, window_size_seconds, &timezone)
        }
        Commands::Schema => {
            let schema = schema_for!(ProfileConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn run_report(
    profile: &Path,
    window_size_seconds: Option<u32>,
    json: Option<PathBuf>,
    csv_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = ProfileConfig::from_file(profile)?;
    if let Some(window) = window_size_seconds {
        config.window_size_seconds = window;
    }
    if json.is_some() {
        config.output.json = json;
    }
    if csv_dir.is_some() {
        config.output.csv_dir = csv_dir;
    }
    config.validate()?;
    let zone = config.zone()?;

    let entries = discover::discover_sources(&config.input_dir, &config.log_file_name)?;
    if entries.is_empty() {
        println!(
            "No {} files found under subdirectories of {}",
            config.log_file_name,
            config.input_dir.display()
        );
        return Ok(());
    }

    info!(sources = entries.len(), window = config.window_size_seconds, "aggregating sources");
    let sources = runner::aggregate_sources(&entries, config.window_size_seconds, zone);
    if sources.is_empty() {
        println!("Every discovered source failed to read; nothing to report.");
        return Ok(());
    }

    let batch = BatchReport::build(config.window_size_seconds, &config.timezone, &sources);
    batch.print_human();

    if let Some(path) = &config.output.json {
        batch.write_json(path)?;
        println!("Summary written to: {}", path.display());
    }

    if let Some(dir) = &config.output.csv_dir {
        std::fs::create_dir_all(dir)?;
        report::write_summary_csv(&batch, dir)?;
        report::write_window_csvs(&sources, dir)?;
        if sources.len() >= 2 {
            match align_series(&report::window_sequences(&sources), config.window_size_seconds)? {
                Alignment::Aligned(aligned) => report::write_aligned_csv(&aligned, dir)?,
                Alignment::Disjoint => {
                    info!("sources share no common window; skipping the aligned table")
                }
            }
        }
        println!("CSV files written to: {}", dir.display());
    }

    Ok(())
}

fn run_compare(
    file_a: &Path,
    file_b: &Path,
    window_size_seconds: u32,
    timezone: &str,
) -> Result<()> {
    let zone = config::parse_zone(timezone)?;

    let series_a = runner::aggregate_file(file_a, window_size_seconds, zone)?;
    let series_b = runner::aggregate_file(file_b, window_size_seconds, zone)?;

    let name_a = display_name(file_a);
    let name_b = display_name(file_b);

    let comparison = compare_series(&series_a.results(), &series_b.results());
    report::print_comparison(&name_a, &name_b, &comparison, zone);

    report::print_source_stats(&name_a, &series_a.stats(), series_a.weighted_window_average());
    report::print_source_stats(&name_b, &series_b.stats(), series_b.weighted_window_average());

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
