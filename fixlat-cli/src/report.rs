//! Report assembly and rendering
//!
//! Builds one summary row per source and renders the batch as a
//! human-readable summary, pretty JSON, or CSV files: a summary table, one
//! window table per source, and a side-by-side table over the common axis
//! when several sources align.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::path::Path;

use fixlat_core::{AlignedSeries, Comparison, LatencyStats, Verdict, WindowResult};

use crate::runner::AggregatedSource;

/// One source's summary row
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub stats: LatencyStats,
    /// Count²-weighted average across this source's windows
    pub weighted_window_average: f64,
    /// Mean per-window sample count divided by the window size
    pub mean_messages_per_second: f64,
    pub window_count: usize,
    pub rejected_lines: u64,
    /// True on the row with the lowest whole-series average among sources
    /// that produced at least one sample
    pub best: bool,
}

/// Full batch summary over every aggregated source
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub window_size_seconds: u32,
    pub timezone: String,
    pub sources: Vec<SourceReport>,
}

impl BatchReport {
    /// Build summary rows and mark the lowest-average source
    pub fn build(window_size_seconds: u32, timezone: &str, sources: &[AggregatedSource]) -> Self {
        let mut rows: Vec<SourceReport> = sources
            .iter()
            .map(|source| {
                let stats = source.series.stats();
                let window_count = source.series.window_count();
                let mean_messages_per_second = if window_count == 0 {
                    0.0
                } else {
                    source.series.accepted() as f64
                        / window_count as f64
                        / f64::from(window_size_seconds)
                };
                SourceReport {
                    name: source.name.clone(),
                    stats,
                    weighted_window_average: source.series.weighted_window_average(),
                    mean_messages_per_second,
                    window_count,
                    rejected_lines: source.series.rejections().total(),
                    best: false,
                }
            })
            .collect();

        // Only sources with samples are eligible; an all-rejected source
        // reports zeros but never wins
        let best = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.stats.total_count > 0)
            .min_by(|(_, a), (_, b)| a.stats.average.total_cmp(&b.stats.average))
            .map(|(index, _)| index);
        if let Some(index) = best {
            rows[index].best = true;
        }

        Self {
            window_size_seconds,
            timezone: timezone.to_string(),
            sources: rows,
        }
    }

    /// Print the batch summary to stdout in human-readable format
    pub fn print_human(&self) {
        println!("\n{}", "=".repeat(60));
        println!(
            "Latency Summary  (window {}s, {})",
            self.window_size_seconds, self.timezone
        );
        println!("{}", "=".repeat(60));

        for row in &self.sources {
            let s = &row.stats;
            println!();
            println!("{}{}", row.name, if row.best { "  [lowest average]" } else { "" });
            println!("  Samples:             {}  (rejected {})", s.total_count, row.rejected_lines);
            println!("  Windows:             {}", row.window_count);
            println!("  Average:             {:.2} ms", s.average);
            println!("  Window weighted:     {:.2} ms", row.weighted_window_average);
            println!("  Std dev:             {:.2} ms", s.std_dev);
            println!("  Min / Max:           {} / {} ms", s.min, s.max);
            println!(
                "  p50/p95/p99/p99.9:   {} / {} / {} / {} ms",
                s.p50, s.p95, s.p99, s.p999
            );
            println!("  Above p95:           {}", s.above_p95_count);
            println!(
                "  Tail avg ≤p95 / ≥p95: {:.2} / {:.2} ms",
                s.average_below_p95, s.average_above_p95
            );
            println!(
                "  Peaks (>2σ):         {} ({:.2}%)",
                s.peak_count,
                100.0 * s.peak_ratio()
            );
            println!("  Messages/s:          {:.2}", row.mean_messages_per_second);
        }
        println!("\n{}", "=".repeat(60));
    }

    /// Write the batch summary as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Write the summary table as `summary.csv` in `dir`
pub fn write_summary_csv(report: &BatchReport, dir: &Path) -> Result<()> {
    let path = dir.join("summary.csv");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record([
        "source",
        "average_ms",
        "window_weighted_ms",
        "std_dev_ms",
        "max_ms",
        "min_ms",
        "peak_count",
        "p95_ms",
        "p99_ms",
        "p999_ms",
        "p50_ms",
        "above_p95_count",
        "sample_count",
        "average_below_p95_ms",
        "average_above_p95_ms",
        "messages_per_second",
        "rejected_lines",
        "best",
    ])?;
    for row in &report.sources {
        let s = &row.stats;
        writer.write_record([
            row.name.clone(),
            format!("{:.6}", s.average),
            format!("{:.6}", row.weighted_window_average),
            format!("{:.6}", s.std_dev),
            s.max.to_string(),
            s.min.to_string(),
            s.peak_count.to_string(),
            s.p95.to_string(),
            s.p99.to_string(),
            s.p999.to_string(),
            s.p50.to_string(),
            s.above_p95_count.to_string(),
            s.total_count.to_string(),
            format!("{:.6}", s.average_below_p95),
            format!("{:.6}", s.average_above_p95),
            format!("{:.6}", row.mean_messages_per_second),
            row.rejected_lines.to_string(),
            row.best.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one `<source>_windows.csv` per source in `dir`
pub fn write_window_csvs(sources: &[AggregatedSource], dir: &Path) -> Result<()> {
    for source in sources {
        let path = dir.join(format!("{}_windows.csv", sanitize_name(&source.name)));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        writer.write_record(["window_start", "average_ms", "count", "weighted_ms"])?;
        for result in source.series.results() {
            writer.write_record([
                format_instant_utc(result.start_millis),
                format!("{:.6}", result.average_latency),
                result.count.to_string(),
                format!("{:.6}", result.weighted_contribution()),
            ])?;
        }
        writer.flush()?;
    }
    Ok(())
}

/// Write the common-axis table as `aligned_windows.csv` in `dir`
pub fn write_aligned_csv(aligned: &AlignedSeries, dir: &Path) -> Result<()> {
    let path = dir.join("aligned_windows.csv");
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec!["window_start".to_string()];
    for (name, _) in &aligned.filled {
        header.push(format!("{name}_average_ms"));
        header.push(format!("{name}_count"));
    }
    writer.write_record(&header)?;

    for (index, &start) in aligned.axis.iter().enumerate() {
        let mut record = vec![format_instant_utc(start)];
        for (_, sequence) in &aligned.filled {
            let result = sequence[index];
            record.push(format!("{:.6}", result.average_latency));
            record.push(result.count.to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Print a two-source comparison to stdout
pub fn print_comparison(name_a: &str, name_b: &str, comparison: &Comparison, zone: Tz) {
    let report = match comparison {
        Comparison::NoCommonWindows => {
            println!("\nNo common windows between {name_a} and {name_b}.");
            return;
        }
        Comparison::Report(report) => report,
    };

    println!(
        "\n{:<22} {:>14} {:>14} {:>12}",
        "Window Start",
        format!("{name_a} (ms)"),
        format!("{name_b} (ms)"),
        "Diff (ms)"
    );
    for row in &report.rows {
        println!(
            "{:<22} {:>14.2} {:>14.2} {:>12.2}",
            format_local(row.start_millis, zone),
            row.average_a,
            row.average_b,
            row.diff
        );
    }

    println!(
        "\nAverage over {} common windows:",
        report.common_window_count
    );
    println!("  {name_a}: {:.2} ms", report.mean_a);
    println!("  {name_b}: {:.2} ms", report.mean_b);
    match report.verdict {
        Verdict::FirstLower => println!("\n{name_a} had the lower average latency."),
        Verdict::SecondLower => println!("\n{name_b} had the lower average latency."),
        Verdict::Tie => println!("\nBoth sources have the same average latency."),
    }
}

/// Print one source's whole-series statistics block
pub fn print_source_stats(label: &str, stats: &LatencyStats, weighted_window_average: f64) {
    println!("\n{label}:");
    println!("  Samples:             {}", stats.total_count);
    println!("  Average:             {:.2} ms", stats.average);
    println!("  Window weighted:     {weighted_window_average:.2} ms");
    println!("  Std dev:             {:.2} ms", stats.std_dev);
    println!("  Min / Max:           {} / {} ms", stats.min, stats.max);
    println!(
        "  p50/p95/p99/p99.9:   {} / {} / {} / {} ms",
        stats.p50, stats.p95, stats.p99, stats.p999
    );
    println!("  Above p95:           {}", stats.above_p95_count);
    println!(
        "  Peaks (>2σ):         {} ({:.2}%)",
        stats.peak_count,
        100.0 * stats.peak_ratio()
    );
}

fn sanitize_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Epoch milliseconds as an RFC 3339 UTC instant
fn format_instant_utc(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Epoch milliseconds rendered in the display zone
fn format_local(millis: i64, zone: Tz) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.with_timezone(&zone).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Window sequences of every source, named, for alignment
pub fn window_sequences(sources: &[AggregatedSource]) -> Vec<(String, Vec<WindowResult>)> {
    sources
        .iter()
        .map(|source| (source.name.clone(), source.series.results()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixlat_core::SourceSeries;

    fn aggregated(name: &str, lines: &[&str]) -> AggregatedSource {
        let mut series = SourceSeries::new(1, chrono_tz::UTC).unwrap();
        for line in lines {
            series.ingest_line(line);
        }
        AggregatedSource { name: name.to_string(), series }
    }

    #[test]
    fn test_best_marks_lowest_average() {
        let sources = vec![
            aggregated("slow/delay.log", &["a;b;20250805 10:00:00.000;d;90"]),
            aggregated("fast/delay.log", &["a;b;20250805 10:00:00.000;d;10"]),
        ];
        let report = BatchReport::build(1, "UTC", &sources);
        assert!(!report.sources[0].best);
        assert!(report.sources[1].best);
    }

    #[test]
    fn test_empty_source_never_best() {
        let sources = vec![
            aggregated("empty/delay.log", &["only garbage"]),
            aggregated("real/delay.log", &["a;b;20250805 10:00:00.000;d;50"]),
        ];
        let report = BatchReport::build(1, "UTC", &sources);
        assert!(!report.sources[0].best);
        assert!(report.sources[1].best);
        assert_eq!(report.sources[0].stats.total_count, 0);
        assert_eq!(report.sources[0].rejected_lines, 1);
    }

    #[test]
    fn test_mean_messages_per_second() {
        // Three samples across two one-second windows
        let sources = vec![aggregated(
            "a/delay.log",
            &[
                "a;b;20250805 10:00:00.100;d;1",
                "a;b;20250805 10:00:00.200;d;2",
                "a;b;20250805 10:00:01.000;d;3",
            ],
        )];
        let report = BatchReport::build(1, "UTC", &sources);
        assert_eq!(report.sources[0].mean_messages_per_second, 1.5);
        assert_eq!(report.sources[0].window_count, 2);
    }

    #[test]
    fn test_write_json_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![aggregated("a/delay.log", &["a;b;20250805 10:00:00.000;d;50"])];
        let report = BatchReport::build(1, "UTC", &sources);

        let json_path = dir.path().join("summary.json");
        report.write_json(&json_path).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed["sources"][0]["stats"]["average"], 50.0);
        assert_eq!(parsed["sources"][0]["best"], true);

        write_summary_csv(&report, dir.path()).unwrap();
        let summary = std::fs::read_to_string(dir.path().join("summary.csv")).unwrap();
        assert_eq!(summary.lines().count(), 2);
        assert!(summary.lines().nth(1).unwrap().starts_with("a/delay.log,50.000000"));

        write_window_csvs(&sources, dir.path()).unwrap();
        let windows =
            std::fs::read_to_string(dir.path().join("a_delay.log_windows.csv")).unwrap();
        assert!(windows.contains("2025-08-05T10:00:00.000Z,50.000000,1,50.000000"));
    }

    #[test]
    fn test_format_local() {
        let tz = chrono_tz::America::Argentina::Buenos_Aires;
        assert_eq!(format_local(1754388000123, tz), "2025-08-05 07:00:00");
        assert_eq!(format_instant_utc(1754388000123), "2025-08-05T10:00:00.123Z");
    }
}
