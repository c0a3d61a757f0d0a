//! Parallel source processing
//!
//! Each source is read, parsed and aggregated on its own thread; no state
//! is shared while sources aggregate. Finished series are collected over a
//! channel (the single merge point) and re-ordered by source name. A source
//! whose file cannot be read is logged and skipped rather than failing the
//! whole batch.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use tracing::{debug, warn};

use fixlat_core::SourceSeries;

use crate::discover::SourceEntry;

/// A fully aggregated source ready for reporting
#[derive(Debug)]
pub struct AggregatedSource {
    pub name: String,
    pub series: SourceSeries,
}

/// Ingest one log file into a fresh series
pub fn aggregate_file(path: &Path, window_size_seconds: u32, zone: Tz) -> Result<SourceSeries> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut series = SourceSeries::new(window_size_seconds, zone)?;
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        series.ingest_line(&line);
    }
    debug!(
        path = %path.display(),
        accepted = series.accepted(),
        rejected = series.rejections().total(),
        "aggregated source"
    );
    Ok(series)
}

/// Aggregate every discovered source concurrently
pub fn aggregate_sources(
    entries: &[SourceEntry],
    window_size_seconds: u32,
    zone: Tz,
) -> Vec<AggregatedSource> {
    let (tx, rx) = mpsc::channel();
    thread::scope(|scope| {
        for entry in entries {
            let tx = tx.clone();
            scope.spawn(move || {
                match aggregate_file(&entry.path, window_size_seconds, zone) {
                    Ok(series) => {
                        let _ = tx.send(AggregatedSource { name: entry.name.clone(), series });
                    }
                    Err(err) => warn!(source = %entry.name, "skipping source: {err:#}"),
                }
            });
        }
    });
    drop(tx);

    let mut sources: Vec<AggregatedSource> = rx.iter().collect();
    sources.sort_by(|a, b| a.name.cmp(&b.name));
    sources
}
