//! Per-source ingestion
//!
//! Couples the record parser with a window aggregator and keeps the
//! rejection tallies the raw format otherwise hides. One `SourceSeries` is
//! built sequentially from one source's lines; independent sources carry no
//! shared state and may be built on separate threads.

use chrono_tz::Tz;

use crate::error::Result;
use crate::record::{RecordParser, RejectionCounts};
use crate::stats::{weighted_window_average, LatencyStats};
use crate::window::{WindowAggregator, WindowResult};

/// One source's full ingestion pipeline: parse, bucket, tally
#[derive(Debug)]
pub struct SourceSeries {
    parser: RecordParser,
    aggregator: WindowAggregator,
    accepted: u64,
    rejections: RejectionCounts,
}

impl SourceSeries {
    pub fn new(window_size_seconds: u32, zone: Tz) -> Result<Self> {
        Ok(Self {
            parser: RecordParser::new(zone),
            aggregator: WindowAggregator::new(window_size_seconds)?,
            accepted: 0,
            rejections: RejectionCounts::default(),
        })
    }

    /// Feed one raw line; malformed lines are tallied, never fatal
    pub fn ingest_line(&mut self, line: &str) {
        match self.parser.parse_line(line) {
            Ok(sample) => {
                self.aggregator.add_sample(sample);
                self.accepted += 1;
            }
            Err(reason) => self.rejections.record(reason),
        }
    }

    /// Lines that produced a sample
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Lines that were rejected, by reason
    pub fn rejections(&self) -> RejectionCounts {
        self.rejections
    }

    pub fn window_size_seconds(&self) -> u32 {
        self.aggregator.window_size_seconds()
    }

    /// Number of populated windows
    pub fn window_count(&self) -> usize {
        self.aggregator.len()
    }

    /// Per-window snapshots in ascending start order
    pub fn results(&self) -> Vec<WindowResult> {
        self.aggregator.results()
    }

    /// Whole-series statistics over every accepted sample
    pub fn stats(&self) -> LatencyStats {
        LatencyStats::from_values(&self.aggregator.all_samples())
    }

    /// Count²-weighted average across this source's windows
    pub fn weighted_window_average(&self) -> f64 {
        weighted_window_average(&self.results())
    }
}
