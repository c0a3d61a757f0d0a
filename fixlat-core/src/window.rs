//! Tumbling-window aggregation
//!
//! Samples are bucketed into fixed-size, non-overlapping windows keyed by
//! their aligned start time. Windows are created lazily on first sample,
//! kept in a sorted map, and iterated in ascending start order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::LatencySample;

pub const MILLIS_PER_SECOND: i64 = 1000;

/// One window's raw latencies, in arrival order
#[derive(Debug, Clone)]
pub struct Window {
    start_millis: i64,
    latencies: Vec<i32>,
}

impl Window {
    fn new(start_millis: i64) -> Self {
        Self { start_millis, latencies: Vec::new() }
    }

    fn add(&mut self, latency_ms: i32) {
        self.latencies.push(latency_ms);
    }

    pub fn start_millis(&self) -> i64 {
        self.start_millis
    }

    pub fn latencies(&self) -> &[i32] {
        &self.latencies
    }

    fn average(&self) -> f64 {
        if self.latencies.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.latencies.iter().map(|&v| f64::from(v)).sum();
        sum / self.latencies.len() as f64
    }

    /// Immutable snapshot of this window
    pub fn to_result(&self) -> WindowResult {
        WindowResult {
            start_millis: self.start_millis,
            average_latency: self.average(),
            count: self.latencies.len() as u32,
        }
    }
}

/// Immutable per-window snapshot derived at read time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowResult {
    /// Window start as epoch milliseconds, aligned to the window size
    pub start_millis: i64,
    /// Mean latency of the window's samples (0.0 for a placeholder)
    pub average_latency: f64,
    /// Number of samples in the window (0 for a placeholder)
    pub count: u32,
}

impl WindowResult {
    /// Zero-count placeholder synthesized for a gap in a window axis
    pub fn placeholder(start_millis: i64) -> Self {
        Self { start_millis, average_latency: 0.0, count: 0 }
    }

    /// This window's count²-weighted contribution
    pub fn weighted_contribution(&self) -> f64 {
        self.average_latency * f64::from(self.count) * f64::from(self.count)
    }
}

/// Assigns samples to tumbling windows for a single source
///
/// Construction rejects a zero window size; there is no meaningful grid to
/// bucket onto. Samples for one aggregator are added sequentially.
#[derive(Debug)]
pub struct WindowAggregator {
    window_size_seconds: u32,
    windows: BTreeMap<i64, Window>,
}

impl WindowAggregator {
    pub fn new(window_size_seconds: u32) -> Result<Self> {
        if window_size_seconds == 0 {
            return Err(Error::Config(
                "window size must be a positive number of seconds".to_string(),
            ));
        }
        Ok(Self { window_size_seconds, windows: BTreeMap::new() })
    }

    pub fn window_size_seconds(&self) -> u32 {
        self.window_size_seconds
    }

    /// Width of one window in milliseconds
    pub fn step_millis(&self) -> i64 {
        i64::from(self.window_size_seconds) * MILLIS_PER_SECOND
    }

    /// Bucket one sample into the window covering its timestamp
    pub fn add_sample(&mut self, sample: LatencySample) {
        let step = self.step_millis();
        // Euclidean division floors correctly for pre-epoch timestamps
        let start = sample.timestamp_millis.div_euclid(step) * step;
        self.windows
            .entry(start)
            .or_insert_with(|| Window::new(start))
            .add(sample.latency_ms);
    }

    /// Per-window snapshots in ascending start order, without gap filling
    pub fn results(&self) -> Vec<WindowResult> {
        self.windows.values().map(Window::to_result).collect()
    }

    /// Every bucketed latency, concatenated in ascending window order
    pub fn all_samples(&self) -> Vec<i32> {
        self.windows
            .values()
            .flat_map(|w| w.latencies().iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(timestamp_millis: i64, latency_ms: i32) -> LatencySample {
        LatencySample { timestamp_millis, latency_ms }
    }

    #[test]
    fn test_zero_window_size_rejected() {
        assert!(WindowAggregator::new(0).is_err());
        assert!(WindowAggregator::new(1).is_ok());
    }

    #[test]
    fn test_two_windows() {
        let mut agg = WindowAggregator::new(1).unwrap();
        agg.add_sample(sample(0, 50));
        agg.add_sample(sample(0, 60));
        agg.add_sample(sample(1000, 100));

        let results = agg.results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].start_millis, 0);
        assert_eq!(results[0].average_latency, 55.0);
        assert_eq!(results[0].count, 2);
        assert_eq!(results[1].start_millis, 1000);
        assert_eq!(results[1].average_latency, 100.0);
        assert_eq!(results[1].count, 1);
    }

    #[test]
    fn test_start_aligned_to_window_size() {
        let mut agg = WindowAggregator::new(10).unwrap();
        agg.add_sample(sample(12_345, 1));
        agg.add_sample(sample(19_999, 2));
        agg.add_sample(sample(20_000, 3));

        let results = agg.results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].start_millis, 10_000);
        assert_eq!(results[0].count, 2);
        assert_eq!(results[1].start_millis, 20_000);
        for r in &results {
            assert_eq!(r.start_millis % agg.step_millis(), 0);
        }
    }

    #[test]
    fn test_pre_epoch_timestamp_floors_down() {
        let mut agg = WindowAggregator::new(1).unwrap();
        agg.add_sample(sample(-1, 5));
        let results = agg.results();
        assert_eq!(results[0].start_millis, -1000);
    }

    #[test]
    fn test_results_ascending_regardless_of_arrival() {
        let mut agg = WindowAggregator::new(1).unwrap();
        agg.add_sample(sample(5000, 1));
        agg.add_sample(sample(1000, 2));
        agg.add_sample(sample(3000, 3));

        let starts: Vec<i64> = agg.results().iter().map(|r| r.start_millis).collect();
        assert_eq!(starts, vec![1000, 3000, 5000]);
    }

    #[test]
    fn test_all_samples_window_order() {
        let mut agg = WindowAggregator::new(1).unwrap();
        agg.add_sample(sample(2000, 30));
        agg.add_sample(sample(0, 10));
        agg.add_sample(sample(2000, 40));
        agg.add_sample(sample(0, 20));

        // Ascending window order, arrival order inside each window
        assert_eq!(agg.all_samples(), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_placeholder() {
        let p = WindowResult::placeholder(7000);
        assert_eq!(p.start_millis, 7000);
        assert_eq!(p.average_latency, 0.0);
        assert_eq!(p.count, 0);
        assert_eq!(p.weighted_contribution(), 0.0);
    }

    #[test]
    fn test_weighted_contribution() {
        let r = WindowResult { start_millis: 0, average_latency: 10.0, count: 3 };
        assert_eq!(r.weighted_contribution(), 90.0);
    }
}
