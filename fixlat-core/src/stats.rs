//! Distributional statistics
//!
//! Whole-series statistics over every accepted sample of one source, plus
//! the count²-weighted cross-window average. Percentiles use the
//! nearest-rank method: the sorted element at rank `ceil(q·n)`, no
//! interpolation. All functions here are deterministic and insensitive to
//! input order.

use serde::{Deserialize, Serialize};

use crate::window::WindowResult;

/// Multiple of the standard deviation beyond which a sample counts as a peak
pub const PEAK_SIGMA_MULTIPLIER: f64 = 2.0;

/// Whole-series latency statistics snapshot
///
/// Computed once per request from all samples of a source; an empty source
/// yields the all-zero snapshot rather than an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub average: f64,
    /// Population standard deviation (sum of squared deviations over n)
    pub std_dev: f64,
    pub min: i32,
    pub max: i32,
    pub p50: i32,
    pub p95: i32,
    pub p99: i32,
    pub p999: i32,
    /// Samples strictly greater than p95
    pub above_p95_count: u32,
    /// Mean of samples ≤ p95 (the p95 value itself belongs to both tails)
    pub average_below_p95: f64,
    /// Mean of samples ≥ p95 (the p95 value itself belongs to both tails)
    pub average_above_p95: f64,
    /// Samples whose absolute deviation from the mean exceeds 2σ
    pub peak_count: u32,
    pub total_count: u32,
}

impl LatencyStats {
    /// Compute statistics over one source's full sample set
    pub fn from_values(values: &[i32]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();

        let sum: f64 = sorted.iter().map(|&v| f64::from(v)).sum();
        let average = sum / n as f64;
        let variance = sorted
            .iter()
            .map(|&v| {
                let d = f64::from(v) - average;
                d * d
            })
            .sum::<f64>()
            / n as f64;
        let std_dev = variance.sqrt();

        let p50 = nearest_rank(&sorted, 0.50);
        let p95 = nearest_rank(&sorted, 0.95);
        let p99 = nearest_rank(&sorted, 0.99);
        let p999 = nearest_rank(&sorted, 0.999);

        let above_p95_count = sorted.iter().filter(|&&v| v > p95).count() as u32;
        let average_below_p95 = mean_of(sorted.iter().copied().filter(|&v| v <= p95));
        let average_above_p95 = mean_of(sorted.iter().copied().filter(|&v| v >= p95));

        let peak_count = sorted
            .iter()
            .filter(|&&v| (f64::from(v) - average).abs() > PEAK_SIGMA_MULTIPLIER * std_dev)
            .count() as u32;

        Self {
            average,
            std_dev,
            min: sorted[0],
            max: sorted[n - 1],
            p50,
            p95,
            p99,
            p999,
            above_p95_count,
            average_below_p95,
            average_above_p95,
            peak_count,
            total_count: n as u32,
        }
    }

    /// Fraction of samples counted as peaks (0.0 for an empty series)
    pub fn peak_ratio(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        f64::from(self.peak_count) / f64::from(self.total_count)
    }
}

/// Nearest-rank percentile: sorted element at `min(ceil(q·n) − 1, n − 1)`
fn nearest_rank(sorted: &[i32], q: f64) -> i32 {
    let n = sorted.len();
    let index = ((q * n as f64).ceil() as usize)
        .saturating_sub(1)
        .min(n - 1);
    sorted[index]
}

fn mean_of(values: impl Iterator<Item = i32>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += f64::from(v);
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Count²-weighted average latency across windows
///
/// `Σ(avg_i · count_i²) / Σ(count_i²)`. Squaring the count over-weights
/// dense windows relative to a plain count-weighted mean, so bursts dominate
/// the figure; the exponent is intentional. Returns 0.0 when there are no
/// windows or every window is empty.
pub fn weighted_window_average(results: &[WindowResult]) -> f64 {
    let weighted_sum: f64 = results.iter().map(WindowResult::weighted_contribution).sum();
    let total_weight: f64 = results
        .iter()
        .map(|r| f64::from(r.count) * f64::from(r.count))
        .sum();
    if total_weight == 0.0 {
        0.0
    } else {
        weighted_sum / total_weight
    }
}
