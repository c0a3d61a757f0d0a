//! Two-source comparison
//!
//! Compares two sources over the window starts they share. Each common
//! window contributes an average-latency delta; the verdict goes to the
//! source with the strictly lower mean across exactly those windows. Two
//! sources with no common window are a distinct outcome, not a zero diff.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::window::WindowResult;

/// Per-window latency delta between two sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowDiff {
    pub start_millis: i64,
    pub average_a: f64,
    pub average_b: f64,
    /// `average_a − average_b`
    pub diff: f64,
}

/// Which source had the strictly lower mean latency over common windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    FirstLower,
    SecondLower,
    Tie,
}

/// Comparison of two sources over their common window axis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// One row per common window, ascending by start
    pub rows: Vec<WindowDiff>,
    pub common_window_count: usize,
    /// Mean of source A's window averages over common windows (unweighted)
    pub mean_a: f64,
    /// Mean of source B's window averages over common windows (unweighted)
    pub mean_b: f64,
    pub verdict: Verdict,
}

/// Outcome of comparing two sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Comparison {
    Report(ComparisonReport),
    /// The two sources have no populated window start in common
    NoCommonWindows,
}

/// Compare two window sequences produced with the same window size
pub fn compare_series(a: &[WindowResult], b: &[WindowResult]) -> Comparison {
    let by_start_b: BTreeMap<i64, &WindowResult> = b
        .iter()
        .filter(|r| r.count > 0)
        .map(|r| (r.start_millis, r))
        .collect();

    let mut rows = Vec::new();
    let mut total_a = 0.0;
    let mut total_b = 0.0;
    for ra in a.iter().filter(|r| r.count > 0) {
        let Some(rb) = by_start_b.get(&ra.start_millis) else {
            continue;
        };
        rows.push(WindowDiff {
            start_millis: ra.start_millis,
            average_a: ra.average_latency,
            average_b: rb.average_latency,
            diff: ra.average_latency - rb.average_latency,
        });
        total_a += ra.average_latency;
        total_b += rb.average_latency;
    }

    if rows.is_empty() {
        return Comparison::NoCommonWindows;
    }
    rows.sort_by_key(|row| row.start_millis);

    let common_window_count = rows.len();
    let mean_a = total_a / common_window_count as f64;
    let mean_b = total_b / common_window_count as f64;
    let verdict = if mean_a < mean_b {
        Verdict::FirstLower
    } else if mean_b < mean_a {
        Verdict::SecondLower
    } else {
        Verdict::Tie
    };

    Comparison::Report(ComparisonReport {
        rows,
        common_window_count,
        mean_a,
        mean_b,
        verdict,
    })
}
