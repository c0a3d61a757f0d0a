//! Multi-source window alignment
//!
//! Puts several sources onto one shared window axis so they can be shown
//! side by side. The axis spans the earliest to the latest window start
//! common to every source; gaps inside that span are filled with zero-count
//! placeholders. Filled sequences are for display only; statistics are
//! always computed from unfilled data.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::window::{WindowResult, MILLIS_PER_SECOND};

/// Outcome of aligning several sources onto a common axis
#[derive(Debug, Clone)]
pub enum Alignment {
    /// At least one window start is shared by every source
    Aligned(AlignedSeries),
    /// The sources share no populated window start
    Disjoint,
}

/// Sources filled onto one shared window axis
#[derive(Debug, Clone)]
pub struct AlignedSeries {
    /// Every window start from the earliest to the latest common one,
    /// stepping by the window size (a superset of the intersection)
    pub axis: Vec<i64>,
    /// Per source, one result per axis entry (placeholders where absent)
    pub filled: Vec<(String, Vec<WindowResult>)>,
}

/// Align all sources onto the axis spanned by their common windows
///
/// Every source must have been aggregated with the same window size;
/// a window start off the grid means sizes were mixed and is rejected.
pub fn align_series(
    series: &[(String, Vec<WindowResult>)],
    window_size_seconds: u32,
) -> Result<Alignment> {
    if window_size_seconds == 0 {
        return Err(Error::Config(
            "window size must be a positive number of seconds".to_string(),
        ));
    }
    let step = i64::from(window_size_seconds) * MILLIS_PER_SECOND;

    for (name, results) in series {
        for r in results {
            if r.start_millis.rem_euclid(step) != 0 {
                return Err(Error::Alignment(format!(
                    "source {name} has window start {} off the {window_size_seconds}s grid",
                    r.start_millis
                )));
            }
        }
    }

    let mut common: Option<BTreeSet<i64>> = None;
    for (_, results) in series {
        let starts: BTreeSet<i64> = results
            .iter()
            .filter(|r| r.count > 0)
            .map(|r| r.start_millis)
            .collect();
        common = Some(match common {
            None => starts,
            Some(prev) => prev.intersection(&starts).copied().collect(),
        });
    }

    let common = common.unwrap_or_default();
    let (Some(&min_common), Some(&max_common)) = (common.first(), common.last()) else {
        return Ok(Alignment::Disjoint);
    };

    let axis_len = ((max_common - min_common) / step + 1) as usize;
    let axis: Vec<i64> = (0..axis_len)
        .map(|i| min_common + i as i64 * step)
        .collect();

    let filled = series
        .iter()
        .map(|(name, results)| {
            let by_start: BTreeMap<i64, WindowResult> =
                results.iter().map(|r| (r.start_millis, *r)).collect();
            let sequence = axis
                .iter()
                .map(|&start| {
                    by_start
                        .get(&start)
                        .copied()
                        .unwrap_or_else(|| WindowResult::placeholder(start))
                })
                .collect();
            (name.clone(), sequence)
        })
        .collect();

    Ok(Alignment::Aligned(AlignedSeries { axis, filled }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(start_millis: i64, average_latency: f64, count: u32) -> WindowResult {
        WindowResult { start_millis, average_latency, count }
    }

    #[test]
    fn test_aligned_with_gap_fill() {
        let series = vec![
            (
                "a".to_string(),
                vec![result(0, 10.0, 1), result(3000, 30.0, 1)],
            ),
            (
                "b".to_string(),
                vec![result(0, 11.0, 2), result(1000, 12.0, 1), result(3000, 31.0, 2)],
            ),
        ];

        let Alignment::Aligned(aligned) = align_series(&series, 1).unwrap() else {
            panic!("expected aligned outcome");
        };

        // Common starts {0, 3000}; axis spans the full range
        assert_eq!(aligned.axis, vec![0, 1000, 2000, 3000]);
        // Span divided by the step, inclusive of both ends
        assert_eq!(aligned.axis.len(), 3000 / 1000 + 1);

        let (_, seq_a) = &aligned.filled[0];
        assert_eq!(seq_a.len(), aligned.axis.len());
        assert_eq!(seq_a[0], result(0, 10.0, 1));
        assert_eq!(seq_a[1], WindowResult::placeholder(1000));
        assert_eq!(seq_a[2], WindowResult::placeholder(2000));
        assert_eq!(seq_a[3], result(3000, 30.0, 1));

        let (_, seq_b) = &aligned.filled[1];
        assert_eq!(seq_b[1], result(1000, 12.0, 1));
        assert_eq!(seq_b[2], WindowResult::placeholder(2000));
    }

    #[test]
    fn test_disjoint_sources() {
        let series = vec![
            ("a".to_string(), vec![result(0, 10.0, 1)]),
            ("b".to_string(), vec![result(5000, 20.0, 1)]),
        ];
        assert!(matches!(align_series(&series, 1).unwrap(), Alignment::Disjoint));
    }

    #[test]
    fn test_no_sources_is_disjoint() {
        assert!(matches!(align_series(&[], 1).unwrap(), Alignment::Disjoint));
    }

    #[test]
    fn test_placeholder_windows_do_not_count_as_common() {
        // b only overlaps a at start 0 through a zero-count placeholder
        let series = vec![
            ("a".to_string(), vec![result(0, 10.0, 1)]),
            ("b".to_string(), vec![WindowResult::placeholder(0), result(1000, 5.0, 1)]),
        ];
        assert!(matches!(align_series(&series, 1).unwrap(), Alignment::Disjoint));
    }

    #[test]
    fn test_mixed_window_sizes_rejected() {
        // 1500 is not on a 1s grid: these results came from a different size
        let series = vec![
            ("a".to_string(), vec![result(0, 10.0, 1)]),
            ("b".to_string(), vec![result(1500, 20.0, 1)]),
        ];
        assert!(align_series(&series, 1).is_err());
    }

    #[test]
    fn test_zero_window_size_rejected() {
        assert!(align_series(&[], 0).is_err());
    }

    #[test]
    fn test_larger_window_size_axis() {
        let series = vec![
            ("a".to_string(), vec![result(10_000, 1.0, 1), result(40_000, 4.0, 1)]),
            ("b".to_string(), vec![result(10_000, 2.0, 1), result(40_000, 5.0, 1)]),
        ];
        let Alignment::Aligned(aligned) = align_series(&series, 10).unwrap() else {
            panic!("expected aligned outcome");
        };
        assert_eq!(aligned.axis, vec![10_000, 20_000, 30_000, 40_000]);
    }
}
