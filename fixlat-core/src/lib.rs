//! Fixlat Core Library
//!
//! Windowed latency aggregation engine: parses raw latency records, buckets
//! them into fixed-size tumbling time windows, and computes distributional
//! statistics, count²-weighted cross-window averages, multi-source axis
//! alignment, and pairwise comparisons. The crate performs no I/O and keeps
//! no global state; collaborators feed it text lines and configuration
//! values and receive value objects back.

pub mod align;
pub mod compare;
pub mod error;
pub mod record;
pub mod source;
pub mod stats;
pub mod window;

pub use align::{align_series, AlignedSeries, Alignment};
pub use compare::{compare_series, Comparison, ComparisonReport, Verdict, WindowDiff};
pub use error::{Error, Result};
pub use record::{LatencySample, RecordParser, RejectReason, RejectionCounts};
pub use source::SourceSeries;
pub use stats::{weighted_window_average, LatencyStats};
pub use window::{WindowAggregator, WindowResult};
