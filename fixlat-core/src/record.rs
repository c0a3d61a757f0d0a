//! Raw record parsing
//!
//! One input line is five semicolon-separated fields. Only the receive
//! timestamp (field 2, `yyyyMMdd HH:mm:ss.SSS`, no zone marker) and the
//! integer latency in milliseconds (field 4) are consumed. Malformed lines
//! are rejected with a reason instead of being dropped silently, so callers
//! can tally or log them.

use chrono::offset::LocalResult;
use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Timestamp pattern of field 2 (`yyyyMMdd HH:mm:ss.SSS`)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S%.3f";

const FIELD_COUNT: usize = 5;
const TIMESTAMP_FIELD: usize = 2;
const LATENCY_FIELD: usize = 4;

/// A single timestamped latency measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySample {
    /// Receive time as epoch milliseconds
    pub timestamp_millis: i64,
    /// Measured latency in milliseconds
    pub latency_ms: i32,
}

/// Why a line produced no sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Field count differs from the expected five
    FieldCount,
    /// Receive timestamp failed to parse, or names a local time that does
    /// not exist (or is ambiguous) in the configured zone
    Timestamp,
    /// Latency field is not a valid integer
    Latency,
}

/// Tallies of rejected lines by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionCounts {
    pub field_count: u64,
    pub timestamp: u64,
    pub latency: u64,
}

impl RejectionCounts {
    /// Count one rejection
    pub fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::FieldCount => self.field_count += 1,
            RejectReason::Timestamp => self.timestamp += 1,
            RejectReason::Latency => self.latency += 1,
        }
    }

    /// Total rejected lines across all reasons
    pub fn total(&self) -> u64 {
        self.field_count + self.timestamp + self.latency
    }
}

/// Parser for the five-field semicolon-delimited latency log format
///
/// Timestamps carry no zone marker; the parser interprets them in one fixed
/// configured zone and converts to epoch milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct RecordParser {
    zone: Tz,
}

impl RecordParser {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Parse one line into a sample, or report why it was rejected
    pub fn parse_line(&self, line: &str) -> std::result::Result<LatencySample, RejectReason> {
        let fields: Vec<&str> = line.split(';').collect();
        if fields.len() != FIELD_COUNT {
            return Err(RejectReason::FieldCount);
        }

        let naive = NaiveDateTime::parse_from_str(fields[TIMESTAMP_FIELD], TIMESTAMP_FORMAT)
            .map_err(|_| RejectReason::Timestamp)?;
        let timestamp_millis = match self.zone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt.timestamp_millis(),
            // DST gaps and folds have no single instant; the line is unusable
            LocalResult::Ambiguous(..) | LocalResult::None => return Err(RejectReason::Timestamp),
        };

        let latency_ms: i32 = fields[LATENCY_FIELD]
            .parse()
            .map_err(|_| RejectReason::Latency)?;

        Ok(LatencySample { timestamp_millis, latency_ms })
    }
}
