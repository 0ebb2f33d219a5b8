//! Turns raw rows into typed fixes grouped by device.
//!
//! Rows are classified in file order. An optional header on the first row is
//! skipped silently. Every other row yields exactly one [`Fix`] or exactly
//! one [`RejectRecord`], which goes to a [`RejectSink`].

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::stats::RunStats;
use crate::trips::types::{DeviceTracks, Fix};
use crate::validate::{is_header_row, parse_latitude, parse_longitude, parse_timestamp};

/// One input line split into fields.
pub type RawRecord = Vec<String>;

/// Separator used when a rejected row is written back out as a single line.
pub const REJECT_LINE_SEPARATOR: &str = "|";

/// Why a row was not turned into a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    TooFewColumns,
    EmptyDeviceId,
    InvalidCoordinates,
    BadTimestamp,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::TooFewColumns => "too_few_columns",
            RejectReason::EmptyDeviceId => "empty_device_id",
            RejectReason::InvalidCoordinates => "invalid_coordinates",
            RejectReason::BadTimestamp => "bad_timestamp",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected row: the reason plus the row's fields joined with `|`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectRecord {
    pub reason: RejectReason,
    pub line: String,
}

impl RejectRecord {
    pub fn new<S: AsRef<str>>(reason: RejectReason, fields: &[S]) -> Self {
        let line = fields
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(REJECT_LINE_SEPARATOR);
        Self { reason, line }
    }
}

/// Destination for rejected rows. A failing sink aborts the run.
pub trait RejectSink {
    fn report(&mut self, reject: RejectRecord) -> Result<()>;
}

impl RejectSink for Vec<RejectRecord> {
    fn report(&mut self, reject: RejectRecord) -> Result<()> {
        self.push(reject);
        Ok(())
    }
}

/// Classifies one data row.
pub fn classify_row<S: AsRef<str>>(fields: &[S]) -> Result<Fix, RejectReason> {
    if fields.len() < 4 {
        return Err(RejectReason::TooFewColumns);
    }

    let device_id = fields[0].as_ref().trim();
    let raw_timestamp = fields[3].as_ref();

    if device_id.is_empty() {
        return Err(RejectReason::EmptyDeviceId);
    }

    let (Some(latitude), Some(longitude)) = (
        parse_latitude(fields[1].as_ref()),
        parse_longitude(fields[2].as_ref()),
    ) else {
        return Err(RejectReason::InvalidCoordinates);
    };

    let timestamp = parse_timestamp(raw_timestamp).ok_or(RejectReason::BadTimestamp)?;

    Ok(Fix {
        device_id: device_id.to_string(),
        latitude,
        longitude,
        timestamp,
        raw_timestamp: raw_timestamp.to_string(),
    })
}

/// Consumes rows in file order and groups the admissible ones by device.
///
/// Only the first row is checked for being a header. Rejects are reported in
/// encounter order; counts land in `stats`.
pub fn ingest_rows<I, S>(rows: I, sink: &mut S, stats: &mut RunStats) -> Result<DeviceTracks>
where
    I: IntoIterator<Item = RawRecord>,
    S: RejectSink + ?Sized,
{
    let mut tracks = DeviceTracks::new();

    for (row_index, fields) in rows.into_iter().enumerate() {
        stats.rows_read += 1;

        if row_index == 0 && is_header_row(&fields) {
            debug!(fields = ?fields, "Skipping header row");
            stats.header_skipped = true;
            continue;
        }

        match classify_row(&fields) {
            Ok(fix) => {
                stats.fixes += 1;
                tracks.push(fix);
            }
            Err(reason) => {
                debug!(row = row_index + 1, %reason, "Rejecting row");
                stats.record_reject(reason);
                sink.report(RejectRecord::new(reason, &fields))?;
            }
        }
    }

    stats.devices = tracks.len();
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> RawRecord {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_classify_valid_row() {
        let fix = classify_row(&["A", "12.5", "-45.25", "2025-08-14T12:34:56Z", "extra"]).unwrap();
        assert_eq!(fix.device_id, "A");
        assert_eq!(fix.latitude, 12.5);
        assert_eq!(fix.longitude, -45.25);
        assert_eq!(fix.raw_timestamp, "2025-08-14T12:34:56Z");
    }

    #[test]
    fn test_classify_reject_order() {
        assert_eq!(classify_row(&["A", "1", "2"]), Err(RejectReason::TooFewColumns));
        assert_eq!(
            classify_row(&["  ", "91", "2", "bad"]),
            Err(RejectReason::EmptyDeviceId)
        );
        assert_eq!(
            classify_row(&["A", "91", "2", "bad"]),
            Err(RejectReason::InvalidCoordinates)
        );
        assert_eq!(
            classify_row(&["A", "north", "2", "2025-08-14T12:34:56Z"]),
            Err(RejectReason::InvalidCoordinates)
        );
        assert_eq!(
            classify_row(&["A", "1", "181", "2025-08-14T12:34:56Z"]),
            Err(RejectReason::InvalidCoordinates)
        );
        assert_eq!(
            classify_row(&["A", "1", "2", "bad"]),
            Err(RejectReason::BadTimestamp)
        );
    }

    #[test]
    fn test_reject_reason_codes() {
        assert_eq!(RejectReason::TooFewColumns.to_string(), "too_few_columns");
        assert_eq!(RejectReason::EmptyDeviceId.as_str(), "empty_device_id");
        assert_eq!(
            serde_json::to_string(&RejectReason::InvalidCoordinates).unwrap(),
            "\"invalid_coordinates\""
        );
        assert_eq!(RejectReason::BadTimestamp.as_str(), "bad_timestamp");
    }

    #[test]
    fn test_reject_record_joins_fields() {
        let reject = RejectRecord::new(RejectReason::BadTimestamp, &["A", "1", "2", "x"]);
        assert_eq!(reject.line, "A|1|2|x");
    }

    #[test]
    fn test_header_row_skipped_without_reject() {
        let rows = vec![
            row(&["device_id", "lat", "lon", "timestamp"]),
            row(&["A", "1.0", "2.0", "2025-08-14T12:34:56Z"]),
        ];
        let mut rejects: Vec<RejectRecord> = Vec::new();
        let mut stats = RunStats::default();
        let tracks = ingest_rows(rows, &mut rejects, &mut stats).unwrap();

        assert!(rejects.is_empty());
        assert_eq!(tracks.fix_count(), 1);
        assert!(stats.header_skipped);
        assert_eq!(stats.rows_read, 2);
    }

    #[test]
    fn test_only_first_row_checked_for_header() {
        let rows = vec![
            row(&["A", "1.0", "2.0", "2025-08-14T12:34:56Z"]),
            row(&["device_id", "lat", "lon", "timestamp"]),
        ];
        let mut rejects: Vec<RejectRecord> = Vec::new();
        let mut stats = RunStats::default();
        let tracks = ingest_rows(rows, &mut rejects, &mut stats).unwrap();

        assert_eq!(tracks.fix_count(), 1);
        assert_eq!(rejects.len(), 1);
        assert_eq!(rejects[0].reason, RejectReason::InvalidCoordinates);
        assert!(!stats.header_skipped);
    }

    #[test]
    fn test_out_of_range_single_row_rejected() {
        let rows = vec![row(&["A", "91", "0", "2025-08-14T12:34:56Z"])];
        let mut rejects: Vec<RejectRecord> = Vec::new();
        let mut stats = RunStats::default();
        let tracks = ingest_rows(rows, &mut rejects, &mut stats).unwrap();

        assert!(tracks.is_empty());
        assert_eq!(
            rejects,
            vec![RejectRecord {
                reason: RejectReason::InvalidCoordinates,
                line: "A|91|0|2025-08-14T12:34:56Z".to_string(),
            }]
        );
    }

    #[test]
    fn test_one_outcome_per_data_row() {
        let rows = vec![
            row(&["A", "1.0", "2.0", "2025-08-14T12:00:00Z"]),
            row(&["B", "1.0"]),
            row(&["", "1.0", "2.0", "2025-08-14T12:00:00Z"]),
            row(&["C", "1.0", "2.0", "soon"]),
            row(&["B", "3.0", "4.0", "2025-08-14T12:05:00Z"]),
            row(&["A", "1.0", "2.0", "2025-08-14T12:01:00Z"]),
        ];
        let mut rejects: Vec<RejectRecord> = Vec::new();
        let mut stats = RunStats::default();
        let tracks = ingest_rows(rows, &mut rejects, &mut stats).unwrap();

        assert_eq!(tracks.fix_count() + rejects.len(), 6);
        let reasons: Vec<_> = rejects.iter().map(|r| r.reason).collect();
        assert_eq!(
            reasons,
            vec![
                RejectReason::TooFewColumns,
                RejectReason::EmptyDeviceId,
                RejectReason::BadTimestamp,
            ]
        );
        let devices: Vec<_> = tracks.iter().map(|t| t.device_id.as_str()).collect();
        assert_eq!(devices, vec!["A", "B"]);
        assert_eq!(stats.fixes, 3);
        assert_eq!(stats.devices, 2);
        assert_eq!(stats.rejected_too_few_columns, 1);
    }

    struct FailingSink;

    impl RejectSink for FailingSink {
        fn report(&mut self, _reject: RejectRecord) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn test_sink_failure_aborts() {
        let rows = vec![
            row(&["A", "1.0", "2.0", "2025-08-14T12:00:00Z"]),
            row(&["B"]),
        ];
        let mut stats = RunStats::default();
        let result = ingest_rows(rows, &mut FailingSink, &mut stats);
        assert!(result.is_err());
    }
}
