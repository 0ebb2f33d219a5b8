use serde::Serialize;

use crate::ingest::RejectReason;

/// Counters collected over one run, reported once at the end.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub rows_read: usize,
    pub header_skipped: bool,
    pub fixes: usize,
    pub devices: usize,

    // rejects by reason
    pub rejected_too_few_columns: usize,
    pub rejected_empty_device_id: usize,
    pub rejected_invalid_coordinates: usize,
    pub rejected_bad_timestamp: usize,

    // segmentation
    pub segments: usize,
    pub dropped_single_fix_segments: usize,
    pub trips_exported: usize,
}

impl RunStats {
    pub fn record_reject(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::TooFewColumns => self.rejected_too_few_columns += 1,
            RejectReason::EmptyDeviceId => self.rejected_empty_device_id += 1,
            RejectReason::InvalidCoordinates => self.rejected_invalid_coordinates += 1,
            RejectReason::BadTimestamp => self.rejected_bad_timestamp += 1,
        }
    }

    pub fn rejects(&self) -> usize {
        self.rejected_too_few_columns
            + self.rejected_empty_device_id
            + self.rejected_invalid_coordinates
            + self.rejected_bad_timestamp
    }

    /// Share of non-header rows that became fixes, in percent.
    pub fn acceptance_pct(&self) -> f64 {
        let data_rows = self.rows_read - usize::from(self.header_skipped);
        if data_rows == 0 {
            0.0
        } else {
            (self.fixes as f64 / data_rows as f64) * 100.0
        }
    }
}
