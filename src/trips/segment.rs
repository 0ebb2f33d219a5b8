//! Splits a device's sorted track into trips at time gaps and distance jumps.

use tracing::debug;

use crate::trips::types::{DeviceTrack, Fix, Trip};

/// Default maximum gap between consecutive fixes before a trip ends.
pub const DEFAULT_MAX_GAP_MIN: f64 = 25.0;
/// Default maximum jump between consecutive fixes before a trip ends.
pub const DEFAULT_MAX_JUMP_KM: f64 = 2.0;

/// Thresholds of the split predicate. Both comparisons are strict: a gap or
/// jump exactly at the threshold keeps the trip together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRule {
    pub max_gap_min: f64,
    pub max_jump_km: f64,
}

impl Default for SplitRule {
    fn default() -> Self {
        Self {
            max_gap_min: DEFAULT_MAX_GAP_MIN,
            max_jump_km: DEFAULT_MAX_JUMP_KM,
        }
    }
}

impl SplitRule {
    /// True when a segment with this gap and jump ends the current trip.
    pub fn splits(&self, gap_min: f64, jump_km: f64) -> bool {
        gap_min > self.max_gap_min || jump_km > self.max_jump_km
    }

    /// Applies [`SplitRule::splits`] to two consecutive fixes.
    pub fn splits_between(&self, prev: &Fix, next: &Fix) -> bool {
        self.splits(prev.minutes_until(next), prev.distance_km(next))
    }
}

/// Cuts a chronologically sorted slice into maximal runs with no split
/// between neighbours. Every fix lands in exactly one run, and runs of a
/// single fix are kept here.
pub fn split_buffers<'a>(fixes: &'a [Fix], rule: &SplitRule) -> Vec<&'a [Fix]> {
    let mut buffers = Vec::new();
    if fixes.is_empty() {
        return buffers;
    }

    let mut start = 0;
    for (i, pair) in fixes.windows(2).enumerate() {
        if rule.splits_between(&pair[0], &pair[1]) {
            buffers.push(&fixes[start..=i]);
            start = i + 1;
        }
    }
    buffers.push(&fixes[start..]);

    buffers
}

/// Drops runs shorter than two fixes and numbers the rest from 1, in order.
pub fn keep_trips<'a>(device_id: &'a str, buffers: &[&'a [Fix]]) -> Vec<Trip<'a>> {
    let mut trips = Vec::new();

    for &buffer in buffers {
        if buffer.len() < 2 {
            debug!(
                device_id,
                timestamp = ?buffer.first().map(|f| f.raw_timestamp.as_str()),
                "Dropping single-fix segment"
            );
            continue;
        }

        trips.push(Trip {
            device_id,
            sequence: trips.len() + 1,
            fixes: buffer,
        });
    }

    trips
}

/// Segments one sorted device track into its exportable trips.
pub fn segment_track<'a>(track: &'a DeviceTrack, rule: &SplitRule) -> Vec<Trip<'a>> {
    let buffers = split_buffers(&track.fixes, rule);
    keep_trips(&track.device_id, &buffers)
}
