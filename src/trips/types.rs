//! Data types shared by ingestion, segmentation and export.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A validated GPS observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    /// Timestamp text as it appeared in the input.
    pub raw_timestamp: String,
}

impl Fix {
    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Fix) -> f64 {
        crate::geo::distance_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    /// Minutes elapsed from `self` to `other`.
    pub fn minutes_until(&self, other: &Fix) -> f64 {
        crate::geo::minutes_between(self.timestamp, other.timestamp)
    }
}

/// All fixes reported by one device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceTrack {
    pub device_id: String,
    pub fixes: Vec<Fix>,
}

impl DeviceTrack {
    /// Orders fixes by timestamp. The sort is stable, so fixes sharing a
    /// timestamp keep their ingestion order.
    pub fn sort_chronologically(&mut self) {
        self.fixes.sort_by_key(|fix| fix.timestamp);
    }
}

/// Device tracks keyed by device id, iterated in the order each device was
/// first seen.
#[derive(Debug, Default)]
pub struct DeviceTracks {
    index: HashMap<String, usize>,
    tracks: Vec<DeviceTrack>,
}

impl DeviceTracks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `fix` to its device's track, creating the track on first sight.
    pub fn push(&mut self, fix: Fix) {
        match self.index.get(&fix.device_id) {
            Some(&slot) => self.tracks[slot].fixes.push(fix),
            None => {
                self.index.insert(fix.device_id.clone(), self.tracks.len());
                self.tracks.push(DeviceTrack {
                    device_id: fix.device_id.clone(),
                    fixes: vec![fix],
                });
            }
        }
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceTrack> {
        self.index.get(device_id).map(|&slot| &self.tracks[slot])
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total fixes across all devices.
    pub fn fix_count(&self) -> usize {
        self.tracks.iter().map(|t| t.fixes.len()).sum()
    }

    pub fn sort_chronologically(&mut self) {
        for track in &mut self.tracks {
            track.sort_chronologically();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceTrack> {
        self.tracks.iter()
    }
}

/// A kept run of at least two fixes from one device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trip<'a> {
    pub device_id: &'a str,
    /// 1-based position among the device's kept trips.
    pub sequence: usize,
    pub fixes: &'a [Fix],
}

impl Trip<'_> {
    pub fn trip_id(&self) -> String {
        format!("trip_{}", self.sequence)
    }
}

/// Kinematic summary of one trip, at full precision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TripMetrics {
    pub total_distance_km: f64,
    pub duration_min: f64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub point_count: usize,
}
