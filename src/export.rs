//! GeoJSON assembly for computed trips.
//!
//! Each kept trip becomes a `LineString` feature carrying its rounded metrics
//! and simplestyle stroke attributes. Colours cycle through [`PALETTE`] in
//! global export order, while `trip_N` numbering stays per device.

use serde::Serialize;

use crate::trips::types::{Trip, TripMetrics};

/// Stroke colours, assigned round-robin across all exported trips.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const STROKE_WIDTH: u32 = 4;
pub const STROKE_OPACITY: f64 = 0.9;

/// Top-level GeoJSON document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub properties: TripProperties,
    pub geometry: LineString,
}

/// Line geometry with `[longitude, latitude]` vertices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripProperties {
    pub trip_id: String,
    pub device_id: String,
    pub point_count: usize,
    pub distance_km: f64,
    pub duration_min: f64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub stroke: &'static str,
    #[serde(rename = "stroke-width")]
    pub stroke_width: u32,
    #[serde(rename = "stroke-opacity")]
    pub stroke_opacity: f64,
}

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Palette entry for the trip exported at position `export_index` (0-based,
/// counted across all devices).
pub fn color_for(export_index: usize) -> &'static str {
    PALETTE[export_index % PALETTE.len()]
}

/// Builds the feature for one trip. `export_index` is the number of trips
/// already exported before this one, across all devices.
pub fn trip_feature(trip: &Trip<'_>, metrics: &TripMetrics, export_index: usize) -> Feature {
    let coordinates = trip
        .fixes
        .iter()
        .map(|fix| [fix.longitude, fix.latitude])
        .collect();

    Feature {
        kind: "Feature",
        properties: TripProperties {
            trip_id: trip.trip_id(),
            device_id: trip.device_id.to_string(),
            point_count: metrics.point_count,
            distance_km: round_to(metrics.total_distance_km, 3),
            duration_min: round_to(metrics.duration_min, 2),
            avg_speed_kmh: round_to(metrics.avg_speed_kmh, 2),
            max_speed_kmh: round_to(metrics.max_speed_kmh, 2),
            stroke: color_for(export_index),
            stroke_width: STROKE_WIDTH,
            stroke_opacity: STROKE_OPACITY,
        },
        geometry: LineString {
            kind: "LineString",
            coordinates,
        },
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self {
            kind: "FeatureCollection",
            features: Vec::new(),
        }
    }

    /// Appends a trip. The global export counter is the number of features
    /// already in the collection.
    pub fn push_trip(&mut self, trip: &Trip<'_>, metrics: &TripMetrics) {
        let export_index = self.features.len();
        self.features.push(trip_feature(trip, metrics, export_index));
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
