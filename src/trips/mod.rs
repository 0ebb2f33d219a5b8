//! Per-device trip reconstruction.
//!
//! Sorted device tracks are cut into trips by [`segment`], and each kept
//! trip is summarised by [`metrics`].

pub mod metrics;
pub mod segment;
pub mod types;

pub use segment::{SplitRule, segment_track};
pub use types::{DeviceTrack, DeviceTracks, Fix, Trip, TripMetrics};
