//! Great-circle distance, time deltas and speed derivation.

use chrono::{DateTime, Utc};

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance in kilometres between two coordinates given in degrees.
///
/// Inputs are assumed to be range-checked already.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // a can round slightly above 1.0 near the antipode
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Signed difference `t2 - t1` in minutes. Negative when `t2` precedes `t1`.
pub fn minutes_between(t1: DateTime<Utc>, t2: DateTime<Utc>) -> f64 {
    (t2 - t1).num_milliseconds() as f64 / 60_000.0
}

/// Speed in km/h. Returns 0.0 for a non-positive duration.
pub fn speed_kmh(distance_km: f64, duration_min: f64) -> f64 {
    if duration_min > 0.0 {
        distance_km / (duration_min / 60.0)
    } else {
        0.0
    }
}
