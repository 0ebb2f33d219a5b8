use crate::geo::speed_kmh;
use crate::trips::types::{Fix, TripMetrics};

impl TripMetrics {
    /// Computes distance, duration and speeds for an ordered run of fixes.
    ///
    /// Distance is the sum of consecutive segment lengths, not the net
    /// displacement. Segments with a non-positive duration take no part in
    /// the maximum speed. Values are kept at full precision; rounding is the
    /// exporter's job.
    pub fn from_fixes(fixes: &[Fix]) -> Self {
        let (Some(first), Some(last)) = (fixes.first(), fixes.last()) else {
            return Self::default();
        };

        let duration_min = first.minutes_until(last).max(0.0);

        let mut total_distance_km = 0.0;
        let mut max_speed_kmh: Option<f64> = None;

        for pair in fixes.windows(2) {
            let segment_km = pair[0].distance_km(&pair[1]);
            let segment_min = pair[0].minutes_until(&pair[1]);
            total_distance_km += segment_km;

            if segment_min > 0.0 {
                let speed = speed_kmh(segment_km, segment_min);
                max_speed_kmh = Some(max_speed_kmh.map_or(speed, |m| m.max(speed)));
            }
        }

        TripMetrics {
            total_distance_km,
            duration_min,
            avg_speed_kmh: speed_kmh(total_distance_km, duration_min),
            max_speed_kmh: max_speed_kmh.unwrap_or(0.0),
            point_count: fixes.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{EARTH_RADIUS_KM, distance_km};
    use chrono::{Duration, TimeZone, Utc};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn fix_at(seconds: i64, lat: f64, lon: f64) -> Fix {
        let timestamp = Utc.with_ymd_and_hms(2025, 8, 14, 12, 0, 0).unwrap()
            + Duration::seconds(seconds);
        Fix {
            device_id: "A".to_string(),
            latitude: lat,
            longitude: lon,
            timestamp,
            raw_timestamp: timestamp.to_rfc3339(),
        }
    }

    fn lon_for_km(km: f64) -> f64 {
        (km / EARTH_RADIUS_KM).to_degrees()
    }

    #[test]
    fn test_straight_line_metrics() {
        // 1 km per 5 minutes, twice: 2 km in 10 min
        let fixes = vec![
            fix_at(0, 0.0, 0.0),
            fix_at(300, 0.0, lon_for_km(1.0)),
            fix_at(600, 0.0, lon_for_km(2.0)),
        ];
        let m = TripMetrics::from_fixes(&fixes);

        assert_eq!(m.point_count, 3);
        assert!(approx_eq(m.total_distance_km, 2.0, 1e-9));
        assert!(approx_eq(m.duration_min, 10.0, 1e-12));
        assert!(approx_eq(m.avg_speed_kmh, 12.0, 1e-6));
        assert!(approx_eq(m.max_speed_kmh, 12.0, 1e-6));
    }

    #[test]
    fn test_round_trip_distance_is_path_length() {
        let fixes = vec![
            fix_at(0, 0.0, 0.0),
            fix_at(60, 0.0, 0.01),
            fix_at(120, 0.0, 0.0),
        ];
        let m = TripMetrics::from_fixes(&fixes);
        let leg = distance_km(0.0, 0.0, 0.0, 0.01);

        assert_eq!(distance_km(0.0, 0.0, 0.0, 0.0), 0.0);
        assert!(m.total_distance_km > 0.0);
        assert!(approx_eq(m.total_distance_km, 2.0 * leg, 1e-12));
    }

    #[test]
    fn test_zero_duration_trip_has_zero_speeds() {
        let fixes = vec![fix_at(0, 0.0, 0.0), fix_at(0, 0.0, 0.01)];
        let m = TripMetrics::from_fixes(&fixes);

        assert_eq!(m.duration_min, 0.0);
        assert_eq!(m.avg_speed_kmh, 0.0);
        assert_eq!(m.max_speed_kmh, 0.0);
        assert!(m.total_distance_km > 0.0);
    }

    #[test]
    fn test_zero_duration_segment_excluded_from_max() {
        // the duplicate-timestamp jump would be infinitely fast if counted
        let fixes = vec![
            fix_at(0, 0.0, 0.0),
            fix_at(600, 0.0, lon_for_km(1.0)),
            fix_at(600, 0.0, lon_for_km(1.5)),
            fix_at(1200, 0.0, lon_for_km(2.0)),
        ];
        let m = TripMetrics::from_fixes(&fixes);

        assert!(approx_eq(m.max_speed_kmh, 6.0, 1e-6));
        assert!(approx_eq(m.total_distance_km, 2.0, 1e-9));
        assert!(approx_eq(m.avg_speed_kmh, 6.0, 1e-6));
    }

    #[test]
    fn test_max_speed_picks_fastest_segment() {
        let fixes = vec![
            fix_at(0, 0.0, 0.0),
            fix_at(60, 0.0, lon_for_km(1.0)),
            fix_at(660, 0.0, lon_for_km(1.5)),
        ];
        let m = TripMetrics::from_fixes(&fixes);
        assert!(approx_eq(m.max_speed_kmh, 60.0, 1e-6));
    }

    #[test]
    fn test_empty_input_yields_default() {
        assert_eq!(TripMetrics::from_fixes(&[]), TripMetrics::default());
    }
}
