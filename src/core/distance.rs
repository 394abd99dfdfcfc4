use crate::domain::model::Location;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points, by the haversine formula.
///
/// Identical points yield exactly `0.0`.
pub fn haversine_meters(from: &Location, to: &Location) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can push `a` just past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(latitude: f64, longitude: f64) -> Location {
        Location {
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_identical_points_are_zero() {
        let seattle = loc(47.6062, -122.3321);
        assert_eq!(haversine_meters(&seattle, &seattle), 0.0);
        assert_eq!(haversine_meters(&loc(90.0, 0.0), &loc(90.0, 0.0)), 0.0);
    }

    #[test]
    fn test_downtown_to_space_needle() {
        // roughly 2 km across downtown Seattle
        let d = haversine_meters(&loc(47.6062, -122.3321), &loc(47.6205, -122.3493));
        assert!((d - 2_047.0).abs() < 10.0, "got {}", d);
    }

    #[test]
    fn test_symmetric() {
        let a = loc(47.6062, -122.3321);
        let b = loc(45.5152, -122.6784);
        assert!((haversine_meters(&a, &b) - haversine_meters(&b, &a)).abs() < 1e-6);
    }

    #[test]
    fn test_seattle_to_portland() {
        let d = haversine_meters(&loc(47.6062, -122.3321), &loc(45.5152, -122.6784));
        assert!((d - 234_000.0).abs() < 1_000.0, "got {}", d);
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let d = haversine_meters(&loc(0.0, 0.0), &loc(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1.0);
    }
}
