//! GeoDistance - Great-circle distance and distance proximity

use crate::domain::GeoPoint;

/// Mean Earth radius (IUGG) in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Haversine distance between two points, in meters
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    let d_lat = lat_b - lat_a;
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h marginally above 1 for antipodal points
    let central_angle = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_METERS * central_angle
}

/// Map a distance onto (0, 1]: 1 at zero distance, 0.5 at `scale_meters`
pub fn proximity_score(distance_meters: f64, scale_meters: f64) -> f64 {
    1.0 / (1.0 + distance_meters.max(0.0) / scale_meters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let p = GeoPoint::new(59.437, 24.7536).unwrap();
        assert_eq!(haversine_meters(p, p), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // Tallinn -> Tartu, roughly 164 km
        let tallinn = GeoPoint::new(59.437, 24.7536).unwrap();
        let tartu = GeoPoint::new(58.378, 26.729).unwrap();
        let d = haversine_meters(tallinn, tartu);
        assert!((d - 164_000.0).abs() < 3_000.0, "got {}", d);
    }

    #[test]
    fn test_symmetric() {
        let a = GeoPoint::new(10.0, 20.0).unwrap();
        let b = GeoPoint::new(-33.0, 151.0).unwrap();
        assert_eq!(haversine_meters(a, b), haversine_meters(b, a));
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let d = haversine_meters(
            GeoPoint::new(0.0, 0.0).unwrap(),
            GeoPoint::new(0.0, 180.0).unwrap(),
        );
        let half = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((d - half).abs() < 1.0);
    }

    #[test]
    fn test_proximity_decreases() {
        assert_eq!(proximity_score(0.0, 10_000.0), 1.0);
        assert_eq!(proximity_score(10_000.0, 10_000.0), 0.5);
        assert!(proximity_score(1_000.0, 10_000.0) > proximity_score(5_000.0, 10_000.0));
    }
}
