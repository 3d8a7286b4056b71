//! Great-circle distance math for listing search.
//!
//! Pure spherical approximation; no datastore involvement. The store's
//! spatial predicate does the heavy filtering, this module computes the
//! per-result distances reported to clients.

use super::models::Location;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the distance between two coordinates in kilometers.
///
/// Uses the haversine formula. Deterministic, symmetric, and zero for equal
/// inputs (within floating-point epsilon).
pub fn distance_km(from: Location, to: Location) -> f64 {
    let dlat = (to.latitude() - from.latitude()).to_radians();
    let dlon = (to.longitude() - from.longitude()).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + from.latitude().to_radians().cos()
            * to.latitude().to_radians().cos()
            * (dlon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Whether `to` lies within `radius_km` of `from` (inclusive).
pub fn is_within_radius(from: Location, to: Location, radius_km: f64) -> bool {
    distance_km(from, to) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lon: f64) -> Location {
        Location::of(lat, lon).unwrap()
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let madrid = loc(40.4168, -3.7038);
        assert!(distance_km(madrid, madrid).abs() < 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = loc(40.4168, -3.7038);
        let b = loc(41.3874, 2.1686);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_quarter_great_circle() {
        // (0,0) to (0,90 deg) is a quarter of the equator
        let d = distance_km(loc(0.0, 0.0), loc(0.0, 90.0));
        assert!((d - 10_007.5).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_known_city_pair() {
        // Madrid to Barcelona, roughly 505 km
        let d = distance_km(loc(40.4168, -3.7038), loc(41.3874, 2.1686));
        assert!(d > 495.0 && d < 515.0, "got {}", d);
    }

    #[test]
    fn test_within_radius_is_inclusive() {
        let origin = loc(0.0, 0.0);
        let other = loc(0.0, 0.1);
        let exact = distance_km(origin, other);

        assert!(is_within_radius(origin, other, exact));
        assert!(is_within_radius(origin, other, exact + 0.001));
        assert!(!is_within_radius(origin, other, exact - 0.001));
    }
}
