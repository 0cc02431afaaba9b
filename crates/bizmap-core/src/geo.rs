//! Great-circle distance and coordinate equality primitives.

use crate::types::Coordinates;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres (haversine).
///
/// Inputs are assumed finite; [`Coordinates::new`] guarantees that for
/// every value built through it.
#[must_use]
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push `h` a hair past 1.0 for antipodal points.
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Exact field equality, no tolerance.
///
/// Used for skip-if-unchanged checks, not for geographic proximity.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn coordinates_equal(a: Coordinates, b: Coordinates) -> bool {
    a.latitude == b.latitude && a.longitude == b.longitude
}
