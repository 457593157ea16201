//! Great-circle distance helpers for attendance range checks.

/// Mean Earth radius in meters (IUGG value).
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Computes the haversine distance in meters between two latitude/longitude
/// points given in decimal degrees.
///
/// Used as the proxy for physical proximity between a student's reported
/// position and the faculty anchor point of an attendance session.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}
