//! Gnomonic (tangent-plane) projection about an arbitrary centre.
//!
//! Coordinates are generic spherical (longitude, latitude) pairs, so the same
//! functions project RA/Dec and mount-frame (-HA, Dec) positions.

use crate::error::ProjectionError;
use focalplate_core::angle::wrap_0_2pi;

/// Denominator below which the projection is considered degenerate.
const TINY: f64 = 1e-6;

/// Projects `(lon, lat)` onto the plane tangent at `(centre_lon, centre_lat)`.
///
/// Returns the standard coordinates (xi, eta) in radians, or the geometric
/// reason the point has no usable projection.
pub fn project(
    lon: f64,
    lat: f64,
    centre_lon: f64,
    centre_lat: f64,
) -> Result<(f64, f64), ProjectionError> {
    let (sin_lat_z, cos_lat_z) = centre_lat.sin_cos();
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_dlon, cos_dlon) = (lon - centre_lon).sin_cos();

    let denom = sin_lat * sin_lat_z + cos_lat * cos_lat_z * cos_dlon;

    let status = if denom > TINY {
        0
    } else if denom >= 0.0 {
        1
    } else if denom > -TINY {
        2
    } else {
        3
    };
    if let Some(err) = ProjectionError::from_status(status) {
        return Err(err);
    }

    let xi = cos_lat * sin_dlon / denom;
    let eta = (sin_lat * cos_lat_z - cos_lat * sin_lat_z * cos_dlon) / denom;
    Ok((xi, eta))
}

/// Inverse of [`project`]; the returned longitude is in [0, 2pi).
pub fn deproject(xi: f64, eta: f64, centre_lon: f64, centre_lat: f64) -> (f64, f64) {
    let (sin_lat_z, cos_lat_z) = centre_lat.sin_cos();
    let denom = cos_lat_z - eta * sin_lat_z;
    let lon = wrap_0_2pi(xi.atan2(denom) + centre_lon);
    let lat = (sin_lat_z + eta * cos_lat_z).atan2((xi * xi + denom * denom).sqrt());
    (lon, lat)
}
