//! Spherical/Cartesian conversion for unit vectors.
//!
//! Longitude is measured from +X toward +Y and latitude from the XY plane, so
//! the same pair of functions serves RA/Dec, (-HA)/Dec and (-Az)/El.

#[inline]
pub fn spherical_to_cartesian(lon: f64, lat: f64) -> [f64; 3] {
    let (sin_lon, cos_lon) = lon.sin_cos();
    let (sin_lat, cos_lat) = lat.sin_cos();
    [cos_lon * cos_lat, sin_lon * cos_lat, sin_lat]
}

/// Converts a Cartesian vector of any length to (longitude, latitude), with the
/// longitude in (-pi, +pi]. The null vector maps to (0, 0).
#[inline]
pub fn cartesian_to_spherical(v: [f64; 3]) -> (f64, f64) {
    let r = (v[0] * v[0] + v[1] * v[1]).sqrt();
    let lon = if r == 0.0 { 0.0 } else { v[1].atan2(v[0]) };
    let lat = if v[2] == 0.0 { 0.0 } else { v[2].atan2(r) };
    (lon, lat)
}
