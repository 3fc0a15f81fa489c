//! Horizon <-> equatorial conversion.
//!
//! Azimuth is measured from north through east; hour angle is positive west.

use focalplate_core::constants::TWOPI;

/// Hour angle and declination to (azimuth, elevation).
pub fn equatorial_to_horizon(ha: f64, dec: f64, latitude: f64) -> (f64, f64) {
    let (sin_ha, cos_ha) = ha.sin_cos();
    let (sin_dec, cos_dec) = dec.sin_cos();
    let (sin_lat, cos_lat) = latitude.sin_cos();

    let x = -cos_ha * cos_dec * sin_lat + sin_dec * cos_lat;
    let y = -sin_ha * cos_dec;
    let z = cos_ha * cos_dec * cos_lat + sin_dec * sin_lat;

    let r = (x * x + y * y).sqrt();
    let raw_azimuth = if r != 0.0 { y.atan2(x) } else { 0.0 };
    let azimuth = if raw_azimuth < 0.0 {
        raw_azimuth + TWOPI
    } else {
        raw_azimuth
    };
    let elevation = z.atan2(r);

    (azimuth, elevation)
}

/// Azimuth and elevation to (hour angle, declination).
pub fn horizon_to_equatorial(azimuth: f64, elevation: f64, latitude: f64) -> (f64, f64) {
    let (sin_az, cos_az) = azimuth.sin_cos();
    let (sin_el, cos_el) = elevation.sin_cos();
    let (sin_lat, cos_lat) = latitude.sin_cos();

    let x = -cos_az * cos_el * sin_lat + sin_el * cos_lat;
    let y = -sin_az * cos_el;
    let z = cos_az * cos_el * cos_lat + sin_el * sin_lat;

    let r = (x * x + y * y).sqrt();
    let ha = if r != 0.0 { y.atan2(x) } else { 0.0 };
    let dec = z.atan2(r);

    (ha, dec)
}
