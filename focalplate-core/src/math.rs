#[inline]
pub fn fmod(x: f64, y: f64) -> f64 {
    libm::fmod(x, y)
}

/// Great-circle separation from the Vincenty formula.
///
/// Stable at all separations, including the near-zero separations that dominate
/// field-centre to fibre distances.
#[inline]
pub fn vincenty_angular_separation(
    sin_lat1: f64,
    cos_lat1: f64,
    sin_lat2: f64,
    cos_lat2: f64,
    delta_lon: f64,
) -> f64 {
    let (sin_delta_lon, cos_delta_lon) = libm::sincos(delta_lon);

    let num = libm::sqrt(
        (cos_lat2 * sin_delta_lon).powi(2)
            + (cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_delta_lon).powi(2),
    );
    let den = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_delta_lon;

    libm::atan2(num, den)
}

/// Angular separation of two points given as (longitude, latitude) in radians.
#[inline]
pub fn angular_separation(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (sin_lat1, cos_lat1) = libm::sincos(lat1);
    let (sin_lat2, cos_lat2) = libm::sincos(lat2);
    vincenty_angular_separation(sin_lat1, cos_lat1, sin_lat2, cos_lat2, lon2 - lon1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HALF_PI, PI};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fmod_keeps_sign_of_dividend() {
        assert_eq!(fmod(7.0, 3.0), 1.0);
        assert_eq!(fmod(-7.0, 3.0), -1.0);
    }

    #[test]
    fn test_separation_pole_to_equator() {
        assert_abs_diff_eq!(angular_separation(0.0, HALF_PI, 1.0, 0.0), HALF_PI, epsilon = 1e-15);
    }

    #[test]
    fn test_separation_antipodal() {
        assert_abs_diff_eq!(angular_separation(0.0, 0.0, PI, 0.0), PI, epsilon = 1e-15);
    }

    #[test]
    fn test_separation_small_angle() {
        let d = 1e-7;
        let sep = angular_separation(1.0, -0.5, 1.0, -0.5 + d);
        assert_abs_diff_eq!(sep, d, epsilon = 1e-15);
    }
}
