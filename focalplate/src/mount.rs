//! Observed horizon coordinates to the telescope's own HA/Dec frame.
//!
//! The AAT polar axis is not exactly aligned with the celestial pole. The
//! mount frame is the equatorial frame of that physical axis: a horizon unit
//! vector (Wallace convention, `(cos El cos Az, -cos El sin Az, sin El)`) is
//! rotated by a fixed matrix built once from the site latitude and the two
//! misalignment angles, and read back as (-HA, Dec).

use crate::error::{Body, PlateError, PlateResult};
use focalplate_astrometry::{AstrometryProvider, ObservedParams};
use focalplate_core::constants::{ARCSEC_TO_RAD, DEG_TO_RAD, HALF_PI, PI, RAD_TO_DEG};
use focalplate_core::{
    cartesian_to_spherical, spherical_to_cartesian, wrap_0_2pi, RotationMatrix3,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Targets further than this from the zenith are rejected.
pub const ZENITH_DISTANCE_LIMIT_DEG: f64 = 70.0;

/// Polar-axis misalignment in arcseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MountMisalignment {
    /// Azimuth of the polar axis relative to the pole.
    pub azimuth_arcsec: f64,
    /// Elevation of the polar axis relative to the pole.
    pub elevation_arcsec: f64,
}

impl MountMisalignment {
    /// Measured AAT polar-axis misalignment.
    pub const AAT: Self = Self {
        azimuth_arcsec: -3.5,
        elevation_arcsec: 2.8,
    };

    /// A perfectly aligned mount.
    pub const NONE: Self = Self {
        azimuth_arcsec: 0.0,
        elevation_arcsec: 0.0,
    };
}

impl Default for MountMisalignment {
    fn default() -> Self {
        Self::AAT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountFrameRotator {
    matrix: RotationMatrix3,
    zd_limit: f64,
}

impl MountFrameRotator {
    pub fn new(latitude: f64, misalignment: MountMisalignment) -> Self {
        let phi = latitude + misalignment.elevation_arcsec * ARCSEC_TO_RAD;
        // Horizon -> (-HA, Dec) for a mount whose pole sits at elevation phi,
        // turned in azimuth by the azimuth misalignment.
        let mut matrix = RotationMatrix3::identity();
        matrix.rotate_z(misalignment.azimuth_arcsec * ARCSEC_TO_RAD);
        matrix.rotate_y(HALF_PI - phi);
        matrix.rotate_z(PI);

        Self {
            matrix,
            zd_limit: ZENITH_DISTANCE_LIMIT_DEG * DEG_TO_RAD,
        }
    }

    pub fn matrix(&self) -> &RotationMatrix3 {
        &self.matrix
    }

    /// Observed (Az, ZD) to mount (-HA, Dec).
    pub fn horizon_to_mount(&self, azimuth: f64, zd: f64) -> (f64, f64) {
        let horizon = spherical_to_cartesian(-azimuth, HALF_PI - zd);
        cartesian_to_spherical(self.matrix * horizon)
    }

    /// Mount (-HA, Dec) back to observed (Az, ZD), azimuth in [0, 2pi).
    pub fn from_mount_frame(&self, neg_ha: f64, dec: f64) -> (f64, f64) {
        let mount = spherical_to_cartesian(neg_ha, dec);
        let (lon, el) = cartesian_to_spherical(self.matrix.transpose() * mount);
        (wrap_0_2pi(-lon), HALF_PI - el)
    }

    /// Apparent (RA, Dec) to mount (-HA, Dec) for the conditions in `params`.
    ///
    /// Fails when the observed zenith distance exceeds the 70 degree limit.
    pub fn to_mount_frame<P: AstrometryProvider + ?Sized>(
        &self,
        provider: &P,
        body: Body,
        ra: f64,
        dec: f64,
        params: &ObservedParams,
    ) -> PlateResult<(f64, f64)> {
        let place = provider.apparent_to_observed(ra, dec, params);
        if place.zenith_distance > self.zd_limit {
            debug!(%body, zd_deg = place.zenith_distance * RAD_TO_DEG, "rejected: too low");
            return Err(PlateError::zenith_distance(
                body,
                ra,
                dec,
                params.mjd,
                place.zenith_distance * RAD_TO_DEG,
                ZENITH_DISTANCE_LIMIT_DEG,
            ));
        }
        Ok(self.horizon_to_mount(place.azimuth, place.zenith_distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use focalplate_astrometry::{ObservingConditions, Site, SphericalAstrometry};

    fn params() -> ObservedParams {
        let conditions = ObservingConditions {
            mjd: 59000.0,
            dut: 0.0,
            site: Site::aat(),
            temperature_k: 283.0,
            pressure_mb: 900.0,
            humidity: 0.3,
            wavelength_um: 0.55,
        };
        SphericalAstrometry::new()
            .build_observed_params(&conditions)
            .unwrap()
    }

    #[test]
    fn test_matrix_is_rotation() {
        let rotator = MountFrameRotator::new(Site::aat().latitude, MountMisalignment::AAT);
        assert!(rotator.matrix().is_rotation_matrix(1e-12));
    }

    #[test]
    fn test_aligned_mount_matches_observed_hour_angle() {
        let provider = SphericalAstrometry::new();
        let params = params();
        let rotator = MountFrameRotator::new(Site::aat().latitude, MountMisalignment::NONE);
        let ra = wrap_0_2pi(params.local_sidereal_time - 0.3);
        let dec = -0.6;

        let place = provider.apparent_to_observed(ra, dec, &params);
        let (neg_ha, mdec) = rotator
            .to_mount_frame(&provider, Body::Target, ra, dec, &params)
            .unwrap();
        assert_abs_diff_eq!(neg_ha, -place.hour_angle, epsilon = 1e-12);
        assert_abs_diff_eq!(mdec, place.declination, epsilon = 1e-12);
    }

    #[test]
    fn test_misalignment_is_a_few_arcseconds() {
        let latitude = Site::aat().latitude;
        let aligned = MountFrameRotator::new(latitude, MountMisalignment::NONE);
        let misaligned = MountFrameRotator::new(latitude, MountMisalignment::AAT);
        let (h0, d0) = aligned.horizon_to_mount(2.0, 0.5);
        let (h1, d1) = misaligned.horizon_to_mount(2.0, 0.5);
        let shift = focalplate_core::math::angular_separation(h0, d0, h1, d1) / ARCSEC_TO_RAD;
        assert!(shift > 0.5 && shift < 10.0, "shift = {shift} arcsec");
    }

    #[test]
    fn test_mount_round_trip() {
        let rotator = MountFrameRotator::new(Site::aat().latitude, MountMisalignment::AAT);
        for &(az, zd) in &[(0.3, 0.2), (3.5, 1.0), (5.9, 0.05)] {
            let (neg_ha, dec) = rotator.horizon_to_mount(az, zd);
            let (az2, zd2) = rotator.from_mount_frame(neg_ha, dec);
            assert_abs_diff_eq!(az2, az, epsilon = 1e-12);
            assert_abs_diff_eq!(zd2, zd, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zenith_maps_to_site_latitude() {
        let latitude = Site::aat().latitude;
        let rotator = MountFrameRotator::new(latitude, MountMisalignment::NONE);
        let (neg_ha, dec) = rotator.horizon_to_mount(0.0, 0.0);
        assert_abs_diff_eq!(neg_ha, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dec, latitude, epsilon = 1e-12);
    }

    #[test]
    fn test_low_target_rejected() {
        let provider = SphericalAstrometry::new();
        let params = params();
        let rotator = MountFrameRotator::new(Site::aat().latitude, MountMisalignment::AAT);
        let ra = wrap_0_2pi(params.local_sidereal_time + PI);
        let err = rotator
            .to_mount_frame(&provider, Body::FieldCentre, ra, 0.0, &params)
            .unwrap_err();
        assert!(matches!(
            err,
            PlateError::ZenithDistance {
                body: Body::FieldCentre,
                ..
            }
        ));
    }
}
