//! Reference [`AstrometryProvider`].
//!
//! Apparent -> observed is: hour angle from local sidereal time, rotation to
//! the horizon, refraction of the zenith distance, and back to HA/Dec/RA.
//! Diurnal aberration and polar motion are below the precision that matters at
//! the focal plate and are not modelled.

use crate::error::{AstrometryError, AstrometryResult};
use crate::horizon::{equatorial_to_horizon, horizon_to_equatorial};
use crate::params::{ObservedParams, ObservedPlace, ObservingConditions};
use crate::provider::AstrometryProvider;
use focalplate_core::angle::{wrap_0_2pi, wrap_pm_pi};
use focalplate_core::constants::HALF_PI;

#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalAstrometry;

impl SphericalAstrometry {
    pub fn new() -> Self {
        Self
    }
}

impl AstrometryProvider for SphericalAstrometry {
    fn build_observed_params(
        &self,
        conditions: &ObservingConditions,
    ) -> AstrometryResult<ObservedParams> {
        let checks = [
            ("mjd", conditions.mjd),
            ("dut", conditions.dut),
            ("temperature", conditions.temperature_k),
            ("pressure", conditions.pressure_mb),
            ("humidity", conditions.humidity),
            ("wavelength", conditions.wavelength_um),
            ("latitude", conditions.site.latitude),
            ("longitude", conditions.site.longitude),
        ];
        for (name, value) in checks {
            if !value.is_finite() {
                return Err(AstrometryError::invalid_conditions(format!(
                    "{name} is not finite"
                )));
            }
        }
        if conditions.wavelength_um <= 0.0 {
            return Err(AstrometryError::invalid_conditions(format!(
                "wavelength {} um must be positive",
                conditions.wavelength_um
            )));
        }
        if conditions.temperature_k <= 0.0 {
            return Err(AstrometryError::invalid_conditions(format!(
                "temperature {} K must be positive",
                conditions.temperature_k
            )));
        }

        Ok(ObservedParams::new(conditions))
    }

    fn refresh_for_time(&self, params: &mut ObservedParams, mjd: f64) {
        params.set_time(mjd);
    }

    fn apparent_to_observed(&self, ra: f64, dec: f64, params: &ObservedParams) -> ObservedPlace {
        let latitude = params.site.latitude;
        let ha = wrap_pm_pi(params.local_sidereal_time - ra);

        let (azimuth, elevation) = equatorial_to_horizon(ha, dec, latitude);
        let zd = params.refraction.refract(HALF_PI - elevation);

        let (ha_obs, dec_obs) = horizon_to_equatorial(azimuth, HALF_PI - zd, latitude);
        ObservedPlace {
            azimuth,
            zenith_distance: zd,
            hour_angle: ha_obs,
            declination: dec_obs,
            right_ascension: wrap_0_2pi(params.local_sidereal_time - ha_obs),
        }
    }

    fn observed_to_apparent(&self, azimuth: f64, zd: f64, params: &ObservedParams) -> (f64, f64) {
        let zd_vacuum = params.refraction.unrefract(zd);
        let (ha, dec) = horizon_to_equatorial(azimuth, HALF_PI - zd_vacuum, params.site.latitude);
        (wrap_0_2pi(params.local_sidereal_time - ha), dec)
    }
}
