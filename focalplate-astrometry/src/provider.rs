use crate::error::{AstrometryResult, ProjectionError};
use crate::params::{ObservedParams, ObservedPlace, ObservingConditions};
use crate::tangent;
use focalplate_core::math::angular_separation;

/// Spherical-astronomy capability consumed by the plate transforms.
///
/// The plate engine never computes refraction, sidereal time or projections
/// itself; it asks a provider. Geometry that does not depend on the
/// atmosphere has default implementations.
pub trait AstrometryProvider {
    /// Builds the star-independent parameter block for the given conditions.
    fn build_observed_params(
        &self,
        conditions: &ObservingConditions,
    ) -> AstrometryResult<ObservedParams>;

    /// Updates only the time-dependent part of `params`.
    fn refresh_for_time(&self, params: &mut ObservedParams, mjd: f64);

    /// Apparent geocentric (RA, Dec) to observed place.
    fn apparent_to_observed(&self, ra: f64, dec: f64, params: &ObservedParams) -> ObservedPlace;

    /// Observed (azimuth, zenith distance) to apparent (RA, Dec).
    fn observed_to_apparent(&self, azimuth: f64, zd: f64, params: &ObservedParams) -> (f64, f64);

    fn tangent_project(
        &self,
        lon: f64,
        lat: f64,
        centre_lon: f64,
        centre_lat: f64,
    ) -> Result<(f64, f64), ProjectionError> {
        tangent::project(lon, lat, centre_lon, centre_lat)
    }

    fn tangent_deproject(&self, xi: f64, eta: f64, centre_lon: f64, centre_lat: f64) -> (f64, f64) {
        tangent::deproject(xi, eta, centre_lon, centre_lat)
    }

    fn angular_separation(&self, ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
        angular_separation(ra1, dec1, ra2, dec2)
    }
}

impl<P: AstrometryProvider + ?Sized> AstrometryProvider for &P {
    fn build_observed_params(
        &self,
        conditions: &ObservingConditions,
    ) -> AstrometryResult<ObservedParams> {
        (**self).build_observed_params(conditions)
    }

    fn refresh_for_time(&self, params: &mut ObservedParams, mjd: f64) {
        (**self).refresh_for_time(params, mjd)
    }

    fn apparent_to_observed(&self, ra: f64, dec: f64, params: &ObservedParams) -> ObservedPlace {
        (**self).apparent_to_observed(ra, dec, params)
    }

    fn observed_to_apparent(&self, azimuth: f64, zd: f64, params: &ObservedParams) -> (f64, f64) {
        (**self).observed_to_apparent(azimuth, zd, params)
    }

    fn tangent_project(
        &self,
        lon: f64,
        lat: f64,
        centre_lon: f64,
        centre_lat: f64,
    ) -> Result<(f64, f64), ProjectionError> {
        (**self).tangent_project(lon, lat, centre_lon, centre_lat)
    }

    fn tangent_deproject(&self, xi: f64, eta: f64, centre_lon: f64, centre_lat: f64) -> (f64, f64) {
        (**self).tangent_deproject(xi, eta, centre_lon, centre_lat)
    }

    fn angular_separation(&self, ra1: f64, dec1: f64, ra2: f64, dec2: f64) -> f64 {
        (**self).angular_separation(ra1, dec1, ra2, dec2)
    }
}
