//! Observing conditions and the derived parameter block.

use crate::refraction::RefractionCoefficients;
use crate::sidereal::local_sidereal_time;
use focalplate_core::constants::DEG_TO_RAD;

/// A geodetic observing site.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Site {
    /// East-positive longitude, radians.
    pub longitude: f64,
    /// Geodetic latitude, radians.
    pub latitude: f64,
    /// Height above sea level, metres.
    ///
    /// Carried for providers that model the atmosphere above the site.
    /// `SphericalAstrometry` takes pressure as measured at the site and
    /// does not read it.
    pub height_m: f64,
    /// Tropospheric lapse rate, K/m. Not read by `SphericalAstrometry`.
    pub temperature_lapse_rate: f64,
}

impl Site {
    /// The Anglo-Australian Telescope, Siding Spring.
    pub fn aat() -> Self {
        Self {
            longitude: (149.0 + 3.0 / 60.0 + 57.91 / 3600.0) * DEG_TO_RAD,
            latitude: -(31.0 + 16.0 / 60.0 + 37.34 / 3600.0) * DEG_TO_RAD,
            height_m: 1164.0,
            temperature_lapse_rate: 0.0065,
        }
    }

    pub fn from_degrees(longitude_deg: f64, latitude_deg: f64, height_m: f64) -> Self {
        Self {
            longitude: longitude_deg * DEG_TO_RAD,
            latitude: latitude_deg * DEG_TO_RAD,
            height_m,
            temperature_lapse_rate: 0.0065,
        }
    }
}

impl Default for Site {
    fn default() -> Self {
        Self::aat()
    }
}

/// Everything needed to build an [`ObservedParams`] block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservingConditions {
    /// UTC as a Modified Julian Date.
    pub mjd: f64,
    /// UT1 - UTC, seconds.
    pub dut: f64,
    pub site: Site,
    /// Ambient temperature, K.
    pub temperature_k: f64,
    /// Ambient pressure, mB.
    pub pressure_mb: f64,
    /// Relative humidity, 0-1.
    pub humidity: f64,
    /// Effective wavelength, micrometres.
    pub wavelength_um: f64,
}

/// Star-independent parameters for apparent <-> observed conversion.
///
/// The block splits into a slowly varying part (site, atmosphere, refraction
/// coefficients) and a time-dependent part (`mjd`, `local_sidereal_time`)
/// refreshed by [`refresh_for_time`].
///
/// [`refresh_for_time`]: crate::AstrometryProvider::refresh_for_time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservedParams {
    pub site: Site,
    pub dut: f64,
    pub temperature_k: f64,
    pub pressure_mb: f64,
    pub humidity: f64,
    pub wavelength_um: f64,
    pub refraction: RefractionCoefficients,
    pub mjd: f64,
    pub local_sidereal_time: f64,
}

impl ObservedParams {
    pub fn new(conditions: &ObservingConditions) -> Self {
        let mut params = Self {
            site: conditions.site,
            dut: conditions.dut,
            temperature_k: conditions.temperature_k,
            pressure_mb: conditions.pressure_mb,
            humidity: conditions.humidity,
            wavelength_um: conditions.wavelength_um,
            refraction: RefractionCoefficients::compute(
                conditions.pressure_mb,
                conditions.temperature_k,
                conditions.humidity,
                conditions.wavelength_um,
            ),
            mjd: conditions.mjd,
            local_sidereal_time: 0.0,
        };
        params.set_time(conditions.mjd);
        params
    }

    /// Recomputes the time-dependent part for a new UTC MJD.
    pub fn set_time(&mut self, mjd: f64) {
        self.mjd = mjd;
        self.local_sidereal_time = local_sidereal_time(mjd, self.dut, self.site.longitude);
    }

    /// A snapshot of this block with refraction switched off (pressure zero).
    pub fn without_refraction(&self) -> Self {
        Self {
            pressure_mb: 0.0,
            refraction: RefractionCoefficients::NONE,
            ..*self
        }
    }
}

/// Result of an apparent to observed conversion. All angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedPlace {
    /// Azimuth, north through east.
    pub azimuth: f64,
    /// Observed (refracted) zenith distance.
    pub zenith_distance: f64,
    /// Observed hour angle.
    pub hour_angle: f64,
    /// Observed declination.
    pub declination: f64,
    /// Observed right ascension.
    pub right_ascension: f64,
}
