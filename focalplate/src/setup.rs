//! Per-field observing set-up and its validation.

use crate::error::{PlateError, PlateResult};
use focalplate_astrometry::{ObservingConditions, Site};
use focalplate_core::constants::{PI, TWOPI};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_TEMPERATURE_K: f64 = 230.0;
pub const MAX_TEMPERATURE_K: f64 = 320.0;
pub const MIN_PRESSURE_MB: f64 = 500.0;
pub const MAX_PRESSURE_MB: f64 = 1100.0;
pub const MIN_HUMIDITY: f64 = 0.0;
pub const MAX_HUMIDITY: f64 = 1.0;
pub const MIN_WAVELENGTH_UM: f64 = 0.3;
pub const MAX_WAVELENGTH_UM: f64 = 1.2;

/// Humidity used in place of an exact 0.0 reading.
pub const DRY_HUMIDITY_SUBSTITUTE: f64 = 0.1;

fn in_range(value: f64, min: f64, max: f64) -> bool {
    (min..=max).contains(&value)
}

pub fn validate_wavelength(wavelength_um: f64) -> PlateResult<()> {
    if in_range(wavelength_um, MIN_WAVELENGTH_UM, MAX_WAVELENGTH_UM) {
        Ok(())
    } else {
        Err(PlateError::IllegalWavelength {
            value: wavelength_um,
            min: MIN_WAVELENGTH_UM,
            max: MAX_WAVELENGTH_UM,
        })
    }
}

/// Checks a field centre and an optional target against the RA/Dec domains.
pub fn validate_positions(
    centre_ra: f64,
    centre_dec: f64,
    target: Option<(f64, f64)>,
) -> PlateResult<()> {
    let ra_ok = |ra: f64| (0.0..TWOPI).contains(&ra);
    let dec_ok = |dec: f64| (-PI..=PI).contains(&dec);

    if !ra_ok(centre_ra) || target.map_or(false, |(ra, _)| !ra_ok(ra)) {
        return Err(PlateError::illegal_ra(centre_ra, centre_dec, target));
    }
    if !dec_ok(centre_dec) || target.map_or(false, |(_, dec)| !dec_ok(dec)) {
        return Err(PlateError::illegal_dec(centre_ra, centre_dec, target));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereParams {
    pub temperature_k: f64,
    pub pressure_mb: f64,
    /// Relative humidity, 0-1.
    pub humidity: f64,
}

impl AtmosphereParams {
    /// Range-checks every field. An exact 0.0 humidity becomes
    /// [`DRY_HUMIDITY_SUBSTITUTE`].
    pub fn validated(&self) -> PlateResult<Self> {
        if !in_range(self.temperature_k, MIN_TEMPERATURE_K, MAX_TEMPERATURE_K) {
            return Err(PlateError::IllegalTemperature {
                value: self.temperature_k,
                min: MIN_TEMPERATURE_K,
                max: MAX_TEMPERATURE_K,
            });
        }
        if !in_range(self.pressure_mb, MIN_PRESSURE_MB, MAX_PRESSURE_MB) {
            return Err(PlateError::IllegalPressure {
                value: self.pressure_mb,
                min: MIN_PRESSURE_MB,
                max: MAX_PRESSURE_MB,
            });
        }
        if !in_range(self.humidity, MIN_HUMIDITY, MAX_HUMIDITY) {
            return Err(PlateError::IllegalHumidity {
                value: self.humidity,
                min: MIN_HUMIDITY,
                max: MAX_HUMIDITY,
            });
        }

        let mut checked = *self;
        if checked.humidity == 0.0 {
            debug!(
                substitute = DRY_HUMIDITY_SUBSTITUTE,
                "humidity 0.0 replaced for refraction"
            );
            checked.humidity = DRY_HUMIDITY_SUBSTITUTE;
        }
        Ok(checked)
    }
}

/// Everything fixed for one field: time, centre, wavelengths, atmosphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSetup {
    /// UTC, Modified Julian Date.
    pub mjd: f64,
    /// UT1 - UTC, seconds.
    #[serde(default)]
    pub dut: f64,
    pub centre_ra: f64,
    pub centre_dec: f64,
    /// Wavelength the telescope is pointed at, micrometres.
    pub pointing_wavelength_um: f64,
    /// Wavelength the targets are observed at, micrometres.
    pub observing_wavelength_um: f64,
    pub atmosphere: AtmosphereParams,
}

impl FieldSetup {
    /// Validates every field, returning the set-up with humidity substitution
    /// applied.
    pub fn validated(&self) -> PlateResult<Self> {
        validate_positions(self.centre_ra, self.centre_dec, None)?;
        validate_wavelength(self.pointing_wavelength_um)?;
        validate_wavelength(self.observing_wavelength_um)?;
        Ok(Self {
            atmosphere: self.atmosphere.validated()?,
            ..*self
        })
    }

    pub fn conditions(&self, site: Site, wavelength_um: f64) -> ObservingConditions {
        ObservingConditions {
            mjd: self.mjd,
            dut: self.dut,
            site,
            temperature_k: self.atmosphere.temperature_k,
            pressure_mb: self.atmosphere.pressure_mb,
            humidity: self.atmosphere.humidity,
            wavelength_um,
        }
    }
}
