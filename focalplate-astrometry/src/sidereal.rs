//! Greenwich and local sidereal time from an MJD.
//!
//! GMST is the Earth rotation angle plus the IAU 2006 polynomial. TT is taken
//! as UTC + 69.184 s, which is adequate for the polynomial term; the equation
//! of the equinoxes is neglected.

use focalplate_core::angle::wrap_0_2pi;
use focalplate_core::constants::{
    ARCSEC_TO_RAD, DAYS_PER_JULIAN_CENTURY, J2000_MJD, SECONDS_PER_DAY_F64, TWOPI,
};
use focalplate_core::math::fmod;

const TT_MINUS_UTC_SECONDS: f64 = 69.184;

/// Earth rotation angle for a UT1 MJD.
pub fn earth_rotation_angle(mjd_ut1: f64) -> f64 {
    let d = mjd_ut1 - J2000_MJD;
    let f = fmod(d, 1.0);
    wrap_0_2pi(TWOPI * (f + 0.7790572732640 + 0.00273781191135448 * d))
}

/// Greenwich mean sidereal time for a UTC MJD and UT1-UTC in seconds.
pub fn gmst(mjd_utc: f64, dut_seconds: f64) -> f64 {
    let mjd_ut1 = mjd_utc + dut_seconds / SECONDS_PER_DAY_F64;
    let mjd_tt = mjd_utc + TT_MINUS_UTC_SECONDS / SECONDS_PER_DAY_F64;
    let t = (mjd_tt - J2000_MJD) / DAYS_PER_JULIAN_CENTURY;

    let polynomial_arcsec = 0.014506
        + t * (4612.156534
            + t * (1.3915817 + t * (-0.00000044 + t * (-0.000029956 + t * (-0.0000000368)))));

    wrap_0_2pi(earth_rotation_angle(mjd_ut1) + polynomial_arcsec * ARCSEC_TO_RAD)
}

/// Local sidereal time for an east-positive longitude in radians.
pub fn local_sidereal_time(mjd_utc: f64, dut_seconds: f64, longitude: f64) -> f64 {
    wrap_0_2pi(gmst(mjd_utc, dut_seconds) + longitude)
}
