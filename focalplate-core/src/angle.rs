//! Angle wrapping and sexagesimal rendering.
//!
//! | Quantity | Range | Function |
//! |----------|-------|----------|
//! | Right Ascension | [0, 2pi) | [`wrap_0_2pi`] |
//! | Hour Angle | [-pi, +pi) | [`wrap_pm_pi`] |
//!
//! The rendering helpers exist for diagnostics: feasibility failures carry the
//! offending position as `HHh MMm SS.SSs` / `+DDd MM' SS.S"` so that a rejected
//! target can be identified without re-running the transform.

use crate::constants::{PI, RAD_TO_DEG, TWOPI};
use crate::math::fmod;

/// Wraps an angle in radians into [0, 2pi).
#[inline]
pub fn wrap_0_2pi(angle: f64) -> f64 {
    let w = fmod(angle, TWOPI);
    if w < 0.0 {
        w + TWOPI
    } else {
        w
    }
}

/// Wraps an angle in radians into [-pi, +pi).
#[inline]
pub fn wrap_pm_pi(angle: f64) -> f64 {
    let w = fmod(angle, TWOPI);
    if w >= PI {
        w - TWOPI
    } else if w < -PI {
        w + TWOPI
    } else {
        w
    }
}

/// Splits a non-negative value into (whole, minutes, seconds) with the seconds
/// rounded to `decimals` places and carried upward when they round to 60.
fn sexagesimal(value: f64, decimals: usize) -> (u32, u32, f64) {
    let scale = 10f64.powi(decimals as i32);
    let total = (value * 3600.0 * scale).round() / scale;
    let mut whole = (total / 3600.0).floor();
    let mut minutes = ((total - whole * 3600.0) / 60.0).floor();
    let mut seconds = total - whole * 3600.0 - minutes * 60.0;
    if seconds >= 60.0 {
        seconds -= 60.0;
        minutes += 1.0;
    }
    if minutes >= 60.0 {
        minutes -= 60.0;
        whole += 1.0;
    }
    (whole as u32, minutes as u32, seconds.max(0.0))
}

/// Renders a right ascension in radians as `HHh MMm SS.SSs`.
pub fn format_ra(ra: f64) -> String {
    if !ra.is_finite() {
        return format!("{ra}");
    }
    let hours = wrap_0_2pi(ra) * RAD_TO_DEG / 15.0;
    let (h, m, s) = sexagesimal(hours, 2);
    format!("{:02}h {:02}m {:05.2}s", h % 24, m, s)
}

/// Renders a declination in radians as `+DDd MM' SS.S"`.
pub fn format_dec(dec: f64) -> String {
    if !dec.is_finite() {
        return format!("{dec}");
    }
    let sign = if dec < 0.0 { '-' } else { '+' };
    let (d, m, s) = sexagesimal(dec.abs() * RAD_TO_DEG, 1);
    format!("{sign}{d:02}d {m:02}' {s:04.1}\"")
}
