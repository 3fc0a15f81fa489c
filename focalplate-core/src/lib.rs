//! Shared numerical building blocks for the focal-plate workspace.
//!
//! Everything here is plain `f64` arithmetic: angle wrapping and rendering,
//! ERFA-convention rotation matrices, unit-vector conversion and the calendar
//! rendering used in diagnostics.

pub mod angle;
pub mod constants;
pub mod math;
pub mod matrix;
pub mod time;
pub mod vector;

pub use angle::{format_dec, format_ra, wrap_0_2pi, wrap_pm_pi};
pub use matrix::RotationMatrix3;
pub use time::{format_mjd, CalendarDate};
pub use vector::{cartesian_to_spherical, spherical_to_cartesian};
