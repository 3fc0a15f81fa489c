//! Sky to fibre-plate coordinate transforms for the AAT and Hector.
//!
//! The engine converts apparent RA/Dec into focal-plate X/Y in microns and
//! back, accounting for refraction, the mount's polar-axis misalignment,
//! the wavelength-dependent radial distortion of the corrector and an
//! empirical distortion grid. Hector targets additionally get zone-based
//! telecentricity and mechanical offsets plus plate thermal expansion.
//!
//! ```no_run
//! use focalplate::{
//!     AtmosphereParams, FieldSetup, FieldTransformSession, HectorOffsetCorrector,
//!     RadialDistortionParams, SessionOptions,
//! };
//! use focalplate_astrometry::SphericalAstrometry;
//!
//! # fn main() -> focalplate::PlateResult<()> {
//! let setup = FieldSetup {
//!     mjd: 59000.3,
//!     dut: 0.0,
//!     centre_ra: 3.0,
//!     centre_dec: -0.5,
//!     pointing_wavelength_um: 0.55,
//!     observing_wavelength_um: 0.55,
//!     atmosphere: AtmosphereParams {
//!         temperature_k: 283.0,
//!         pressure_mb: 900.0,
//!         humidity: 0.3,
//!     },
//! };
//! let session = FieldTransformSession::new(
//!     SphericalAstrometry::new(),
//!     setup,
//!     RadialDistortionParams::default(),
//!     SessionOptions::default(),
//! )?;
//! let hector = HectorOffsetCorrector::default();
//! let (x, y) = hector.to_xy(&session, 3.0, -0.5, 3.0005, -0.4995, 59000.3)?;
//! let (ra, dec) = hector.to_radec(&session, 3.0, -0.5, x, y, 59000.3)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod distortion;
pub mod error;
pub mod hector;
pub mod linear;
pub mod mount;
pub mod params;
pub mod session;
pub mod setup;

pub use config::InstrumentConfig;
pub use distortion::{DistortionMapGrid, RadialDistortionParams};
pub use error::{Body, PlateError, PlateResult};
pub use hector::{
    thermal_offset, HectorOffsetCorrector, ThermalExpansion, ZoneOffset, ZoneTable,
};
pub use linear::{
    normalize_linear, GridSource, LinearCoefficients, LinearModelParams, LinearPlateModel,
};
pub use mount::{MountFrameRotator, MountMisalignment};
pub use params::PlateParameters;
pub use session::{
    check_observable, FieldTransformSession, Observability, SessionOptions, SessionState,
};
pub use setup::{AtmosphereParams, FieldSetup};
