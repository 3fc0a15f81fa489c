use focalplate_astrometry::{AstrometryError, ProjectionError};
use focalplate_core::{format_dec, format_mjd, format_ra};
use std::path::PathBuf;
use thiserror::Error;

pub type PlateResult<T> = Result<T, PlateError>;

/// Which position a feasibility check was run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    FieldCentre,
    Target,
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::FieldCentre => write!(f, "field centre"),
            Body::Target => write!(f, "target"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlateError {
    #[error("illegal RA: {detail}")]
    IllegalRa { detail: String },

    #[error("illegal Dec: {detail}")]
    IllegalDec { detail: String },

    #[error("illegal temperature {value} K (valid range {min} to {max} K)")]
    IllegalTemperature { value: f64, min: f64, max: f64 },

    #[error("illegal pressure {value} mB (valid range {min} to {max} mB)")]
    IllegalPressure { value: f64, min: f64, max: f64 },

    #[error("illegal humidity {value} (valid range {min} to {max})")]
    IllegalHumidity { value: f64, min: f64, max: f64 },

    #[error("illegal wavelength {value} um (valid range {min} to {max} um)")]
    IllegalWavelength { value: f64, min: f64, max: f64 },

    #[error("illegal scale {scale}: extra scale must be non-zero")]
    IllegalScale { scale: f64 },

    #[error("illegal non-perpendicularity {degrees} deg: must lie strictly within +/-90 deg")]
    IllegalNonPerpendicularity { degrees: f64 },

    #[error("linear model is singular (determinant = {determinant})")]
    SingularLinearModel { determinant: f64 },

    #[error(
        "{body} zenith distance {zd_deg:.3} deg exceeds the {limit_deg:.1} deg limit: {position}"
    )]
    ZenithDistance {
        body: Body,
        zd_deg: f64,
        limit_deg: f64,
        position: String,
    },

    #[error("tangent-plane projection failed: {source}")]
    Projection {
        #[from]
        source: ProjectionError,
    },

    #[error("astrometry failed: {source}")]
    Astrometry {
        #[from]
        source: AstrometryError,
    },

    #[error("distortion map {path:?}: {message}")]
    DistortionMap { path: PathBuf, message: String },

    #[error("parameter file {path:?}: {message}")]
    ParameterFile { path: PathBuf, message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session is not initialised; reinitialise before transforming")]
    SessionUninitialized,
}

/// Renders a centre and optional target position for validation errors.
fn describe_positions(centre_ra: f64, centre_dec: f64, target: Option<(f64, f64)>) -> String {
    let mut detail = format!("field centre RA={centre_ra} Dec={centre_dec}");
    if let Some((ra, dec)) = target {
        detail.push_str(&format!(", target RA={ra} Dec={dec}"));
    }
    detail
}

impl PlateError {
    pub fn illegal_ra(centre_ra: f64, centre_dec: f64, target: Option<(f64, f64)>) -> Self {
        Self::IllegalRa {
            detail: describe_positions(centre_ra, centre_dec, target),
        }
    }

    pub fn illegal_dec(centre_ra: f64, centre_dec: f64, target: Option<(f64, f64)>) -> Self {
        Self::IllegalDec {
            detail: describe_positions(centre_ra, centre_dec, target),
        }
    }

    pub fn zenith_distance(
        body: Body,
        ra: f64,
        dec: f64,
        mjd: f64,
        zd_deg: f64,
        limit_deg: f64,
    ) -> Self {
        Self::ZenithDistance {
            body,
            zd_deg,
            limit_deg,
            position: format!(
                "RA {} Dec {} at {}",
                format_ra(ra),
                format_dec(dec),
                format_mjd(mjd)
            ),
        }
    }

    pub fn distortion_map(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DistortionMap {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn parameter_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParameterFile {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the requested position or time rather than
    /// by parameters, files or session state.
    pub fn is_feasibility(&self) -> bool {
        matches!(self, Self::ZenithDistance { .. } | Self::Projection { .. })
    }
}
