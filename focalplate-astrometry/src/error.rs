use thiserror::Error;

pub type AstrometryResult<T> = Result<T, AstrometryError>;

/// Failure of a gnomonic projection onto the tangent plane.
///
/// The three geometric kinds mirror the status codes of the classic
/// star-to-tangent-plane routine; `Unexpected` covers any other status a
/// provider might report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("star too far from axis")]
    TooFarFromAxis,

    #[error("antistar on tangent plane")]
    AntistarOnTangentPlane,

    #[error("antistar too far from axis")]
    AntistarTooFarFromAxis,

    #[error("unexpected projection status {status}")]
    Unexpected { status: i32 },
}

impl ProjectionError {
    pub fn from_status(status: i32) -> Option<Self> {
        match status {
            0 => None,
            1 => Some(Self::TooFarFromAxis),
            2 => Some(Self::AntistarOnTangentPlane),
            3 => Some(Self::AntistarTooFarFromAxis),
            other => Some(Self::Unexpected { status: other }),
        }
    }
}

#[derive(Debug, Error)]
pub enum AstrometryError {
    #[error("Invalid observing conditions: {message}")]
    InvalidConditions { message: String },

    #[error("Tangent-plane projection failed: {source}")]
    Projection {
        #[from]
        source: ProjectionError,
    },
}

impl AstrometryError {
    pub fn invalid_conditions(message: impl Into<String>) -> Self {
        Self::InvalidConditions {
            message: message.into(),
        }
    }
}
