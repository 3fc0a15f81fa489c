//! Astrometric collaborator for the focal-plate engine.
//!
//! The plate transforms consume spherical astronomy through the
//! [`AstrometryProvider`] trait: building an observed-place parameter block,
//! refreshing it for a new time, converting apparent places to observed
//! places and back, and projecting onto the tangent plane.
//! [`SphericalAstrometry`] is the reference provider.

pub mod error;
pub mod horizon;
pub mod params;
pub mod provider;
pub mod refraction;
pub mod sidereal;
pub mod spherical;
pub mod tangent;

pub use error::{AstrometryError, AstrometryResult, ProjectionError};
pub use params::{ObservedParams, ObservedPlace, ObservingConditions, Site};
pub use provider::AstrometryProvider;
pub use refraction::RefractionCoefficients;
pub use spherical::SphericalAstrometry;
