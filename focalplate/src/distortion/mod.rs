//! Optical and empirical distortion models.

pub mod grid;
pub mod radial;

pub use grid::DistortionMapGrid;
pub use radial::RadialDistortionParams;
