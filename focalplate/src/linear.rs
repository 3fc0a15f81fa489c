//! Field-plate to positioner affine model.
//!
//! ```text
//! xp = a + b x + c y
//! yp = d + e x + f y
//! ```
//!
//! The linear part is normalised by an extra scale, rotation and
//! non-perpendicularity before use, and the empirical distortion grid is
//! applied on the positioner side.

use crate::distortion::DistortionMapGrid;
use crate::error::{PlateError, PlateResult};
use focalplate_core::constants::{DEG_TO_RAD, HALF_PI};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Grid file name looked for next to a linear-model parameter file.
pub const DISTORTION_MAP_FILE: &str = "distortion_map.txt";

/// Linear parts with a smaller absolute determinant are not inverted.
const SINGULAR_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl LinearCoefficients {
    pub const IDENTITY: Self = Self {
        a: 0.0,
        b: 1.0,
        c: 0.0,
        d: 0.0,
        e: 0.0,
        f: 1.0,
    };

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a + self.b * x + self.c * y,
            self.d + self.e * x + self.f * y,
        )
    }

    /// Determinant of the 2x2 linear part.
    pub fn determinant(&self) -> f64 {
        self.b * self.f - self.c * self.e
    }

    /// Solves `apply(x, y) == (xp, yp)` analytically.
    pub fn invert(&self, xp: f64, yp: f64) -> PlateResult<(f64, f64)> {
        let det = self.determinant();
        if det.is_nan() || det.abs() < SINGULAR_TOLERANCE {
            return Err(PlateError::SingularLinearModel { determinant: det });
        }
        let u = xp - self.a;
        let v = yp - self.d;
        Ok(((self.f * u - self.c * v) / det, (self.b * v - self.e * u) / det))
    }

    fn linear_part(&self) -> [[f64; 2]; 2] {
        [[self.b, self.c], [self.e, self.f]]
    }

    fn set_linear_part(&mut self, m: [[f64; 2]; 2]) {
        self.b = m[0][0];
        self.c = m[0][1];
        self.e = m[1][0];
        self.f = m[1][1];
    }

    pub fn average(&self, other: &Self) -> Self {
        Self {
            a: 0.5 * (self.a + other.a),
            b: 0.5 * (self.b + other.b),
            c: 0.5 * (self.c + other.c),
            d: 0.5 * (self.d + other.d),
            e: 0.5 * (self.e + other.e),
            f: 0.5 * (self.f + other.f),
        }
    }
}

impl Default for LinearCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn mul2(m: [[f64; 2]; 2], n: [[f64; 2]; 2]) -> [[f64; 2]; 2] {
    [
        [
            m[0][0] * n[0][0] + m[0][1] * n[1][0],
            m[0][0] * n[0][1] + m[0][1] * n[1][1],
        ],
        [
            m[1][0] * n[0][0] + m[1][1] * n[1][0],
            m[1][0] * n[0][1] + m[1][1] * n[1][1],
        ],
    ]
}

fn apply2(m: [[f64; 2]; 2], x: f64, y: f64) -> (f64, f64) {
    (m[0][0] * x + m[0][1] * y, m[1][0] * x + m[1][1] * y)
}

/// Counter-clockwise rotation by `angle` radians.
fn rotation(angle: f64) -> [[f64; 2]; 2] {
    let (s, c) = angle.sin_cos();
    [[c, -s], [s, c]]
}

/// Area-preserving half-angle shear: the two axes end up `nonperp` radians
/// away from perpendicular. `shear(-p)` is the inverse of `shear(p)`.
fn shear(nonperp: f64) -> PlateResult<[[f64; 2]; 2]> {
    if nonperp.is_nan() || nonperp.abs() >= HALF_PI {
        return Err(PlateError::IllegalNonPerpendicularity {
            degrees: nonperp / DEG_TO_RAD,
        });
    }
    let norm = 1.0 / nonperp.cos().sqrt();
    let (s, c) = (0.5 * nonperp).sin_cos();
    Ok([[norm * c, norm * s], [norm * s, norm * c]])
}

/// Folds an extra rotation, scale and non-perpendicularity into the linear
/// part of `coeffs`: `L <- scale * L * R(rotation) * S(nonperp)`.
///
/// On error `coeffs` is left as it was.
pub fn normalize_linear(
    coeffs: &mut LinearCoefficients,
    rotation_deg: f64,
    scale: f64,
    nonperp_deg: f64,
) -> PlateResult<()> {
    if scale == 0.0 || !scale.is_finite() {
        return Err(PlateError::IllegalScale { scale });
    }
    let shear = shear(nonperp_deg * DEG_TO_RAD)?;
    let mut m = mul2(
        mul2(coeffs.linear_part(), rotation(rotation_deg * DEG_TO_RAD)),
        shear,
    );
    for row in &mut m {
        for value in row.iter_mut() {
            *value *= scale;
        }
    }
    coeffs.set_linear_part(m);
    Ok(())
}

/// Inverse of the normalisation applied to a point already passed through
/// the inverse of the raw linear part.
fn denormalize_point(
    x: f64,
    y: f64,
    rotation_deg: f64,
    scale: f64,
    nonperp_deg: f64,
) -> PlateResult<(f64, f64)> {
    let (x, y) = apply2(rotation(-rotation_deg * DEG_TO_RAD), x, y);
    let (x, y) = apply2(shear(-nonperp_deg * DEG_TO_RAD)?, x, y);
    Ok((x / scale, y / scale))
}

/// Linear-model coefficients and their normalisation, as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModelParams {
    #[serde(flatten)]
    pub coefficients: LinearCoefficients,
    #[serde(default = "unit_scale")]
    pub extra_scale: f64,
    #[serde(default)]
    pub extra_rotation_deg: f64,
    #[serde(default)]
    pub extra_nonperp_deg: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Default for LinearModelParams {
    fn default() -> Self {
        Self {
            coefficients: LinearCoefficients::IDENTITY,
            extra_scale: 1.0,
            extra_rotation_deg: 0.0,
            extra_nonperp_deg: 0.0,
        }
    }
}

impl LinearModelParams {
    pub fn average(&self, other: &Self) -> Self {
        Self {
            coefficients: self.coefficients.average(&other.coefficients),
            extra_scale: 0.5 * (self.extra_scale + other.extra_scale),
            extra_rotation_deg: 0.5 * (self.extra_rotation_deg + other.extra_rotation_deg),
            extra_nonperp_deg: 0.5 * (self.extra_nonperp_deg + other.extra_nonperp_deg),
        }
    }

    /// Coefficients with the extra scale, rotation and non-perpendicularity
    /// folded in.
    pub fn normalized(&self) -> PlateResult<LinearCoefficients> {
        let mut coeffs = self.coefficients;
        normalize_linear(
            &mut coeffs,
            self.extra_rotation_deg,
            self.extra_scale,
            self.extra_nonperp_deg,
        )?;
        Ok(coeffs)
    }
}

/// Where the distortion grid of a linear model comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GridSource {
    #[default]
    None,
    File { path: PathBuf, negate: bool },
}

impl GridSource {
    /// The grid file sitting next to a linear-model parameter file.
    pub fn beside(param_file: &Path, negate: bool) -> Self {
        let dir = param_file.parent().unwrap_or_else(|| Path::new(""));
        Self::File {
            path: dir.join(DISTORTION_MAP_FILE),
            negate,
        }
    }

    fn load(&self) -> PlateResult<DistortionMapGrid> {
        match self {
            Self::None => Ok(DistortionMapGrid::empty()),
            Self::File { path, negate } => DistortionMapGrid::load(path, *negate),
        }
    }
}

#[derive(Debug)]
pub struct LinearPlateModel {
    params: LinearModelParams,
    normalized: LinearCoefficients,
    grid_source: GridSource,
    grid: OnceCell<DistortionMapGrid>,
}

impl LinearPlateModel {
    /// Normalises `params` and checks the raw linear part is invertible. The
    /// grid is read on first use.
    pub fn new(params: LinearModelParams, grid_source: GridSource) -> PlateResult<Self> {
        let normalized = params.normalized()?;
        let det = params.coefficients.determinant();
        if det.is_nan() || det.abs() < SINGULAR_TOLERANCE {
            return Err(PlateError::SingularLinearModel { determinant: det });
        }
        Ok(Self {
            params,
            normalized,
            grid_source,
            grid: OnceCell::new(),
        })
    }

    /// A model whose grid is already in memory.
    pub fn with_grid(params: LinearModelParams, grid: DistortionMapGrid) -> PlateResult<Self> {
        let model = Self::new(params, GridSource::None)?;
        // A fresh cell is always empty.
        let _ = model.grid.set(grid);
        Ok(model)
    }

    pub fn params(&self) -> &LinearModelParams {
        &self.params
    }

    pub fn normalized(&self) -> &LinearCoefficients {
        &self.normalized
    }

    pub fn grid_source(&self) -> &GridSource {
        &self.grid_source
    }

    /// The distortion grid, loading it on the first call.
    pub fn grid(&self) -> PlateResult<&DistortionMapGrid> {
        self.grid.get_or_try_init(|| self.grid_source.load())
    }

    pub fn plate_to_positioner(&self, x: f64, y: f64) -> PlateResult<(f64, f64)> {
        let (xp, yp) = self.normalized.apply(x, y);
        Ok(self.grid()?.apply(true, xp, yp))
    }

    pub fn positioner_to_plate(&self, xp: f64, yp: f64) -> PlateResult<(f64, f64)> {
        let (u, v) = self.grid()?.apply(false, xp, yp);
        let (x, y) = self.params.coefficients.invert(u, v)?;
        denormalize_point(
            x,
            y,
            self.params.extra_rotation_deg,
            self.params.extra_scale,
            self.params.extra_nonperp_deg,
        )
    }
}
