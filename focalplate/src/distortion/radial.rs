//! Wavelength-dependent radial distortion of the prime-focus optics.
//!
//! The optics map a tangent-plane offset (radians) to a plate offset
//! (microns) through
//!
//! ```text
//! X = xi  * (a + r^2 (b + r^2 (c + d r^2)))
//! Y = eta * (a + r^2 (b + r^2 (c + d r^2)))
//! ```
//!
//! where `r` is measured from the optical centre `(x0, y0)` (microns,
//! converted to radians through `a`). `a`, `b` and `c` carry a chromatic
//! correction evaluated at the observing wavelength; `d` does not.

use serde::{Deserialize, Serialize};

/// Reference wavelength of the chromatic correction, micrometres.
pub const CHROMATIC_REFERENCE_UM: f64 = 0.59;

/// Fixed iteration count of the inverse map.
pub const INVERSE_ITERATIONS: usize = 5;

/// Cubic coefficients `(p1, p2, p3)` in `u = 1/lambda - 1/lambda_ref` for
/// `a`, `b` and `c` respectively.
const CHROMATIC_TERMS: [[f64; 3]; 3] = [
    [-2.21e-5, 6.03e-6, -1.12e-6],
    [3.14e-3, -8.05e-4, 1.47e-4],
    [1.21e-2, -3.02e-3, 6.10e-4],
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialDistortionParams {
    /// Plate scale, microns per radian.
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    /// Optical centre offset, microns.
    #[serde(default)]
    pub x0: f64,
    #[serde(default)]
    pub y0: f64,
}

impl Default for RadialDistortionParams {
    /// Nominal AAT prime-focus corrector with the Hector top end.
    fn default() -> Self {
        Self {
            a: 13_570_000.0,
            b: -1.56e7,
            c: 6.9e7,
            d: 0.0,
            x0: 0.0,
            y0: 0.0,
        }
    }
}

/// Multiplier applied to one of `a`, `b`, `c` at the given wavelength.
fn chromatic_factor(terms: &[f64; 3], wavelength_um: f64) -> f64 {
    let u = 1.0 / wavelength_um - 1.0 / CHROMATIC_REFERENCE_UM;
    1.0 + u * (terms[0] + u * (terms[1] + u * terms[2]))
}

/// Coefficients with the chromatic correction folded in.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Effective {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    x0: f64,
    y0: f64,
}

impl Effective {
    #[inline]
    fn radial_factor(&self, xi: f64, eta: f64) -> f64 {
        let x1 = xi - self.x0 / self.a;
        let y1 = eta - self.y0 / self.a;
        let r2 = x1 * x1 + y1 * y1;
        self.a + r2 * (self.b + r2 * (self.c + self.d * r2))
    }
}

impl RadialDistortionParams {
    /// `a`, `b` and `c` scaled for `wavelength_um`.
    pub fn at_wavelength(&self, wavelength_um: f64) -> (f64, f64, f64) {
        (
            self.a * chromatic_factor(&CHROMATIC_TERMS[0], wavelength_um),
            self.b * chromatic_factor(&CHROMATIC_TERMS[1], wavelength_um),
            self.c * chromatic_factor(&CHROMATIC_TERMS[2], wavelength_um),
        )
    }

    fn effective(&self, wavelength_um: f64) -> Effective {
        let (a, b, c) = self.at_wavelength(wavelength_um);
        Effective {
            a,
            b,
            c,
            d: self.d,
            x0: self.x0,
            y0: self.y0,
        }
    }

    /// Tangent-plane offset (radians) to plate position (microns).
    pub fn forward(&self, xi: f64, eta: f64, wavelength_um: f64) -> (f64, f64) {
        let eff = self.effective(wavelength_um);
        let factor = eff.radial_factor(xi, eta);
        (xi * factor, eta * factor)
    }

    /// Plate position (microns) to tangent-plane offset (radians).
    ///
    /// Runs exactly [`INVERSE_ITERATIONS`] fixed-point steps seeded with the
    /// linear solution; there is no convergence test.
    pub fn inverse(&self, x: f64, y: f64, wavelength_um: f64) -> (f64, f64) {
        let eff = self.effective(wavelength_um);
        let mut xi = x / eff.a;
        let mut eta = y / eff.a;
        for _ in 0..INVERSE_ITERATIONS {
            let factor = eff.radial_factor(xi, eta);
            xi = x / factor;
            eta = y / factor;
        }
        (xi, eta)
    }

    /// Element-wise mean of two parameter sets.
    pub fn average(&self, other: &Self) -> Self {
        Self {
            a: 0.5 * (self.a + other.a),
            b: 0.5 * (self.b + other.b),
            c: 0.5 * (self.c + other.c),
            d: 0.5 * (self.d + other.d),
            x0: 0.5 * (self.x0 + other.x0),
            y0: 0.5 * (self.y0 + other.y0),
        }
    }
}
