//! Optical atmospheric refraction.
//!
//! Refraction is modelled as `ZD(vacuum) - ZD(observed) = A tan z + B tan^3 z`
//! with `z` the observed zenith distance. The coefficients follow the optical
//! branch of Hohenkerk & Sinclair (1985) with the Green (1987) closure, and
//! depend on pressure, temperature, humidity and wavelength. Zero pressure
//! disables refraction entirely, which is what the cheap feasibility check
//! relies on.

use focalplate_core::constants::{DEG_TO_RAD, KELVIN_OFFSET};

/// Zenith distance beyond which `tan z` is frozen.
const MAX_REFRACTION_ZD: f64 = 83.0 * DEG_TO_RAD;

const MAX_SOLVER_ITERATIONS: usize = 25;

const SOLVER_TOLERANCE: f64 = 1e-15;

/// The `(A, B)` pair of the two-term refraction law, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefractionCoefficients {
    pub a: f64,
    pub b: f64,
}

impl RefractionCoefficients {
    pub const NONE: Self = Self { a: 0.0, b: 0.0 };

    /// Computes the coefficients for the given atmosphere.
    pub fn compute(
        pressure_mb: f64,
        temperature_k: f64,
        rel_humidity: f64,
        wavelength_um: f64,
    ) -> Self {
        let pressure = pressure_mb.clamp(0.0, 10000.0);
        let temp_celsius = (temperature_k - KELVIN_OFFSET).clamp(-150.0, 200.0);
        let humidity = rel_humidity.clamp(0.0, 1.0);

        if pressure <= 0.0 {
            return Self::NONE;
        }

        let temp_kelvin = temp_celsius + KELVIN_OFFSET;

        // Saturation pressure (Gill 1982, with pressure correction)
        let ps = 10.0_f64
            .powf((0.7859 + 0.03477 * temp_celsius) / (1.0 + 0.00412 * temp_celsius))
            * (1.0 + pressure * (4.5e-6 + 6e-10 * temp_celsius * temp_celsius));
        // Water vapour pressure (Crane 1976)
        let pw = humidity * ps / (1.0 - (1.0 - humidity) * ps / pressure);

        let wl_sq = wavelength_um * wavelength_um;
        let gamma = ((77.53484e-6 + (4.39108e-7 + 3.666e-9 / wl_sq) / wl_sq) * pressure
            - 11.2684e-6 * pw)
            / temp_kelvin;

        let beta = 4.4474e-6 * temp_kelvin;

        Self {
            a: gamma * (1.0 - beta),
            b: -gamma * (beta - gamma / 2.0),
        }
    }

    pub fn is_none(&self) -> bool {
        self.a == 0.0 && self.b == 0.0
    }

    /// Refraction for an observed zenith distance.
    pub fn refraction(&self, zd_observed: f64) -> f64 {
        let tan_z = zd_observed.min(MAX_REFRACTION_ZD).tan();
        tan_z * (self.a + self.b * tan_z * tan_z)
    }

    /// Observed to vacuum (topocentric) zenith distance. Closed form.
    pub fn unrefract(&self, zd_observed: f64) -> f64 {
        zd_observed + self.refraction(zd_observed)
    }

    /// Vacuum (topocentric) to observed zenith distance.
    ///
    /// Newton iteration on `z + A tan z + B tan^3 z = zd_vacuum`; the derivative
    /// is taken as 1 once `z` passes the frozen-tan limit.
    pub fn refract(&self, zd_vacuum: f64) -> f64 {
        if self.is_none() {
            return zd_vacuum;
        }

        let mut z = zd_vacuum;
        for _ in 0..MAX_SOLVER_ITERATIONS {
            let f = self.unrefract(z) - zd_vacuum;
            let slope = if z < MAX_REFRACTION_ZD {
                let tan_z = z.tan();
                let sec_sq = 1.0 + tan_z * tan_z;
                1.0 + sec_sq * (self.a + 3.0 * self.b * tan_z * tan_z)
            } else {
                1.0
            };
            let step = f / slope;
            z -= step;
            if step.abs() < SOLVER_TOLERANCE {
                break;
            }
        }
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focalplate_core::constants::ARCSEC_PER_RAD;

    fn standard() -> RefractionCoefficients {
        RefractionCoefficients::compute(1013.25, 283.15, 0.5, 0.55)
    }

    #[test]
    fn test_zero_pressure_disables_refraction() {
        let coeffs = RefractionCoefficients::compute(0.0, 283.0, 0.3, 0.55);
        assert!(coeffs.is_none());
        assert_eq!(coeffs.refract(0.7), 0.7);
    }

    #[test]
    fn test_sea_level_magnitude() {
        // Roughly 58 arcsec per unit tan z at sea level
        let a_arcsec = standard().a * ARCSEC_PER_RAD;
        assert!(a_arcsec > 55.0 && a_arcsec < 62.0, "A = {}", a_arcsec);
        assert!(standard().b < 0.0);
    }

    #[test]
    fn test_refraction_raises_objects() {
        let coeffs = standard();
        let zd = 60.0 * DEG_TO_RAD;
        assert!(coeffs.refract(zd) < zd);
    }

    #[test]
    fn test_refract_inverts_unrefract() {
        let coeffs = standard();
        for deg in [0.0, 10.0, 35.0, 60.0, 70.0, 80.0] {
            let zd = deg * DEG_TO_RAD;
            let back = coeffs.unrefract(coeffs.refract(zd));
            assert!((back - zd).abs() < 1e-14, "zd {}: {}", deg, back - zd);
        }
    }

    #[test]
    fn test_blue_refracts_more_than_red() {
        let blue = RefractionCoefficients::compute(900.0, 283.0, 0.3, 0.4);
        let red = RefractionCoefficients::compute(900.0, 283.0, 0.3, 0.9);
        assert!(blue.a > red.a);
    }

    #[test]
    fn test_lower_pressure_refracts_less() {
        let high = RefractionCoefficients::compute(1000.0, 283.0, 0.3, 0.55);
        let low = RefractionCoefficients::compute(800.0, 283.0, 0.3, 0.55);
        assert!(low.a < high.a);
    }
}
