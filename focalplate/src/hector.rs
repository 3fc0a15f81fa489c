//! Hector per-target radial offsets.
//!
//! Hector fibre bundles sit on magnets with prisms, so a target's plate
//! position is pushed radially by a telecentricity term (prism angle,
//! growing with field angle) and pulled back by a fixed mechanical term.
//! Both depend on which angular zone from the field centre the target
//! falls in. The plate is also drilled at a configuration temperature and
//! used at the observing temperature.

use crate::error::{PlateError, PlateResult};
use crate::session::FieldTransformSession;
use focalplate_astrometry::AstrometryProvider;
use focalplate_core::constants::RAD_TO_DEG;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default plate coefficient of thermal expansion, ppm per kelvin.
pub const DEFAULT_CTE_PPM_PER_K: f64 = 11.5;

/// Outer edges of the four zones, degrees from the field centre.
pub const ZONE_BOUNDARIES_DEG: [f64; 4] = [0.396, 0.627, 0.823, 1.0];

/// Zone boundaries and per-zone offsets in microns.
///
/// Telecentricity is flat within zones 1 and 2 and linear from the first to
/// the second value within zones 3 and 4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneTable {
    pub boundaries_deg: [f64; 4],
    pub telecentricity_um: [[f64; 2]; 4],
    pub mechanical_um: [f64; 4],
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self {
            boundaries_deg: ZONE_BOUNDARIES_DEG,
            telecentricity_um: [[0.0, 0.0], [4.5, 4.5], [9.0, 13.5], [13.5, 20.0]],
            mechanical_um: [3.0, 3.0, 4.0, 4.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneOffset {
    /// 1 to 4.
    pub zone: u8,
    pub telecentricity_um: f64,
    pub mechanical_um: f64,
}

impl ZoneOffset {
    /// Net outward radial correction.
    pub fn combined(&self) -> f64 {
        self.telecentricity_um - self.mechanical_um
    }
}

impl ZoneTable {
    /// Boundaries must increase. Telecentricity and the combined offset
    /// must not decrease with angle.
    pub fn validate(&self) -> PlateResult<()> {
        let b = &self.boundaries_deg;
        if !(b[0] > 0.0 && b[0] < b[1] && b[1] < b[2] && b[2] < b[3]) {
            return Err(PlateError::config(format!(
                "zone boundaries must be positive and increasing: {b:?}"
            )));
        }
        let t = self.telecentricity_um.iter().flatten().copied().collect::<Vec<_>>();
        if t.windows(2).any(|w| w[1] < w[0]) {
            return Err(PlateError::config(format!(
                "telecentricity offsets must not decrease with angle: {t:?}"
            )));
        }
        let combined = self
            .telecentricity_um
            .iter()
            .zip(&self.mechanical_um)
            .flat_map(|(&[start, end], &mech)| [start - mech, end - mech])
            .collect::<Vec<_>>();
        if combined.windows(2).any(|w| w[1] < w[0]) {
            return Err(PlateError::config(format!(
                "combined offsets must not decrease with angle: {combined:?}"
            )));
        }
        Ok(())
    }

    /// Zone and offsets for a target `angle_deg` from the field centre.
    pub fn zone_for(&self, angle_deg: f64) -> ZoneOffset {
        let b = &self.boundaries_deg;
        let (index, fraction) = if angle_deg < b[0] {
            (0, 0.0)
        } else if angle_deg < b[1] {
            (1, 0.0)
        } else if angle_deg < b[2] {
            (2, (angle_deg - b[1]) / (b[2] - b[1]))
        } else {
            (3, ((angle_deg - b[2]) / (b[3] - b[2])).min(1.0))
        };
        let [start, end] = self.telecentricity_um[index];
        ZoneOffset {
            zone: index as u8 + 1,
            telecentricity_um: start + fraction * (end - start),
            mechanical_um: self.mechanical_um[index],
        }
    }
}

/// Plate expansion between configuration and observation, microns.
pub fn thermal_offset(
    x: f64,
    y: f64,
    config_temperature: f64,
    observing_temperature: f64,
    cte_ppm_per_k: f64,
) -> (f64, f64) {
    let strain = cte_ppm_per_k * (config_temperature - observing_temperature) / 1e6;
    (x * strain, y * strain)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalExpansion {
    /// Plate temperature when configured, deg C.
    pub config_temperature_c: f64,
    /// Plate temperature when observed, deg C.
    pub observing_temperature_c: f64,
    #[serde(default = "default_cte")]
    pub cte_ppm_per_k: f64,
}

fn default_cte() -> f64 {
    DEFAULT_CTE_PPM_PER_K
}

impl ThermalExpansion {
    pub fn offset(&self, x: f64, y: f64) -> (f64, f64) {
        thermal_offset(
            x,
            y,
            self.config_temperature_c,
            self.observing_temperature_c,
            self.cte_ppm_per_k,
        )
    }
}

/// Moves `(x, y)` along its radius by `offset` microns. The origin stays put.
fn scale_radially(x: f64, y: f64, offset: f64) -> (f64, f64) {
    let radius = x.hypot(y);
    if radius == 0.0 {
        return (x, y);
    }
    let factor = (radius + offset) / radius;
    (x * factor, y * factor)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HectorOffsetCorrector {
    zones: ZoneTable,
    telecentricity_enabled: bool,
    mechanical_enabled: bool,
    thermal: Option<ThermalExpansion>,
}

impl Default for HectorOffsetCorrector {
    fn default() -> Self {
        Self {
            zones: ZoneTable::default(),
            telecentricity_enabled: true,
            mechanical_enabled: true,
            thermal: None,
        }
    }
}

impl HectorOffsetCorrector {
    pub fn new(zones: ZoneTable) -> PlateResult<Self> {
        zones.validate()?;
        Ok(Self {
            zones,
            ..Self::default()
        })
    }

    pub fn with_telecentricity(mut self, enabled: bool) -> Self {
        self.telecentricity_enabled = enabled;
        self
    }

    pub fn with_mechanical(mut self, enabled: bool) -> Self {
        self.mechanical_enabled = enabled;
        self
    }

    pub fn with_thermal(mut self, thermal: Option<ThermalExpansion>) -> Self {
        self.thermal = thermal;
        self
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn thermal(&self) -> Option<&ThermalExpansion> {
        self.thermal.as_ref()
    }

    /// Zone offsets with disabled terms zeroed.
    pub fn zone_offset(&self, angle_deg: f64) -> ZoneOffset {
        let mut offset = self.zones.zone_for(angle_deg);
        if !self.telecentricity_enabled {
            offset.telecentricity_um = 0.0;
        }
        if !self.mechanical_enabled {
            offset.mechanical_um = 0.0;
        }
        offset
    }

    fn zone_between<P: AstrometryProvider + ?Sized>(
        &self,
        provider: &P,
        centre: (f64, f64),
        ra: f64,
        dec: f64,
    ) -> ZoneOffset {
        let angle = provider.angular_separation(centre.0, centre.1, ra, dec);
        self.zone_offset(angle * RAD_TO_DEG)
    }

    /// Applies the zone offset of the target at (`ra`, `dec`) to its plate
    /// position.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_to_xy<P: AstrometryProvider + ?Sized>(
        &self,
        provider: &P,
        centre_ra: f64,
        centre_dec: f64,
        ra: f64,
        dec: f64,
        x: f64,
        y: f64,
    ) -> (f64, f64) {
        let zone = self.zone_between(provider, (centre_ra, centre_dec), ra, dec);
        scale_radially(x, y, zone.combined())
    }

    /// Removes the zone offset from a corrected plate position and returns
    /// the target's RA/Dec.
    ///
    /// The zone is found from the uncorrected position; if removing its
    /// offset moves the target into another zone, one more pass is made with
    /// that zone's offset. There is never a third pass.
    pub fn apply_to_radec<P: AstrometryProvider>(
        &self,
        session: &FieldTransformSession<P>,
        centre_ra: f64,
        centre_dec: f64,
        x: f64,
        y: f64,
        mjd: f64,
    ) -> PlateResult<(f64, f64)> {
        let centre = (centre_ra, centre_dec);
        let provider = session.provider();

        let (ra, dec) = session.xy_to_radec(centre_ra, centre_dec, x, y, mjd)?;
        let first = self.zone_between(provider, centre, ra, dec);
        let (x1, y1) = scale_radially(x, y, -first.combined());
        let (ra, dec) = session.xy_to_radec(centre_ra, centre_dec, x1, y1, mjd)?;

        let second = self.zone_between(provider, centre, ra, dec);
        if second.zone == first.zone {
            return Ok((ra, dec));
        }
        debug!(
            from = first.zone,
            to = second.zone,
            "target crossed a zone boundary; re-resolving"
        );
        let (x2, y2) = scale_radially(x, y, -second.combined());
        session.xy_to_radec(centre_ra, centre_dec, x2, y2, mjd)
    }

    /// Target RA/Dec to corrected plate position at the observing
    /// temperature.
    pub fn to_xy<P: AstrometryProvider>(
        &self,
        session: &FieldTransformSession<P>,
        centre_ra: f64,
        centre_dec: f64,
        ra: f64,
        dec: f64,
        mjd: f64,
    ) -> PlateResult<(f64, f64)> {
        let (x, y) = session.radec_to_xy(centre_ra, centre_dec, ra, dec, mjd)?;
        let (x, y) = self.apply_to_xy(session.provider(), centre_ra, centre_dec, ra, dec, x, y);
        Ok(match &self.thermal {
            Some(thermal) => {
                let (dx, dy) = thermal.offset(x, y);
                (x + dx, y + dy)
            }
            None => (x, y),
        })
    }

    /// Corrected plate position back to target RA/Dec.
    pub fn to_radec<P: AstrometryProvider>(
        &self,
        session: &FieldTransformSession<P>,
        centre_ra: f64,
        centre_dec: f64,
        x: f64,
        y: f64,
        mjd: f64,
    ) -> PlateResult<(f64, f64)> {
        let (x, y) = match &self.thermal {
            Some(thermal) => {
                let (dx, dy) = thermal.offset(x, y);
                (x - dx, y - dy)
            }
            None => (x, y),
        };
        self.apply_to_radec(session, centre_ra, centre_dec, x, y, mjd)
    }
}
