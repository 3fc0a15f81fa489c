//! Instrument configuration.
//!
//! Defaults describe the AAT with Hector. Everything can be overridden from
//! a TOML file; the distortion-map location can also be overridden from the
//! environment.

use crate::error::{PlateError, PlateResult};
use crate::hector::{HectorOffsetCorrector, ThermalExpansion, ZoneTable, DEFAULT_CTE_PPM_PER_K};
use crate::linear::GridSource;
use crate::mount::MountMisalignment;
use crate::session::SessionOptions;
use focalplate_astrometry::Site;
use focalplate_core::constants::DEG_TO_RAD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides the distortion-map path.
pub const DISTORTION_MAP_ENV: &str = "HECTOR_DISTORTION_MAP";
/// Negates the distortion map on load unless empty, `0` or `false`.
pub const NEGATE_DISTORTION_MAP_ENV: &str = "HECTOR_NEGATE_DISTORTION_MAP";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    /// Passed through to the provider; the reference provider ignores it.
    pub height_m: f64,
    /// Passed through to the provider; the reference provider ignores it.
    pub temperature_lapse_rate: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let aat = Site::aat();
        Self {
            longitude_deg: aat.longitude / DEG_TO_RAD,
            latitude_deg: aat.latitude / DEG_TO_RAD,
            height_m: aat.height_m,
            temperature_lapse_rate: aat.temperature_lapse_rate,
        }
    }
}

impl SiteConfig {
    pub fn site(&self) -> Site {
        Site {
            temperature_lapse_rate: self.temperature_lapse_rate,
            ..Site::from_degrees(self.longitude_deg, self.latitude_deg, self.height_m)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HectorConfig {
    pub zones: ZoneTable,
    pub telecentricity: bool,
    pub mechanical: bool,
    pub cte_ppm_per_k: f64,
}

impl Default for HectorConfig {
    fn default() -> Self {
        Self {
            zones: ZoneTable::default(),
            telecentricity: true,
            mechanical: true,
            cte_ppm_per_k: DEFAULT_CTE_PPM_PER_K,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionMapConfig {
    /// Explicit grid file; otherwise the file beside the parameter file.
    pub path: Option<PathBuf>,
    pub negate: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    pub site: SiteConfig,
    pub mount: MountMisalignment,
    pub hector: HectorConfig,
    pub distortion_map: DistortionMapConfig,
}

fn env_flag(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

impl InstrumentConfig {
    pub fn from_toml_str(text: &str) -> PlateResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| PlateError::config(e.to_string()))?;
        config.hector.zones.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> PlateResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PlateError::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "loaded instrument configuration");
        Ok(config)
    }

    /// Applies overrides from a variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DISTORTION_MAP_ENV).filter(|p| !p.trim().is_empty()) {
            debug!(%path, "distortion map path overridden");
            self.distortion_map.path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup(NEGATE_DISTORTION_MAP_ENV) {
            self.distortion_map.negate = env_flag(&value);
        }
        self
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            site: self.site.site(),
            misalignment: self.mount,
        }
    }

    /// Grid source for a linear model read from `param_file`.
    pub fn grid_source(&self, param_file: &Path) -> GridSource {
        match &self.distortion_map.path {
            Some(path) => GridSource::File {
                path: path.clone(),
                negate: self.distortion_map.negate,
            },
            None => GridSource::beside(param_file, self.distortion_map.negate),
        }
    }

    /// Hector corrector; thermal expansion is applied when both plate
    /// temperatures are known.
    pub fn hector_corrector(
        &self,
        plate_temperatures_c: Option<(f64, f64)>,
    ) -> PlateResult<HectorOffsetCorrector> {
        let thermal = plate_temperatures_c.map(|(config, observing)| ThermalExpansion {
            config_temperature_c: config,
            observing_temperature_c: observing,
            cte_ppm_per_k: self.hector.cte_ppm_per_k,
        });
        Ok(HectorOffsetCorrector::new(self.hector.zones)?
            .with_telecentricity(self.hector.telecentricity)
            .with_mechanical(self.hector.mechanical)
            .with_thermal(thermal))
    }
}
