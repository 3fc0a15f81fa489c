//! Plate model parameter files.
//!
//! A parameter file is a TOML document with a `[radial]` and a `[linear]`
//! table:
//!
//! ```toml
//! [radial]
//! a = 13570000.0
//! b = -15600000.0
//! c = 69000000.0
//! d = 0.0
//!
//! [linear]
//! a = 0.0
//! b = 1.0
//! c = 0.0
//! d = 0.0
//! e = 0.0
//! f = 1.0
//! extra_scale = 1.0
//! ```
//!
//! Two physical configurations can be averaged into a virtual one.

use crate::distortion::RadialDistortionParams;
use crate::error::{PlateError, PlateResult};
use crate::linear::{GridSource, LinearModelParams, LinearPlateModel};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlateParameters {
    #[serde(default)]
    pub radial: RadialDistortionParams,
    #[serde(default)]
    pub linear: LinearModelParams,
}

impl PlateParameters {
    pub fn from_toml_str(text: &str, path: &Path) -> PlateResult<Self> {
        toml::from_str(text).map_err(|e| PlateError::parameter_file(path, e.to_string()))
    }

    pub fn to_toml_string(&self) -> PlateResult<String> {
        toml::to_string_pretty(self).map_err(|e| PlateError::parameter_file("", e.to_string()))
    }

    pub fn load(path: &Path) -> PlateResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PlateError::io(path, e))?;
        let params = Self::from_toml_str(&text, path)?;
        debug!(path = %path.display(), "loaded plate parameters");
        Ok(params)
    }

    pub fn save(&self, path: &Path) -> PlateResult<()> {
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|e| PlateError::io(path, e))
    }

    /// Element-wise mean of two parameter sets.
    pub fn average(&self, other: &Self) -> Self {
        Self {
            radial: self.radial.average(&other.radial),
            linear: self.linear.average(&other.linear),
        }
    }

    /// Loads two parameter files and averages them.
    pub fn load_averaged(first: &Path, second: &Path) -> PlateResult<Self> {
        let a = Self::load(first)?;
        let b = Self::load(second)?;
        debug!(
            first = %first.display(),
            second = %second.display(),
            "averaged plate parameters"
        );
        Ok(a.average(&b))
    }

    /// Builds the linear plate model, with its grid found next to `path`.
    pub fn linear_model_beside(
        &self,
        path: &Path,
        negate_grid: bool,
    ) -> PlateResult<LinearPlateModel> {
        LinearPlateModel::new(self.linear, GridSource::beside(path, negate_grid))
    }
}
