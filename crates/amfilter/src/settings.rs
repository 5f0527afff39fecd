//! Filter parameters.

use amfilter_grid::{GridResolution, SupportFootprint};
use amfilter_math::GridFrame;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::smooth::corrected_exponent;

/// Printability filter parameters.
///
/// Missing keys take their defaults when deserializing:
///
/// ```toml
/// p_norm = 200.0
/// smoothing_epsilon = 1e-4
/// footprint = "cross"
/// clamp_support = true
/// resolution = { edge_length = 0.1 }
/// frame = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Grid spacing or cell counts.
    pub resolution: GridResolution,
    /// Smooth-max exponent.
    pub p_norm: f64,
    /// Smooth-min regularization.
    pub smoothing_epsilon: f64,
    /// Points of the layer below that support a grid point.
    pub footprint: SupportFootprint,
    /// Cap the support density at 1, the density of solid material.
    pub clamp_support: bool,
    /// Grid orientation; `w` is the build direction.
    pub frame: GridFrame,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            resolution: GridResolution::default(),
            p_norm: 200.0,
            smoothing_epsilon: 1e-4,
            footprint: SupportFootprint::Cross,
            clamp_support: true,
            frame: GridFrame::identity(),
        }
    }
}

impl FilterSettings {
    /// Parse settings from a TOML document and validate them.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.p_norm.is_finite() && self.p_norm >= 1.0) {
            return Err(FilterError::InvalidSettings(
                "p_norm must be at least 1".into(),
            ));
        }
        let widest = self.footprint.max_len();
        if corrected_exponent(self.p_norm, widest) <= 0.0 {
            return Err(FilterError::InvalidSettings(format!(
                "p_norm {} is too small for a support set of {widest} points",
                self.p_norm
            )));
        }
        if !(self.smoothing_epsilon.is_finite() && self.smoothing_epsilon > 0.0) {
            return Err(FilterError::InvalidSettings(
                "smoothing_epsilon must be positive".into(),
            ));
        }
        match self.resolution {
            GridResolution::EdgeLength(h) if !(h.is_finite() && h > 0.0) => {
                return Err(FilterError::InvalidSettings(
                    "edge_length must be positive".into(),
                ));
            }
            GridResolution::CellCounts(cells) if cells.contains(&0) => {
                return Err(FilterError::InvalidSettings(
                    "cell_counts must be at least 1 on every axis".into(),
                ));
            }
            _ => {}
        }
        Ok(())
    }
}
