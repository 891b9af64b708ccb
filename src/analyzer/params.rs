//! Parameters of the analysis pipeline.
//!
//! Every group deserializes with defaults, so a JSON override only needs the
//! fields it changes. Defaults: 1.0 × 1.7 m panels with 0.1 m spacing, 300 W,
//! 20 % efficiency, 14 % system losses, 0.5 m edge margin and 0.3 m obstacle
//! clearance.

use crate::energy::EnergyOptions;
use crate::error::{AnalysisError, AnalysisResult};
use crate::obstacles::ObstacleOptions;
use crate::packing::{PackingOptions, PanelSpec};
use crate::pyramid::PyramidOptions;
use crate::roof::SlopeHeuristic;
use crate::segmentation::SegmentationOptions;
use crate::shading::ShadingOptions;
use crate::suitability::SuitabilityOptions;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub pyramid: PyramidOptions,
    pub segmentation: SegmentationOptions,
    pub obstacles: ObstacleOptions,
    pub shading: ShadingOptions,
    pub slope: SlopeHeuristic,
    pub panel: PanelSpec,
    pub packing: PackingOptions,
    pub energy: EnergyOptions,
    pub suitability: SuitabilityOptions,
    /// Keep-out band along the roof boundary (meters).
    pub edge_margin_m: f64,
    /// Minimum gap between a panel and any obstacle (meters).
    pub obstacle_clearance_m: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            pyramid: PyramidOptions::default(),
            segmentation: SegmentationOptions::default(),
            obstacles: ObstacleOptions::default(),
            shading: ShadingOptions::default(),
            slope: SlopeHeuristic::default(),
            panel: PanelSpec::default(),
            packing: PackingOptions::default(),
            energy: EnergyOptions::default(),
            suitability: SuitabilityOptions::default(),
            edge_margin_m: 0.5,
            obstacle_clearance_m: 0.3,
        }
    }
}

impl AnalysisParams {
    /// Reject inconsistent parameters before any image is touched.
    pub fn validate(&self) -> AnalysisResult<()> {
        let invalid = AnalysisError::InvalidConfig;
        if self.pyramid.levels == 0 {
            return Err(invalid("pyramid needs at least one level".into()));
        }
        let deepest = self.segmentation.deepest_level();
        if deepest >= self.pyramid.levels {
            return Err(invalid(format!(
                "segmentation reads pyramid level {deepest} but only {} levels are built",
                self.pyramid.levels
            )));
        }
        if !self.edge_margin_m.is_finite() || self.edge_margin_m < 0.0 {
            return Err(invalid(format!(
                "edge margin must be non-negative, got {}",
                self.edge_margin_m
            )));
        }
        if !self.obstacle_clearance_m.is_finite() || self.obstacle_clearance_m < 0.0 {
            return Err(invalid(format!(
                "obstacle clearance must be non-negative, got {}",
                self.obstacle_clearance_m
            )));
        }
        self.panel.validate().map_err(invalid)?;
        self.energy.validate().map_err(invalid)?;
        self.segmentation.validate().map_err(invalid)?;
        self.obstacles.validate().map_err(invalid)?;
        self.shading.validate().map_err(invalid)?;
        self.suitability.validate().map_err(invalid)?;
        Ok(())
    }
}
