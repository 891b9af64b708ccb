//! Data model shared by the pipeline stages and the report.
use crate::energy::EnergyEstimate;
use crate::error::{AnalysisError, AnalysisResult};
use crate::geometry::Polygon;
use crate::image::{BinaryMask, ImageU8};
use crate::obstacles::Obstacle;
use crate::packing::Layout;
use crate::roof::SlopeClass;
use crate::suitability::SuitabilityRating;
use serde::{Deserialize, Serialize};

/// 1-based region identifier, assigned in merge order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

/// Roof polygon rasterized into its bounding-box crop.
pub type RegionMask = BinaryMask;

/// One detected rooftop. Coordinates are full-resolution image pixels.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoofRegion {
    pub id: RegionId,
    pub polygon: Polygon,
    #[serde(skip)]
    pub mask: RegionMask,
    /// Name of the segmentation pass that produced the polygon.
    pub source_pass: String,
}

/// Geographic position of the scene; only latitude drives the energy model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: 28.6139,
            longitude: 77.2090,
        }
    }
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AnalysisError::InvalidInput(format!(
                "latitude must lie in [-90, 90], got {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AnalysisError::InvalidInput(format!(
                "longitude must lie in [-180, 180], got {}",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Everything the pipeline needs about one image.
#[derive(Clone, Debug)]
pub struct SceneInput<'a> {
    pub image: ImageU8<'a>,
    pub meters_per_pixel: f64,
    pub location: Location,
}

impl<'a> SceneInput<'a> {
    pub const DEFAULT_METERS_PER_PIXEL: f64 = 0.15;

    /// Scene at the default scale and location.
    pub fn new(image: ImageU8<'a>) -> Self {
        Self {
            image,
            meters_per_pixel: Self::DEFAULT_METERS_PER_PIXEL,
            location: Location::default(),
        }
    }

    pub fn with_scale(mut self, meters_per_pixel: f64) -> Self {
        self.meters_per_pixel = meters_per_pixel;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        self.image.validate()?;
        if !self.meters_per_pixel.is_finite() || self.meters_per_pixel <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "meters_per_pixel must be positive and finite, got {}",
                self.meters_per_pixel
            )));
        }
        self.location.validate()
    }
}

/// Per-roof result.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoofAnalysis {
    pub region_id: RegionId,
    pub source_pass: String,
    pub polygon: Polygon,
    pub roof_area_m2: f64,
    pub obstacle_area_m2: f64,
    pub margin_area_m2: f64,
    pub usable_area_m2: f64,
    /// Compass bearing of the roof's long axis in `[0, 180)`, 0 = north,
    /// 90 = east. The axis is undirected, so a bearing of `b + 180` is
    /// reported as `b`. The faces of the roof look along
    /// `orientation_deg ± 90`.
    pub orientation_deg: f64,
    pub slope_class: SlopeClass,
    pub shading_score: f64,
    pub obstacle_count: usize,
    pub obstacles: Vec<Obstacle>,
    pub layout: Layout,
    pub energy: EnergyEstimate,
    pub suitability: SuitabilityRating,
}

/// Totals over all roofs of one image.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub region_count: usize,
    pub total_panels: usize,
    pub total_capacity_kw: f64,
    pub total_annual_kwh: f64,
    pub total_co2_offset_kg_year: f64,
}

/// All roof analyses from one image.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRun {
    pub regions: Vec<RoofAnalysis>,
    pub summary: RunSummary,
}

impl AnalysisRun {
    pub fn from_regions(regions: Vec<RoofAnalysis>) -> Self {
        let summary = regions.iter().fold(
            RunSummary {
                region_count: regions.len(),
                ..RunSummary::default()
            },
            |mut acc, r| {
                acc.total_panels += r.layout.len();
                acc.total_capacity_kw += r.energy.capacity_kw;
                acc.total_annual_kwh += r.energy.annual_kwh;
                acc.total_co2_offset_kg_year += r.energy.co2_offset_kg_year;
                acc
            },
        );
        Self { regions, summary }
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Roofs by annual energy, highest first; ties keep region order.
    pub fn ranked(&self) -> Vec<&RoofAnalysis> {
        let mut out: Vec<&RoofAnalysis> = self.regions.iter().collect();
        out.sort_by(|a, b| b.energy.annual_kwh.total_cmp(&a.energy.annual_kwh));
        out
    }

    pub fn region(&self, id: RegionId) -> Option<&RoofAnalysis> {
        self.regions.iter().find(|r| r.region_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_bounds_are_enforced() {
        assert!(Location::default().validate().is_ok());
        assert!(matches!(
            Location::new(91.0, 0.0).validate(),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(Location::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn scene_rejects_bad_scale() {
        let data = vec![0u8; 16];
        let scene = SceneInput::new(ImageU8::new(4, 4, &data));
        assert!(scene.validate().is_ok());
        assert!(scene.clone().with_scale(0.0).validate().is_err());
        assert!(scene.with_scale(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn empty_run_has_zero_summary() {
        let run = AnalysisRun::from_regions(Vec::new());
        assert!(run.is_empty());
        assert_eq!(run.summary, RunSummary::default());
        assert!(run.ranked().is_empty());
    }
}
