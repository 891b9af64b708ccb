//! Composite 0–100 suitability score with a rating bucket.
//!
//! The score starts at 100 and loses points for obstacle density, shading,
//! orientation away from the equator, unfavourable slope class, a low
//! usable-to-total ratio and very small usable areas.
use crate::angle::compass_deviation_deg;
use crate::roof::{RoofGeometry, SlopeClass};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Rating {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Rating::Excellent
        } else if score >= 60.0 {
            Rating::Good
        } else if score >= 40.0 {
            Rating::Fair
        } else {
            Rating::Poor
        }
    }
}

/// Points deducted for a slope class.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SlopePenalties {
    pub flat: f64,
    pub gabled: f64,
    pub hipped: f64,
    pub complex: f64,
}

impl Default for SlopePenalties {
    fn default() -> Self {
        Self {
            flat: 0.0,
            gabled: 5.0,
            hipped: 10.0,
            complex: 20.0,
        }
    }
}

impl SlopePenalties {
    pub fn for_class(&self, class: SlopeClass) -> f64 {
        match class {
            SlopeClass::Flat => self.flat,
            SlopeClass::Gabled => self.gabled,
            SlopeClass::Hipped => self.hipped,
            SlopeClass::Complex => self.complex,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SuitabilityOptions {
    /// Points per obstacle per 100 m² of roof.
    pub obstacle_weight: f64,
    pub obstacle_cap: f64,
    /// Points at shading score 0.
    pub shading_weight: f64,
    /// Points at 90° away from the equator-facing bearing.
    pub orientation_weight: f64,
    pub slope: SlopePenalties,
    /// Points when nothing of the roof is usable.
    pub usable_ratio_weight: f64,
    pub min_usable_area_m2: f64,
    pub small_roof_penalty: f64,
}

impl Default for SuitabilityOptions {
    fn default() -> Self {
        Self {
            obstacle_weight: 10.0,
            obstacle_cap: 25.0,
            shading_weight: 30.0,
            orientation_weight: 20.0,
            slope: SlopePenalties::default(),
            usable_ratio_weight: 10.0,
            min_usable_area_m2: 20.0,
            small_roof_penalty: 15.0,
        }
    }
}

impl SuitabilityOptions {
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            self.obstacle_weight,
            self.obstacle_cap,
            self.shading_weight,
            self.orientation_weight,
            self.slope.flat,
            self.slope.gabled,
            self.slope.hipped,
            self.slope.complex,
            self.usable_ratio_weight,
            self.min_usable_area_m2,
            self.small_roof_penalty,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err("suitability weights must be finite and non-negative".into());
        }
        Ok(())
    }
}

/// Deductions that make up a score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyBreakdown {
    pub obstacles: f64,
    pub shading: f64,
    pub orientation: f64,
    pub slope: f64,
    pub usable_ratio: f64,
    pub small_roof: f64,
}

impl PenaltyBreakdown {
    pub fn total(&self) -> f64 {
        self.obstacles
            + self.shading
            + self.orientation
            + self.slope
            + self.usable_ratio
            + self.small_roof
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuitabilityRating {
    pub score: f64,
    pub rating: Rating,
    pub obstacle_count: usize,
    pub breakdown: PenaltyBreakdown,
}

#[derive(Clone, Debug, Default)]
pub struct SuitabilityScorer {
    options: SuitabilityOptions,
}

impl SuitabilityScorer {
    pub fn new(options: SuitabilityOptions) -> Self {
        Self { options }
    }

    /// Equator-facing bearing for a hemisphere.
    pub fn ideal_bearing(latitude: f64) -> f64 {
        if latitude >= 0.0 {
            180.0
        } else {
            0.0
        }
    }

    /// Deviation of the better of the two roof faces (`orientation ± 90°`)
    /// from the ideal bearing, in `[0, 90]`.
    pub fn face_deviation_deg(orientation_deg: f64, latitude: f64) -> f64 {
        let ideal = Self::ideal_bearing(latitude);
        compass_deviation_deg(orientation_deg + 90.0, ideal)
            .min(compass_deviation_deg(orientation_deg - 90.0, ideal))
    }

    pub fn breakdown(
        &self,
        geometry: &RoofGeometry,
        obstacle_count: usize,
        latitude: f64,
    ) -> PenaltyBreakdown {
        let o = &self.options;
        let shape = &geometry.shape;
        let density = if shape.total_area_m2 > 0.0 {
            obstacle_count as f64 * 100.0 / shape.total_area_m2
        } else {
            0.0
        };
        let orientation = match shape.slope_class {
            SlopeClass::Flat => 0.0,
            _ => {
                Self::face_deviation_deg(shape.orientation_deg, latitude) * o.orientation_weight
                    / 90.0
            }
        };
        let usable_ratio = if shape.total_area_m2 > 0.0 {
            (shape.usable_area_m2 / shape.total_area_m2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        PenaltyBreakdown {
            obstacles: (density * o.obstacle_weight).min(o.obstacle_cap),
            shading: (1.0 - geometry.shading_score.clamp(0.0, 1.0)) * o.shading_weight,
            orientation,
            slope: o.slope.for_class(shape.slope_class),
            usable_ratio: (1.0 - usable_ratio) * o.usable_ratio_weight,
            small_roof: if shape.usable_area_m2 < o.min_usable_area_m2 {
                o.small_roof_penalty
            } else {
                0.0
            },
        }
    }

    pub fn score(
        &self,
        geometry: &RoofGeometry,
        obstacle_count: usize,
        latitude: f64,
    ) -> SuitabilityRating {
        let breakdown = self.breakdown(geometry, obstacle_count, latitude);
        let score = (100.0 - breakdown.total()).clamp(0.0, 100.0);
        SuitabilityRating {
            score,
            rating: Rating::from_score(score),
            obstacle_count,
            breakdown,
        }
    }
}
