use crate::obstacles::ObstacleKind;
use crate::roof::ShapeFactors;
use crate::shading::ShadingCues;
use crate::types::RegionId;
use serde::Serialize;

/// Per-roof trace: intermediate measures and stage timings.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionTrace {
    pub region_id: RegionId,
    pub mask_pixels: usize,
    pub obstacle_kinds: Vec<ObstacleKind>,
    pub shape: ShapeFactors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shading_cues: Option<ShadingCues>,
    pub obstacles_ms: f64,
    pub geometry_ms: f64,
    pub shading_ms: f64,
    pub packing_ms: f64,
}
