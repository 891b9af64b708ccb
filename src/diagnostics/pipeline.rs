use crate::diagnostics::{PyramidStage, RegionTrace, SegmentationStage, TimingBreakdown};
use crate::types::AnalysisRun;
use serde::Serialize;

/// Result of [`RooftopAnalyzer::process`](crate::RooftopAnalyzer::process):
/// the run plus a trace of how it was produced.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub run: AnalysisRun,
    pub trace: PipelineTrace,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    pub pyramid: PyramidStage,
    pub segmentation: SegmentationStage,
    pub regions: Vec<RegionTrace>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub meters_per_pixel: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub pyramid_levels: usize,
}
