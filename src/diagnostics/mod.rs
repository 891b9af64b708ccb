//! Diagnostics returned next to the analysis result.
//!
//! [`AnalysisReport`] bundles the [`AnalysisRun`](crate::AnalysisRun) with a
//! [`PipelineTrace`]: input description, stage timings, pyramid levels,
//! per-pass segmentation statistics and per-roof traces. Everything
//! serializes to camelCase JSON.

pub mod pipeline;
pub mod pyramid;
pub mod regions;
pub mod segmentation;
pub mod timing;

pub use pipeline::{AnalysisReport, InputDescriptor, PipelineTrace};
pub use pyramid::{PyramidLevelReport, PyramidStage};
pub use regions::RegionTrace;
pub use segmentation::{PassReport, SegmentationStage};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
