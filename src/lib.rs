#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod analyzer;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod image;
pub mod types;

// Pipeline stages, usable on their own.
pub mod energy;
pub mod obstacles;
pub mod packing;
pub mod roof;
pub mod segmentation;
pub mod shading;
pub mod suitability;

// Lower-level building blocks.
pub mod angle;
pub mod config;
pub mod contour;
pub mod edges;
pub mod morphology;
pub mod pyramid;

// --- High-level re-exports -------------------------------------------------

pub use crate::analyzer::{AnalysisParams, CancelToken, RooftopAnalyzer};
pub use crate::error::{AnalysisError, AnalysisResult};
pub use crate::types::{AnalysisRun, Location, RoofAnalysis, RunSummary, SceneInput};

pub use crate::diagnostics::{AnalysisReport, PipelineTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use rooftop_solar::prelude::*;
///
/// # fn main() -> Result<(), AnalysisError> {
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![0u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// let analyzer = RooftopAnalyzer::new(AnalysisParams::default())?;
/// let scene = SceneInput::new(img).with_scale(0.15);
/// let report = analyzer.process(&scene)?;
/// println!(
///     "roofs={} panels={} latency_ms={:.3}",
///     report.run.summary.region_count,
///     report.run.summary.total_panels,
///     report.trace.timings.total_ms
/// );
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::ImageU8;
    pub use crate::{
        AnalysisError, AnalysisParams, AnalysisRun, Location, RooftopAnalyzer, SceneInput,
    };
}
