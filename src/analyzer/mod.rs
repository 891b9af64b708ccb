//! End-to-end rooftop analysis.
//!
//! [`RooftopAnalyzer`] validates its [`AnalysisParams`] once, then turns each
//! [`SceneInput`](crate::SceneInput) into an
//! [`AnalysisReport`](crate::AnalysisReport):
//!
//! 1. build the image pyramid,
//! 2. segment roof regions ([`crate::segmentation`]),
//! 3. per region, in parallel: obstacles, then roof geometry and shading
//!    side by side, then packing, energy and suitability,
//! 4. merge the per-region results in region order.
//!
//! Each region only reads the shared image, so regions are independent. A
//! [`CancelToken`] checked before the merge abandons the run without a
//! partial result.

mod cancel;
pub mod params;
mod pipeline;

pub use cancel::CancelToken;
pub use params::AnalysisParams;
pub use pipeline::RooftopAnalyzer;
