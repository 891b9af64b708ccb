use super::cancel::CancelToken;
use super::params::AnalysisParams;
use crate::diagnostics::{
    elapsed_ms, AnalysisReport, InputDescriptor, PipelineTrace, PyramidStage, RegionTrace,
    TimingBreakdown,
};
use crate::energy::EnergyModel;
use crate::error::{AnalysisError, AnalysisResult};
use crate::geometry::Polygon;
use crate::image::ImageF32;
use crate::obstacles::ObstacleDetector;
use crate::packing::{PackingRequest, PanelPackingOptimizer};
use crate::pyramid::Pyramid;
use crate::roof::{RoofGeometry, RoofGeometryAnalyzer};
use crate::segmentation::RegionSegmenter;
use crate::shading::{ShadingEstimator, NEUTRAL_SHADING};
use crate::suitability::SuitabilityScorer;
use crate::types::{AnalysisRun, RoofAnalysis, RoofRegion, SceneInput};
use log::debug;
use rayon::prelude::*;
use std::time::Instant;

/// Rooftop analysis pipeline. Holds validated parameters only, so one
/// analyzer can serve many scenes, also concurrently.
#[derive(Clone, Debug)]
pub struct RooftopAnalyzer {
    params: AnalysisParams,
    segmenter: RegionSegmenter,
    obstacles: ObstacleDetector,
    geometry: RoofGeometryAnalyzer,
    shading: ShadingEstimator,
    packer: PanelPackingOptimizer,
    energy: EnergyModel,
    scorer: SuitabilityScorer,
}

impl RooftopAnalyzer {
    /// Validate `params` and set up the stages.
    pub fn new(params: AnalysisParams) -> AnalysisResult<Self> {
        params.validate()?;
        Ok(Self {
            segmenter: RegionSegmenter::new(params.segmentation.clone()),
            obstacles: ObstacleDetector::new(params.obstacles.clone()),
            geometry: RoofGeometryAnalyzer::new(params.slope.clone()),
            shading: ShadingEstimator::new(params.shading.clone()),
            packer: PanelPackingOptimizer::new(params.panel, params.packing.clone()),
            energy: EnergyModel::new(params.energy.clone()),
            scorer: SuitabilityScorer::new(params.suitability.clone()),
            params,
        })
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Analyze one scene and return the compact run.
    pub fn analyze(&self, scene: &SceneInput<'_>) -> AnalysisResult<AnalysisRun> {
        self.process(scene).map(|report| report.run)
    }

    /// Analyze one scene, returning the run and its pipeline trace.
    pub fn process(&self, scene: &SceneInput<'_>) -> AnalysisResult<AnalysisReport> {
        self.process_with_cancel(scene, &CancelToken::new())
    }

    /// Like [`process`](Self::process), but gives up with
    /// [`AnalysisError::Cancelled`] once `cancel` is set.
    pub fn process_with_cancel(
        &self,
        scene: &SceneInput<'_>,
        cancel: &CancelToken,
    ) -> AnalysisResult<AnalysisReport> {
        scene.validate()?;
        self.params
            .panel
            .check_scale(scene.meters_per_pixel)
            .map_err(AnalysisError::InvalidInput)?;
        let total_start = Instant::now();
        let (width, height) = (scene.image.w, scene.image.h);
        debug!(
            "RooftopAnalyzer::process start w={} h={} mpp={} lat={}",
            width, height, scene.meters_per_pixel, scene.location.latitude
        );
        let mut timings = TimingBreakdown::default();

        let pyr_start = Instant::now();
        let pyramid = Pyramid::build(ImageF32::from_u8(&scene.image), &self.params.pyramid);
        let pyramid_stage = PyramidStage::from_pyramid(&pyramid, elapsed_ms(pyr_start));
        timings.push("pyramid", pyramid_stage.elapsed_ms);

        let (regions, segmentation) = self.segmenter.segment(&pyramid);
        timings.push("segmentation", segmentation.elapsed_ms);
        if cancel.is_cancelled() {
            debug!("RooftopAnalyzer::process cancelled after segmentation");
            return Err(AnalysisError::Cancelled);
        }

        let level0 = &pyramid.levels[0];
        let regions_start = Instant::now();
        let analyzed: Vec<(RoofAnalysis, RegionTrace)> = regions
            .par_iter()
            .map(|region| self.analyze_region(level0, region, scene))
            .collect();
        timings.push("regions", elapsed_ms(regions_start));

        if cancel.is_cancelled() {
            debug!("RooftopAnalyzer::process cancelled before merge");
            return Err(AnalysisError::Cancelled);
        }
        let (analyses, region_traces): (Vec<_>, Vec<_>) = analyzed.into_iter().unzip();
        let run = AnalysisRun::from_regions(analyses);
        timings.total_ms = elapsed_ms(total_start);
        debug!(
            "RooftopAnalyzer::process done regions={} panels={} annual_kwh={:.1} total_ms={:.2}",
            run.summary.region_count,
            run.summary.total_panels,
            run.summary.total_annual_kwh,
            timings.total_ms
        );

        Ok(AnalysisReport {
            run,
            trace: PipelineTrace {
                input: InputDescriptor {
                    width,
                    height,
                    meters_per_pixel: scene.meters_per_pixel,
                    latitude: scene.location.latitude,
                    longitude: scene.location.longitude,
                    pyramid_levels: pyramid.levels.len(),
                },
                timings,
                pyramid: pyramid_stage,
                segmentation,
                regions: region_traces,
            },
        })
    }

    fn analyze_region(
        &self,
        image: &ImageF32,
        region: &RoofRegion,
        scene: &SceneInput<'_>,
    ) -> (RoofAnalysis, RegionTrace) {
        let mpp = scene.meters_per_pixel;
        let latitude = scene.location.latitude;

        let obstacles_start = Instant::now();
        let obstacles = self.obstacles.detect(image, region);
        let obstacles_ms = elapsed_ms(obstacles_start);

        let ((shape, geometry_ms), (cues, shading_ms)) = rayon::join(
            || {
                let start = Instant::now();
                let shape =
                    self.geometry
                        .analyze(region, &obstacles, mpp, self.params.edge_margin_m);
                (shape, elapsed_ms(start))
            },
            || {
                let start = Instant::now();
                let cues = self.shading.cues(image, &region.mask);
                (cues, elapsed_ms(start))
            },
        );
        let shading_score = cues
            .as_ref()
            .map_or(NEUTRAL_SHADING, |c| self.shading.score(c));
        let geometry = RoofGeometry::new(shape, shading_score);

        let packing_start = Instant::now();
        let obstacle_polygons: Vec<Polygon> =
            obstacles.iter().map(|o| o.polygon.clone()).collect();
        let layout = self.packer.pack(&PackingRequest {
            roof: &region.polygon,
            obstacles: &obstacle_polygons,
            axis_angle: geometry.shape.factors.long_axis_angle,
            meters_per_pixel: mpp,
            edge_margin_m: self.params.edge_margin_m,
            obstacle_clearance_m: self.params.obstacle_clearance_m,
            usable_area_m2: geometry.usable_area_m2(),
        });
        let packing_ms = elapsed_ms(packing_start);

        let energy = self.energy.estimate(&layout, latitude, geometry.shading_score);
        let suitability = self.scorer.score(&geometry, obstacles.len(), latitude);
        debug!(
            "region {:?}: area={:.1} m² usable={:.1} m² obstacles={} panels={} score={:.1}",
            region.id,
            geometry.shape.total_area_m2,
            geometry.shape.usable_area_m2,
            obstacles.len(),
            layout.len(),
            suitability.score
        );

        let trace = RegionTrace {
            region_id: region.id,
            mask_pixels: region.mask.count(),
            obstacle_kinds: obstacles.iter().map(|o| o.kind).collect(),
            shape: geometry.shape.factors,
            shading_cues: cues,
            obstacles_ms,
            geometry_ms,
            shading_ms,
            packing_ms,
        };
        let shape = geometry.shape;
        let analysis = RoofAnalysis {
            region_id: region.id,
            source_pass: region.source_pass.clone(),
            polygon: region.polygon.clone(),
            roof_area_m2: shape.total_area_m2,
            obstacle_area_m2: shape.obstacle_area_m2,
            margin_area_m2: shape.margin_area_m2,
            usable_area_m2: shape.usable_area_m2,
            orientation_deg: shape.orientation_deg,
            slope_class: shape.slope_class,
            shading_score: geometry.shading_score,
            obstacle_count: obstacles.len(),
            obstacles,
            layout,
            energy,
            suitability,
        };
        (analysis, trace)
    }
}
