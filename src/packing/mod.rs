//! Panel packing: fill a roof with fixed-size, non-overlapping panels.
//!
//! The roof is rotated into the frame of its long axis and covered by a
//! regular grid of cells ([`grid::CellGrid`]). Cells are visited row-major
//! and a panel is placed when its rectangle lies inside the roof, keeps the
//! edge margin to the roof boundary, and stays at least the clearance away
//! from every obstacle. No partial panels are placed.
//!
//! Both panel orientations and the grid phases `{0, ½}` per axis are tried;
//! the hypothesis with the most panels wins and ties go to the earliest one in
//! that fixed order.
pub mod grid;
mod layout;

pub use layout::{Layout, Panel, PanelOrientation, PanelSpec};

use crate::angle::normalize_half_pi;
use crate::geometry::{Polygon, ShapeKind};
use grid::{CellGrid, GridFrame};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const FIT_EPS: f64 = 1e-6;

/// Search space of the optimizer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingOptions {
    /// Also try the panel rotated by 90°.
    pub try_portrait: bool,
    /// Also try grids shifted by half a cell per axis.
    pub try_half_phase: bool,
}

impl Default for PackingOptions {
    fn default() -> Self {
        Self {
            try_portrait: true,
            try_half_phase: true,
        }
    }
}

/// One roof as seen by the packer. Lengths in meters, coordinates in pixels.
#[derive(Clone, Copy, Debug)]
pub struct PackingRequest<'a> {
    pub roof: &'a Polygon,
    pub obstacles: &'a [Polygon],
    /// Image-space angle of the roof's long axis (radians).
    pub axis_angle: f64,
    pub meters_per_pixel: f64,
    pub edge_margin_m: f64,
    pub obstacle_clearance_m: f64,
    pub usable_area_m2: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanelPackingOptimizer {
    spec: PanelSpec,
    options: PackingOptions,
}

impl PanelPackingOptimizer {
    pub fn new(spec: PanelSpec, options: PackingOptions) -> Self {
        Self { spec, options }
    }

    pub fn spec(&self) -> &PanelSpec {
        &self.spec
    }

    /// Grid hypotheses in tie-break order.
    fn hypotheses(&self) -> Vec<(PanelOrientation, [f64; 2])> {
        let orientations: &[PanelOrientation] = if self.options.try_portrait {
            &[PanelOrientation::Landscape, PanelOrientation::Portrait]
        } else {
            &[PanelOrientation::Landscape]
        };
        let phases: &[[f64; 2]] = if self.options.try_half_phase {
            &[[0.0, 0.0], [0.5, 0.0], [0.0, 0.5], [0.5, 0.5]]
        } else {
            &[[0.0, 0.0]]
        };
        orientations
            .iter()
            .flat_map(|&o| phases.iter().map(move |&p| (o, p)))
            .collect()
    }

    /// Best layout for `req`; empty when nothing fits or no usable area is
    /// left.
    pub fn pack(&self, req: &PackingRequest<'_>) -> Layout {
        if req.usable_area_m2 <= 0.0
            || req.roof.len() < 3
            || !(req.meters_per_pixel.is_finite() && req.meters_per_pixel > 0.0)
        {
            return Layout::empty();
        }
        if let Err(msg) = self.spec.check_scale(req.meters_per_pixel) {
            warn!("packing skipped: {msg}");
            return Layout::empty();
        }
        let layouts: Vec<Layout> = self
            .hypotheses()
            .par_iter()
            .map(|&(orientation, phase)| self.pack_grid(req, orientation, phase))
            .collect();
        let best = layouts
            .into_iter()
            .reduce(|best, next| if next.len() > best.len() { next } else { best })
            .unwrap_or_default();
        debug!(
            "packing: {} panels ({:?}, phase {:?})",
            best.len(),
            best.orientation,
            best.phase
        );
        best
    }

    fn pack_grid(
        &self,
        req: &PackingRequest<'_>,
        orientation: PanelOrientation,
        phase: [f64; 2],
    ) -> Layout {
        let mpp = req.meters_per_pixel;
        let (along_m, across_m) = self.spec.footprint_m(orientation);
        let frame = GridFrame {
            angle: req.axis_angle,
            pivot: req.roof.centroid(),
            panel: [along_m / mpp, across_m / mpp],
            spacing: self.spec.spacing_m / mpp,
            margin: req.edge_margin_m.max(0.0) / mpp,
            phase,
        };
        let clearance = req.obstacle_clearance_m.max(0.0) / mpp;
        let cells = CellGrid::build(&frame, &req.roof.points());

        let mut panels = Vec::new();
        for cell in cells.iter() {
            let corners = cell.rect.to_polygon(ShapeKind::Panel);
            if !fits(req.roof, req.obstacles, &corners, frame.margin, clearance) {
                continue;
            }
            panels.push(Panel {
                id: panels.len() as u32 + 1,
                row: cell.row,
                col: cell.col,
                center: cell.rect.center,
                rotation_deg: normalize_half_pi(cell.rect.angle).to_degrees(),
                corners,
                width_px: frame.panel[0],
                height_px: frame.panel[1],
                width_m: along_m,
                height_m: across_m,
            });
        }
        Layout {
            panels,
            orientation,
            phase,
        }
    }
}

/// Panel inside the roof, `margin` away from its boundary and `clearance`
/// away from every obstacle.
fn fits(
    roof: &Polygon,
    obstacles: &[Polygon],
    panel: &Polygon,
    margin: f64,
    clearance: f64,
) -> bool {
    if !roof.contains_polygon(panel) {
        return false;
    }
    if roof.boundary_distance(panel) + FIT_EPS < margin {
        return false;
    }
    let bounds = panel.bounds();
    obstacles.iter().all(|obstacle| {
        if !bounds.overlaps(&obstacle.bounds(), clearance + FIT_EPS) {
            return true;
        }
        !panel.intersects(obstacle) && panel.boundary_distance(obstacle) + FIT_EPS >= clearance
    })
}
