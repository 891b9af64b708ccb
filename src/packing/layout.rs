use crate::geometry::{Point, Polygon};
use serde::{Deserialize, Serialize};

/// Physical panel size and the gap kept between neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSpec {
    pub width_m: f64,
    pub height_m: f64,
    pub spacing_m: f64,
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self {
            width_m: 1.0,
            height_m: 1.7,
            spacing_m: 0.1,
        }
    }
}

impl PanelSpec {
    pub fn area_m2(&self) -> f64 {
        self.width_m * self.height_m
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.width_m.is_finite() && self.width_m > 0.0)
            || !(self.height_m.is_finite() && self.height_m > 0.0)
        {
            return Err(format!(
                "panel dimensions must be positive, got {} x {} m",
                self.width_m, self.height_m
            ));
        }
        if !self.spacing_m.is_finite() || self.spacing_m < 0.0 {
            return Err(format!("panel spacing must be non-negative, got {}", self.spacing_m));
        }
        Ok(())
    }

    /// Smallest panel side that still spans a whole pixel.
    pub const MIN_SIDE_PX: f64 = 1.0;

    /// Rejects image scales at which a panel side covers less than
    /// [`Self::MIN_SIDE_PX`] pixels.
    pub fn check_scale(&self, meters_per_pixel: f64) -> Result<(), String> {
        let short_px = self.width_m.min(self.height_m) / meters_per_pixel;
        if !(short_px >= Self::MIN_SIDE_PX) {
            return Err(format!(
                "panel side of {:.3} m is {:.3} px at {} m/px, below {} px",
                self.width_m.min(self.height_m),
                short_px,
                meters_per_pixel,
                Self::MIN_SIDE_PX
            ));
        }
        Ok(())
    }

    /// `(along, across)` extents in meters relative to the roof's long axis.
    pub fn footprint_m(&self, orientation: PanelOrientation) -> (f64, f64) {
        let long = self.width_m.max(self.height_m);
        let short = self.width_m.min(self.height_m);
        match orientation {
            PanelOrientation::Landscape => (long, short),
            PanelOrientation::Portrait => (short, long),
        }
    }
}

/// Landscape puts the panel's long side along the roof's long axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelOrientation {
    #[default]
    Landscape,
    Portrait,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    /// 1-based, in placement order.
    pub id: u32,
    pub row: usize,
    pub col: usize,
    /// Centre in image pixels.
    pub center: Point,
    /// Image-space angle of the panel's first side, degrees in `[0, 180)`.
    pub rotation_deg: f64,
    pub corners: Polygon,
    pub width_px: f64,
    pub height_px: f64,
    pub width_m: f64,
    pub height_m: f64,
}

impl Panel {
    pub fn area_m2(&self) -> f64 {
        self.width_m * self.height_m
    }
}

/// Placed panels of one roof plus the grid choice that produced them.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub panels: Vec<Panel>,
    pub orientation: PanelOrientation,
    /// Grid offset as a fraction of one cell step, per frame axis.
    pub phase: [f64; 2],
}

impl Layout {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn total_panel_area_m2(&self) -> f64 {
        self.panels.iter().map(Panel::area_m2).sum()
    }
}
