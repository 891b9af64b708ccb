//! Cell arena for one grid hypothesis.
//!
//! The roof is rotated into a frame whose x axis follows the roof's long
//! axis. Cells of `panel + spacing` tile the frame bounding box (inset by the
//! edge margin) starting at a phase offset; each cell owns one candidate
//! panel rectangle mapped back to image space.
use crate::geometry::{OrientedRect, Point};
use log::warn;
use nalgebra::{Point2, Rotation2, Vector2};

/// Upper bound on cells per hypothesis.
pub const MAX_CELLS: usize = 1 << 20;

#[derive(Clone, Debug)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub rect: OrientedRect,
}

/// Row-major cell storage, `index = row * cols + col`.
#[derive(Clone, Debug)]
pub struct CellGrid {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<Cell>,
}

/// Geometry of one grid hypothesis, all lengths in pixels.
#[derive(Clone, Copy, Debug)]
pub struct GridFrame {
    /// Image-space angle of the frame x axis.
    pub angle: f64,
    /// Rotation pivot.
    pub pivot: Point,
    pub panel: [f64; 2],
    pub spacing: f64,
    pub margin: f64,
    pub phase: [f64; 2],
}

impl GridFrame {
    fn frame_rotation(&self) -> Rotation2<f64> {
        Rotation2::new(-self.angle)
    }

    fn image_rotation(&self) -> Rotation2<f64> {
        Rotation2::new(self.angle)
    }

    /// Frame coordinates of an image point.
    pub fn project(&self, p: Point) -> Point2<f64> {
        let pivot = Point2::new(self.pivot[0], self.pivot[1]);
        Point2::from(self.frame_rotation() * (Point2::new(p[0], p[1]) - pivot))
    }

    pub fn unproject(&self, q: Point2<f64>) -> Point {
        let v: Vector2<f64> = self.image_rotation() * q.coords;
        [self.pivot[0] + v.x, self.pivot[1] + v.y]
    }
}

impl CellGrid {
    /// Tile the frame bounds of `outline` with cells.
    pub fn build(frame: &GridFrame, outline: &[Point]) -> Self {
        let mut lo = [f64::INFINITY; 2];
        let mut hi = [f64::NEG_INFINITY; 2];
        for &p in outline {
            let q = frame.project(p);
            lo = [lo[0].min(q.x), lo[1].min(q.y)];
            hi = [hi[0].max(q.x), hi[1].max(q.y)];
        }
        let step = [frame.panel[0] + frame.spacing, frame.panel[1] + frame.spacing];
        let start = [
            lo[0] + frame.margin + frame.phase[0] * step[0],
            lo[1] + frame.margin + frame.phase[1] * step[1],
        ];
        let end = [hi[0] - frame.margin, hi[1] - frame.margin];
        let count = |axis: usize| -> usize {
            let span = end[axis] - start[axis];
            if !span.is_finite() || span + 1e-9 < frame.panel[axis] {
                0
            } else {
                (((span - frame.panel[axis]) / step[axis] + 1e-9).floor() as usize).saturating_add(1)
            }
        };
        let (cols, rows) = (count(0), count(1));
        if cols.saturating_mul(rows) > MAX_CELLS {
            warn!("cell grid of {cols}x{rows} exceeds {MAX_CELLS} cells, skipped");
            return Self {
                rows: 0,
                cols: 0,
                cells: Vec::new(),
            };
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let c = Point2::new(
                    start[0] + col as f64 * step[0] + 0.5 * frame.panel[0],
                    start[1] + row as f64 * step[1] + 0.5 * frame.panel[1],
                );
                let rect =
                    OrientedRect::new(frame.unproject(c), frame.panel[0], frame.panel[1], frame.angle);
                cells.push(Cell { row, col, rect });
            }
        }
        Self { rows, cols, cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        (row < self.rows && col < self.cols).then(|| &self.cells[row * self.cols + col])
    }

    /// Row-major scan: top-to-bottom, left-to-right in the frame.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(angle: f64, phase: [f64; 2]) -> GridFrame {
        GridFrame {
            angle,
            pivot: [0.0, 0.0],
            panel: [10.0, 5.0],
            spacing: 1.0,
            margin: 2.0,
            phase,
        }
    }

    #[test]
    fn cell_counts_follow_step_and_margin() {
        let outline = [[0.0, 0.0], [48.0, 0.0], [48.0, 30.0], [0.0, 30.0]];
        let grid = CellGrid::build(&frame(0.0, [0.0, 0.0]), &outline);
        // 44 px of span: 10 + 11 * 3 = 43 fits 4 columns; 26 px: 5 + 6 * 3 = 23 fits 4 rows.
        assert_eq!((grid.cols, grid.rows), (4, 4));
        let first = grid.get(0, 0).expect("cell");
        assert!((first.rect.center[0] - 7.0).abs() < 1e-9);
        assert!((first.rect.center[1] - 4.5).abs() < 1e-9);
        assert!(grid.get(4, 0).is_none());
    }

    #[test]
    fn phase_shifts_the_grid() {
        let outline = [[0.0, 0.0], [48.0, 0.0], [48.0, 30.0], [0.0, 30.0]];
        let grid = CellGrid::build(&frame(0.0, [0.5, 0.0]), &outline);
        assert_eq!(grid.cols, 3);
        assert!((grid.get(0, 0).expect("cell").rect.center[0] - 12.5).abs() < 1e-9);
    }

    #[test]
    fn sub_pixel_cells_are_capped() {
        let outline = [[0.0, 0.0], [2000.0, 0.0], [2000.0, 2000.0], [0.0, 2000.0]];
        let f = GridFrame {
            panel: [0.5, 0.5],
            spacing: 0.0,
            margin: 0.0,
            ..frame(0.0, [0.0, 0.0])
        };
        let grid = CellGrid::build(&f, &outline);
        assert!(grid.is_empty());
        assert_eq!((grid.rows, grid.cols), (0, 0));
    }

    #[test]
    fn projection_round_trips_through_rotation() {
        let f = GridFrame {
            pivot: [5.0, -3.0],
            ..frame(0.7, [0.0, 0.0])
        };
        let p = [12.0, 4.0];
        let back = f.unproject(f.project(p));
        assert!((back[0] - p[0]).abs() < 1e-9 && (back[1] - p[1]).abs() < 1e-9);
    }
}
