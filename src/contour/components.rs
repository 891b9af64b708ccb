use crate::image::BinaryMask;
use nalgebra::{Matrix2, SymmetricEigen};

const NEIGH_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Per-pixel component labels (0 = background), same layout as the mask.
#[derive(Clone, Debug)]
pub struct Labels {
    pub origin: [usize; 2],
    pub w: usize,
    pub h: usize,
    pub labels: Vec<u32>,
}

impl Labels {
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> u32 {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return 0;
        }
        self.labels[y as usize * self.w + x as usize]
    }
}

/// Statistics of one 8-connected component, in local mask coordinates.
#[derive(Clone, Debug)]
pub struct Component {
    pub label: u32,
    pub pixel_count: usize,
    /// First pixel in row-major order (top-most, then left-most).
    pub seed: [usize; 2],
    /// `[x0, y0, x1, y1]`, exclusive upper bounds.
    pub bbox: [usize; 4],
    /// Touches the outer frame of the mask.
    pub touches_frame: bool,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
}

impl Component {
    fn start(label: u32, x: usize, y: usize) -> Self {
        Self {
            label,
            pixel_count: 0,
            seed: [x, y],
            bbox: [x, y, x + 1, y + 1],
            touches_frame: false,
            sum_x: 0.0,
            sum_y: 0.0,
            sum_xx: 0.0,
            sum_yy: 0.0,
            sum_xy: 0.0,
        }
    }

    fn push(&mut self, x: usize, y: usize, w: usize, h: usize) {
        self.pixel_count += 1;
        let xf = x as f64;
        let yf = y as f64;
        self.sum_x += xf;
        self.sum_y += yf;
        self.sum_xx += xf * xf;
        self.sum_yy += yf * yf;
        self.sum_xy += xf * yf;
        self.bbox[0] = self.bbox[0].min(x);
        self.bbox[1] = self.bbox[1].min(y);
        self.bbox[2] = self.bbox[2].max(x + 1);
        self.bbox[3] = self.bbox[3].max(y + 1);
        if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
            self.touches_frame = true;
        }
    }

    /// Pixel-centre centroid in local coordinates.
    pub fn centroid(&self) -> [f64; 2] {
        let n = self.pixel_count.max(1) as f64;
        [self.sum_x / n + 0.5, self.sum_y / n + 0.5]
    }

    /// Ratio of the principal standard deviations (`>= 1`); 1 for a disc or
    /// square, large for thin streaks.
    pub fn elongation(&self) -> f64 {
        if self.pixel_count < 2 {
            return 1.0;
        }
        let n = self.pixel_count as f64;
        let mx = self.sum_x / n;
        let my = self.sum_y / n;
        // Each pixel is a unit square, not a point: add its own variance.
        let cxx = self.sum_xx / n - mx * mx + 1.0 / 12.0;
        let cyy = self.sum_yy / n - my * my + 1.0 / 12.0;
        let cxy = self.sum_xy / n - mx * my;
        let eig = SymmetricEigen::new(Matrix2::new(cxx, cxy, cxy, cyy));
        let l0 = eig.eigenvalues[0].max(0.0);
        let l1 = eig.eigenvalues[1].max(0.0);
        let (hi, lo) = if l0 >= l1 { (l0, l1) } else { (l1, l0) };
        if lo <= f64::EPSILON {
            return f64::INFINITY;
        }
        (hi / lo).sqrt()
    }
}

/// Flood-fill labelling with 8-connectivity. Labels start at 1 and follow
/// the row-major order of each component's seed pixel.
pub fn label_components(mask: &BinaryMask) -> (Labels, Vec<Component>) {
    let (w, h) = (mask.w, mask.h);
    let mut labels = vec![0u32; w * h];
    let mut comps = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if mask.data[idx] == 0 || labels[idx] != 0 {
                continue;
            }
            let label = comps.len() as u32 + 1;
            let mut comp = Component::start(label, x, y);
            labels[idx] = label;
            stack.push((x, y));
            while let Some((cx, cy)) = stack.pop() {
                comp.push(cx, cy, w, h);
                for (dx, dy) in NEIGH_OFFSETS {
                    let nx = cx as isize + dx;
                    let ny = cy as isize + dy;
                    if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                        continue;
                    }
                    let nidx = ny as usize * w + nx as usize;
                    if mask.data[nidx] != 0 && labels[nidx] == 0 {
                        labels[nidx] = label;
                        stack.push((nx as usize, ny as usize));
                    }
                }
            }
            comps.push(comp);
        }
    }
    (
        Labels {
            origin: mask.origin,
            w,
            h,
            labels,
        },
        comps,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_pixels_join_one_component() {
        let mut m = BinaryMask::new(4, 4);
        m.set(0, 0, true);
        m.set(1, 1, true);
        m.set(3, 3, true);
        let (labels, comps) = label_components(&m);
        assert_eq!(comps.len(), 2);
        assert_eq!(labels.get(1, 1), 1);
        assert_eq!(comps[0].pixel_count, 2);
        assert!(comps[1].touches_frame);
    }

    #[test]
    fn elongation_separates_square_from_streak() {
        let mut m = BinaryMask::new(20, 20);
        for y in 2..6 {
            for x in 2..6 {
                m.set(x, y, true);
            }
        }
        for x in 0..18 {
            m.set(x, 15, true);
        }
        let (_, comps) = label_components(&m);
        assert!((comps[0].elongation() - 1.0).abs() < 1e-6);
        assert!(comps[1].elongation() > 10.0);
    }
}
