//! Binary raster with an origin offset into the full image.
//!
//! Pass masks cover the whole level (`origin == [0, 0]`); region and
//! obstacle masks are bounding-box crops so per-region work stays local.

/// Owned 0/1 mask, row-major, `stride == w`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    /// Top-left corner of the crop in full-image pixel coordinates.
    pub origin: [usize; 2],
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl BinaryMask {
    pub fn new(w: usize, h: usize) -> Self {
        Self::with_origin([0, 0], w, h)
    }

    pub fn with_origin(origin: [usize; 2], w: usize, h: usize) -> Self {
        Self {
            origin,
            w,
            h,
            data: vec![0; w * h],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    /// Local lookup; out-of-bounds reads as background.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return false;
        }
        self.data[self.idx(x as usize, y as usize)] != 0
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, on: bool) {
        let i = self.idx(x, y);
        self.data[i] = on as u8;
    }

    /// Lookup in full-image coordinates.
    #[inline]
    pub fn get_global(&self, gx: usize, gy: usize) -> bool {
        let x = gx as isize - self.origin[0] as isize;
        let y = gy as isize - self.origin[1] as isize;
        self.get(x, y)
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Iterate set pixels as full-image coordinates, row-major.
    pub fn iter_set(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.data.iter().enumerate().filter_map(move |(i, &v)| {
            (v != 0).then(|| (self.origin[0] + i % self.w, self.origin[1] + i / self.w))
        })
    }

    /// Pixel-wise `self AND NOT other`; `other` may have any origin.
    pub fn subtract(&self, other: &BinaryMask) -> BinaryMask {
        let mut out = self.clone();
        for y in 0..self.h {
            for x in 0..self.w {
                let gx = self.origin[0] + x;
                let gy = self.origin[1] + y;
                if other.get_global(gx, gy) {
                    out.set(x, y, false);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_lookup_respects_origin() {
        let mut m = BinaryMask::with_origin([10, 5], 3, 2);
        m.set(1, 1, true);
        assert!(m.get_global(11, 6));
        assert!(!m.get_global(1, 1));
        assert_eq!(m.iter_set().collect::<Vec<_>>(), vec![(11, 6)]);
    }

    #[test]
    fn subtract_clears_overlap() {
        let mut a = BinaryMask::new(4, 1);
        a.data = vec![1, 1, 1, 1];
        let mut b = BinaryMask::with_origin([2, 0], 2, 1);
        b.data = vec![1, 0];
        assert_eq!(a.subtract(&b).data, vec![1, 1, 0, 1]);
    }
}
