//! Binary morphology with square structuring elements.
//!
//! A `(2r+1)²` square is separable, so each operator runs as a horizontal
//! then a vertical 1D pass over running window counts: O(W·H) regardless of
//! `r`. Samples outside the mask are ignored (neither foreground nor
//! background), so objects touching the border are not eroded by it.
use crate::image::BinaryMask;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Op {
    Dilate,
    Erode,
}

fn pass_1d(src: &[u8], dst: &mut [u8], r: usize, op: Op) {
    let n = src.len();
    if n == 0 {
        return;
    }
    let mut prefix = vec![0usize; n + 1];
    for i in 0..n {
        prefix[i + 1] = prefix[i] + (src[i] != 0) as usize;
    }
    for i in 0..n {
        let lo = i.saturating_sub(r);
        let hi = (i + r + 1).min(n);
        let on = prefix[hi] - prefix[lo];
        dst[i] = match op {
            Op::Dilate => (on > 0) as u8,
            Op::Erode => (on == hi - lo) as u8,
        };
    }
}

fn separable(mask: &BinaryMask, r: usize, op: Op) -> BinaryMask {
    if r == 0 || mask.w == 0 || mask.h == 0 {
        return mask.clone();
    }
    let (w, h) = (mask.w, mask.h);
    let mut horiz = mask.clone();
    for y in 0..h {
        let row = &mask.data[y * w..(y + 1) * w];
        pass_1d(row, &mut horiz.data[y * w..(y + 1) * w], r, op);
    }
    let mut out = horiz.clone();
    let mut col = vec![0u8; h];
    let mut col_out = vec![0u8; h];
    for x in 0..w {
        for y in 0..h {
            col[y] = horiz.data[y * w + x];
        }
        pass_1d(&col, &mut col_out, r, op);
        for y in 0..h {
            out.data[y * w + x] = col_out[y];
        }
    }
    out
}

pub fn dilate(mask: &BinaryMask, r: usize) -> BinaryMask {
    separable(mask, r, Op::Dilate)
}

pub fn erode(mask: &BinaryMask, r: usize) -> BinaryMask {
    separable(mask, r, Op::Erode)
}

/// Erosion followed by dilation: removes speckle narrower than `2r+1`.
pub fn open(mask: &BinaryMask, r: usize) -> BinaryMask {
    dilate(&erode(mask, r), r)
}

/// Dilation followed by erosion: bridges gaps narrower than `2r+1`.
pub fn close(mask: &BinaryMask, r: usize) -> BinaryMask {
    erode(&dilate(mask, r), r)
}

/// Erosion that treats everything outside the mask as background, so the
/// result shrinks away from the crop border too.
pub fn erode_with_border(mask: &BinaryMask, r: usize) -> BinaryMask {
    if r == 0 {
        return mask.clone();
    }
    let mut padded = BinaryMask::new(mask.w + 2 * r, mask.h + 2 * r);
    for y in 0..mask.h {
        for x in 0..mask.w {
            if mask.data[mask.idx(x, y)] != 0 {
                padded.set(x + r, y + r, true);
            }
        }
    }
    let eroded = erode(&padded, r);
    let mut out = BinaryMask::with_origin(mask.origin, mask.w, mask.h);
    for y in 0..mask.h {
        for x in 0..mask.w {
            if eroded.data[eroded.idx(x + r, y + r)] != 0 {
                out.set(x, y, true);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> BinaryMask {
        let h = rows.len();
        let w = rows[0].len();
        let mut m = BinaryMask::new(w, h);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                m.set(x, y, ch == '#');
            }
        }
        m
    }

    #[test]
    fn open_removes_isolated_pixel() {
        let m = mask_from(&[
            ".......", ".#.....", ".......", "...###.", "...###.", "...###.", ".......",
        ]);
        let opened = open(&m, 1);
        assert!(!opened.get(1, 1));
        assert_eq!(opened.count(), 9);
    }

    #[test]
    fn close_bridges_one_pixel_gap() {
        let m = mask_from(&["........", ".###.###", ".###.###", ".###.###", "........"]);
        let closed = close(&m, 1);
        assert!(closed.get(4, 2));
    }

    #[test]
    fn border_erosion_shrinks_from_crop_edge() {
        let m = mask_from(&["#####", "#####", "#####"]);
        assert_eq!(erode(&m, 1).count(), 15);
        let shrunk = erode_with_border(&m, 1);
        assert_eq!(shrunk.count(), 3);
        assert!(shrunk.get(2, 1));
    }
}
