use super::components::{Component, Labels};
use crate::geometry::Point;

/// Pixel diagonal to a lattice vertex: `s > 0` selects the pixel on the
/// positive side of the vertex coordinate.
#[inline]
fn side(v: isize, s: isize) -> isize {
    if s > 0 {
        v
    } else {
        v - 1
    }
}

/// Follow the outer boundary of `comp` along pixel edges, keeping the
/// component on the right-hand side (image frame, y down). Returns only the
/// corner vertices, offset into full-image coordinates.
///
/// Starts at the top-left corner of the seed pixel heading east. Diagonal
/// contacts are walked around, matching the 8-connected labelling.
pub fn trace_outer_boundary(labels: &Labels, comp: &Component) -> Vec<Point> {
    let fg = |x: isize, y: isize| labels.get(x, y) == comp.label;
    let start = (comp.seed[0] as isize, comp.seed[1] as isize);
    let mut v = start;
    let mut d: (isize, isize) = (1, 0);
    let mut corners = vec![start];
    let limit = 4 * (labels.w + 1) * (labels.h + 1) + 8;

    for _ in 0..limit {
        v = (v.0 + d.0, v.1 + d.1);
        if v == start {
            break;
        }
        let r = (-d.1, d.0);
        let ahead_left = fg(side(v.0, d.0 - r.0), side(v.1, d.1 - r.1));
        let ahead_right = fg(side(v.0, d.0 + r.0), side(v.1, d.1 + r.1));
        let next = if ahead_left {
            (d.1, -d.0)
        } else if ahead_right {
            d
        } else {
            r
        };
        if next != d {
            corners.push(v);
            d = next;
        }
    }

    let ox = labels.origin[0] as f64;
    let oy = labels.origin[1] as f64;
    corners
        .into_iter()
        .map(|(x, y)| [x as f64 + ox, y as f64 + oy])
        .collect()
}
