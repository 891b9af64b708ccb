use super::{coord, to_point, OrientedRect, Point};
use crate::angle::normalize_half_pi;
use crate::image::BinaryMask;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Area, BooleanOps, BoundingRect, Centroid, Contains, ConvexHull, EuclideanDistance,
    EuclideanLength, Intersects, MapCoords, MinimumRotatedRect,
};
use geo_types::{Line, LineString};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// What a polygon stands for. Geometry never branches on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Roof,
    Obstacle,
    Panel,
}

/// Axis-aligned bounds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 2],
            max: [f64::NEG_INFINITY; 2],
        }
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Overlap test with an optional inflation of `self`.
    pub fn overlaps(&self, other: &Aabb, inflate: f64) -> bool {
        self.min[0] - inflate <= other.max[0]
            && self.max[0] + inflate >= other.min[0]
            && self.min[1] - inflate <= other.max[1]
            && self.max[1] + inflate >= other.min[1]
    }
}

/// Tagged simple polygon without holes. The exterior ring is kept closed
/// inside a [`geo_types::Polygon`]; [`Polygon::points`] reports it without
/// the repeated closing vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    kind: ShapeKind,
    shape: geo_types::Polygon<f64>,
}

impl Serialize for Polygon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Polygon", 2)?;
        s.serialize_field("kind", &self.kind)?;
        s.serialize_field("points", &self.points())?;
        s.end()
    }
}

impl Polygon {
    /// Builds a ring, dropping consecutive duplicates and an explicit
    /// closing vertex.
    pub fn new(kind: ShapeKind, points: Vec<Point>) -> Self {
        let mut ring: Vec<Point> = Vec::with_capacity(points.len() + 1);
        for p in points {
            if ring.last().map_or(true, |q| !same(*q, p)) {
                ring.push(p);
            }
        }
        while ring.len() > 1 && same(ring[0], ring[ring.len() - 1]) {
            ring.pop();
        }
        let exterior: LineString<f64> = ring.into_iter().map(coord).collect();
        Self {
            kind,
            shape: geo_types::Polygon::new(exterior, Vec::new()),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn as_geo(&self) -> &geo_types::Polygon<f64> {
        &self.shape
    }

    /// Vertex ring without the closing vertex.
    pub fn points(&self) -> Vec<Point> {
        self.shape.exterior().0[..self.len()]
            .iter()
            .copied()
            .map(to_point)
            .collect()
    }

    pub fn len(&self) -> usize {
        let n = self.shape.exterior().0.len();
        if n <= 1 {
            n
        } else {
            n - 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Edges as `(start, end)` pairs, closing edge last.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.shape
            .exterior()
            .lines()
            .map(|l| (to_point(l.start), to_point(l.end)))
    }

    /// Positive for counter-clockwise rings in a y-up frame.
    pub fn signed_area(&self) -> f64 {
        if self.len() < 3 {
            return 0.0;
        }
        self.shape.signed_area()
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn perimeter(&self) -> f64 {
        self.shape.exterior().euclidean_length()
    }

    /// Area centroid; falls back to the vertex mean for degenerate rings.
    pub fn centroid(&self) -> Point {
        if self.area() > 1e-12 {
            if let Some(c) = self.shape.centroid() {
                return [c.x(), c.y()];
            }
        }
        let pts = self.points();
        let n = pts.len().max(1) as f64;
        let (sx, sy) = pts
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        [sx / n, sy / n]
    }

    pub fn bounds(&self) -> Aabb {
        self.shape.bounding_rect().map_or_else(Aabb::empty, |r| Aabb {
            min: to_point(r.min()),
            max: to_point(r.max()),
        })
    }

    /// Strict interior test. Points exactly on the boundary are outside;
    /// use [`Polygon::covers_point`] when the boundary must count as inside.
    pub fn contains_point(&self, p: Point) -> bool {
        self.shape.contains(&geo_types::Point::from(coord(p)))
    }

    /// Minimum distance from `p` to the boundary.
    pub fn distance_to_boundary(&self, p: Point) -> f64 {
        if self.is_empty() {
            return f64::INFINITY;
        }
        self.shape
            .exterior()
            .euclidean_distance(&geo_types::Point::from(coord(p)))
    }

    /// Interior or boundary (within `1e-9`).
    pub fn covers_point(&self, p: Point) -> bool {
        self.shape.intersects(&coord(p)) || self.distance_to_boundary(p) <= 1e-9
    }

    /// True when `inner` lies entirely inside `self` (boundary contact allowed).
    pub fn contains_polygon(&self, inner: &Polygon) -> bool {
        if inner.is_empty() || self.len() < 3 {
            return false;
        }
        self.shape.contains(&inner.shape)
    }

    /// Closed-set intersection: shared boundary points count.
    pub fn intersects(&self, other: &Polygon) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if !self.bounds().overlaps(&other.bounds(), 0.0) {
            return false;
        }
        self.shape.intersects(&other.shape)
    }

    /// Minimum distance between the two boundaries (0 when they touch).
    pub fn boundary_distance(&self, other: &Polygon) -> f64 {
        if self.is_empty() || other.is_empty() {
            return f64::INFINITY;
        }
        self.shape
            .exterior()
            .euclidean_distance(other.shape.exterior())
    }

    /// Area of the overlap of two polygons.
    pub fn intersection_area(&self, other: &Polygon) -> f64 {
        if self.len() < 3 || other.len() < 3 || !self.bounds().overlaps(&other.bounds(), 0.0) {
            return 0.0;
        }
        self.shape.intersection(&other.shape).unsigned_area()
    }

    /// At least three vertices, positive area and no contact between
    /// non-adjacent edges. Adjacent edges may only share their common vertex.
    pub fn is_simple(&self) -> bool {
        let n = self.len();
        if n < 3 || self.area() <= 1e-9 {
            return false;
        }
        let edges: Vec<Line<f64>> = self.shape.exterior().lines().collect();
        for i in 0..n {
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                match line_intersection(edges[i], edges[j]) {
                    None => {}
                    Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                    Some(LineIntersection::Collinear { intersection })
                        if adjacent && intersection.start == intersection.end => {}
                    Some(_) => return false,
                }
            }
        }
        true
    }

    /// Convex hull with the same kind.
    pub fn convex_hull(&self) -> Polygon {
        Polygon {
            kind: self.kind,
            shape: self.shape.convex_hull(),
        }
    }

    /// Minimum-area enclosing rectangle, `None` for degenerate input.
    pub fn min_area_rect(&self) -> Option<OrientedRect> {
        if self.len() < 3 {
            return None;
        }
        let rect = self.shape.minimum_rotated_rect()?;
        let c = &rect.exterior().0;
        if c.len() < 4 {
            return None;
        }
        let (c0, c1, c2) = (to_point(c[0]), to_point(c[1]), to_point(c[2]));
        let u = [c1[0] - c0[0], c1[1] - c0[1]];
        let v = [c2[0] - c1[0], c2[1] - c1[1]];
        let center = [0.5 * (c0[0] + c2[0]), 0.5 * (c0[1] + c2[1])];
        Some(OrientedRect::new(
            center,
            u[0].hypot(u[1]),
            v[0].hypot(v[1]),
            normalize_half_pi(u[1].atan2(u[0])),
        ))
    }

    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Polygon {
        Polygon {
            kind: self.kind,
            shape: self.shape.map_coords(|c| coord(f(to_point(c)))),
        }
    }

    pub fn scaled(&self, sx: f64, sy: f64) -> Polygon {
        self.map_points(|p| [p[0] * sx, p[1] * sy])
    }

    /// Half-open pixel ranges `[x0, x1)` of row `y` whose pixel centres lie
    /// inside the polygon.
    pub fn pixel_spans(&self, y: i64) -> Vec<(i64, i64)> {
        let yc = y as f64 + 0.5;
        let mut xs: Vec<f64> = self
            .edges()
            .filter(|(a, b)| (a[1] <= yc) != (b[1] <= yc))
            .map(|(a, b)| a[0] + (yc - a[1]) * (b[0] - a[0]) / (b[1] - a[1]))
            .collect();
        xs.sort_by(|a, b| a.total_cmp(b));
        xs.chunks_exact(2)
            .filter_map(|pair| {
                let start = (pair[0] - 0.5).ceil() as i64;
                let end = (pair[1] - 0.5).ceil() as i64;
                (end > start).then_some((start, end))
            })
            .collect()
    }

    fn pixel_rows(&self) -> std::ops::Range<i64> {
        if self.len() < 3 {
            return 0..0;
        }
        let b = self.bounds();
        (b.min[1].floor() as i64)..(b.max[1].ceil() as i64 + 1)
    }

    /// Number of pixel centres covered by the polygon.
    pub fn pixel_area(&self) -> usize {
        self.pixel_rows()
            .map(|y| {
                self.pixel_spans(y)
                    .iter()
                    .map(|(a, b)| (b - a) as usize)
                    .sum::<usize>()
            })
            .sum()
    }

    /// Fraction of `self`'s pixel centres also covered by `other`.
    pub fn overlap_fraction(&self, other: &Polygon) -> f64 {
        let own = self.pixel_area();
        if own == 0 || !self.bounds().overlaps(&other.bounds(), 1.0) {
            return 0.0;
        }
        let mut shared = 0usize;
        for y in self.pixel_rows() {
            let ours = self.pixel_spans(y);
            if ours.is_empty() {
                continue;
            }
            let theirs = other.pixel_spans(y);
            for &(a0, a1) in &ours {
                for &(b0, b1) in &theirs {
                    let lo = a0.max(b0);
                    let hi = a1.min(b1);
                    if hi > lo {
                        shared += (hi - lo) as usize;
                    }
                }
            }
        }
        shared as f64 / own as f64
    }

    /// Rasterize into a mask cropped to the polygon's bounds inside a
    /// `width × height` image.
    pub fn rasterize(&self, width: usize, height: usize) -> BinaryMask {
        if self.len() < 3 {
            return BinaryMask::new(0, 0);
        }
        let b = self.bounds();
        let x0 = (b.min[0].floor().max(0.0) as usize).min(width);
        let y0 = (b.min[1].floor().max(0.0) as usize).min(height);
        let x1 = (b.max[0].ceil().max(0.0) as usize).min(width);
        let y1 = (b.max[1].ceil().max(0.0) as usize).min(height);
        let mut mask = BinaryMask::with_origin([x0, y0], x1.saturating_sub(x0), y1.saturating_sub(y0));
        for ly in 0..mask.h {
            let gy = (y0 + ly) as i64;
            for (s, e) in self.pixel_spans(gy) {
                let s = s.max(x0 as i64);
                let e = e.min(x1 as i64);
                for gx in s..e {
                    mask.set(gx as usize - x0, ly, true);
                }
            }
        }
        mask
    }
}

fn same(a: Point, b: Point) -> bool {
    (a[0] - b[0]).hypot(a[1] - b[1]) <= 1e-12
}
