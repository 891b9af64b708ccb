use crate::geometry::{coord, to_point, Point};
use geo::Simplify;
use geo_types::LineString;

fn chain(points: impl Iterator<Item = Point>) -> LineString<f64> {
    points.map(coord).collect()
}

/// Douglas–Peucker on a closed ring. The ring is split at vertex 0 and the
/// vertex farthest from it; each half is simplified independently so the
/// result does not depend on a single arbitrary anchor segment.
pub fn simplify_closed(ring: &[Point], epsilon: f64) -> Vec<Point> {
    let n = ring.len();
    if n <= 3 || epsilon <= 0.0 {
        return ring.to_vec();
    }
    let dist = |i: usize| (ring[i][0] - ring[0][0]).hypot(ring[i][1] - ring[0][1]);
    let far = (1..n)
        .max_by(|&a, &b| dist(a).total_cmp(&dist(b)).then(b.cmp(&a)))
        .unwrap_or(n / 2);

    let head = chain(ring[..=far].iter().copied()).simplify(&epsilon);
    let tail = chain(ring[far..].iter().chain(std::iter::once(&ring[0])).copied())
        .simplify(&epsilon);

    // `head` ends where `tail` starts; `tail` ends on vertex 0 again.
    let tail_len = tail.0.len();
    head.0
        .into_iter()
        .chain(tail.0.into_iter().take(tail_len.saturating_sub(1)).skip(1))
        .map(to_point)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staircase_collapses_to_diagonal() {
        // Triangle whose hypotenuse is a pixel staircase.
        let mut ring = vec![[0.0, 0.0]];
        for i in 0..10 {
            let i = i as f64;
            ring.push([i + 1.0, i]);
            ring.push([i + 1.0, i + 1.0]);
        }
        ring.push([0.0, 10.0]);
        let simplified = simplify_closed(&ring, 1.0);
        assert_eq!(simplified, vec![[0.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
    }

    #[test]
    fn square_survives() {
        let sq = vec![[0.0, 0.0], [5.0, 0.0], [5.0, 5.0], [0.0, 5.0]];
        assert_eq!(simplify_closed(&sq, 1.0), sq);
    }

    #[test]
    fn zero_epsilon_is_identity() {
        let ring = vec![[0.0, 0.0], [1.0, 0.1], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        assert_eq!(simplify_closed(&ring, 0.0), ring);
    }
}
