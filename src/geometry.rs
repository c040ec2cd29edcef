//! Point, segment and triangle distances.

use crate::Node;
use nalgebra::Matrix2;
use nalgebra::Vector2;

pub type Point2D = Vector2<f64>;

/// Euclidean distance from `p` to the segment `[a, b]`.
///
/// `p` is projected onto the line through `a` and `b`, and the projection is
/// clamped to the segment.  A segment reduced to a point yields the distance
/// to that point.
///
/// # Example
///
/// ```rust
/// use polydomain::{distance_to_segment, Node};
///
/// let d = distance_to_segment(Node::new(5.0, 0.0), Node::new(0.0, 1.0), Node::new(1.0, 0.0));
/// assert_eq!(d, 4.0);
/// ```
pub fn distance_to_segment(p: Node, a: Node, b: Node) -> f64 {
    let (p, a, b) = (Point2D::from(p), Point2D::from(a), Point2D::from(b));
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + t * ab)).norm()
}

/// Solves `a + t1·(b - a) + t2·(c - a) = p` for `(t1, t2)`.
///
/// Returns `None` when the triangle has no area.
fn triangle_parameters(p: Point2D, a: Point2D, b: Point2D, c: Point2D) -> Option<(f64, f64)> {
    let system = Matrix2::from_columns(&[b - a, c - a]);
    let t = system.try_inverse()? * (p - a);
    Some((t.x, t.y))
}

/// Distance from `p` to the triangle `(a, b, c)`.
///
/// The edge measured against is picked from the parameters of `p` in the
/// triangle's affine frame, in this order: inside the triangle gives zero,
/// then `t1 < 0` picks `[a, c]`, then `t2 < 0` picks `[a, b]`, otherwise
/// `[b, c]`.  This is exact for triangles without an obtuse angle; outside an
/// obtuse triangle it can overestimate the distance.
///
/// The branch order is part of the contract of
/// [`MeshDomain::distance_to_element`](crate::MeshDomain::distance_to_element)
/// and of closest-element ranking.  Do not replace it with an exact
/// closest-point computation.
///
/// Returns `None` when the triangle has no area.
pub(crate) fn distance_to_triangle(p: Node, [a, b, c]: [Node; 3]) -> Option<f64> {
    let (t1, t2) = triangle_parameters(p.into(), a.into(), b.into(), c.into())?;
    let distance = if (0.0..=1.0).contains(&t1) && (0.0..=1.0).contains(&t2) && t1 + t2 <= 1.0 {
        0.0
    } else if t1 < 0.0 {
        distance_to_segment(p, a, c)
    } else if t2 < 0.0 {
        distance_to_segment(p, a, b)
    } else {
        distance_to_segment(p, b, c)
    };
    Some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_ulps_eq;

    const UNIT: [Node; 3] = [Node::new(0.0, 0.0), Node::new(1.0, 0.0), Node::new(0.0, 1.0)];

    #[test]
    fn test_distance_to_segment() {
        let a = Node::new(0.0, 1.0);
        let b = Node::new(1.0, 0.0);
        assert_eq!(distance_to_segment(Node::new(5.0, 0.0), a, b), 4.0);
        assert_eq!(distance_to_segment(Node::new(0.0, 0.0), a, b), f64::sqrt(0.5));
        assert_eq!(distance_to_segment(Node::new(1.0, 0.0), a, b), 0.0);
    }

    #[test]
    fn test_distance_to_point_segment() {
        let a = Node::new(1.0, 1.0);
        assert_eq!(distance_to_segment(Node::new(4.0, 5.0), a, a), 5.0);
    }

    #[test]
    fn test_triangle_parameters() {
        let (t1, t2) = triangle_parameters(
            Point2D::new(3.0, 2.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(3.0, 1.0),
            Point2D::new(1.0, 3.0),
        )
        .unwrap();
        assert_ulps_eq!(t1, 1.0);
        assert_ulps_eq!(t2, 0.5);
    }

    #[test]
    fn test_distance_to_triangle() {
        assert_ulps_eq!(distance_to_triangle(Node::new(0.0, -1.0), UNIT).unwrap(), 1.0);
        assert_ulps_eq!(distance_to_triangle(Node::new(-0.42, 0.0), UNIT).unwrap(), 0.42);
        assert_eq!(distance_to_triangle(Node::new(0.25, 0.25), UNIT).unwrap(), 0.0);
        assert_ulps_eq!(
            distance_to_triangle(Node::new(1.0, 1.0), UNIT).unwrap(),
            f64::sqrt(0.5),
        );
    }

    #[test]
    fn test_distance_on_boundary_is_zero() {
        for p in [
            Node::new(0.0, 0.0),
            Node::new(0.5, 0.0),
            Node::new(0.0, 0.5),
            Node::new(0.5, 0.5),
        ] {
            assert_eq!(distance_to_triangle(p, UNIT).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_both_parameters_negative_uses_first_edge() {
        // t1 < 0 and t2 < 0: measured against [a, c], which reaches `a`.
        let d = distance_to_triangle(Node::new(-3.0, -4.0), UNIT).unwrap();
        assert_ulps_eq!(d, 5.0);
    }

    #[test]
    fn test_obtuse_triangle_overestimates() {
        let triangle = [Node::new(0.0, 0.0), Node::new(2.0, 1.0), Node::new(4.0, 0.0)];
        // The closest point is the vertex (4, 0) at distance sqrt(20), but t2 < 0
        // makes the computation measure against the edge [(0, 0), (2, 1)].
        // Element distances keep this branch order, so 5 is the expected
        // result, not sqrt(20).
        let d = distance_to_triangle(Node::new(6.0, 4.0), triangle).unwrap();
        assert_ulps_eq!(d, 5.0);
    }

    #[test]
    fn test_degenerate_triangle() {
        let flat = [Node::new(0.0, 0.0), Node::new(1.0, 1.0), Node::new(2.0, 2.0)];
        assert_eq!(distance_to_triangle(Node::new(0.0, 1.0), flat), None);
    }
}
