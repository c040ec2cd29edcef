//! Nearest-neighbor search over the vertices of a domain.

use crate::geometry::Point2D;
use crate::Node;

/// Below this many points, subtrees are built on the current thread.
const SEQUENTIAL_THRESHOLD: usize = 4096;

/// A 2D k-d tree.
///
/// The tree is implicit: `permutation` holds point ids such that, for any
/// subslice covering a subtree, the middle item is the splitting point, items
/// on its left are below it along the splitting axis and items on its right
/// are above it.  The splitting axis alternates between x and y with depth,
/// like a recursive coordinate bisection that never stops.
#[derive(Clone, Debug)]
pub struct KdTree {
    points: Vec<Point2D>,
    permutation: Vec<usize>,
}

impl KdTree {
    pub fn new(nodes: &[Node]) -> Self {
        let points: Vec<Point2D> = nodes.iter().map(|node| Point2D::from(*node)).collect();
        let mut permutation: Vec<usize> = (0..points.len()).collect();
        build(&points, &mut permutation, 0);
        Self {
            points,
            permutation,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The coordinates stored in the tree, indexed by point id.
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// The id of the point nearest to `query`, `None` if the tree is empty.
    ///
    /// When several points are at the same distance, the smallest id wins.
    pub fn nearest(&self, query: Node) -> Option<usize> {
        let mut best = None;
        self.nearest_in(&self.permutation, 0, Point2D::from(query), &mut best);
        best.map(|(_, id)| id)
    }

    fn nearest_in(
        &self,
        subtree: &[usize],
        depth: usize,
        query: Point2D,
        best: &mut Option<(f64, usize)>,
    ) {
        if subtree.is_empty() {
            return;
        }
        let mid = subtree.len() / 2;
        let id = subtree[mid];
        let point = self.points[id];

        let distance = (point - query).norm_squared();
        let is_better = match *best {
            None => true,
            Some((best_distance, best_id)) => {
                distance < best_distance || (distance == best_distance && id < best_id)
            }
        };
        if is_better {
            *best = Some((distance, id));
        }

        let axis = depth % 2;
        let offset = query[axis] - point[axis];
        let (below, above) = (&subtree[..mid], &subtree[mid + 1..]);
        let (near, far) = if offset < 0.0 {
            (below, above)
        } else {
            (above, below)
        };

        self.nearest_in(near, depth + 1, query, best);
        // Equal distances must still be visited for the id tie-break.
        if best.map_or(true, |(best_distance, _)| offset * offset <= best_distance) {
            self.nearest_in(far, depth + 1, query, best);
        }
    }
}

fn build(points: &[Point2D], permutation: &mut [usize], depth: usize) {
    if permutation.len() <= 1 {
        return;
    }
    let axis = depth % 2;
    let mid = permutation.len() / 2;
    permutation.select_nth_unstable_by(mid, |a, b| points[*a][axis].total_cmp(&points[*b][axis]));

    let (below, rest) = permutation.split_at_mut(mid);
    let above = &mut rest[1..];
    if below.len() + above.len() < SEQUENTIAL_THRESHOLD {
        build(points, below, depth + 1);
        build(points, above, depth + 1);
    } else {
        rayon::join(
            || build(points, below, depth + 1),
            || build(points, above, depth + 1),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gen_point_sample() -> Vec<Node> {
        vec![
            Node::new(4., 6.),
            Node::new(9., 5.),
            Node::new(-1.2, 7.),
            Node::new(0., 0.),
            Node::new(3., 9.),
            Node::new(-4., 3.),
            Node::new(1., 2.),
        ]
    }

    fn brute_force(nodes: &[Node], query: Node) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        for (id, node) in nodes.iter().enumerate() {
            let distance = node.squared_distance(query);
            if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, id));
            }
        }
        best.map(|(_, id)| id)
    }

    #[test]
    fn test_nearest_basic() {
        let tree = KdTree::new(&gen_point_sample());
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.nearest(Node::new(0.1, -0.2)), Some(3));
        assert_eq!(tree.nearest(Node::new(10., 10.)), Some(1));
        assert_eq!(tree.nearest(Node::new(-5., 3.5)), Some(5));
        assert_eq!(tree.nearest(Node::new(3.9, 6.2)), Some(0));
    }

    #[test]
    fn test_nearest_exact_hit() {
        let nodes = gen_point_sample();
        let tree = KdTree::new(&nodes);
        for (id, node) in nodes.iter().enumerate() {
            assert_eq!(tree.nearest(*node), Some(id));
        }
    }

    #[test]
    fn test_nearest_tie_breaks_on_smallest_id() {
        let nodes = vec![
            Node::new(1., 0.),
            Node::new(0., 1.),
            Node::new(-1., 0.),
            Node::new(0., -1.),
        ];
        let tree = KdTree::new(&nodes);
        assert_eq!(tree.nearest(Node::new(0., 0.)), Some(0));
    }

    #[test]
    fn test_empty() {
        let tree = KdTree::new(&[]);
        assert!(tree.is_empty());
        assert_eq!(tree.nearest(Node::new(0., 0.)), None);
    }

    proptest!(
        #[test]
        fn test_nearest_matches_brute_force(
            coordinates in prop::collection::vec((-100.0..100.0_f64, -100.0..100.0_f64), 1..300),
            query in (-150.0..150.0_f64, -150.0..150.0_f64),
        ) {
            let nodes: Vec<Node> = coordinates.into_iter().map(Node::from).collect();
            let query = Node::from(query);
            let tree = KdTree::new(&nodes);
            let found = tree.nearest(query).unwrap();
            let expected = brute_force(&nodes, query).unwrap();
            // Same distance; ids may differ only on exact ties.
            prop_assert_eq!(
                nodes[found].squared_distance(query),
                nodes[expected].squared_distance(query),
            );
            prop_assert!(found <= expected);
        }
    );
}
