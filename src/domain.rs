use crate::files;
use crate::generate;
use crate::geometry;
use crate::spatial::KdTree;
use crate::Element;
use crate::Error;
use crate::Node;
use itertools::Itertools as _;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;

/// Result of a closest-element query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Closest {
    /// Id of the closest element.
    pub element: usize,
    /// Distance between the query point and that element.
    pub distance: f64,
}

/// A polygonal domain made of triangular elements.
///
/// All adjacency relations are computed once, on construction, and stored as
/// dense arrays indexed by id.  Each relation lists ids in ascending order.
/// The domain cannot be modified afterwards, so it can be queried from
/// several threads at once.
#[derive(Clone, Debug)]
pub struct MeshDomain {
    elements: Vec<Element>,
    nodes: Vec<Node>,
    node_tree: KdTree,

    /// vertex -> elements whose triangle includes the vertex.
    containing_elements: Vec<Vec<usize>>,
    /// element -> elements sharing at least one vertex with it, itself excluded.
    vertex_adjacent_elements: Vec<Vec<usize>>,
    /// element -> elements sharing exactly two vertices with it.
    edge_adjacent_elements: Vec<Vec<usize>>,
    /// vertex -> vertices sharing a triangle with it, itself included.
    adjacent_vertices: Vec<Vec<usize>>,
}

impl MeshDomain {
    /// Builds a domain and its adjacency relations.
    ///
    /// The element at position `i` must have id `i`, and every vertex id must
    /// be a valid index into `nodes`.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), polydomain::Error> {
    /// use polydomain::{Element, MeshDomain, Node};
    ///
    /// let domain = MeshDomain::new(
    ///     vec![Element::new(0, &[0, 1, 2])?, Element::new(1, &[1, 2, 3])?],
    ///     vec![
    ///         Node::new(0.0, 0.0),
    ///         Node::new(1.0, 0.0),
    ///         Node::new(0.0, 1.0),
    ///         Node::new(1.0, 1.0),
    ///     ],
    /// )?;
    /// assert_eq!(domain.adjacent_vertices(0)?, &[0, 1, 2]);
    /// assert_eq!(domain.adjacent_elements(1, true)?, &[0]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(elements: Vec<Element>, nodes: Vec<Node>) -> Result<Self, Error> {
        let span = tracing::info_span!("build domain", elements = elements.len(), nodes = nodes.len());
        let _enter = span.enter();

        for (position, element) in elements.iter().enumerate() {
            if element.id() != position {
                return Err(Error::ElementIdMismatch {
                    expected: position,
                    actual: element.id(),
                });
            }
            if let Some(vertex) = element.vertices().into_iter().find(|v| nodes.len() <= *v) {
                return Err(Error::UnknownVertex {
                    element: position,
                    vertex,
                });
            }
        }

        let containing_elements = containing_elements(&elements, nodes.len());
        let vertex_adjacent_elements = vertex_adjacent_elements(&elements, &containing_elements);
        let edge_adjacent_elements = edge_adjacent_elements(&elements, &vertex_adjacent_elements);
        let adjacent_vertices = adjacent_vertices(&elements, &containing_elements);
        tracing::debug!(
            vertex_adjacencies = vertex_adjacent_elements.iter().map(Vec::len).sum::<usize>(),
            edge_adjacencies = edge_adjacent_elements.iter().map(Vec::len).sum::<usize>(),
            vertex_pairs = adjacent_vertices.iter().map(Vec::len).sum::<usize>(),
            "built adjacency relations",
        );

        let node_tree = KdTree::new(&nodes);

        Ok(Self {
            elements,
            nodes,
            node_tree,
            containing_elements,
            vertex_adjacent_elements,
            edge_adjacent_elements,
            adjacent_vertices,
        })
    }

    /// Reads a domain from an element file and a vertex file.
    ///
    /// See [`files`] for the format of both.
    pub fn from_files(
        element_file: impl AsRef<Path>,
        vertex_file: impl AsRef<Path>,
    ) -> Result<Self, files::Error> {
        let elements = files::read_element_file(element_file)?;
        let nodes = files::read_vertex_file(vertex_file)?;
        Ok(Self::new(elements, nodes)?)
    }

    /// A structured mesh of the unit square, see [`generate::rectangle`].
    pub fn rectangle(columns: NonZeroUsize, rows: NonZeroUsize) -> Result<Self, Error> {
        let (elements, nodes) = generate::rectangle(columns, rows);
        Self::new(elements, nodes)
    }

    pub fn len_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn len_vertices(&self) -> usize {
        self.nodes.len()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, element: usize) -> Result<&Element, Error> {
        self.elements.get(element).ok_or(Error::ElementOutOfBounds {
            element,
            len: self.elements.len(),
        })
    }

    /// The coordinates of all vertices, indexed by vertex id.
    pub fn vertices(&self) -> &[Node] {
        &self.nodes
    }

    pub fn vertex(&self, vertex: usize) -> Result<Node, Error> {
        self.nodes
            .get(vertex)
            .copied()
            .ok_or(Error::VertexOutOfBounds {
                vertex,
                len: self.nodes.len(),
            })
    }

    /// Ids of the elements whose triangle includes `vertex`.
    pub fn elements_containing_vertex(&self, vertex: usize) -> Result<&[usize], Error> {
        self.vertex_relation(&self.containing_elements, vertex)
    }

    /// Ids of the elements adjacent to `element`.
    ///
    /// With `shared_edge`, only elements sharing an edge (two vertices) are
    /// returned, otherwise all elements sharing at least one vertex.
    pub fn adjacent_elements(&self, element: usize, shared_edge: bool) -> Result<&[usize], Error> {
        let relation = if shared_edge {
            &self.edge_adjacent_elements
        } else {
            &self.vertex_adjacent_elements
        };
        relation
            .get(element)
            .map(Vec::as_slice)
            .ok_or(Error::ElementOutOfBounds {
                element,
                len: self.elements.len(),
            })
    }

    /// Ids of the vertices sharing a triangle with `vertex`, `vertex` included.
    ///
    /// A vertex that belongs to no element has no adjacent vertex, not even
    /// itself.
    pub fn adjacent_vertices(&self, vertex: usize) -> Result<&[usize], Error> {
        self.vertex_relation(&self.adjacent_vertices, vertex)
    }

    /// The whole vertex adjacency relation, indexed by vertex id.
    pub(crate) fn vertex_adjacency(&self) -> &[Vec<usize>] {
        &self.adjacent_vertices
    }

    fn vertex_relation<'a>(
        &self,
        relation: &'a [Vec<usize>],
        vertex: usize,
    ) -> Result<&'a [usize], Error> {
        relation
            .get(vertex)
            .map(Vec::as_slice)
            .ok_or(Error::VertexOutOfBounds {
                vertex,
                len: self.nodes.len(),
            })
    }

    /// Id of the vertex nearest to `node`.
    ///
    /// Vertices at the same distance are broken by smallest id.
    pub fn closest_vertex(&self, node: Node) -> Result<usize, Error> {
        self.node_tree.nearest(node).ok_or(Error::EmptyDomain)
    }

    /// Distance from `node` to the triangle of `element`.
    ///
    /// See [`distance_to_segment`](crate::distance_to_segment) for the distance
    /// to edges.  The edge is chosen from the affine coordinates of `node` in the
    /// triangle; for obtuse triangles this can overestimate the distance near
    /// the obtuse vertex.
    ///
    /// # Errors
    ///
    /// [`Error::DegenerateElement`] if the triangle has no area.
    pub fn distance_to_element(&self, node: Node, element: usize) -> Result<f64, Error> {
        let triangle = self.element(element)?.vertices().map(|vertex| self.nodes[vertex]);
        geometry::distance_to_triangle(node, triangle).ok_or(Error::DegenerateElement { element })
    }

    /// The element closest to `node`.
    ///
    /// With `compare_all_elements`, every element of the domain is measured.
    /// Otherwise only the elements containing the [closest
    /// vertex][Self::closest_vertex] and their vertex-adjacent elements are.
    /// This local search is much cheaper but, on a domain made of several
    /// disconnected parts, it can miss the actual closest element.
    ///
    /// Candidates are measured in ascending id order and the first one at the
    /// minimal distance is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if there is no candidate, which happens when the
    ///   domain has no element or the closest vertex belongs to no element,
    /// - [`Error::EmptyDomain`] if the domain has no vertex,
    /// - [`Error::DegenerateElement`] if a candidate has no area.
    pub fn closest_element(&self, node: Node, compare_all_elements: bool) -> Result<Closest, Error> {
        let candidates: Vec<usize> = if compare_all_elements {
            (0..self.elements.len()).collect()
        } else {
            let vertex = self.closest_vertex(node)?;
            let containing = &self.containing_elements[vertex];
            containing
                .iter()
                .chain(containing.iter().flat_map(|e| &self.vertex_adjacent_elements[*e]))
                .copied()
                .sorted_unstable()
                .dedup()
                .collect()
        };

        let mut closest: Option<Closest> = None;
        for element in candidates {
            let distance = self.distance_to_element(node, element)?;
            if closest.map_or(true, |c| distance < c.distance) {
                closest = Some(Closest { element, distance });
            }
        }
        closest.ok_or(Error::NotFound)
    }
}

impl fmt::Display for MeshDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PolygonalDomain({} elements, {} nodes)",
            self.elements.len(),
            self.nodes.len(),
        )
    }
}

fn containing_elements(elements: &[Element], vertex_count: usize) -> Vec<Vec<usize>> {
    let mut containing = vec![Vec::new(); vertex_count];
    for element in elements {
        for vertex in element.vertices() {
            containing[vertex].push(element.id());
        }
    }
    containing
}

fn vertex_adjacent_elements(elements: &[Element], containing: &[Vec<usize>]) -> Vec<Vec<usize>> {
    elements
        .iter()
        .map(|element| {
            element
                .vertices()
                .iter()
                .flat_map(|vertex| &containing[*vertex])
                .copied()
                .filter(|neighbor| *neighbor != element.id())
                .sorted_unstable()
                .dedup()
                .collect()
        })
        .collect()
}

fn edge_adjacent_elements(elements: &[Element], vertex_adjacent: &[Vec<usize>]) -> Vec<Vec<usize>> {
    elements
        .iter()
        .zip(vertex_adjacent)
        .map(|(element, neighbors)| {
            neighbors
                .iter()
                .copied()
                .filter(|neighbor| element.shared_vertex_count(&elements[*neighbor]) == 2)
                .collect()
        })
        .collect()
}

fn adjacent_vertices(elements: &[Element], containing: &[Vec<usize>]) -> Vec<Vec<usize>> {
    containing
        .iter()
        .map(|element_ids| {
            element_ids
                .iter()
                .flat_map(|e| elements[*e].vertices())
                .sorted_unstable()
                .dedup()
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use approx::assert_ulps_eq;
    use proptest::prelude::*;

    fn tiny_domain() -> MeshDomain {
        MeshDomain::new(
            vec![
                Element::new(0, &[0, 1, 2]).unwrap(),
                Element::new(1, &[1, 2, 3]).unwrap(),
                Element::new(2, &[3, 4, 5]).unwrap(),
            ],
            vec![
                Node::new(0., 0.),
                Node::new(1., 0.),
                Node::new(0., 1.),
                Node::new(1., 1.),
                Node::new(2., 1.),
                Node::new(1., 2.),
            ],
        )
        .unwrap()
    }

    fn rectangle(columns: usize, rows: usize) -> MeshDomain {
        MeshDomain::rectangle(
            NonZeroUsize::new(columns).unwrap(),
            NonZeroUsize::new(rows).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_map_construction_tiny() {
        let domain = tiny_domain();
        let containing: Vec<&[usize]> = (0..6)
            .map(|v| domain.elements_containing_vertex(v).unwrap())
            .collect();
        assert_eq!(
            containing,
            [&[0][..], &[0, 1], &[0, 1], &[1, 2], &[2], &[2]],
        );

        let adjacent: Vec<&[usize]> = (0..6)
            .map(|v| domain.adjacent_vertices(v).unwrap())
            .collect();
        assert_eq!(
            adjacent,
            [
                &[0, 1, 2][..],
                &[0, 1, 2, 3],
                &[0, 1, 2, 3],
                &[1, 2, 3, 4, 5],
                &[3, 4, 5],
                &[3, 4, 5],
            ],
        );

        assert_eq!(domain.adjacent_elements(1, true).unwrap(), &[0]);
        assert_eq!(domain.adjacent_elements(1, false).unwrap(), &[0, 2]);
        assert_eq!(domain.adjacent_elements(2, true).unwrap(), &[] as &[usize]);
        assert_eq!(domain.adjacent_elements(2, false).unwrap(), &[1]);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            tiny_domain().to_string(),
            "PolygonalDomain(3 elements, 6 nodes)"
        );
        let domain = rectangle(42, 42);
        assert_eq!(
            domain.to_string(),
            format!("PolygonalDomain({} elements, {} nodes)", 2 * 42 * 42, 43 * 43),
        );
    }

    #[test]
    fn test_out_of_range_lookups() {
        let domain = tiny_domain();
        assert_eq!(
            domain.elements_containing_vertex(6),
            Err(Error::VertexOutOfBounds { vertex: 6, len: 6 }),
        );
        assert_eq!(
            domain.adjacent_vertices(100),
            Err(Error::VertexOutOfBounds { vertex: 100, len: 6 }),
        );
        assert_eq!(
            domain.adjacent_elements(3, false),
            Err(Error::ElementOutOfBounds { element: 3, len: 3 }),
        );
        assert_eq!(
            domain.vertex(6),
            Err(Error::VertexOutOfBounds { vertex: 6, len: 6 }),
        );
        assert_eq!(
            domain.distance_to_element(Node::new(0., 0.), 3),
            Err(Error::ElementOutOfBounds { element: 3, len: 3 }),
        );
        assert_eq!(domain.vertex(4), Ok(Node::new(2., 1.)));
    }

    #[test]
    fn test_invalid_input() {
        let nodes = vec![Node::new(0., 0.), Node::new(1., 0.), Node::new(0., 1.)];
        assert_eq!(
            MeshDomain::new(vec![Element::new(1, &[0, 1, 2]).unwrap()], nodes.clone()).unwrap_err(),
            Error::ElementIdMismatch {
                expected: 0,
                actual: 1
            },
        );
        assert_eq!(
            MeshDomain::new(vec![Element::new(0, &[0, 1, 3]).unwrap()], nodes).unwrap_err(),
            Error::UnknownVertex {
                element: 0,
                vertex: 3
            },
        );
    }

    #[test]
    fn test_3x3_domain() {
        let domain = rectangle(3, 3);
        assert_eq!(domain.to_string(), "PolygonalDomain(18 elements, 16 nodes)");
        // Upper triangle of the second cell of the bottom row.
        assert_eq!(
            domain.adjacent_elements(3, false).unwrap(),
            &[1, 2, 4, 5, 6, 7, 8, 9, 10],
        );
        assert_eq!(domain.adjacent_elements(3, true).unwrap(), &[2, 4, 8]);
    }

    #[test]
    fn test_adjacency_invariants() {
        let domain = rectangle(5, 4);
        for element in 0..domain.len_elements() {
            let vertex_adjacent = domain.adjacent_elements(element, false).unwrap();
            assert!(!vertex_adjacent.contains(&element));
            for neighbor in domain.adjacent_elements(element, true).unwrap() {
                assert!(vertex_adjacent.contains(neighbor));
            }
            for neighbor in vertex_adjacent {
                assert!(domain
                    .adjacent_elements(*neighbor, false)
                    .unwrap()
                    .contains(&element));
            }
        }
        for vertex in 0..domain.len_vertices() {
            let adjacent = domain.adjacent_vertices(vertex).unwrap();
            assert!(adjacent.contains(&vertex));
            assert!(adjacent.windows(2).all(|w| w[0] < w[1]));
            for other in adjacent {
                assert!(domain.adjacent_vertices(*other).unwrap().contains(&vertex));
            }
        }
    }

    #[test]
    fn test_closest_vertex() {
        let domain = tiny_domain();
        assert_eq!(domain.closest_vertex(Node::new(-1., -1.)), Ok(0));
        assert_eq!(domain.closest_vertex(Node::new(1.9, 1.2)), Ok(4));
        assert_eq!(domain.closest_vertex(Node::new(1., 5.)), Ok(5));
    }

    #[test]
    fn test_distance_to_element() {
        let domain = rectangle(1, 1);
        assert_ulps_eq!(domain.distance_to_element(Node::new(0., -1.), 0).unwrap(), 1.0);
        assert_ulps_eq!(domain.distance_to_element(Node::new(-0.42, 0.), 0).unwrap(), 0.42);
        assert_eq!(domain.distance_to_element(Node::new(0.25, 0.25), 0).unwrap(), 0.0);
        assert_ulps_eq!(domain.distance_to_element(Node::new(1., -10.), 1).unwrap(), 10.0);
    }

    #[test]
    fn test_degenerate_element() {
        let domain = MeshDomain::new(
            vec![Element::new(0, &[0, 1, 2]).unwrap()],
            vec![Node::new(0., 0.), Node::new(1., 1.), Node::new(2., 2.)],
        )
        .unwrap();
        assert_eq!(
            domain.distance_to_element(Node::new(0., 1.), 0),
            Err(Error::DegenerateElement { element: 0 }),
        );
        assert_eq!(
            domain.closest_element(Node::new(0., 1.), false),
            Err(Error::DegenerateElement { element: 0 }),
        );
    }

    #[test]
    fn test_closest_element_compare_all_elements() {
        let domain = rectangle(2, 2);
        let closest = domain.closest_element(Node::new(1.1, 0.9), true).unwrap();
        assert_eq!(closest.element, 7);
        assert_relative_eq!(closest.distance, 0.1, epsilon = 1e-12);
        assert_eq!(
            domain.closest_element(Node::new(1.1, 0.9), false).unwrap(),
            closest,
        );
    }

    #[test]
    fn test_closest_element_tie_break() {
        let domain = rectangle(1, 1);
        // On the shared diagonal: both elements are at distance 0.
        let closest = domain.closest_element(Node::new(0.5, 0.5), false).unwrap();
        assert_eq!(closest, Closest { element: 0, distance: 0.0 });
    }

    #[test]
    fn test_closest_element_disconnected() {
        // The closest vertex belongs to a small triangle lying next to the long
        // edge of a large one: the local search never looks at the large one.
        let domain = MeshDomain::new(
            vec![
                Element::new(0, &[0, 1, 2]).unwrap(),
                Element::new(1, &[3, 4, 5]).unwrap(),
            ],
            vec![
                Node::new(0., 0.),
                Node::new(10., 0.),
                Node::new(0., 10.),
                Node::new(5.6, 5.6),
                Node::new(8., 5.6),
                Node::new(5.6, 8.),
            ],
        )
        .unwrap();
        let query = Node::new(5.2, 5.2);
        assert_eq!(domain.closest_vertex(query), Ok(3));
        let local = domain.closest_element(query, false).unwrap();
        let global = domain.closest_element(query, true).unwrap();
        assert_eq!(local.element, 1);
        assert_eq!(global.element, 0);
        assert_relative_eq!(global.distance, f64::sqrt(0.08), epsilon = 1e-12);
        assert!(global.distance < local.distance);
    }

    #[test]
    fn test_closest_element_isolated_vertex() {
        let domain = MeshDomain::new(
            vec![Element::new(0, &[0, 1, 2]).unwrap()],
            vec![
                Node::new(0., 0.),
                Node::new(1., 0.),
                Node::new(0., 1.),
                Node::new(5., 5.),
            ],
        )
        .unwrap();
        assert_eq!(domain.adjacent_vertices(3), Ok(&[] as &[usize]));
        assert_eq!(
            domain.closest_element(Node::new(5., 6.), false),
            Err(Error::NotFound),
        );
        assert_eq!(
            domain.closest_element(Node::new(5., 6.), true).unwrap().element,
            0,
        );
    }

    #[test]
    fn test_empty_domain() {
        let domain = MeshDomain::new(Vec::new(), Vec::new()).unwrap();
        assert_eq!(
            domain.closest_vertex(Node::new(0., 0.)),
            Err(Error::EmptyDomain)
        );
        assert_eq!(
            domain.closest_element(Node::new(0., 0.), true),
            Err(Error::NotFound)
        );
    }

    proptest!(
        #[test]
        fn test_closest_element_unit_square(x in -0.5..1.5_f64, y in -0.5..1.5_f64) {
            // Near the corners where both elements meet, both are equally close.
            prop_assume!((x - y).abs() < 1.0);
            prop_assume!((x + y - 1.0).abs() > 1e-9);
            let domain = rectangle(1, 1);
            let closest = domain.closest_element(Node::new(x, y), false).unwrap();
            let expected = if x + y > 1.0 { 1 } else { 0 };
            prop_assert_eq!(closest.element, expected);
        }

        #[test]
        fn test_local_search_matches_global_on_rectangle(x in -0.5..1.5_f64, y in -0.5..1.5_f64) {
            let domain = rectangle(4, 3);
            let node = Node::new(x, y);
            let local = domain.closest_element(node, false).unwrap();
            let global = domain.closest_element(node, true).unwrap();
            prop_assert!((local.distance - global.distance).abs() < 1e-12);
        }
    );
}
