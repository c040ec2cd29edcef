use crate::geometry::Point2D;
use crate::Error;
use std::fmt;

/// A triangular element of a domain.
///
/// Vertex ids are kept sorted, so two elements built from the same vertex set
/// compare equal regardless of the order the ids were given in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Element {
    id: usize,
    vertices: [usize; 3],
}

impl Element {
    /// Creates an element from exactly three distinct vertex ids.
    ///
    /// # Example
    ///
    /// ```rust
    /// use polydomain::Element;
    ///
    /// let element = Element::new(42, &[10000, 1, 100]).unwrap();
    /// assert_eq!(element.vertices(), [1, 100, 10000]);
    /// assert!(Element::new(42, &[1, 2, 3, 4]).is_err());
    /// assert!(Element::new(42, &[1, 2, 2]).is_err());
    /// ```
    pub fn new(id: usize, vertices: &[usize]) -> Result<Self, Error> {
        let invalid = Error::InvalidElement {
            id,
            vertex_count: vertices.len(),
        };
        let mut vertices: [usize; 3] = vertices.try_into().map_err(|_| invalid)?;
        vertices.sort_unstable();
        if vertices[0] == vertices[1] || vertices[1] == vertices[2] {
            return Err(invalid);
        }
        Ok(Self { id, vertices })
    }

    /// Builds an element whose vertices are known to be distinct.
    pub(crate) fn triangle(id: usize, mut vertices: [usize; 3]) -> Self {
        debug_assert!(
            vertices[0] != vertices[1] && vertices[1] != vertices[2] && vertices[0] != vertices[2]
        );
        vertices.sort_unstable();
        Self { id, vertices }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// The vertex ids of the element, in ascending order.
    pub fn vertices(&self) -> [usize; 3] {
        self.vertices
    }

    pub fn contains(&self, vertex: usize) -> bool {
        self.vertices.contains(&vertex)
    }

    /// The number of vertices `self` and `other` have in common.
    pub fn shared_vertex_count(&self, other: &Element) -> usize {
        self.vertices
            .iter()
            .filter(|vertex| other.contains(**vertex))
            .count()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.vertices;
        write!(f, "Element(id={}, vertices=[{a}, {b}, {c}])", self.id)
    }
}

/// A point of the plane.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn squared_distance(self, other: Node) -> f64 {
        (Point2D::from(self) - Point2D::from(other)).norm_squared()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(x={}, y={})", self.x, self.y)
    }
}

impl From<[f64; 2]> for Node {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Node {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for Node {
    fn from(p: Point2D) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Node> for Point2D {
    fn from(node: Node) -> Self {
        Point2D::new(node.x, node.y)
    }
}
