use std::fmt;

/// Errors raised when building or querying a domain and its graphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An element was not given exactly three distinct vertices.
    InvalidElement { id: usize, vertex_count: usize },

    /// The element at position `expected` in the element list carries another id.
    ElementIdMismatch { expected: usize, actual: usize },

    /// An element refers to a vertex that has no coordinates.
    UnknownVertex { element: usize, vertex: usize },

    /// A vertex id is out of range.
    VertexOutOfBounds { vertex: usize, len: usize },

    /// An element id is out of range.
    ElementOutOfBounds { element: usize, len: usize },

    /// The triangle has no area, the point-to-element system is singular.
    DegenerateElement { element: usize },

    /// No candidate element could be found for a closest-element query.
    NotFound,

    /// The domain has no vertex to query.
    EmptyDomain,

    /// Matrix entry out of the matrix's shape.
    IndexOutOfBounds {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    /// Input sets don't have matching lengths.
    InputLenMismatch { expected: usize, actual: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidElement { id, vertex_count } => write!(
                f,
                "element {id} must have exactly 3 distinct vertices, got {vertex_count}",
            ),
            Error::ElementIdMismatch { expected, actual } => write!(
                f,
                "element at position {expected} has id {actual}, ids must match positions",
            ),
            Error::UnknownVertex { element, vertex } => {
                write!(f, "element {element} refers to unknown vertex {vertex}")
            }
            Error::VertexOutOfBounds { vertex, len } => {
                write!(f, "vertex {vertex} out of bounds (domain has {len} vertices)")
            }
            Error::ElementOutOfBounds { element, len } => {
                write!(f, "element {element} out of bounds (domain has {len} elements)")
            }
            Error::DegenerateElement { element } => {
                write!(f, "element {element} is degenerate (zero area)")
            }
            Error::NotFound => write!(f, "no candidate element found"),
            Error::EmptyDomain => write!(f, "domain has no vertices"),
            Error::IndexOutOfBounds {
                row,
                column,
                rows,
                columns,
            } => write!(
                f,
                "entry ({row}, {column}) out of bounds for a {rows}x{columns} matrix",
            ),
            Error::InputLenMismatch { expected, actual } => write!(
                f,
                "input sets don't have the same length (expected {expected} items, got {actual})",
            ),
        }
    }
}

impl std::error::Error for Error {}
