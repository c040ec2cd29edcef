//! A library for planar triangulated meshes ("polygonal domains").
//!
//! # Crate Layout
//!
//! The entry point is [`MeshDomain`], built from a list of triangular
//! [`Element`]s and the [`Node`]s (vertex coordinates) they refer to.  On
//! construction it derives the adjacency relations between elements and
//! vertices, and a spatial index over the vertices.  It then answers:
//!
//! - topological queries: [elements containing a vertex][MeshDomain::elements_containing_vertex],
//!   [adjacent elements][MeshDomain::adjacent_elements],
//!   [adjacent vertices][MeshDomain::adjacent_vertices],
//! - geometric queries: [closest vertex][MeshDomain::closest_vertex],
//!   [distance to an element][MeshDomain::distance_to_element],
//!   [closest element][MeshDomain::closest_element].
//!
//! The vertex adjacency of a domain can be materialized as a [`Graph`] or a
//! [`WeightedGraph`], whose adjacency matrix is stored in a [`SparseMatrix`]
//! (compressed row storage).
//!
//! # Example
//!
//! ```rust
//! # fn main() -> Result<(), polydomain::Error> {
//! use polydomain::{MeshDomain, Node, WeightedGraph};
//! use std::num::NonZeroUsize;
//!
//! let side = NonZeroUsize::new(4).unwrap();
//! let domain = MeshDomain::rectangle(side, side)?;
//!
//! let closest = domain.closest_element(Node::new(0.3, -1.0), false)?;
//! assert!(closest.distance > 0.99);
//!
//! let graph = WeightedGraph::new(&domain);
//! let laplacian_of_ones = graph.adjacency_matrix().mul_vec(&vec![1.0; graph.order()])?;
//! assert!(laplacian_of_ones.iter().all(|v| v.abs() < 1e-9));
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    rust_2018_idioms
)]

mod domain;
mod element;
mod error;
pub mod files;
pub mod generate;
mod geometry;
mod graph;
mod spatial;
pub mod sparse;
mod topology;

pub use crate::domain::Closest;
pub use crate::domain::MeshDomain;
pub use crate::element::Element;
pub use crate::element::Node;
pub use crate::error::Error;
pub use crate::geometry::distance_to_segment;
pub use crate::geometry::Point2D;
pub use crate::graph::Graph;
pub use crate::graph::Segment;
pub use crate::graph::WeightedGraph;
pub use crate::spatial::KdTree;
pub use crate::sparse::SparseMatrix;
pub use crate::topology::Topology;

pub use nalgebra;
#[cfg(feature = "sprs")]
pub use sprs;
