//! Vertex graphs of a domain.

use crate::MeshDomain;
use crate::Node;
use crate::SparseMatrix;
use crate::Topology as _;
use rayon::iter::IntoParallelIterator as _;
use rayon::iter::ParallelIterator as _;
use std::fmt;

/// An edge of a graph, with the coordinates of its ends.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub from: Node,
    pub to: Node,
    pub weight: f64,
}

/// The vertex adjacency of a domain, as a 0/1 adjacency matrix.
///
/// Each vertex is adjacent to itself, so the matrix diagonal is stored.  The
/// graph borrows the vertex coordinates of its domain, to locate its edges.
#[derive(Clone, Debug)]
pub struct Graph<'d> {
    adjacency: SparseMatrix,
    positions: &'d [Node],
}

impl<'d> Graph<'d> {
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), polydomain::Error> {
    /// use polydomain::{Graph, MeshDomain};
    /// use std::num::NonZeroUsize;
    ///
    /// let two = NonZeroUsize::new(2).unwrap();
    /// let domain = MeshDomain::rectangle(two, two)?;
    /// let graph = Graph::new(&domain);
    ///
    /// assert_eq!(graph.to_string(), "Graph(9 vertices, 41 edges)");
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(domain: &'d MeshDomain) -> Self {
        let _span = tracing::info_span!("graph", vertices = domain.len_vertices()).entered();

        let adjacency = domain.vertex_adjacency();
        let mut row_pointers = Vec::with_capacity(adjacency.len() + 1);
        row_pointers.push(0);
        row_pointers.extend(adjacency.iter().scan(0, |nnz, row| {
            *nnz += row.len();
            Some(*nnz)
        }));
        let column_indices = adjacency.concat();
        let values = vec![1.0; column_indices.len()];

        Self {
            adjacency: SparseMatrix::from_crs(
                values,
                column_indices,
                row_pointers,
                domain.len_vertices(),
            ),
            positions: domain.vertices(),
        }
    }

    /// The number of vertices.
    pub fn order(&self) -> usize {
        self.adjacency.rows()
    }

    /// The number of stored edges, reflexive ones included.
    ///
    /// Edges between distinct vertices are stored in both directions.
    pub fn size(&self) -> usize {
        self.adjacency.nnz()
    }

    pub fn adjacency_matrix(&self) -> &SparseMatrix {
        &self.adjacency
    }

    pub fn into_adjacency_matrix(self) -> SparseMatrix {
        self.adjacency
    }

    /// Vertex coordinates, indexed by vertex id.
    pub fn positions(&self) -> &'d [Node] {
        self.positions
    }

    /// The edges between distinct vertices, in storage order.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.order()).flat_map(move |from| {
            self.adjacency
                .neighbors(from)
                .filter(move |(to, _)| *to != from)
                .map(move |(to, weight)| Segment {
                    from: self.positions[from],
                    to: self.positions[to],
                    weight,
                })
        })
    }
}

impl fmt::Display for Graph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Graph({} vertices, {} edges)", self.order(), self.size())
    }
}

/// The vertex adjacency of a domain, weighted by geometry.
///
/// The weight of the edge between distinct vertices `u` and `v` is the
/// inverse of their squared distance.  The weight of the reflexive edge
/// `(v, v)` is the opposite of the total weight of the other edges incident to
/// `v`, so that rows sum to zero, like in a graph Laplacian.
///
/// Coincident adjacent vertices give infinite weights.  The binary matrix
/// format keeps them.
#[derive(Clone, Debug)]
pub struct WeightedGraph<'d> {
    graph: Graph<'d>,
}

impl<'d> WeightedGraph<'d> {
    pub fn new(domain: &'d MeshDomain) -> Self {
        let _span = tracing::info_span!("weighted graph", vertices = domain.len_vertices()).entered();

        let graph = Graph::new(domain);
        let nodes = graph.positions;
        let adjacency = &graph.adjacency;
        let values: Vec<f64> = (0..adjacency.rows())
            .into_par_iter()
            .flat_map_iter(|i| {
                let (columns, _) = adjacency.row(i).unwrap_or_default();
                let diagonal: f64 = -columns
                    .iter()
                    .filter(|k| **k != i)
                    .map(|k| edge_weight(nodes[i], nodes[*k]))
                    .sum::<f64>();
                columns.iter().map(move |j| {
                    if *j == i {
                        diagonal
                    } else {
                        edge_weight(nodes[i], nodes[*j])
                    }
                })
            })
            .collect();
        tracing::debug!(edges = values.len(), "computed edge weights");

        let adjacency = SparseMatrix::from_crs(
            values,
            adjacency.column_indices().to_vec(),
            adjacency.row_pointers().to_vec(),
            adjacency.columns(),
        );
        Self {
            graph: Graph {
                adjacency,
                positions: nodes,
            },
        }
    }

    pub fn order(&self) -> usize {
        self.graph.order()
    }

    pub fn size(&self) -> usize {
        self.graph.size()
    }

    pub fn adjacency_matrix(&self) -> &SparseMatrix {
        self.graph.adjacency_matrix()
    }

    pub fn into_adjacency_matrix(self) -> SparseMatrix {
        self.graph.adjacency
    }

    pub fn positions(&self) -> &'d [Node] {
        self.graph.positions()
    }

    /// The weighted edges between distinct vertices, in storage order.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        self.graph.edges()
    }
}

impl fmt::Display for WeightedGraph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WeightedGraph({} vertices, {} edges)",
            self.order(),
            self.size(),
        )
    }
}

fn edge_weight(a: Node, b: Node) -> f64 {
    1.0 / a.squared_distance(b)
}
