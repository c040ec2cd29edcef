use crate::SparseMatrix;
use std::iter::Cloned;
use std::iter::Sum;
use std::iter::Zip;
use std::slice;

#[cfg(feature = "sprs")]
mod sprs;

/// `Topology` is implemented for types that represent the vertex
/// neighborhoods of a mesh, such as adjacency matrices.
pub trait Topology<E> {
    /// Return type for [`Topology::neighbors`].
    ///
    /// This is an implementation detail and will be removed when Rust allows us
    /// to do so (at most when async fns are allowed in traits).
    type Neighbors<'n>: Iterator<Item = (usize, E)>
    where
        Self: 'n;

    /// The number of vertices in the mesh.
    fn len(&self) -> usize;

    /// Whether the topology has no vertices.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An iterator over the neighbors of the given vertex and the weights of
    /// the edges that lead to them.
    ///
    /// A vertex may be its own neighbor, e.g. through the diagonal of an
    /// adjacency matrix.  Out-of-range vertices have no neighbors.
    fn neighbors(&self, vertex: usize) -> Self::Neighbors<'_>;

    /// The number of neighbors of the given vertex, itself excluded.
    fn degree(&self, vertex: usize) -> usize {
        self.neighbors(vertex)
            .filter(|(neighbor, _)| *neighbor != vertex)
            .count()
    }

    /// The total weight of the edges incident to the given vertex, the
    /// reflexive edge excluded.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), polydomain::Error> {
    /// use polydomain::SparseMatrix;
    /// use polydomain::Topology as _;
    ///
    /// let adjacency = SparseMatrix::from_dense(&[
    ///     [-3.0, 1.0, 2.0],
    ///     [1.0, -1.0, 0.0],
    ///     [2.0, 0.0, -2.0],
    /// ])?;
    /// assert_eq!(adjacency.edge_weight_sum(0), 3.0);
    /// assert_eq!(adjacency.degree(1), 1);
    /// # Ok(())
    /// # }
    /// ```
    fn edge_weight_sum(&self, vertex: usize) -> E
    where
        E: Sum,
    {
        self.neighbors(vertex)
            .filter(|(neighbor, _)| *neighbor != vertex)
            .map(|(_, edge_weight)| edge_weight)
            .sum()
    }
}

impl<'a, T, E> Topology<E> for &'a T
where
    E: Copy,
    T: Topology<E>,
{
    type Neighbors<'n>
        = T::Neighbors<'n>
    where
        Self: 'n;

    fn len(&self) -> usize {
        T::len(self)
    }

    fn neighbors(&self, vertex: usize) -> Self::Neighbors<'_> {
        T::neighbors(self, vertex)
    }
}

impl Topology<f64> for SparseMatrix {
    type Neighbors<'n>
        = Zip<Cloned<slice::Iter<'n, usize>>, Cloned<slice::Iter<'n, f64>>>
    where
        Self: 'n;

    fn len(&self) -> usize {
        debug_assert_eq!(self.rows(), self.columns());
        self.rows()
    }

    fn neighbors(&self, vertex: usize) -> Self::Neighbors<'_> {
        let (indices, data) = self.row(vertex).unwrap_or((&[], &[]));
        indices.iter().cloned().zip(data.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> SparseMatrix {
        SparseMatrix::from_dense(&[
            [0., 1., 0., 0.],
            [1., 0., 2., 0.],
            [0., 2., 0., 3.],
            [0., 0., 3., 0.],
        ])
        .unwrap()
    }

    #[test]
    fn test_neighbors() {
        let adjacency = path_graph();
        assert_eq!(Topology::len(&adjacency), 4);
        assert_eq!(
            adjacency.neighbors(2).collect::<Vec<_>>(),
            [(1, 2.), (3, 3.)],
        );
        assert_eq!(adjacency.neighbors(4).count(), 0);
    }

    #[test]
    fn test_edge_weight_sum() {
        let adjacency = path_graph();
        let sums: Vec<f64> = (0..4).map(|v| adjacency.edge_weight_sum(v)).collect();
        assert_eq!(sums, [1., 3., 5., 3.]);
        let degrees: Vec<usize> = (0..4).map(|v| (&adjacency).degree(v)).collect();
        assert_eq!(degrees, [1, 2, 2, 1]);
    }

    #[test]
    fn test_reflexive_edge_excluded() {
        let adjacency = SparseMatrix::from_dense(&[[5., 1.], [1., 7.]]).unwrap();
        assert_eq!(adjacency.neighbors(0).count(), 2);
        assert_eq!(adjacency.degree(0), 1);
        assert_eq!(adjacency.edge_weight_sum(1), 1.);
    }
}
