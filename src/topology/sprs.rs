use super::Topology;
use std::iter::Cloned;
use std::iter::Zip;

impl<'a, E> Topology<E> for sprs::CsMatView<'a, E>
where
    E: Copy,
{
    type Neighbors<'n>
        = Zip<Cloned<std::slice::Iter<'n, usize>>, Cloned<std::slice::Iter<'n, E>>>
    where
        Self: 'n;

    fn len(&self) -> usize {
        debug_assert_eq!(self.rows(), self.cols());
        self.rows()
    }

    fn neighbors(&self, vertex: usize) -> Self::Neighbors<'_> {
        // `CsVecView` does not implement `IntoIterator`, so we have to
        // implement it ourselves. It's needed to pass through the `&'_ self`
        // lifetime and not end up with a local one.
        let (indices, data) = match self.outer_view(vertex) {
            Some(row) => row.into_raw_storage(),
            None => (&[][..], &[][..]),
        };
        indices.iter().cloned().zip(data.iter().cloned())
    }
}
