use super::SparseMatrix;
use sprs::errors::StructureError;
use sprs::CsMat;

impl SparseMatrix {
    /// Copies the matrix into a [`sprs::CsMat`], to use sprs' linear algebra.
    ///
    /// # Errors
    ///
    /// sprs checks the storage and refuses matrices built with
    /// [`SparseMatrix::from_crs`] from inconsistent arrays, or with unsorted
    /// column indices.
    pub fn to_csmat(&self) -> Result<CsMat<f64>, StructureError> {
        CsMat::try_new(
            (self.rows(), self.columns),
            self.row_pointers.clone(),
            self.column_indices.clone(),
            self.values.clone(),
        )
        .map_err(|(_, _, _, err)| err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::tests::sample;

    #[test]
    fn test_to_csmat() {
        let mat = sample();
        let csmat = mat.to_csmat().unwrap();
        assert_eq!(csmat.rows(), 4);
        assert_eq!(csmat.cols(), 5);
        assert_eq!(csmat.nnz(), 7);
        for ((i, j), value) in mat.cells() {
            assert_eq!(csmat.get(i, j), Some(&value));
        }
        assert_eq!(csmat.get(1, 1), None);
    }

    #[test]
    fn test_to_csmat_unsorted() {
        let mat = SparseMatrix::from_crs(vec![1., 2.], vec![1, 0], vec![0, 2], 2);
        assert!(mat.to_csmat().is_err());
    }
}
