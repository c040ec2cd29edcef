//! Sparse matrices in compressed row storage (CRS).

use crate::Error;
use rayon::iter::IntoParallelIterator as _;
use rayon::iter::ParallelIterator as _;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::ops::Mul;
use std::ops::Range;

mod format;
#[cfg(feature = "sprs")]
mod sprs;

pub use format::FormatError;

/// A sparse matrix of floats implementing the CRS format.
///
/// Only non-zero entries are stored, row after row:
///
/// - `values` holds the entries,
/// - `column_indices[k]` is the column of `values[k]`,
/// - the entries of row `i` are at positions
///   `row_pointers[i]..row_pointers[i + 1]` of the two arrays above.
///
/// Two matrices are equal when their storage is equal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    #[serde(with = "format::json_floats")]
    values: Vec<f64>,
    column_indices: Vec<usize>,
    row_pointers: Vec<usize>,
    columns: usize,
}

impl SparseMatrix {
    /// Compresses a two-dimensional, rectangular array.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), polydomain::Error> {
    /// use polydomain::SparseMatrix;
    ///
    /// let mat = SparseMatrix::from_dense(&[
    ///     [10.0, 0.0, 0.0, 12.0, 0.0],
    ///     [0.0, 0.0, 11.0, 0.0, 13.0],
    ///     [0.0, 16.0, 0.0, 0.0, 0.0],
    ///     [0.0, 0.0, 11.0, 0.0, 13.0],
    /// ])?;
    /// assert_eq!(mat.values(), &[10.0, 12.0, 11.0, 13.0, 16.0, 11.0, 13.0]);
    /// assert_eq!(mat.column_indices(), &[0, 3, 2, 4, 1, 2, 4]);
    /// assert_eq!(mat.row_pointers(), &[0, 2, 4, 5, 7]);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::InputLenMismatch`] if rows don't have the same length.
    pub fn from_dense<R>(array: &[R]) -> Result<Self, Error>
    where
        R: AsRef<[f64]>,
    {
        let columns = array.first().map_or(0, |row| row.as_ref().len());
        let mut values = Vec::new();
        let mut column_indices = Vec::new();
        let mut row_pointers = Vec::with_capacity(array.len() + 1);
        row_pointers.push(0);

        for row in array {
            let row = row.as_ref();
            if row.len() != columns {
                return Err(Error::InputLenMismatch {
                    expected: columns,
                    actual: row.len(),
                });
            }
            for (column, value) in row.iter().enumerate() {
                if *value != 0.0 {
                    values.push(*value);
                    column_indices.push(column);
                }
            }
            row_pointers.push(values.len());
        }

        Ok(Self {
            values,
            column_indices,
            row_pointers,
            columns,
        })
    }

    /// Builds a matrix from raw CRS data.
    ///
    /// The data is taken as is: it is up to the caller to give a
    /// non-decreasing `row_pointers` starting at zero and ending at
    /// `values.len()`, `column_indices` of the same length as `values` and
    /// column indices lower than `columns`.
    pub fn from_crs(
        values: Vec<f64>,
        column_indices: Vec<usize>,
        row_pointers: Vec<usize>,
        columns: usize,
    ) -> Self {
        Self {
            values,
            column_indices,
            row_pointers,
            columns,
        }
    }

    pub fn rows(&self) -> usize {
        self.row_pointers.len().saturating_sub(1)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// The number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn column_indices(&self) -> &[usize] {
        &self.column_indices
    }

    pub fn row_pointers(&self) -> &[usize] {
        &self.row_pointers
    }

    fn row_range(&self, row: usize) -> Range<usize> {
        self.row_pointers[row]..self.row_pointers[row + 1]
    }

    /// The column indices and values stored in `row`, `None` if out of range.
    pub fn row(&self, row: usize) -> Option<(&[usize], &[f64])> {
        if self.rows() <= row {
            return None;
        }
        let range = self.row_range(row);
        Some((&self.column_indices[range.clone()], &self.values[range]))
    }

    /// The entry at row `i` and column `j`, zero if it is not stored.
    pub fn get(&self, i: usize, j: usize) -> Result<f64, Error> {
        if self.rows() <= i || self.columns <= j {
            return Err(Error::IndexOutOfBounds {
                row: i,
                column: j,
                rows: self.rows(),
                columns: self.columns,
            });
        }
        let range = self.row_range(i);
        Ok(self.column_indices[range.clone()]
            .iter()
            .position(|column| *column == j)
            .map_or(0.0, |k| self.values[range.start + k]))
    }

    /// Matrix-vector multiplication.
    ///
    /// Only matrix-vector products are supported, not matrix-matrix ones.
    ///
    /// # Errors
    ///
    /// [`Error::InputLenMismatch`] if the length of `vector` is not the number
    /// of columns.
    pub fn mul_vec(&self, vector: &[f64]) -> Result<Vec<f64>, Error> {
        if vector.len() != self.columns {
            return Err(Error::InputLenMismatch {
                expected: self.columns,
                actual: vector.len(),
            });
        }
        Ok((0..self.rows())
            .into_par_iter()
            .map(|row| {
                let range = self.row_range(row);
                self.column_indices[range.clone()]
                    .iter()
                    .zip(&self.values[range])
                    .map(|(column, value)| value * vector[*column])
                    .sum()
            })
            .collect())
    }

    /// An iterator over the stored entries and their coordinates, in storage
    /// order.
    ///
    /// Each call returns a new, independent iterator.
    ///
    /// # Example
    ///
    /// ```rust
    /// # fn main() -> Result<(), polydomain::Error> {
    /// use polydomain::SparseMatrix;
    ///
    /// let mat = SparseMatrix::from_dense(&[[0.0, 2.0], [0.0, 0.0], [3.0, 4.0]])?;
    /// let cells: Vec<_> = mat.cells().collect();
    /// assert_eq!(cells, [((0, 1), 2.0), ((2, 0), 3.0), ((2, 1), 4.0)]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn cells(&self) -> Cells<'_> {
        Cells {
            matrix: self,
            row: 0,
            index: 0,
        }
    }

    /// The matrix as a two-dimensional array, zeros included.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.columns]; self.rows()];
        for ((i, j), value) in self.cells() {
            dense[i][j] = value;
        }
        dense
    }
}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SparseMatrix({}x{}, {} entries)",
            self.rows(),
            self.columns,
            self.values.len(),
        )
    }
}

/// Matrix-vector multiplication.
///
/// # Panics
///
/// Panics if the length of the vector is not the number of columns.  See
/// [`SparseMatrix::mul_vec`] for a fallible version.
impl Mul<&[f64]> for &SparseMatrix {
    type Output = Vec<f64>;

    fn mul(self, vector: &[f64]) -> Vec<f64> {
        match self.mul_vec(vector) {
            Ok(product) => product,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Iterator returned by [`SparseMatrix::cells`].
#[derive(Clone, Debug)]
pub struct Cells<'a> {
    matrix: &'a SparseMatrix,
    row: usize,
    index: usize,
}

impl Iterator for Cells<'_> {
    type Item = ((usize, usize), f64);

    fn next(&mut self) -> Option<Self::Item> {
        let value = *self.matrix.values.get(self.index)?;
        let column = *self.matrix.column_indices.get(self.index)?;
        while self
            .matrix
            .row_pointers
            .get(self.row + 1)
            .map_or(false, |row_end| *row_end <= self.index)
        {
            self.row += 1;
        }
        self.index += 1;
        Some(((self.row, column), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.matrix.values.len().saturating_sub(self.index);
        (len, Some(len))
    }
}

impl ExactSizeIterator for Cells<'_> {}
