//! Row-major 2D array of `f64`.

use crate::error::IoError;

/// A dense row-major matrix of `f64` values.
///
/// Rows are cases, columns are features or targets. All shape-changing
/// operations validate dimensions and return [`IoError::DimensionMismatch`]
/// rather than panicking.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a matrix from row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if `data.len() != n_rows * n_cols`.
    pub fn new(n_rows: usize, n_cols: usize, data: Vec<f64>) -> Result<Self, IoError> {
        if data.len() != n_rows * n_cols {
            return Err(IoError::DimensionMismatch {
                name: "matrix data".to_string(),
                expected: n_rows * n_cols,
                got: data.len(),
            });
        }
        Ok(Self {
            n_rows,
            n_cols,
            data,
        })
    }

    /// Creates a matrix filled with zeros.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            data: vec![0.0; n_rows * n_cols],
        }
    }

    /// Creates a matrix filled with `value`.
    pub fn filled(n_rows: usize, n_cols: usize, value: f64) -> Self {
        Self {
            n_rows,
            n_cols,
            data: vec![value; n_rows * n_cols],
        }
    }

    /// Creates a matrix from a slice of equal-length rows.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if rows have differing lengths.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, IoError> {
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(IoError::DimensionMismatch {
                    name: "row length".to_string(),
                    expected: n_cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            n_rows: rows.len(),
            n_cols,
            data,
        })
    }

    /// Creates a matrix from column vectors that all have `n_rows` entries.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if any column has the wrong length.
    pub fn from_columns(n_rows: usize, columns: &[Vec<f64>]) -> Result<Self, IoError> {
        let n_cols = columns.len();
        for col in columns {
            if col.len() != n_rows {
                return Err(IoError::DimensionMismatch {
                    name: "column length".to_string(),
                    expected: n_rows,
                    got: col.len(),
                });
            }
        }
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for r in 0..n_rows {
            for col in columns {
                data.push(col[r]);
            }
        }
        Ok(Self {
            n_rows,
            n_cols,
            data,
        })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// `(n_rows, n_cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Row-major backing storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Element at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.n_rows && col < self.n_cols, "index out of bounds");
        self.data[row * self.n_cols + col]
    }

    /// Sets the element at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(row < self.n_rows && col < self.n_cols, "index out of bounds");
        self.data[row * self.n_cols + col] = value;
    }

    /// Borrow one row.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    /// Copy one column.
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.n_rows).map(|r| self.get(r, col)).collect()
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_rows).map(move |r| self.row(r))
    }

    /// Concatenate columns of `self` and `other` (same row count).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if row counts differ.
    pub fn hstack(&self, other: &Matrix) -> Result<Matrix, IoError> {
        if self.n_rows != other.n_rows {
            return Err(IoError::DimensionMismatch {
                name: "rows".to_string(),
                expected: self.n_rows,
                got: other.n_rows,
            });
        }
        let n_cols = self.n_cols + other.n_cols;
        let mut data = Vec::with_capacity(self.n_rows * n_cols);
        for r in 0..self.n_rows {
            data.extend_from_slice(self.row(r));
            data.extend_from_slice(other.row(r));
        }
        Ok(Matrix {
            n_rows: self.n_rows,
            n_cols,
            data,
        })
    }

    /// Concatenate rows of `self` and `other` (same column count).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if column counts differ.
    pub fn vstack(&self, other: &Matrix) -> Result<Matrix, IoError> {
        if self.n_cols != other.n_cols {
            return Err(IoError::DimensionMismatch {
                name: "columns".to_string(),
                expected: self.n_cols,
                got: other.n_cols,
            });
        }
        let mut data = self.data.clone();
        data.extend_from_slice(&other.data);
        Ok(Matrix {
            n_rows: self.n_rows + other.n_rows,
            n_cols: self.n_cols,
            data,
        })
    }

    /// The first `k` columns.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if `k > n_cols`.
    pub fn leading_columns(&self, k: usize) -> Result<Matrix, IoError> {
        if k > self.n_cols {
            return Err(IoError::DimensionMismatch {
                name: "columns".to_string(),
                expected: k,
                got: self.n_cols,
            });
        }
        let mut data = Vec::with_capacity(self.n_rows * k);
        for r in 0..self.n_rows {
            data.extend_from_slice(&self.row(r)[..k]);
        }
        Ok(Matrix {
            n_rows: self.n_rows,
            n_cols: k,
            data,
        })
    }

    /// Rows `start..end` as a new matrix.
    ///
    /// # Panics
    ///
    /// Panics if `start > end` or `end > n_rows`.
    pub fn slice_rows(&self, start: usize, end: usize) -> Matrix {
        assert!(start <= end && end <= self.n_rows, "row range out of bounds");
        Matrix {
            n_rows: end - start,
            n_cols: self.n_cols,
            data: self.data[start * self.n_cols..end * self.n_cols].to_vec(),
        }
    }

    /// Rows at the given indices (repeats allowed) as a new matrix.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    pub fn select_rows(&self, indices: &[usize]) -> Matrix {
        let mut data = Vec::with_capacity(indices.len() * self.n_cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Matrix {
            n_rows: indices.len(),
            n_cols: self.n_cols,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m2x3() -> Matrix {
        Matrix::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
    }

    #[test]
    fn new_rejects_bad_length() {
        let err = Matrix::new(2, 2, vec![1.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            IoError::DimensionMismatch {
                expected: 4,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn accessors() {
        let m = m2x3();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 2), 6.0);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.column(1), vec![2.0, 5.0]);
    }

    #[test]
    fn from_columns_transposes() {
        let m = Matrix::from_columns(2, &[vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]).unwrap();
        assert_eq!(m, m2x3());
    }

    #[test]
    fn from_rows_ragged() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, IoError::DimensionMismatch { .. }));
    }

    #[test]
    fn hstack_and_vstack() {
        let a = m2x3();
        let b = Matrix::new(2, 1, vec![7.0, 8.0]).unwrap();
        let h = a.hstack(&b).unwrap();
        assert_eq!(h.shape(), (2, 4));
        assert_eq!(h.row(1), &[4.0, 5.0, 6.0, 8.0]);

        let v = a.vstack(&a).unwrap();
        assert_eq!(v.shape(), (4, 3));
        assert_eq!(v.row(2), &[1.0, 2.0, 3.0]);

        assert!(a.vstack(&b).is_err());
        assert!(a.hstack(&Matrix::zeros(3, 1)).is_err());
    }

    #[test]
    fn leading_columns_and_slices() {
        let a = m2x3();
        let l = a.leading_columns(2).unwrap();
        assert_eq!(l.row(1), &[4.0, 5.0]);
        assert!(a.leading_columns(4).is_err());

        let s = a.slice_rows(1, 2);
        assert_eq!(s.shape(), (1, 3));
        assert_eq!(s.row(0), &[4.0, 5.0, 6.0]);

        let sel = a.select_rows(&[1, 1, 0]);
        assert_eq!(sel.n_rows(), 3);
        assert_eq!(sel.row(2), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn rows_iterator_zero_width() {
        let m = Matrix::zeros(3, 0);
        assert_eq!(m.rows().count(), 3);
        assert!(m.rows().all(|r| r.is_empty()));
    }
}
