//! Validated, immutable sample matrices.

use std::sync::Arc;

use crate::error::EmbedError;

/// Dense row-major matrix of `n_samples` sequences of equal length.
///
/// Values may be NaN (missing); infinities are rejected. Storage is
/// reference-counted and immutable, so cloning is cheap and a prototype that
/// shares rows with this matrix can never observe a mutation.
#[derive(Debug, Clone)]
pub struct SampleMatrix {
    data: Arc<[f64]>,
    n_rows: usize,
    n_cols: usize,
}

impl SampleMatrix {
    /// Build a matrix from a slice of rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::EmptyInput`] | `rows` is empty |
    /// | [`EmbedError::ZeroLength`] | The first row is empty |
    /// | [`EmbedError::RaggedRow`] | A row length differs from the first row |
    /// | [`EmbedError::InfiniteValue`] | Any value is infinite |
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, EmbedError> {
        let first = rows.first().ok_or(EmbedError::EmptyInput)?;
        let n_cols = first.as_ref().len();
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != n_cols {
                return Err(EmbedError::RaggedRow {
                    row,
                    expected: n_cols,
                    got: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Self::from_flat(data, rows.len(), n_cols)
    }

    /// Build a matrix from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::EmptyInput`] | `n_rows` is zero |
    /// | [`EmbedError::ZeroLength`] | `n_cols` is zero |
    /// | [`EmbedError::ShapeMismatch`] | `data.len() != n_rows * n_cols` |
    /// | [`EmbedError::InfiniteValue`] | Any value is infinite |
    pub fn from_flat(data: Vec<f64>, n_rows: usize, n_cols: usize) -> Result<Self, EmbedError> {
        if n_rows == 0 {
            return Err(EmbedError::EmptyInput);
        }
        if n_cols == 0 {
            return Err(EmbedError::ZeroLength);
        }
        if data.len() != n_rows * n_cols {
            return Err(EmbedError::ShapeMismatch {
                len: data.len(),
                n_rows,
                n_cols,
            });
        }
        if let Some(pos) = data.iter().position(|v| v.is_infinite()) {
            return Err(EmbedError::InfiniteValue {
                row: pos / n_cols,
                col: pos % n_cols,
            });
        }
        Ok(Self {
            data: data.into(),
            n_rows,
            n_cols,
        })
    }

    /// Return the number of sequences.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_rows
    }

    /// Return the number of time steps per sequence.
    #[must_use]
    pub fn length(&self) -> usize {
        self.n_cols
    }

    /// Return `(n_samples, length)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Borrow sequence `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_samples`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.n_rows, "row index {i} out of bounds for {} samples", self.n_rows);
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    /// Iterate over all sequences in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.data.chunks_exact(self.n_cols)
    }

    /// Return true if both matrices share the same underlying storage.
    #[must_use]
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_shape() {
        let m = SampleMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.rows().len(), 2);
    }

    #[test]
    fn rejects_empty() {
        let rows: Vec<Vec<f64>> = vec![];
        assert!(matches!(SampleMatrix::from_rows(&rows), Err(EmbedError::EmptyInput)));
    }

    #[test]
    fn rejects_zero_length_rows() {
        let rows: Vec<Vec<f64>> = vec![vec![], vec![]];
        assert!(matches!(SampleMatrix::from_rows(&rows), Err(EmbedError::ZeroLength)));
    }

    #[test]
    fn rejects_ragged() {
        let result = SampleMatrix::from_rows(&[vec![1.0, 2.0], vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(EmbedError::RaggedRow { row: 2, expected: 2, got: 1 })
        ));
    }

    #[test]
    fn rejects_infinity() {
        let result = SampleMatrix::from_rows(&[vec![1.0, 2.0], vec![f64::NEG_INFINITY, 2.0]]);
        assert!(matches!(result, Err(EmbedError::InfiniteValue { row: 1, col: 0 })));
    }

    #[test]
    fn accepts_nan() {
        let m = SampleMatrix::from_rows(&[vec![1.0, f64::NAN], vec![f64::NAN, 2.0]]).unwrap();
        assert!(m.row(0)[1].is_nan());
    }

    #[test]
    fn from_flat_shape_mismatch() {
        let result = SampleMatrix::from_flat(vec![1.0; 5], 2, 3);
        assert!(matches!(
            result,
            Err(EmbedError::ShapeMismatch { len: 5, n_rows: 2, n_cols: 3 })
        ));
    }

    #[test]
    fn clones_share_storage() {
        let m = SampleMatrix::from_flat(vec![0.0; 6], 2, 3).unwrap();
        let c = m.clone();
        assert!(m.shares_storage(&c));
        let other = SampleMatrix::from_flat(vec![0.0; 6], 2, 3).unwrap();
        assert!(!m.shares_storage(&other));
    }
}
