//! Dense sample-by-prototype distance matrix.

use std::ops::Index;

use crate::error::EmbedError;

/// Row-major `(n_samples, n_components)` matrix of distances.
///
/// Entry `(i, j)` is the distance from sample `i` to prototype `j`. A matrix
/// may have zero columns once every prototype has been removed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    /// Create a matrix from pre-computed row-major data.
    pub(crate) fn from_raw(n_rows: usize, n_cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), n_rows * n_cols);
        Self { n_rows, n_cols, data }
    }

    /// Return the number of rows (samples).
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns (prototypes).
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_cols
    }

    /// Return `(n_samples, n_components)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Return the distance from sample `i` to prototype `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_samples` or `j >= n_components`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self[(i, j)]
    }

    /// Borrow the feature vector of sample `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_samples`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.n_rows, "row index {i} out of bounds for {} rows", self.n_rows);
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    /// Iterate over feature vectors in sample order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    /// Copy out the distances of every sample to prototype `j`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= n_components`.
    #[must_use]
    pub fn column(&self, j: usize) -> Vec<f64> {
        assert!(j < self.n_cols, "column index {j} out of bounds for {} columns", self.n_cols);
        (0..self.n_rows).map(|i| self.data[i * self.n_cols + j]).collect()
    }

    /// Return the raw row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Return a new matrix with `block`'s columns appended after this one's.
    pub(crate) fn with_appended_columns(&self, block: &FeatureMatrix) -> FeatureMatrix {
        debug_assert_eq!(self.n_rows, block.n_rows);
        let n_cols = self.n_cols + block.n_cols;
        let mut data = Vec::with_capacity(self.n_rows * n_cols);
        for i in 0..self.n_rows {
            data.extend_from_slice(self.row(i));
            data.extend_from_slice(block.row(i));
        }
        Self::from_raw(self.n_rows, n_cols, data)
    }

    /// Return a new matrix holding only the columns where `keep` is true.
    pub(crate) fn select_columns(&self, keep: &[bool]) -> FeatureMatrix {
        debug_assert_eq!(keep.len(), self.n_cols);
        let n_cols = keep.iter().filter(|&&k| k).count();
        let data: Vec<f64> = self
            .rows()
            .flat_map(|row| row.iter().zip(keep).filter(|(_, k)| **k).map(|(v, _)| *v))
            .collect();
        Self::from_raw(self.n_rows, n_cols, data)
    }

    /// Concatenate matrices column-wise, in order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::NoChannels`] | `parts` is empty |
    /// | [`EmbedError::ChannelRowMismatch`] | Row counts differ |
    pub fn hstack(parts: &[&FeatureMatrix]) -> Result<FeatureMatrix, EmbedError> {
        let first = parts.first().ok_or(EmbedError::NoChannels)?;
        let n_rows = first.n_rows;
        if let Some((channel, part)) = parts.iter().enumerate().find(|(_, p)| p.n_rows != n_rows) {
            return Err(EmbedError::ChannelRowMismatch {
                channel,
                expected: n_rows,
                got: part.n_rows,
            });
        }
        let n_cols: usize = parts.iter().map(|p| p.n_cols).sum();
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for i in 0..n_rows {
            for part in parts {
                data.extend_from_slice(part.row(i));
            }
        }
        Ok(Self::from_raw(n_rows, n_cols, data))
    }
}

impl Index<(usize, usize)> for FeatureMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        assert!(i < self.n_rows, "row index {i} out of bounds for {} rows", self.n_rows);
        assert!(j < self.n_cols, "column index {j} out of bounds for {} columns", self.n_cols);
        &self.data[i * self.n_cols + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_matrix() -> FeatureMatrix {
        // 2 samples x 3 prototypes
        FeatureMatrix::from_raw(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
    }

    #[test]
    fn specific_values() {
        let m = make_matrix();
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(1, 2), 6.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(m.shape(), (2, 3));
    }

    #[test]
    fn row_and_column() {
        let m = make_matrix();
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.column(1), vec![2.0, 5.0]);
    }

    #[test]
    fn append_columns_keeps_existing() {
        let m = make_matrix();
        let block = FeatureMatrix::from_raw(2, 1, vec![7.0, 8.0]);
        let out = m.with_appended_columns(&block);
        assert_eq!(out.shape(), (2, 4));
        assert_eq!(out.row(0), &[1.0, 2.0, 3.0, 7.0]);
        assert_eq!(out.row(1), &[4.0, 5.0, 6.0, 8.0]);
    }

    #[test]
    fn select_columns_filters_in_order() {
        let m = make_matrix();
        let out = m.select_columns(&[true, false, true]);
        assert_eq!(out.shape(), (2, 2));
        assert_eq!(out.row(0), &[1.0, 3.0]);
        assert_eq!(out.row(1), &[4.0, 6.0]);
    }

    #[test]
    fn select_no_columns_keeps_rows() {
        let m = make_matrix();
        let out = m.select_columns(&[false, false, false]);
        assert_eq!(out.shape(), (2, 0));
        assert_eq!(out.rows().count(), 2);
        assert!(out.row(0).is_empty());
    }

    #[test]
    fn hstack_concatenates_in_order() {
        let a = make_matrix();
        let b = FeatureMatrix::from_raw(2, 2, vec![10.0, 11.0, 12.0, 13.0]);
        let out = FeatureMatrix::hstack(&[&a, &b]).unwrap();
        assert_eq!(out.shape(), (2, 5));
        assert_eq!(out.row(0), &[1.0, 2.0, 3.0, 10.0, 11.0]);
        assert_eq!(out.row(1), &[4.0, 5.0, 6.0, 12.0, 13.0]);
    }

    #[test]
    fn hstack_rejects_row_mismatch() {
        let a = make_matrix();
        let b = FeatureMatrix::from_raw(3, 1, vec![0.0; 3]);
        assert!(matches!(
            FeatureMatrix::hstack(&[&a, &b]),
            Err(EmbedError::ChannelRowMismatch { channel: 1, expected: 2, got: 3 })
        ));
    }

    #[test]
    fn hstack_empty_is_error() {
        assert!(matches!(FeatureMatrix::hstack(&[]), Err(EmbedError::NoChannels)));
    }
}
