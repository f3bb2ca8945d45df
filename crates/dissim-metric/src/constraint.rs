//! Band constraint types for DTW computation.

use std::ops::Range;

/// Constraint on the DTW warping window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandConstraint {
    /// No constraint: the full cost matrix is computed.
    #[default]
    Unconstrained,

    /// Sakoe-Chiba band: cell (i,j) is valid only if |i - j| <= radius.
    SakoeChibaRadius(usize),
}

impl BandConstraint {
    /// Build a constraint from an optional window radius.
    ///
    /// `None` means unconstrained.
    #[must_use]
    pub fn from_window(window: Option<usize>) -> Self {
        match window {
            None => Self::Unconstrained,
            Some(r) => Self::SakoeChibaRadius(r),
        }
    }

    /// Widen a Sakoe-Chiba radius so the band still reaches the final cell
    /// when the two series differ in length by `len_diff`.
    #[must_use]
    pub fn widened(self, len_diff: usize) -> Self {
        match self {
            Self::Unconstrained => Self::Unconstrained,
            Self::SakoeChibaRadius(r) => Self::SakoeChibaRadius(r.max(len_diff)),
        }
    }

    /// Return the valid column range for a given row in the cost matrix.
    ///
    /// For unconstrained DTW, returns `0..n_cols`.
    /// For Sakoe-Chiba, returns the intersection of `[row - r, row + r]` with `[0, n_cols)`.
    #[must_use]
    pub fn column_range(&self, row: usize, n_cols: usize) -> Range<usize> {
        match self {
            Self::Unconstrained => 0..n_cols,
            Self::SakoeChibaRadius(r) => {
                let start = row.saturating_sub(*r);
                let end = (row + r + 1).min(n_cols);
                start..end
            }
        }
    }

    /// Return the maximum band width for a row of `m` columns.
    ///
    /// For unconstrained DTW, returns `m` (full width).
    /// For Sakoe-Chiba with radius `r`, returns `min(2*r + 1, m)`.
    #[must_use]
    pub fn band_width(&self, m: usize) -> usize {
        match self {
            Self::Unconstrained => m,
            Self::SakoeChibaRadius(r) => (2 * r + 1).min(m),
        }
    }
}
