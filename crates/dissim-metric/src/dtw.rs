//! DTW distance computation.

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::error::MetricError;
use crate::params::MetricParams;
use crate::preprocess::{strip_nan, trim_trailing_nan};

/// Band radius used by [`fast_dtw`] when no `radius` parameter is given.
const DEFAULT_FAST_RADIUS: usize = 1;

/// Immutable DTW configuration. Thread-safe and copyable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dtw {
    constraint: BandConstraint,
}

impl Dtw {
    /// Create an unconstrained DTW calculator.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self {
            constraint: BandConstraint::Unconstrained,
        }
    }

    /// Create a DTW calculator with a Sakoe-Chiba band constraint.
    #[must_use]
    pub fn with_sakoe_chiba(radius: usize) -> Self {
        Self {
            constraint: BandConstraint::SakoeChibaRadius(radius),
        }
    }

    /// Build a calculator from the `window` parameter (Sakoe-Chiba radius).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::InvalidParam`] | `window` is negative or not an integer |
    pub fn from_params(params: &MetricParams) -> Result<Self, MetricError> {
        let window = params.get_usize("window")?;
        Ok(Self {
            constraint: BandConstraint::from_window(window),
        })
    }

    /// Return the band constraint configuration.
    #[must_use]
    pub fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Compute the DTW distance between two sequences.
    ///
    /// Trailing NaN padding is trimmed from both inputs first, so sequences
    /// padded to a common length compare at their true lengths. A NaN left
    /// inside a sequence makes the distance undefined and NaN is returned.
    ///
    /// The band radius is widened to `|len(a) - len(b)|` when needed so that a
    /// warping path always exists.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::EmptySequence`] | Either input has no observed values |
    #[instrument(level = "trace", skip_all, fields(n = a.len(), m = b.len()))]
    pub fn distance(&self, a: &[f64], b: &[f64]) -> Result<f64, MetricError> {
        let a = trim_trailing_nan(a);
        let b = trim_trailing_nan(b);
        if a.is_empty() || b.is_empty() {
            return Err(MetricError::EmptySequence);
        }
        if a.iter().chain(b).any(|v| v.is_nan()) {
            return Ok(f64::NAN);
        }
        let constraint = self.constraint.widened(a.len().abs_diff(b.len()));
        Ok(dtw_distance_rolling(constraint, a, b))
    }
}

/// Approximate DTW for speed: every NaN is stripped from each sequence
/// independently, then a narrow Sakoe-Chiba band (`radius`, default 1) is used.
///
/// Stripping breaks positional alignment of NaN-padded sequences, so use this
/// only when padding carries no positional meaning.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`MetricError::EmptySequence`] | Either input is entirely NaN |
/// | [`MetricError::InvalidParam`] | `radius` is negative or not an integer |
pub fn fast_dtw(a: &[f64], b: &[f64], params: &MetricParams) -> Result<f64, MetricError> {
    let radius = params.get_usize("radius")?.unwrap_or(DEFAULT_FAST_RADIUS);
    let a = strip_nan(a);
    let b = strip_nan(b);
    Dtw::with_sakoe_chiba(radius).distance(&a, &b)
}

/// Rolling two-row buffer DTW; computes only the distance.
///
/// Each row buffer has `bw + 2` slots. Index 0 is the left sentinel (INF)
/// and index `bw + 1` is the right sentinel (INF). Active columns occupy
/// indices `1..=bw`.
///
/// For column `j` in row `i`:
/// - current local index: `j - col_range.start + 1`
/// - predecessor above `C[i-1][j]`: `j - prev_start + 1` in `prev`
/// - predecessor diagonal `C[i-1][j-1]`: `j - prev_start` in `prev`
/// - predecessor left `C[i][j-1]`: `curr_local - 1`
///
/// Runs in O(n * bw) time and O(bw) space. Local cost is the squared
/// difference; the result is the square root of the accumulated cost.
fn dtw_distance_rolling(constraint: BandConstraint, a: &[f64], b: &[f64]) -> f64 {
    let n = a.len();
    let m = b.len();

    let bw = constraint.band_width(m);
    let buf_width = bw + 2;

    let mut prev = vec![f64::INFINITY; buf_width];
    let mut curr = vec![f64::INFINITY; buf_width];

    let mut prev_start: usize = 0;

    #[allow(clippy::needless_range_loop)]
    for i in 0..n {
        curr.fill(f64::INFINITY);

        let col_range = constraint.column_range(i, m);
        let curr_start = col_range.start;

        for j in col_range {
            let cost = (a[i] - b[j]).powi(2);
            let cj = j - curr_start + 1;

            if i == 0 && j == 0 {
                curr[cj] = cost;
                continue;
            }

            let left = if j > curr_start { curr[cj - 1] } else { f64::INFINITY };

            let above = if i > 0 {
                let pj = j.wrapping_sub(prev_start).wrapping_add(1);
                if pj < buf_width { prev[pj] } else { f64::INFINITY }
            } else {
                f64::INFINITY
            };

            let diag = if i > 0 && j > 0 {
                let pj = (j - 1).wrapping_sub(prev_start).wrapping_add(1);
                if pj < buf_width { prev[pj] } else { f64::INFINITY }
            } else {
                f64::INFINITY
            };

            curr[cj] = cost + left.min(above).min(diag);
        }

        prev_start = curr_start;
        std::mem::swap(&mut prev, &mut curr);
    }

    // After the final swap, `prev` holds the last completed row.
    let final_range = constraint.column_range(n - 1, m);
    let local = (m - 1) - final_range.start + 1;
    prev[local].sqrt()
}
