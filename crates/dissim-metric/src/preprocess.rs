//! Sequence preprocessing: first difference and missing-value handling.

/// Discrete first difference: `d[i] = x[i + 1] - x[i]`.
///
/// Output length is `n - 1`; an input of length 0 or 1 yields an empty vector.
/// NaN propagates into every difference it touches.
#[must_use = "returns a new difference series; the original is unchanged"]
pub fn first_difference(series: &[f64]) -> Vec<f64> {
    series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Drop every NaN entry, keeping the observed values in order.
#[must_use = "returns a new series without missing values"]
pub fn strip_nan(series: &[f64]) -> Vec<f64> {
    series.iter().copied().filter(|v| !v.is_nan()).collect()
}

/// Borrow the prefix of `series` that precedes its trailing NaN padding.
///
/// Interior NaN values are kept; only the padded tail is cut.
#[must_use]
pub fn trim_trailing_nan(series: &[f64]) -> &[f64] {
    let end = series
        .iter()
        .rposition(|v| !v.is_nan())
        .map_or(0, |last| last + 1);
    &series[..end]
}
