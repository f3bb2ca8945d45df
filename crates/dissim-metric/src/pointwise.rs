//! Lock-step (pointwise) distances over equal-length sequences.

use crate::error::MetricError;

fn check_lengths(a: &[f64], b: &[f64]) -> Result<(), MetricError> {
    if a.len() != b.len() {
        return Err(MetricError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Sum of squared differences.
///
/// # Errors
///
/// Returns [`MetricError::LengthMismatch`] if the lengths differ.
pub fn sq_euclidean(a: &[f64], b: &[f64]) -> Result<f64, MetricError> {
    check_lengths(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum())
}

/// Euclidean (L2) distance.
///
/// # Errors
///
/// Returns [`MetricError::LengthMismatch`] if the lengths differ.
pub fn euclidean(a: &[f64], b: &[f64]) -> Result<f64, MetricError> {
    sq_euclidean(a, b).map(f64::sqrt)
}

/// Manhattan (L1, city block) distance.
///
/// # Errors
///
/// Returns [`MetricError::LengthMismatch`] if the lengths differ.
pub fn manhattan(a: &[f64], b: &[f64]) -> Result<f64, MetricError> {
    check_lengths(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum())
}

/// Cosine distance `1 - a·b / (|a| |b|)`.
///
/// A zero-norm input is treated as orthogonal to everything (distance 1).
///
/// # Errors
///
/// Returns [`MetricError::LengthMismatch`] if the lengths differ.
pub fn cosine(a: &[f64], b: &[f64]) -> Result<f64, MetricError> {
    check_lengths(a, b)?;
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(1.0);
    }
    // Rounding can push the similarity a hair outside [-1, 1].
    Ok((1.0 - dot / (norm_a * norm_b)).clamp(0.0, 2.0))
}

/// Euclidean distance that skips coordinates missing in either sequence and
/// rescales by the fraction present:
///
/// ```text
/// d = sqrt(n / n_present * Σ_present (a_i - b_i)²)
/// ```
///
/// Returns NaN when no coordinate is present in both sequences.
///
/// # Errors
///
/// Returns [`MetricError::LengthMismatch`] if the lengths differ.
pub fn nan_euclidean(a: &[f64], b: &[f64]) -> Result<f64, MetricError> {
    check_lengths(a, b)?;
    let (sum, present) = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .fold((0.0, 0usize), |(s, c), (x, y)| (s + (x - y).powi(2), c + 1));
    if present == 0 {
        return Ok(f64::NAN);
    }
    let weight = a.len() as f64 / present as f64;
    Ok((weight * sum).sqrt())
}
