//! Cached sample-by-prototype distances.

use tracing::{debug, instrument};

use crate::error::EmbedError;
use crate::features::FeatureMatrix;
use crate::matrix::SampleMatrix;
use crate::metric::Metric;
use crate::parallel::Executor;
use crate::prototypes::Prototype;

/// Compute the `(n_samples, prototypes.len())` block of distances.
///
/// Rows are distributed over `executor`; each worker writes one output row.
fn compute_block(
    samples: &SampleMatrix,
    prototypes: &[Prototype],
    metric: &Metric,
    executor: &Executor,
) -> Result<FeatureMatrix, EmbedError> {
    let (n_rows, n_cols) = (samples.n_samples(), prototypes.len());
    debug!(n_rows, n_cols, metric = metric.name(), "distance batch started");
    let rows = executor.try_map(n_rows, |i| {
        let sample = samples.row(i);
        prototypes
            .iter()
            .map(|p| metric.distance(sample, p.as_slice()))
            .collect::<Result<Vec<f64>, _>>()
    })?;
    let data: Vec<f64> = rows.into_iter().flatten().collect();
    debug!(n_rows, n_cols, "distance batch finished");
    Ok(FeatureMatrix::from_raw(n_rows, n_cols, data))
}

/// The distance matrix built by the last transform, plus incremental edits.
#[derive(Debug, Clone)]
pub(crate) struct DistanceCache {
    matrix: FeatureMatrix,
}

impl DistanceCache {
    /// Compute every sample-by-prototype distance.
    #[instrument(skip_all, fields(n_samples = samples.n_samples(), n_prototypes = prototypes.len()))]
    pub(crate) fn compute_full(
        samples: &SampleMatrix,
        prototypes: &[Prototype],
        metric: &Metric,
        executor: &Executor,
    ) -> Result<Self, EmbedError> {
        let matrix = compute_block(samples, prototypes, metric, executor)?;
        Ok(Self { matrix })
    }

    /// Compute columns for `new_prototypes` and append them in order.
    ///
    /// Existing columns are not recomputed. On error the cache is unchanged.
    #[instrument(skip_all, fields(n_samples = samples.n_samples(), n_new = new_prototypes.len()))]
    pub(crate) fn append_columns(
        &mut self,
        samples: &SampleMatrix,
        new_prototypes: &[Prototype],
        metric: &Metric,
        executor: &Executor,
    ) -> Result<(), EmbedError> {
        debug_assert_eq!(samples.n_samples(), self.matrix.n_samples());
        if new_prototypes.is_empty() {
            return Ok(());
        }
        let block = compute_block(samples, new_prototypes, metric, executor)?;
        self.matrix = self.matrix.with_appended_columns(&block);
        Ok(())
    }

    /// Keep only the columns flagged in `keep`.
    pub(crate) fn remove_columns(&mut self, keep: &[bool]) {
        if keep.iter().all(|&k| k) {
            return;
        }
        self.matrix = self.matrix.select_columns(keep);
        debug!(n_components = self.matrix.n_components(), "columns removed");
    }

    pub(crate) fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }
}
