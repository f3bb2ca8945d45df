//! Single-channel prototype distance transformer.

use tracing::{debug, info, instrument};

use crate::cache::DistanceCache;
use crate::config::TransformerConfig;
use crate::error::EmbedError;
use crate::features::FeatureMatrix;
use crate::matrix::SampleMatrix;
use crate::metric::Metric;
use crate::parallel::{Executor, Parallelism};
use crate::prototypes::{Prototype, PrototypeStore, materialize, select};

#[derive(Debug, Clone)]
struct FittedState {
    n_features: usize,
    n_samples_fit: usize,
    store: PrototypeStore,
    cache: Option<DistanceCache>,
}

/// Maps each sequence to its distances from a set of prototype sequences.
///
/// Lifecycle: [`fit`](Self::fit) selects prototypes;
/// [`transform`](Self::transform) computes and caches the distance matrix;
/// [`add_prototype`](Self::add_prototype) and
/// [`remove_prototype`](Self::remove_prototype) then edit the cached matrix
/// column-wise without recomputing existing columns.
///
/// Every fallible method leaves the transformer unchanged when it returns an
/// error.
///
/// # Example
///
/// ```
/// use dissim_embed::{SampleMatrix, TransformerConfig};
///
/// let x = SampleMatrix::from_rows(&[
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 1.0, 1.0],
///     vec![2.0, 1.0, 0.0],
///     vec![0.0, 0.0, 0.0],
/// ])?;
/// let mut t = TransformerConfig::new(2)?.with_random_state(Some(0)).build()?;
/// let features = t.fit_transform(&x)?;
/// assert_eq!(features.shape(), (4, 2));
/// # Ok::<(), dissim_embed::EmbedError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FeatureTransformer {
    config: TransformerConfig,
    metric: Metric,
    executor: Executor,
    state: Option<FittedState>,
}

impl FeatureTransformer {
    /// Build an unfitted transformer, resolving the metric and worker pool.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::InvalidJobs`] | `n_jobs` is `Some(0)` |
    /// | [`EmbedError::ThreadPool`] | The worker pool cannot be created |
    pub fn new(config: TransformerConfig) -> Result<Self, EmbedError> {
        let parallelism = Parallelism::from_n_jobs(config.n_jobs)?;
        let executor = Executor::new(parallelism)?;
        let metric = Metric::new(&config.metric, config.metric_params.clone());
        debug!(metric = metric.name(), ?parallelism, "transformer built");
        Ok(Self {
            config,
            metric,
            executor,
            state: None,
        })
    }

    /// Select prototypes from `x`.
    ///
    /// Refitting discards previous prototypes and cached distances.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::SequenceTooShort`] | `x.length()` is below [`MetricSpec::min_length`](crate::MetricSpec::min_length) |
    /// | [`EmbedError::TooFewSamples`] | `n_components > x.n_samples()` |
    #[instrument(skip_all, fields(n_samples = x.n_samples(), length = x.length()))]
    pub fn fit(&mut self, x: &SampleMatrix) -> Result<&mut Self, EmbedError> {
        let required = self.config.metric.min_length();
        if x.length() < required {
            return Err(EmbedError::SequenceTooShort {
                metric: self.metric.name().to_string(),
                required,
                length: x.length(),
            });
        }
        let indices = select(x.n_samples(), self.config.n_components, self.config.random_state)?;
        let prototypes = materialize(x, &indices, self.config.copy_prototypes);
        info!(n_prototypes = indices.len(), "prototypes selected");
        self.state = Some(FittedState {
            n_features: x.length(),
            n_samples_fit: x.n_samples(),
            store: PrototypeStore::new(indices, prototypes),
            cache: None,
        });
        Ok(self)
    }

    /// Compute distances from every row of `x` to every prototype.
    ///
    /// The result replaces the cached distance matrix.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::NotFitted`] | Called before [`fit`](Self::fit) |
    /// | [`EmbedError::LengthMismatch`] | `x.length()` differs from the fit-time length |
    /// | [`EmbedError::Metric`] | The metric failed |
    #[instrument(skip_all, fields(n_samples = x.n_samples(), length = x.length()))]
    pub fn transform(&mut self, x: &SampleMatrix) -> Result<&FeatureMatrix, EmbedError> {
        let state = self.state.as_mut().ok_or(EmbedError::NotFitted)?;
        check_length(state.n_features, x)?;
        let cache = DistanceCache::compute_full(
            x,
            state.store.prototypes(),
            &self.metric,
            &self.executor,
        )?;
        info!(shape = ?cache.matrix().shape(), "distance matrix cached");
        Ok(state.cache.insert(cache).matrix())
    }

    /// [`fit`](Self::fit) then [`transform`](Self::transform) on the same `x`.
    ///
    /// # Errors
    ///
    /// See [`fit`](Self::fit) and [`transform`](Self::transform).
    pub fn fit_transform(&mut self, x: &SampleMatrix) -> Result<&FeatureMatrix, EmbedError> {
        self.fit(x)?.transform(x)
    }

    /// Append prototypes taken from rows `indices` of `x`.
    ///
    /// Indices already present, and repeats within `indices`, are skipped.
    /// New columns are computed against `x` and appended after the existing
    /// ones, which are left untouched.
    ///
    /// `x` must have as many rows as the cached matrix, and is assumed to be
    /// the same data that was last transformed: the new columns are distances
    /// from the rows of `x`, whereas the existing columns are distances from
    /// the rows of the last transformed input. Prototype indices recorded here
    /// refer to rows of `x`, not of the fit-time matrix.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::NotFitted`] | Called before [`fit`](Self::fit) |
    /// | [`EmbedError::NotTransformed`] | No distance matrix is cached |
    /// | [`EmbedError::LengthMismatch`] | `x.length()` differs from the fit-time length |
    /// | [`EmbedError::SampleCountMismatch`] | `x` and the cached matrix differ in row count |
    /// | [`EmbedError::IndexOutOfBounds`] | A new index is not a row of `x` |
    /// | [`EmbedError::Metric`] | The metric failed |
    #[instrument(skip_all, fields(n_requested = indices.len()))]
    pub fn add_prototype(
        &mut self,
        x: &SampleMatrix,
        indices: &[usize],
    ) -> Result<&FeatureMatrix, EmbedError> {
        let state = self.state.as_mut().ok_or(EmbedError::NotFitted)?;
        let cache = state.cache.as_mut().ok_or(EmbedError::NotTransformed)?;
        check_length(state.n_features, x)?;
        let expected = cache.matrix().n_samples();
        if x.n_samples() != expected {
            return Err(EmbedError::SampleCountMismatch {
                expected,
                got: x.n_samples(),
            });
        }

        let novel = state.store.novel_indices(indices);
        if let Some(&index) = novel.iter().find(|&&i| i >= x.n_samples()) {
            return Err(EmbedError::IndexOutOfBounds {
                index,
                n_samples: x.n_samples(),
            });
        }
        let prototypes = materialize(x, &novel, self.config.copy_prototypes);
        cache.append_columns(x, &prototypes, &self.metric, &self.executor)?;
        debug!(n_added = novel.len(), "prototypes added");
        state.store.append(novel, prototypes);
        Ok(cache.matrix())
    }

    /// Remove the prototypes with the given indices and their columns.
    ///
    /// Indices that are not prototypes are ignored.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::NotFitted`] | Called before [`fit`](Self::fit) |
    /// | [`EmbedError::NotTransformed`] | No distance matrix is cached |
    #[instrument(skip_all, fields(n_requested = indices.len()))]
    pub fn remove_prototype(&mut self, indices: &[usize]) -> Result<&FeatureMatrix, EmbedError> {
        let state = self.state.as_mut().ok_or(EmbedError::NotFitted)?;
        let cache = state.cache.as_mut().ok_or(EmbedError::NotTransformed)?;
        let keep = state.store.remove(indices);
        cache.remove_columns(&keep);
        debug!(n_remaining = state.store.len(), "prototypes removed");
        Ok(cache.matrix())
    }

    /// Return the prototype indices in column order.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::NotFitted`] before [`fit`](Self::fit).
    pub fn indices(&self) -> Result<&[usize], EmbedError> {
        Ok(self.fitted()?.store.indices())
    }

    /// Return the prototype sequences in column order.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::NotFitted`] before [`fit`](Self::fit).
    pub fn prototypes(&self) -> Result<&[Prototype], EmbedError> {
        Ok(self.fitted()?.store.prototypes())
    }

    /// Return the cached distance matrix, if a transform has run.
    #[must_use]
    pub fn distances(&self) -> Option<&FeatureMatrix> {
        self.state
            .as_ref()
            .and_then(|s| s.cache.as_ref())
            .map(DistanceCache::matrix)
    }

    /// Return the sequence length seen at fit.
    #[must_use]
    pub fn n_features_in(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.n_features)
    }

    /// Return the number of samples seen at fit.
    #[must_use]
    pub fn n_samples_fit(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.n_samples_fit)
    }

    /// Return true once [`fit`](Self::fit) has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Return the configuration.
    #[must_use]
    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// Return the resolved metric.
    #[must_use]
    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    fn fitted(&self) -> Result<&FittedState, EmbedError> {
        self.state.as_ref().ok_or(EmbedError::NotFitted)
    }
}

fn check_length(expected: usize, x: &SampleMatrix) -> Result<(), EmbedError> {
    if x.length() != expected {
        return Err(EmbedError::LengthMismatch {
            expected,
            got: x.length(),
        });
    }
    Ok(())
}
