//! Configuration builder for [`FeatureTransformer`].

use dissim_metric::MetricParams;

use crate::error::EmbedError;
use crate::metric::MetricSpec;
use crate::transformer::FeatureTransformer;

/// Configuration for a single-channel transformer.
///
/// Construct via [`TransformerConfig::new`], then chain `with_*` methods to
/// override defaults. A built transformer never sees later changes.
///
/// # Defaults
///
/// | Parameter         | Default                |
/// |-------------------|------------------------|
/// | `n_components`    | 30 ([`Default`] only)  |
/// | `copy_prototypes` | true                   |
/// | `metric`          | `euclidean`            |
/// | `metric_params`   | empty                  |
/// | `random_state`    | none (entropy-seeded)  |
/// | `n_jobs`          | none (sequential)      |
#[derive(Debug, Clone)]
pub struct TransformerConfig {
    pub(crate) n_components: usize,
    pub(crate) copy_prototypes: bool,
    pub(crate) metric: MetricSpec,
    pub(crate) metric_params: MetricParams,
    pub(crate) random_state: Option<u64>,
    pub(crate) n_jobs: Option<i32>,
}

impl TransformerConfig {
    /// Default number of prototypes.
    pub const DEFAULT_N_COMPONENTS: usize = 30;

    /// Create a configuration selecting `n_components` prototypes.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::InvalidComponents`] | `n_components` is zero |
    pub fn new(n_components: usize) -> Result<Self, EmbedError> {
        if n_components == 0 {
            return Err(EmbedError::InvalidComponents { n_components });
        }
        Ok(Self {
            n_components,
            copy_prototypes: true,
            metric: MetricSpec::default(),
            metric_params: MetricParams::new(),
            random_state: None,
            n_jobs: None,
        })
    }

    /// Copy selected rows into owned storage (`true`) or keep shared views
    /// of the fit-time matrix (`false`).
    #[must_use]
    pub fn with_copy_prototypes(mut self, copy_prototypes: bool) -> Self {
        self.copy_prototypes = copy_prototypes;
        self
    }

    /// Set the distance measure.
    #[must_use]
    pub fn with_metric(mut self, metric: impl Into<MetricSpec>) -> Self {
        self.metric = metric.into();
        self
    }

    /// Set the parameters passed to every metric call.
    #[must_use]
    pub fn with_metric_params(mut self, metric_params: MetricParams) -> Self {
        self.metric_params = metric_params;
        self
    }

    /// Seed prototype selection. `None` draws a fresh seed from OS entropy.
    #[must_use]
    pub fn with_random_state(mut self, random_state: Option<u64>) -> Self {
        self.random_state = random_state;
        self
    }

    /// Set the parallelism degree. See [`crate::Parallelism`] for the mapping.
    #[must_use]
    pub fn with_n_jobs(mut self, n_jobs: Option<i32>) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    /// Return the number of prototypes selected at fit.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Return whether prototypes are copied.
    #[must_use]
    pub fn copy_prototypes(&self) -> bool {
        self.copy_prototypes
    }

    /// Return the metric specification.
    #[must_use]
    pub fn metric(&self) -> &MetricSpec {
        &self.metric
    }

    /// Return the metric parameters.
    #[must_use]
    pub fn metric_params(&self) -> &MetricParams {
        &self.metric_params
    }

    /// Return the selection seed.
    #[must_use]
    pub fn random_state(&self) -> Option<u64> {
        self.random_state
    }

    /// Return the parallelism degree.
    #[must_use]
    pub fn n_jobs(&self) -> Option<i32> {
        self.n_jobs
    }

    /// Build a transformer from this configuration.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::InvalidJobs`] | `n_jobs` is `Some(0)` |
    /// | [`EmbedError::ThreadPool`] | The worker pool cannot be created |
    pub fn build(self) -> Result<FeatureTransformer, EmbedError> {
        FeatureTransformer::new(self)
    }
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            n_components: Self::DEFAULT_N_COMPONENTS,
            copy_prototypes: true,
            metric: MetricSpec::default(),
            metric_params: MetricParams::new(),
            random_state: None,
            n_jobs: None,
        }
    }
}
