use dissim_metric::MetricError;

/// Errors from input validation, configuration, and transformer state.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// Returned when an input matrix has zero rows.
    #[error("input has zero samples")]
    EmptyInput,

    /// Returned when an input matrix has zero time steps per row.
    #[error("input has zero time steps per sample")]
    ZeroLength,

    /// Returned when a row's length differs from the first row's length.
    #[error("ragged input: row {row} has {got} values, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        got: usize,
    },

    /// Returned when a flat buffer does not match the declared shape.
    #[error("buffer of {len} values cannot be shaped as {n_rows}x{n_cols}")]
    ShapeMismatch {
        /// Length of the buffer.
        len: usize,
        /// Declared row count.
        n_rows: usize,
        /// Declared column count.
        n_cols: usize,
    },

    /// Returned when a value is positive or negative infinity. NaN is allowed.
    #[error("infinite value at row {row}, column {col}")]
    InfiniteValue {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        col: usize,
    },

    /// Returned when `n_components` is zero.
    #[error("n_components must be at least 1, got {n_components}")]
    InvalidComponents {
        /// The invalid value.
        n_components: usize,
    },

    /// Returned when more prototypes are requested than there are samples.
    #[error("need at least {n_components} samples to select {n_components} prototypes, got {n_samples}")]
    TooFewSamples {
        /// Number of samples provided.
        n_samples: usize,
        /// Requested number of prototypes.
        n_components: usize,
    },

    /// Returned when `n_jobs` is zero.
    #[error("n_jobs must not be zero")]
    InvalidJobs,

    /// Returned when transform, add, or remove is called before `fit`.
    #[error("transformer is not fitted; call fit first")]
    NotFitted,

    /// Returned when add or remove is called before any `transform` has
    /// populated the distance cache.
    #[error("no cached distances; call transform or fit_transform first")]
    NotTransformed,

    /// Returned when the fit input is shorter than the metric can compare.
    #[error("metric {metric} needs at least {required} time steps, input has {length}")]
    SequenceTooShort {
        /// Metric label.
        metric: String,
        /// Minimum length the metric accepts.
        required: usize,
        /// Length of the input.
        length: usize,
    },

    /// Returned when an input's sequence length differs from the fit-time length.
    #[error("input has {got} time steps per sample, transformer was fitted with {expected}")]
    LengthMismatch {
        /// Length seen at fit time.
        expected: usize,
        /// Length of the new input.
        got: usize,
    },

    /// Returned when `add_prototype` receives a matrix whose sample count
    /// differs from the rows of the cached distance matrix.
    #[error("input has {got} samples, cached distances cover {expected}")]
    SampleCountMismatch {
        /// Rows in the cached distance matrix.
        expected: usize,
        /// Rows in the new input.
        got: usize,
    },

    /// Returned when a prototype index is outside the input matrix.
    #[error("prototype index {index} out of bounds for {n_samples} samples")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Number of samples in the input.
        n_samples: usize,
    },

    /// Returned when channel outputs cannot be stacked side by side.
    #[error("channel {channel} produced {got} rows, expected {expected}")]
    ChannelRowMismatch {
        /// Zero-based channel index.
        channel: usize,
        /// Row count of the first channel.
        expected: usize,
        /// Row count of the offending channel.
        got: usize,
    },

    /// Returned when an aggregator operation pairs zero channels with inputs.
    #[error("no channels to combine")]
    NoChannels,

    /// A distance computation failed; user-callable errors pass through unchanged.
    #[error(transparent)]
    Metric(#[from] MetricError),

    /// Returned when the dedicated worker pool cannot be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
