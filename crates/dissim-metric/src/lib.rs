//! Distance primitives for dissimilarity-space embedding.
//!
//! Pure math library with no I/O. Every metric follows one contract:
//! `distance(a, b, params) -> Result<f64, MetricError>` over plain `f64`
//! slices that may carry NaN for missing observations. Metrics are looked up
//! by name through [`MetricKind`].

mod constraint;
mod dtw;
mod error;
mod kind;
mod params;
mod pointwise;
mod preprocess;

pub use constraint::BandConstraint;
pub use dtw::{Dtw, fast_dtw};
pub use error::MetricError;
pub use kind::MetricKind;
pub use params::{MetricParams, ParamValue};
pub use pointwise::{cosine, euclidean, manhattan, nan_euclidean, sq_euclidean};
pub use preprocess::{first_difference, strip_nan, trim_trailing_nan};
