//! Dissimilarity-space embedding of time series.
//!
//! Maps each input sequence to the vector of its distances to a set of
//! prototype sequences drawn from the training data. Provides randomized
//! prototype selection, a cached sample-by-prototype distance matrix with
//! incremental column add/remove, and a multi-channel aggregator.

mod aggregator;
mod cache;
mod config;
mod error;
mod features;
mod matrix;
mod metric;
mod parallel;
mod prototypes;
mod transformer;

pub use aggregator::MultiComponentTransformer;
pub use config::TransformerConfig;
pub use error::EmbedError;
pub use features::FeatureMatrix;
pub use matrix::SampleMatrix;
pub use metric::{DistanceFn, Metric, MetricSpec, compute_blended, dynamic_window};
pub use parallel::Parallelism;
pub use prototypes::Prototype;
pub use transformer::FeatureTransformer;

pub use dissim_metric::{MetricError, MetricKind, MetricParams, ParamValue};
