//! Registry of named metrics.

use std::fmt;
use std::str::FromStr;

use crate::dtw::{Dtw, fast_dtw};
use crate::error::MetricError;
use crate::params::MetricParams;
use crate::pointwise;

/// A library-provided distance, addressable by name.
///
/// | Kind | Names |
/// |---|---|
/// | `Euclidean` | `euclidean`, `l2` |
/// | `SqEuclidean` | `sqeuclidean` |
/// | `Manhattan` | `manhattan`, `cityblock`, `l1` |
/// | `Cosine` | `cosine` |
/// | `NanEuclidean` | `nan_euclidean` |
/// | `Dtw` | `dtw` (reads `window`) |
/// | `FastDtw` | `fastdtw` (reads `radius`) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Euclidean (L2) distance.
    Euclidean,
    /// Squared Euclidean distance.
    SqEuclidean,
    /// Manhattan (L1) distance.
    Manhattan,
    /// Cosine distance.
    Cosine,
    /// Euclidean distance over commonly observed coordinates, rescaled.
    NanEuclidean,
    /// Dynamic Time Warping with an optional Sakoe-Chiba `window`.
    Dtw,
    /// Approximate DTW over NaN-stripped sequences with a narrow band.
    FastDtw,
}

impl MetricKind {
    /// Every registered metric, in documentation order.
    pub const ALL: [MetricKind; 7] = [
        Self::Euclidean,
        Self::SqEuclidean,
        Self::Manhattan,
        Self::Cosine,
        Self::NanEuclidean,
        Self::Dtw,
        Self::FastDtw,
    ];

    /// Return the canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::SqEuclidean => "sqeuclidean",
            Self::Manhattan => "manhattan",
            Self::Cosine => "cosine",
            Self::NanEuclidean => "nan_euclidean",
            Self::Dtw => "dtw",
            Self::FastDtw => "fastdtw",
        }
    }

    /// Return true for metrics that return approximate results.
    #[must_use]
    pub fn is_approximate(self) -> bool {
        matches!(self, Self::FastDtw)
    }

    /// Compute the distance between `a` and `b`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::LengthMismatch`] | Pointwise metric on unequal lengths |
    /// | [`MetricError::EmptySequence`] | DTW input with no observed values |
    /// | [`MetricError::InvalidParam`] | Malformed `window` or `radius` |
    pub fn distance(self, a: &[f64], b: &[f64], params: &MetricParams) -> Result<f64, MetricError> {
        match self {
            Self::Euclidean => pointwise::euclidean(a, b),
            Self::SqEuclidean => pointwise::sq_euclidean(a, b),
            Self::Manhattan => pointwise::manhattan(a, b),
            Self::Cosine => pointwise::cosine(a, b),
            Self::NanEuclidean => pointwise::nan_euclidean(a, b),
            Self::Dtw => Dtw::from_params(params)?.distance(a, b),
            Self::FastDtw => fast_dtw(a, b, params),
        }
    }
}

impl FromStr for MetricKind {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "sqeuclidean" => Ok(Self::SqEuclidean),
            "manhattan" | "cityblock" | "l1" => Ok(Self::Manhattan),
            "cosine" => Ok(Self::Cosine),
            "nan_euclidean" => Ok(Self::NanEuclidean),
            "dtw" => Ok(Self::Dtw),
            "fastdtw" => Ok(Self::FastDtw),
            other => Err(MetricError::UnknownMetric {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
