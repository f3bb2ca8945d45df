//! Metric resolution and the derivative-blended composite distance.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dissim_metric::{MetricError, MetricKind, MetricParams, ParamValue, fast_dtw, first_difference};

/// Uniform distance callable: `(a, b, params) -> distance`.
///
/// Errors returned by a user callable reach the caller unchanged, wrapped in
/// [`crate::EmbedError::Metric`].
pub type DistanceFn =
    Arc<dyn Fn(&[f64], &[f64], &MetricParams) -> Result<f64, MetricError> + Send + Sync>;

/// How a transformer measures distance to its prototypes.
///
/// Resolved exactly once, when the transformer is built, into a single
/// [`DistanceFn`].
#[derive(Clone)]
pub enum MetricSpec {
    /// A library-provided metric.
    Named(MetricKind),
    /// Approximate DTW over NaN-stripped sequences (reads `radius`).
    Approximate,
    /// A user-supplied callable, passed through unchanged.
    Custom {
        /// Label used in logs and output metadata.
        name: String,
        /// The distance function.
        func: DistanceFn,
    },
    /// `(1 - alpha) * base(x, y) + alpha * base(diff(x), diff(y))`.
    ///
    /// With a nonzero `alpha` the derivative term needs at least two time
    /// steps; transformers reject shorter inputs at fit time.
    Blended {
        /// Weight of the derivative term. Not range-checked.
        alpha: f64,
        /// Distance applied to both the raw and the differenced sequences.
        base: Box<MetricSpec>,
    },
}

impl MetricSpec {
    /// Wrap a user callable.
    pub fn custom<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[f64], &[f64], &MetricParams) -> Result<f64, MetricError> + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Blend `base` with its value on first differences.
    #[must_use]
    pub fn blended(alpha: f64, base: MetricSpec) -> Self {
        Self::Blended {
            alpha,
            base: Box::new(base),
        }
    }

    /// Return a human-readable label.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Named(kind) => kind.name().to_string(),
            Self::Approximate => MetricKind::FastDtw.name().to_string(),
            Self::Custom { name, .. } => name.clone(),
            Self::Blended { alpha, base } => format!("{}[alpha={alpha}]", base.name()),
        }
    }

    /// Shortest sequence length this metric accepts.
    ///
    /// A blended metric with nonzero `alpha` differences its inputs, so a
    /// single time step would leave nothing to compare.
    #[must_use]
    pub fn min_length(&self) -> usize {
        match self {
            Self::Blended { alpha, base } if *alpha != 0.0 => base.min_length().max(2),
            Self::Blended { base, .. } => base.min_length(),
            _ => 1,
        }
    }

    /// Resolve into a single callable.
    #[must_use]
    pub fn resolve(&self) -> DistanceFn {
        match self {
            Self::Named(kind) => {
                let kind = *kind;
                Arc::new(move |a: &[f64], b: &[f64], p: &MetricParams| kind.distance(a, b, p))
            }
            Self::Approximate => {
                Arc::new(|a: &[f64], b: &[f64], p: &MetricParams| fast_dtw(a, b, p))
            }
            Self::Custom { func, .. } => Arc::clone(func),
            Self::Blended { alpha, base } => {
                let alpha = *alpha;
                let base = base.resolve();
                Arc::new(move |a: &[f64], b: &[f64], p: &MetricParams| {
                    compute_blended(a, b, alpha, &*base, p)
                })
            }
        }
    }
}

impl Default for MetricSpec {
    fn default() -> Self {
        Self::Named(MetricKind::Euclidean)
    }
}

impl From<MetricKind> for MetricSpec {
    fn from(kind: MetricKind) -> Self {
        if kind.is_approximate() {
            Self::Approximate
        } else {
            Self::Named(kind)
        }
    }
}

impl FromStr for MetricSpec {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<MetricKind>().map(Self::from)
    }
}

impl fmt::Debug for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(kind) => f.debug_tuple("Named").field(kind).finish(),
            Self::Approximate => f.write_str("Approximate"),
            Self::Custom { name, .. } => f
                .debug_struct("Custom")
                .field("name", name)
                .finish_non_exhaustive(),
            Self::Blended { alpha, base } => f
                .debug_struct("Blended")
                .field("alpha", alpha)
                .field("base", base)
                .finish(),
        }
    }
}

/// A resolved metric bound to its parameters.
#[derive(Clone)]
pub struct Metric {
    name: String,
    func: DistanceFn,
    params: MetricParams,
}

impl Metric {
    /// Resolve `spec` and bind `params` to it.
    #[must_use]
    pub fn new(spec: &MetricSpec, params: MetricParams) -> Self {
        Self {
            name: spec.name(),
            func: spec.resolve(),
            params,
        }
    }

    /// Compute the distance between `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying callable returns.
    pub fn distance(&self, a: &[f64], b: &[f64]) -> Result<f64, MetricError> {
        (self.func)(a, b, &self.params)
    }

    /// Return the metric label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the bound parameters.
    #[must_use]
    pub fn params(&self) -> &MetricParams {
        &self.params
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metric")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Window used when `window = -1`: one tenth of the longer sequence, rounded up.
#[must_use]
pub fn dynamic_window(len_x: usize, len_y: usize) -> usize {
    len_x.max(len_y).div_ceil(10)
}

/// Blend `base` on the raw sequences with `base` on their first differences.
///
/// ```text
/// (1 - alpha) * base(x, y, params) + alpha * base(diff(x), diff(y), params)
/// ```
///
/// A `window` parameter of `-1` is replaced by [`dynamic_window`] of the raw
/// lengths, and the same window is used for both terms. `alpha = 0` and
/// `alpha = 1` evaluate only the term they select, so the result equals that
/// term exactly.
///
/// # Errors
///
/// Returns the first error produced by `base`.
pub fn compute_blended<F>(
    x: &[f64],
    y: &[f64],
    alpha: f64,
    base: &F,
    params: &MetricParams,
) -> Result<f64, MetricError>
where
    F: Fn(&[f64], &[f64], &MetricParams) -> Result<f64, MetricError> + ?Sized,
{
    let resolved;
    let params = if matches!(params.get_int("window"), Ok(Some(-1))) {
        let mut p = params.clone();
        let window = dynamic_window(x.len(), y.len());
        p.insert("window", ParamValue::Int(window as i64));
        resolved = p;
        &resolved
    } else {
        params
    };

    if alpha == 0.0 {
        return base(x, y, params);
    }
    let dx = first_difference(x);
    let dy = first_difference(y);
    if alpha == 1.0 {
        return base(&dx, &dy, params);
    }
    let raw = base(x, y, params)?;
    let derived = base(&dx, &dy, params)?;
    Ok((1.0 - alpha) * raw + alpha * derived)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn euclid(a: &[f64], b: &[f64], p: &MetricParams) -> Result<f64, MetricError> {
        MetricKind::Euclidean.distance(a, b, p)
    }

    #[test]
    fn dynamic_window_rounds_up() {
        assert_eq!(dynamic_window(50, 80), 8);
        assert_eq!(dynamic_window(30, 10), 3);
        assert_eq!(dynamic_window(31, 1), 4);
        assert_eq!(dynamic_window(1, 1), 1);
    }

    #[test]
    fn blended_alpha_zero_is_base() {
        let x = [1.0, 3.0, 2.0, 5.0];
        let y = [0.0, 1.0, 4.0, 4.0];
        let p = MetricParams::new();
        let blended = compute_blended(&x, &y, 0.0, &euclid, &p).unwrap();
        assert_eq!(blended, euclid(&x, &y, &p).unwrap());
    }

    #[test]
    fn blended_alpha_one_is_derivative() {
        let x = [1.0, 3.0, 2.0, 5.0];
        let y = [0.0, 1.0, 4.0, 4.0];
        let p = MetricParams::new();
        let blended = compute_blended(&x, &y, 1.0, &euclid, &p).unwrap();
        let expected = euclid(&first_difference(&x), &first_difference(&y), &p).unwrap();
        assert_eq!(blended, expected);
    }

    #[test]
    fn blended_mixes_terms() {
        let x = [0.0, 0.0, 0.0];
        let y = [1.0, 2.0, 3.0];
        // raw = sqrt(14), diff: [0,0] vs [1,1] -> sqrt(2)
        let p = MetricParams::new();
        let got = compute_blended(&x, &y, 0.25, &euclid, &p).unwrap();
        let expected = 0.75 * 14.0_f64.sqrt() + 0.25 * 2.0_f64.sqrt();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn blended_alpha_outside_unit_interval_extrapolates() {
        let x = [0.0, 0.0, 0.0];
        let y = [1.0, 2.0, 3.0];
        let p = MetricParams::new();
        let got = compute_blended(&x, &y, 2.0, &euclid, &p).unwrap();
        let expected = -14.0_f64.sqrt() + 2.0 * 2.0_f64.sqrt();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn sentinel_window_is_replaced_for_both_terms() {
        let seen = Mutex::new(Vec::new());
        let base = |_: &[f64], _: &[f64], p: &MetricParams| -> Result<f64, MetricError> {
            seen.lock().unwrap().push(p.get("window"));
            Ok(0.0)
        };
        let x = vec![0.0; 50];
        let y = vec![0.0; 80];
        let p = MetricParams::new().with_int("window", -1);
        compute_blended(&x, &y, 0.5, &base, &p).unwrap();
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen, vec![Some(ParamValue::Int(8)); 2]);
    }

    #[test]
    fn explicit_window_passes_through() {
        let seen = Mutex::new(None);
        let base = |_: &[f64], _: &[f64], p: &MetricParams| -> Result<f64, MetricError> {
            *seen.lock().unwrap() = p.get("window");
            Ok(0.0)
        };
        let p = MetricParams::new().with_int("window", 3);
        compute_blended(&[1.0, 2.0], &[1.0, 2.0], 0.0, &base, &p).unwrap();
        assert_eq!(seen.into_inner().unwrap(), Some(ParamValue::Int(3)));
    }

    #[test]
    fn blended_propagates_base_error() {
        let base = |_: &[f64], _: &[f64], _: &MetricParams| -> Result<f64, MetricError> {
            Err(MetricError::custom("boom"))
        };
        let err = compute_blended(&[1.0, 2.0], &[1.0, 2.0], 0.5, &base, &MetricParams::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn spec_parses_names() {
        assert!(matches!(
            "euclidean".parse::<MetricSpec>().unwrap(),
            MetricSpec::Named(MetricKind::Euclidean)
        ));
        assert!(matches!("fastdtw".parse::<MetricSpec>().unwrap(), MetricSpec::Approximate));
        assert!(matches!(
            "bogus".parse::<MetricSpec>(),
            Err(MetricError::UnknownMetric { .. })
        ));
    }

    #[test]
    fn spec_names() {
        assert_eq!(MetricSpec::default().name(), "euclidean");
        assert_eq!(MetricSpec::Approximate.name(), "fastdtw");
        let blended = MetricSpec::blended(0.5, MetricSpec::Named(MetricKind::Dtw));
        assert_eq!(blended.name(), "dtw[alpha=0.5]");
        let custom = MetricSpec::custom("mine", |_: &[f64], _: &[f64], _: &MetricParams| Ok(1.0));
        assert_eq!(custom.name(), "mine");
        assert!(format!("{custom:?}").contains("mine"));
    }

    #[test]
    fn resolved_named_matches_kind() {
        let metric = Metric::new(&MetricSpec::Named(MetricKind::Manhattan), MetricParams::new());
        assert_eq!(metric.distance(&[0.0, 0.0], &[1.0, -2.0]).unwrap(), 3.0);
        assert_eq!(metric.name(), "manhattan");
    }

    #[test]
    fn resolved_blended_uses_params() {
        let spec = MetricSpec::blended(0.5, MetricSpec::Named(MetricKind::Dtw));
        let metric = Metric::new(&spec, MetricParams::new().with_int("window", -1));
        let x: Vec<f64> = (0..20).map(|i| (i as f64 * 0.4).sin()).collect();
        let d = metric.distance(&x, &x).unwrap();
        assert_eq!(d, 0.0);
    }

    #[test]
    fn custom_receives_bound_params() {
        let spec = MetricSpec::custom("scaled", |a: &[f64], b: &[f64], p: &MetricParams| {
            let scale = p.get_float("scale")?.unwrap_or(1.0);
            Ok(scale * (a[0] - b[0]).abs())
        });
        let metric = Metric::new(&spec, MetricParams::new().with_float("scale", 2.0));
        assert_eq!(metric.distance(&[1.0], &[4.0]).unwrap(), 6.0);
    }

    #[test]
    fn min_length_tracks_derivative_term() {
        let dtw = MetricSpec::from(MetricKind::Dtw);
        assert_eq!(dtw.min_length(), 1);
        assert_eq!(MetricSpec::blended(0.0, dtw.clone()).min_length(), 1);
        assert_eq!(MetricSpec::blended(0.3, dtw.clone()).min_length(), 2);
        assert_eq!(MetricSpec::blended(0.0, MetricSpec::blended(1.0, dtw)).min_length(), 2);
    }
}
