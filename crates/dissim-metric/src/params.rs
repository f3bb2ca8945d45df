//! Extra keyword parameters forwarded to metric calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// A single metric parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value (window radii, sentinels).
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
}

/// Named parameters passed through to every metric call.
///
/// Each transformer owns its own copy; there is no shared default instance.
/// Parameters a metric does not understand are ignored by that metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricParams(BTreeMap<String, ParamValue>);

impl MetricParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an integer parameter.
    #[must_use]
    pub fn with_int(mut self, name: &str, value: i64) -> Self {
        self.insert(name, ParamValue::Int(value));
        self
    }

    /// Set a floating point parameter.
    #[must_use]
    pub fn with_float(mut self, name: &str, value: f64) -> Self {
        self.insert(name, ParamValue::Float(value));
        self
    }

    /// Set a boolean parameter.
    #[must_use]
    pub fn with_bool(mut self, name: &str, value: bool) -> Self {
        self.insert(name, ParamValue::Bool(value));
        self
    }

    /// Insert or replace a parameter, returning the previous value.
    pub fn insert(&mut self, name: &str, value: ParamValue) -> Option<ParamValue> {
        self.0.insert(name.to_string(), value)
    }

    /// Return the raw value of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.0.get(name).copied()
    }

    /// Return true if the parameter is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Return the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Read an integer parameter.
    ///
    /// Floats with an integral value are accepted.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::InvalidParam`] | Value is a bool or a non-integral float |
    pub fn get_int(&self, name: &str) -> Result<Option<i64>, MetricError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParamValue::Int(v)) => Ok(Some(v)),
            Some(ParamValue::Float(v)) if v.fract() == 0.0 && v.is_finite() => Ok(Some(v as i64)),
            Some(other) => Err(MetricError::invalid_param(
                name,
                format!("expected an integer, got {other:?}"),
            )),
        }
    }

    /// Read a floating point parameter. Integers are widened.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::InvalidParam`] | Value is a bool |
    pub fn get_float(&self, name: &str) -> Result<Option<f64>, MetricError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParamValue::Float(v)) => Ok(Some(v)),
            Some(ParamValue::Int(v)) => Ok(Some(v as f64)),
            Some(other) => Err(MetricError::invalid_param(
                name,
                format!("expected a number, got {other:?}"),
            )),
        }
    }

    /// Read a non-negative size parameter such as a band radius.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MetricError::InvalidParam`] | Value is negative or not an integer |
    pub fn get_usize(&self, name: &str) -> Result<Option<usize>, MetricError> {
        match self.get_int(name)? {
            None => Ok(None),
            Some(v) if v < 0 => Err(MetricError::invalid_param(
                name,
                format!("must be non-negative, got {v}"),
            )),
            Some(v) => Ok(Some(v as usize)),
        }
    }
}

impl FromIterator<(String, ParamValue)> for MetricParams {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
