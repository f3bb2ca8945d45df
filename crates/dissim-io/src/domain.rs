//! Domain types for dissim-io.

use dissim_embed::SampleMatrix;

use crate::IoError;

/// A sample identifier.
///
/// Wraps the string in the first column of an input CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleId(String);

impl SampleId {
    /// Wrap an id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One channel of samples with their ids.
///
/// Produced by [`SampleReader`](crate::SampleReader). `sample_ids[i]` labels
/// row `i` of `samples`.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Sample ids in file order.
    pub sample_ids: Vec<SampleId>,
    /// Validated samples in the same order as `sample_ids`.
    pub samples: SampleMatrix,
}

impl Dataset {
    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_id_as_str_returns_inner() {
        let id = SampleId::new("patient_017");
        assert_eq!(id.as_str(), "patient_017");
        assert_eq!(id.to_string(), "patient_017");
    }

    #[test]
    fn experiment_name_valid() {
        let name = ExperimentName::new("gesture-dtw_01".to_string());
        assert_eq!(name.unwrap().as_str(), "gesture-dtw_01");
    }

    #[test]
    fn experiment_name_rejects_empty() {
        let name = ExperimentName::new(String::new());
        assert!(matches!(name, Err(IoError::InvalidExperimentName { .. })));
    }

    #[test]
    fn experiment_name_rejects_path_separators() {
        let name = ExperimentName::new("../escape".to_string());
        assert!(matches!(name, Err(IoError::InvalidExperimentName { .. })));
    }
}
