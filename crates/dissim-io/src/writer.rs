//! Feature CSV and prototype JSON writers.

use std::fs;
use std::path::{Path, PathBuf};

use dissim_embed::FeatureMatrix;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ExperimentName, SampleId};

/// Prototype metadata for one channel.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelPrototypes<'a> {
    /// Metric label used by the channel.
    pub metric: &'a str,
    /// Sequence length of the channel.
    pub length: usize,
    /// Prototype indices in column order.
    pub indices: &'a [usize],
}

/// Writes transform outputs for one experiment.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_features.csv` and
/// `{experiment}_prototypes.json`.
pub struct FeatureWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl FeatureWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Column names `c{channel}_p{index}` for stacked channel outputs.
    #[must_use]
    pub fn column_names(channels: &[&[usize]]) -> Vec<String> {
        channels
            .iter()
            .enumerate()
            .flat_map(|(c, indices)| indices.iter().map(move |p| format!("c{c}_p{p}")))
            .collect()
    }

    /// Path of the features CSV.
    #[must_use]
    pub fn features_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_features.csv", self.experiment.as_str()))
    }

    /// Path of the prototypes JSON.
    #[must_use]
    pub fn prototypes_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_prototypes.json", self.experiment.as_str()))
    }

    /// Write `features` to `{experiment}_features.csv`, one row per sample.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::OutputShape`] | Id count or column-name count disagrees with `features` |
    /// | [`IoError::WriteCsv`] | The file cannot be written |
    #[instrument(skip_all, fields(shape = ?features.shape()))]
    pub fn write_features(
        &self,
        sample_ids: &[SampleId],
        features: &FeatureMatrix,
        columns: &[String],
    ) -> Result<PathBuf, IoError> {
        if sample_ids.len() != features.n_samples() {
            return Err(IoError::OutputShape {
                what: "feature rows",
                expected: sample_ids.len(),
                got: features.n_samples(),
            });
        }
        if columns.len() != features.n_components() {
            return Err(IoError::OutputShape {
                what: "feature columns",
                expected: columns.len(),
                got: features.n_components(),
            });
        }

        let path = self.features_path();
        let csv_err = |e: csv::Error| IoError::WriteCsv {
            path: path.clone(),
            source: e,
        };
        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;
        wtr.write_record(std::iter::once("sample_id").chain(columns.iter().map(String::as_str)))
            .map_err(csv_err)?;
        for (id, row) in sample_ids.iter().zip(features.rows()) {
            let record = std::iter::once(id.as_str().to_string())
                .chain(row.iter().map(f64::to_string));
            wtr.write_record(record).map_err(csv_err)?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "features written");
        Ok(path)
    }

    /// Write per-channel prototype metadata to `{experiment}_prototypes.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be serialized |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all, fields(n_channels = channels.len()))]
    pub fn write_prototypes(
        &self,
        n_samples: usize,
        channels: &[ChannelPrototypes<'_>],
    ) -> Result<PathBuf, IoError> {
        let path = self.prototypes_path();
        let entries: Vec<ChannelEntry<'_>> = channels
            .iter()
            .enumerate()
            .map(|(channel, c)| ChannelEntry {
                channel,
                n_components: c.indices.len(),
                prototypes: c.clone(),
            })
            .collect();
        let artifact = PrototypesArtifact {
            experiment: self.experiment.as_str(),
            n_samples,
            n_features: entries.iter().map(|e| e.n_components).sum(),
            channels: entries,
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "prototypes written");
        Ok(path)
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct PrototypesArtifact<'a> {
    experiment: &'a str,
    n_samples: usize,
    n_features: usize,
    channels: Vec<ChannelEntry<'a>>,
}

#[derive(Serialize)]
struct ChannelEntry<'a> {
    channel: usize,
    n_components: usize,
    #[serde(flatten)]
    prototypes: ChannelPrototypes<'a>,
}
