//! I/O error types for dissim-io.

use std::path::PathBuf;

use dissim_embed::EmbedError;

/// Errors from file I/O, CSV parsing, channel alignment, and output writing.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the header has no time-step columns after the id column.
    #[error("no time-step columns in {path}")]
    NoTimeSteps {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error(
        "inconsistent row length in {path}: row {row_index} (sample {sample_id}) has {got} columns, expected {expected}"
    )]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Id of the offending row.
        sample_id: String,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a cell is infinite or not a number. Empty and `NaN`
    /// cells are accepted as missing values.
    #[error("invalid value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    InvalidValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Zero-based column index (excluding the id column).
        col_index: usize,
        /// The raw cell text.
        raw: String,
    },

    /// Returned when the same sample id appears more than once.
    #[error(
        "duplicate sample id \"{sample_id}\" in {path}: first at row {first_row}, again at row {second_row}"
    )]
    DuplicateSampleId {
        /// Path to the CSV file.
        path: PathBuf,
        /// The duplicated id.
        sample_id: String,
        /// Zero-based row index of the first occurrence.
        first_row: usize,
        /// Zero-based row index of the second occurrence.
        second_row: usize,
    },

    /// Returned when a channel lacks a sample present in the first channel.
    #[error("channel {channel} has no row for sample \"{sample_id}\"")]
    MissingSample {
        /// Zero-based channel index.
        channel: usize,
        /// The missing id.
        sample_id: String,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when ids, feature rows, or column names disagree in count.
    #[error("cannot write {what}: expected {expected}, got {got}")]
    OutputShape {
        /// Which dimension disagrees.
        what: &'static str,
        /// Expected count.
        expected: usize,
        /// Actual count.
        got: usize,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a CSV output record cannot be written.
    #[error("cannot write CSV {path}")]
    WriteCsv {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a JSON artifact cannot be serialized.
    #[error("cannot serialize {path}")]
    Serialize {
        /// Destination path.
        path: PathBuf,
        /// Underlying serializer error.
        source: serde_json::Error,
    },

    /// Returned when parsed values fail sample-matrix validation.
    #[error(transparent)]
    Samples(#[from] EmbedError),
}
