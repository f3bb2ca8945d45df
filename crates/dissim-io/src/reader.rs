//! CSV sample reader with input validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dissim_embed::SampleMatrix;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{Dataset, SampleId};

/// Reads one channel of equal-length sequences from a CSV file.
///
/// Expected CSV format:
/// - Header row required (first column is the sample id, remaining columns
///   are positional time steps)
/// - `id,t0,t1,...,tn`
/// - One row per sample, all rows with the same number of columns
/// - Empty cells and `NaN` mark missing values, so shorter sequences can be
///   right-padded
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::NoTimeSteps`] | Header has only the id column |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::InvalidValue`] | Cell is infinite or unparseable |
/// | [`IoError::DuplicateSampleId`] | Same id appears twice |
pub struct SampleReader {
    path: PathBuf,
}

impl SampleReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so ragged rows reach our own InconsistentRowLength check.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?;
        let expected_cols = header.len();
        if expected_cols < 2 {
            return Err(IoError::NoTimeSteps {
                path: self.path.clone(),
            });
        }
        let length = expected_cols - 1;
        debug!(length, "read CSV header");

        let mut sample_ids = Vec::new();
        let mut data = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            let id = record.get(0).unwrap_or("").to_string();

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    sample_id: id,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            if let Some(&first_row) = seen.get(&id) {
                return Err(IoError::DuplicateSampleId {
                    path: self.path.clone(),
                    sample_id: id,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(id.clone(), row_index);

            for (col_index, raw) in record.iter().skip(1).enumerate() {
                let value = parse_cell(raw).ok_or_else(|| IoError::InvalidValue {
                    path: self.path.clone(),
                    row_index,
                    col_index,
                    raw: raw.to_string(),
                })?;
                data.push(value);
            }
            sample_ids.push(SampleId::new(id));
        }

        if sample_ids.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let n_missing = data.iter().filter(|v| v.is_nan()).count();
        let samples = SampleMatrix::from_flat(data, sample_ids.len(), length)?;
        info!(
            n_samples = samples.n_samples(),
            length,
            n_missing,
            "dataset loaded"
        );

        Ok(Dataset {
            sample_ids,
            samples,
        })
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

/// Parse one cell. Empty and NaN cells are missing; infinities are rejected.
fn parse_cell(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(f64::NAN);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_infinite() => None,
        Ok(v) => Some(v),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_4_samples() {
        let csv = "id,t0,t1,t2\nS1,0.0,0.1,0.2\nS2,1.0,1.1,1.2\nS3,2.0,2.1,2.2\nS4,3.0,3.1,3.2\n";
        let f = write_csv(csv);
        let ds = SampleReader::new(f.path()).read().unwrap();
        assert_eq!(ds.n_samples(), 4);
        assert_eq!(ds.samples.shape(), (4, 3));
        assert_eq!(ds.sample_ids[0].as_str(), "S1");
        assert_eq!(ds.samples.row(3), &[3.0, 3.1, 3.2]);
    }

    #[test]
    fn insertion_order_preserved() {
        let csv = "id,t0\nZZZ,1.0\nAAA,2.0\nMMM,3.0\n";
        let f = write_csv(csv);
        let ds = SampleReader::new(f.path()).read().unwrap();
        let ids: Vec<&str> = ds.sample_ids.iter().map(SampleId::as_str).collect();
        assert_eq!(ids, ["ZZZ", "AAA", "MMM"]);
    }

    #[test]
    fn missing_values_become_nan() {
        let csv = "id,t0,t1,t2,t3\nA,1.0,2.0,,\nB,1.0,NaN,nan,4.0\n";
        let f = write_csv(csv);
        let ds = SampleReader::new(f.path()).read().unwrap();
        let a = ds.samples.row(0);
        assert_eq!(&a[..2], &[1.0, 2.0]);
        assert!(a[2].is_nan() && a[3].is_nan());
        let b = ds.samples.row(1);
        assert!(b[1].is_nan() && b[2].is_nan());
        assert_eq!(b[3], 4.0);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let csv = "id, t0, t1\n A , 1.5 , 2.5 \n";
        let f = write_csv(csv);
        let ds = SampleReader::new(f.path()).read().unwrap();
        assert_eq!(ds.sample_ids[0].as_str(), "A");
        assert_eq!(ds.samples.row(0), &[1.5, 2.5]);
    }

    #[test]
    fn error_file_not_found() {
        let result = SampleReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_csv("id,t0,t1,t2\n");
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_no_time_steps() {
        let f = write_csv("id\nA\n");
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NoTimeSteps { .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let f = write_csv("id,t0,t1,t2\nS1,1.0,2.0,3.0\nS2,1.0,2.0\n");
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, expected: 4, got: 3, .. })
        ));
    }

    #[test]
    fn error_infinite_value() {
        let f = write_csv("id,t0,t1\nS1,1.0,inf\n");
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InvalidValue { row_index: 0, col_index: 1, .. })
        ));
    }

    #[test]
    fn error_unparseable_value() {
        let f = write_csv("id,t0,t1\nS1,1.0,abc\n");
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::InvalidValue { .. })));
    }

    #[test]
    fn error_duplicate_sample_id() {
        let f = write_csv("id,t0,t1\nS1,1.0,2.0\nS2,3.0,4.0\nS1,5.0,6.0\n");
        let result = SampleReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::DuplicateSampleId {
                first_row: 0,
                second_row: 2,
                ..
            })
        ));
    }

    #[test]
    fn parse_cell_rules() {
        assert_eq!(parse_cell("2.5"), Some(2.5));
        assert!(parse_cell("").unwrap().is_nan());
        assert!(parse_cell("NaN").unwrap().is_nan());
        assert_eq!(parse_cell("-inf"), None);
        assert_eq!(parse_cell("x"), None);
    }
}
