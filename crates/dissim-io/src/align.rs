//! Row alignment of multi-channel datasets by sample id.

use std::collections::HashMap;

use dissim_embed::SampleMatrix;
use tracing::{info, instrument, warn};

use crate::IoError;
use crate::domain::Dataset;

/// Reorder every channel's rows to follow the first channel's sample order.
///
/// Channels are matched by sample id. Rows whose id does not appear in the
/// first channel are dropped with a warning. A first-channel id missing from
/// a later channel is a hard error.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::MissingSample`] | A later channel lacks an id of the first channel |
#[instrument(skip_all, fields(n_channels = channels.len()))]
pub fn align_channels(channels: Vec<Dataset>) -> Result<Vec<Dataset>, IoError> {
    let mut iter = channels.into_iter();
    let Some(first) = iter.next() else {
        return Ok(Vec::new());
    };

    let mut aligned = Vec::with_capacity(iter.len() + 1);
    for (offset, dataset) in iter.enumerate() {
        let channel = offset + 1;
        if dataset.sample_ids == first.sample_ids {
            aligned.push(dataset);
            continue;
        }

        let position: HashMap<&str, usize> = dataset
            .sample_ids
            .iter()
            .enumerate()
            .map(|(row, id)| (id.as_str(), row))
            .collect();

        let length = dataset.samples.length();
        let mut data = Vec::with_capacity(first.n_samples() * length);
        for id in &first.sample_ids {
            let &row = position.get(id.as_str()).ok_or_else(|| IoError::MissingSample {
                channel,
                sample_id: id.to_string(),
            })?;
            data.extend_from_slice(dataset.samples.row(row));
        }

        let n_dropped = dataset.n_samples().saturating_sub(first.n_samples());
        if n_dropped > 0 {
            warn!(channel, n_dropped, "samples absent from the first channel dropped");
        }
        info!(channel, "channel reordered to match first channel");

        let samples = SampleMatrix::from_flat(data, first.n_samples(), length)?;
        aligned.push(Dataset {
            sample_ids: first.sample_ids.clone(),
            samples,
        });
    }
    aligned.insert(0, first);
    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SampleId;

    fn dataset(ids: &[&str], rows: &[Vec<f64>]) -> Dataset {
        Dataset {
            sample_ids: ids.iter().map(|&id| SampleId::new(id)).collect(),
            samples: SampleMatrix::from_rows(rows).unwrap(),
        }
    }

    #[test]
    fn identical_order_is_untouched() {
        let a = dataset(&["x", "y"], &[vec![1.0], vec![2.0]]);
        let b = dataset(&["x", "y"], &[vec![3.0, 3.5], vec![4.0, 4.5]]);
        let out = align_channels(vec![a, b]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].samples.row(1), &[4.0, 4.5]);
    }

    #[test]
    fn later_channels_are_reordered() {
        let a = dataset(&["x", "y", "z"], &[vec![1.0], vec![2.0], vec![3.0]]);
        let b = dataset(&["z", "x", "y"], &[vec![30.0], vec![10.0], vec![20.0]]);
        let out = align_channels(vec![a, b]).unwrap();
        assert_eq!(out[1].sample_ids, out[0].sample_ids);
        assert_eq!(out[1].samples.row(0), &[10.0]);
        assert_eq!(out[1].samples.row(1), &[20.0]);
        assert_eq!(out[1].samples.row(2), &[30.0]);
    }

    #[test]
    fn extra_rows_are_dropped() {
        let a = dataset(&["x"], &[vec![1.0]]);
        let b = dataset(&["w", "x"], &[vec![0.0], vec![9.0]]);
        let out = align_channels(vec![a, b]).unwrap();
        assert_eq!(out[1].samples.shape(), (1, 1));
        assert_eq!(out[1].samples.row(0), &[9.0]);
    }

    #[test]
    fn missing_row_is_error() {
        let a = dataset(&["x", "y"], &[vec![1.0], vec![2.0]]);
        let b = dataset(&["x"], &[vec![1.0]]);
        assert!(matches!(
            align_channels(vec![a, b]),
            Err(IoError::MissingSample { channel: 1, .. })
        ));
    }
}
