//! Multi-channel composition of [`FeatureTransformer`]s.

use tracing::{instrument, warn};

use crate::config::TransformerConfig;
use crate::error::EmbedError;
use crate::features::FeatureMatrix;
use crate::matrix::SampleMatrix;
use crate::transformer::FeatureTransformer;

/// One transformer per channel; outputs are stacked column-wise in channel
/// order.
///
/// Inputs are paired with channels by position. When the number of inputs
/// differs from the number of channels, the extra entries on the longer side
/// are ignored and a warning is logged.
///
/// Channels are processed one after another. An error in channel `c` leaves
/// channels before `c` in their updated state.
#[derive(Debug, Clone)]
pub struct MultiComponentTransformer {
    transformers: Vec<FeatureTransformer>,
}

impl MultiComponentTransformer {
    /// Wrap already-built transformers.
    #[must_use]
    pub fn new(transformers: Vec<FeatureTransformer>) -> Self {
        Self { transformers }
    }

    /// Build one transformer per configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`TransformerConfig::build`].
    pub fn from_configs<I>(configs: I) -> Result<Self, EmbedError>
    where
        I: IntoIterator<Item = TransformerConfig>,
    {
        let transformers = configs
            .into_iter()
            .map(TransformerConfig::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(transformers))
    }

    /// Return the per-channel transformers.
    #[must_use]
    pub fn transformers(&self) -> &[FeatureTransformer] {
        &self.transformers
    }

    /// Return the number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    /// Return true if there are no channels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Fit each channel on its paired input.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::NoChannels`] | No channel is paired with an input |
    /// | any | The first error from [`FeatureTransformer::fit`] |
    #[instrument(skip_all, fields(n_channels = self.transformers.len(), n_inputs = xs.len()))]
    pub fn fit(&mut self, xs: &[SampleMatrix]) -> Result<&mut Self, EmbedError> {
        let n = self.paired_len("fit", &[xs.len()])?;
        for (t, x) in self.transformers.iter_mut().zip(xs).take(n) {
            t.fit(x)?;
        }
        Ok(self)
    }

    /// Transform each input with its channel and stack the results.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::NoChannels`] | No channel is paired with an input |
    /// | [`EmbedError::ChannelRowMismatch`] | Paired inputs differ in row count |
    /// | any | The first error from [`FeatureTransformer::transform`] |
    #[instrument(skip_all, fields(n_channels = self.transformers.len(), n_inputs = xs.len()))]
    pub fn transform(&mut self, xs: &[SampleMatrix]) -> Result<FeatureMatrix, EmbedError> {
        let n = self.paired_len("transform", &[xs.len()])?;
        check_rows(&xs[..n])?;
        let parts = self
            .transformers
            .iter_mut()
            .zip(xs)
            .map(|(t, x)| t.transform(x))
            .collect::<Result<Vec<_>, _>>()?;
        FeatureMatrix::hstack(&parts)
    }

    /// [`fit`](Self::fit) then [`transform`](Self::transform) on the same inputs.
    ///
    /// # Errors
    ///
    /// See [`fit`](Self::fit) and [`transform`](Self::transform).
    pub fn fit_transform(&mut self, xs: &[SampleMatrix]) -> Result<FeatureMatrix, EmbedError> {
        self.fit(xs)?.transform(xs)
    }

    /// Add prototypes per channel and stack the updated matrices.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::NoChannels`] | No channel is paired with an input |
    /// | [`EmbedError::ChannelRowMismatch`] | Updated matrices differ in row count |
    /// | any | The first error from [`FeatureTransformer::add_prototype`] |
    #[instrument(skip_all, fields(n_channels = self.transformers.len()))]
    pub fn add_prototypes<I: AsRef<[usize]>>(
        &mut self,
        xs: &[SampleMatrix],
        indices: &[I],
    ) -> Result<FeatureMatrix, EmbedError> {
        self.paired_len("add_prototypes", &[xs.len(), indices.len()])?;
        let parts = self
            .transformers
            .iter_mut()
            .zip(xs)
            .zip(indices)
            .map(|((t, x), idx)| t.add_prototype(x, idx.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        FeatureMatrix::hstack(&parts)
    }

    /// Remove prototypes per channel and stack the updated matrices.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::NoChannels`] | No channel is paired with an index set |
    /// | [`EmbedError::ChannelRowMismatch`] | Updated matrices differ in row count |
    /// | any | The first error from [`FeatureTransformer::remove_prototype`] |
    #[instrument(skip_all, fields(n_channels = self.transformers.len()))]
    pub fn remove_prototypes<I: AsRef<[usize]>>(
        &mut self,
        indices: &[I],
    ) -> Result<FeatureMatrix, EmbedError> {
        self.paired_len("remove_prototypes", &[indices.len()])?;
        let parts = self
            .transformers
            .iter_mut()
            .zip(indices)
            .map(|(t, idx)| t.remove_prototype(idx.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        FeatureMatrix::hstack(&parts)
    }

    /// Return each channel's prototype indices.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::NotFitted`] if any channel is unfitted.
    pub fn indices(&self) -> Result<Vec<&[usize]>, EmbedError> {
        self.transformers.iter().map(FeatureTransformer::indices).collect()
    }

    /// Number of channels paired with every argument list, warning once when
    /// any list length differs from the channel count.
    fn paired_len(&self, op: &str, counts: &[usize]) -> Result<usize, EmbedError> {
        let n_channels = self.transformers.len();
        if counts.iter().any(|&n| n != n_channels) {
            warn!(
                op,
                n_channels,
                ?counts,
                "channel and input counts differ; extra entries are ignored"
            );
        }
        match counts.iter().copied().fold(n_channels, usize::min) {
            0 => Err(EmbedError::NoChannels),
            n => Ok(n),
        }
    }
}

fn check_rows(xs: &[SampleMatrix]) -> Result<(), EmbedError> {
    let Some(first) = xs.first() else {
        return Ok(());
    };
    let expected = first.n_samples();
    match xs.iter().enumerate().find(|(_, x)| x.n_samples() != expected) {
        Some((channel, x)) => Err(EmbedError::ChannelRowMismatch {
            channel,
            expected,
            got: x.n_samples(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(n: usize, len: usize, offset: f64) -> SampleMatrix {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..len).map(|t| offset + (i * len + t) as f64 * 0.1).collect())
            .collect();
        SampleMatrix::from_rows(&rows).unwrap()
    }

    fn aggregator(ks: &[usize]) -> MultiComponentTransformer {
        MultiComponentTransformer::from_configs(
            ks.iter()
                .map(|&k| TransformerConfig::new(k).unwrap().with_random_state(Some(0))),
        )
        .unwrap()
    }

    #[test]
    fn stacks_channels_in_order() {
        let xs = vec![channel(8, 4, 0.0), channel(8, 6, 5.0)];
        let mut agg = aggregator(&[2, 3]);
        let out = agg.fit_transform(&xs).unwrap();
        assert_eq!(out.shape(), (8, 5));
        let first = agg.transformers()[0].distances().unwrap();
        let second = agg.transformers()[1].distances().unwrap();
        for i in 0..8 {
            assert_eq!(&out.row(i)[..2], first.row(i));
            assert_eq!(&out.row(i)[2..], second.row(i));
        }
        assert_eq!(agg.indices().unwrap().len(), 2);
    }

    #[test]
    fn extra_inputs_are_truncated() {
        let xs = vec![channel(6, 4, 0.0), channel(6, 4, 1.0), channel(6, 4, 2.0)];
        let mut agg = aggregator(&[2, 2]);
        assert_eq!(agg.fit_transform(&xs).unwrap().shape(), (6, 4));
    }

    #[test]
    fn missing_inputs_are_truncated() {
        let xs = vec![channel(6, 4, 0.0)];
        let mut agg = aggregator(&[2, 3]);
        assert_eq!(agg.fit_transform(&xs).unwrap().shape(), (6, 2));
        assert!(!agg.transformers()[1].is_fitted());
    }

    #[test]
    fn no_pairs_is_error() {
        let mut agg = aggregator(&[2]);
        assert!(matches!(agg.fit(&[]), Err(EmbedError::NoChannels)));
        let mut empty = MultiComponentTransformer::new(Vec::new());
        assert!(empty.is_empty());
        assert!(matches!(
            empty.transform(&[channel(3, 2, 0.0)]),
            Err(EmbedError::NoChannels)
        ));
    }

    #[test]
    fn row_mismatch_is_rejected_before_transforming() {
        let mut agg = aggregator(&[1, 1]);
        agg.fit(&[channel(4, 3, 0.0), channel(5, 3, 0.0)]).unwrap();
        let err = agg
            .transform(&[channel(4, 3, 0.0), channel(5, 3, 0.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            EmbedError::ChannelRowMismatch { channel: 1, expected: 4, got: 5 }
        ));
        assert!(agg.transformers()[0].distances().is_none());
    }

    #[test]
    fn add_and_remove_per_channel() {
        let xs = vec![channel(6, 4, 0.0), channel(6, 4, 3.0)];
        let mut agg = aggregator(&[2, 2]);
        let base = agg.fit_transform(&xs).unwrap();
        let idx: Vec<Vec<usize>> = agg
            .indices()
            .unwrap()
            .iter()
            .map(|set| (0..6).filter(|i| !set.contains(i)).take(1).collect())
            .collect();
        let grown = agg.add_prototypes(&xs, &idx).unwrap();
        assert_eq!(grown.shape(), (6, 6));
        let shrunk = agg.remove_prototypes(&idx).unwrap();
        assert_eq!(shrunk, base);
    }

    fn fitted_pair(xs: &[SampleMatrix]) -> MultiComponentTransformer {
        let mut agg = aggregator(&[2, 2]);
        agg.fit_transform(xs).unwrap();
        agg
    }

    fn unused_index(agg: &MultiComponentTransformer, channel: usize, n: usize) -> usize {
        let set = agg.indices().unwrap()[channel];
        (0..n).find(|i| !set.contains(i)).unwrap()
    }

    #[test]
    fn add_with_fewer_index_sets_touches_only_paired_channels() {
        let xs = vec![channel(6, 4, 0.0), channel(6, 4, 3.0)];
        let mut agg = fitted_pair(&xs);
        let before: Vec<Vec<usize>> =
            agg.indices().unwrap().iter().map(|s| s.to_vec()).collect();

        let extra = unused_index(&agg, 0, 6);
        let out = agg.add_prototypes(&xs, &[vec![extra]]).unwrap();

        assert_eq!(out.shape(), (6, 3));
        assert_eq!(&out, agg.transformers()[0].distances().unwrap());
        let mut expected = before[0].clone();
        expected.push(extra);
        assert_eq!(agg.indices().unwrap()[0], expected.as_slice());
        assert_eq!(agg.indices().unwrap()[1], before[1].as_slice());
    }

    #[test]
    fn add_with_fewer_inputs_touches_only_paired_channels() {
        let xs = vec![channel(6, 4, 0.0), channel(6, 4, 3.0)];
        let mut agg = fitted_pair(&xs);
        let second_before = agg.indices().unwrap()[1].to_vec();

        let idx = vec![vec![unused_index(&agg, 0, 6)], vec![unused_index(&agg, 1, 6)]];
        let out = agg.add_prototypes(&xs[..1], &idx).unwrap();

        assert_eq!(out.shape(), (6, 3));
        assert_eq!(agg.indices().unwrap()[1], second_before.as_slice());
    }

    #[test]
    fn remove_with_fewer_index_sets_leaves_later_channels() {
        let xs = vec![channel(6, 4, 0.0), channel(6, 4, 3.0)];
        let mut agg = fitted_pair(&xs);
        let second_before = agg.transformers()[1].distances().unwrap().clone();
        let first = agg.indices().unwrap()[0][0];

        let out = agg.remove_prototypes(&[vec![first]]).unwrap();

        assert_eq!(out.shape(), (6, 1));
        assert!(!agg.indices().unwrap()[0].contains(&first));
        assert_eq!(agg.transformers()[1].distances().unwrap(), &second_before);
    }

    #[test]
    fn failing_channel_keeps_earlier_channels_updated() {
        let xs = vec![channel(6, 4, 0.0), channel(6, 4, 3.0)];
        let mut agg = fitted_pair(&xs);
        let second_indices = agg.indices().unwrap()[1].to_vec();
        let second_distances = agg.transformers()[1].distances().unwrap().clone();

        let extra = unused_index(&agg, 0, 6);
        let err = agg.add_prototypes(&xs, &[vec![extra], vec![99]]).unwrap_err();

        assert!(matches!(err, EmbedError::IndexOutOfBounds { index: 99, n_samples: 6 }));
        assert_eq!(agg.indices().unwrap()[0].len(), 3);
        assert!(agg.indices().unwrap()[0].contains(&extra));
        assert_eq!(agg.transformers()[0].distances().unwrap().shape(), (6, 3));
        assert_eq!(agg.indices().unwrap()[1], second_indices.as_slice());
        assert_eq!(agg.transformers()[1].distances().unwrap(), &second_distances);
    }

    #[test]
    fn indices_require_fit() {
        let agg = aggregator(&[1]);
        assert!(matches!(agg.indices(), Err(EmbedError::NotFitted)));
    }
}
