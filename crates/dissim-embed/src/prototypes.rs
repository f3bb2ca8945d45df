//! Prototype selection and storage.

use std::collections::HashSet;

use rand::SeedableRng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;

use crate::error::EmbedError;
use crate::matrix::SampleMatrix;

/// A prototype sequence, either copied out of its source matrix or viewing it.
#[derive(Debug, Clone)]
pub enum Prototype {
    /// An owned copy of the row.
    Owned(Vec<f64>),
    /// A shared view of row `row` of `source`.
    Shared {
        /// Matrix the prototype was drawn from.
        source: SampleMatrix,
        /// Row index within `source`.
        row: usize,
    },
}

impl Prototype {
    /// Borrow the prototype's values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Owned(values) => values,
            Self::Shared { source, row } => source.row(*row),
        }
    }

    /// Return true if the prototype views its source matrix.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared { .. })
    }
}

/// Draw `k` distinct indices from `0..n_samples`.
///
/// A seed makes the draw reproducible; `None` seeds from OS entropy.
pub(crate) fn select(
    n_samples: usize,
    k: usize,
    seed: Option<u64>,
) -> Result<Vec<usize>, EmbedError> {
    if k > n_samples {
        return Err(EmbedError::TooFewSamples {
            n_samples,
            n_components: k,
        });
    }
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    Ok(index::sample(&mut rng, n_samples, k).into_vec())
}

/// Build prototypes for `indices` of `samples`.
///
/// Indices must already be bounds-checked.
pub(crate) fn materialize(samples: &SampleMatrix, indices: &[usize], copy: bool) -> Vec<Prototype> {
    indices
        .iter()
        .map(|&row| {
            if copy {
                Prototype::Owned(samples.row(row).to_vec())
            } else {
                Prototype::Shared {
                    source: samples.clone(),
                    row,
                }
            }
        })
        .collect()
}

/// Ordered prototype indices and their sequences.
///
/// `indices[j]` and `prototypes[j]` always describe column `j` of the
/// distance matrix.
#[derive(Debug, Clone)]
pub(crate) struct PrototypeStore {
    indices: Vec<usize>,
    prototypes: Vec<Prototype>,
}

impl PrototypeStore {
    pub(crate) fn new(indices: Vec<usize>, prototypes: Vec<Prototype>) -> Self {
        debug_assert_eq!(indices.len(), prototypes.len());
        Self { indices, prototypes }
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub(crate) fn prototypes(&self) -> &[Prototype] {
        &self.prototypes
    }

    pub(crate) fn len(&self) -> usize {
        self.indices.len()
    }

    /// Filter `candidates` down to indices not yet stored, keeping the first
    /// occurrence of repeats within the batch.
    pub(crate) fn novel_indices(&self, candidates: &[usize]) -> Vec<usize> {
        let mut seen: HashSet<usize> = self.indices.iter().copied().collect();
        candidates.iter().copied().filter(|i| seen.insert(*i)).collect()
    }

    /// Append prototypes, skipping any index already present.
    pub(crate) fn append(&mut self, indices: Vec<usize>, prototypes: Vec<Prototype>) {
        debug_assert_eq!(indices.len(), prototypes.len());
        let mut seen: HashSet<usize> = self.indices.iter().copied().collect();
        for (index, prototype) in indices.into_iter().zip(prototypes) {
            if seen.insert(index) {
                self.indices.push(index);
                self.prototypes.push(prototype);
            }
        }
    }

    /// Keep mask over the current columns for removing `indices`.
    pub(crate) fn keep_mask(&self, indices: &[usize]) -> Vec<bool> {
        let remove: HashSet<usize> = indices.iter().copied().collect();
        self.indices.iter().map(|i| !remove.contains(i)).collect()
    }

    /// Drop entries whose index is in `indices`; absent indices are ignored.
    ///
    /// Returns the keep mask that was applied.
    pub(crate) fn remove(&mut self, indices: &[usize]) -> Vec<bool> {
        let keep = self.keep_mask(indices);
        let mut flags = keep.iter();
        self.prototypes.retain(|_| flags.next().copied().unwrap_or(false));
        let mut flags = keep.iter();
        self.indices.retain(|_| flags.next().copied().unwrap_or(false));
        keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> SampleMatrix {
        SampleMatrix::from_rows(&[
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![3.0, 3.0],
            vec![4.0, 4.0],
        ])
        .unwrap()
    }

    #[test]
    fn select_is_deterministic_with_seed() {
        let a = select(100, 10, Some(7)).unwrap();
        let b = select(100, 10, Some(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn select_returns_unique_in_range() {
        let idx = select(20, 20, Some(3)).unwrap();
        let unique: HashSet<usize> = idx.iter().copied().collect();
        assert_eq!(unique.len(), 20);
        assert!(idx.iter().all(|&i| i < 20));
    }

    #[test]
    fn select_unseeded_draws() {
        let idx = select(10, 4, None).unwrap();
        assert_eq!(idx.len(), 4);
    }

    #[test]
    fn select_too_many() {
        assert!(matches!(
            select(3, 4, Some(0)),
            Err(EmbedError::TooFewSamples { n_samples: 3, n_components: 4 })
        ));
    }

    #[test]
    fn materialize_copy_and_share() {
        let x = samples();
        let owned = materialize(&x, &[3, 1], true);
        assert!(!owned[0].is_shared());
        assert_eq!(owned[0].as_slice(), &[3.0, 3.0]);
        assert_eq!(owned[1].as_slice(), &[1.0, 1.0]);

        let shared = materialize(&x, &[2], false);
        match &shared[0] {
            Prototype::Shared { source, row } => {
                assert!(source.shares_storage(&x));
                assert_eq!(*row, 2);
            }
            Prototype::Owned(_) => panic!("expected a shared view"),
        }
        assert_eq!(shared[0].as_slice(), &[2.0, 2.0]);
    }

    #[test]
    fn novel_indices_filters_existing_and_repeats() {
        let x = samples();
        let store = PrototypeStore::new(vec![1, 3], materialize(&x, &[1, 3], true));
        assert_eq!(store.novel_indices(&[3, 4, 0, 4, 1]), vec![4, 0]);
    }

    #[test]
    fn append_skips_duplicates() {
        let x = samples();
        let mut store = PrototypeStore::new(vec![1], materialize(&x, &[1], true));
        store.append(vec![1, 2], materialize(&x, &[1, 2], true));
        assert_eq!(store.indices(), &[1, 2]);
        assert_eq!(store.prototypes()[1].as_slice(), &[2.0, 2.0]);
    }

    #[test]
    fn remove_keeps_order() {
        let x = samples();
        let mut store = PrototypeStore::new(vec![4, 0, 2, 1], materialize(&x, &[4, 0, 2, 1], true));
        let keep = store.remove(&[0, 1, 99]);
        assert_eq!(keep, vec![true, false, true, false]);
        assert_eq!(store.indices(), &[4, 2]);
        assert_eq!(store.prototypes()[0].as_slice(), &[4.0, 4.0]);
        assert_eq!(store.prototypes()[1].as_slice(), &[2.0, 2.0]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_absent_is_noop() {
        let x = samples();
        let mut store = PrototypeStore::new(vec![0, 1], materialize(&x, &[0, 1], true));
        store.remove(&[3]);
        assert_eq!(store.indices(), &[0, 1]);
    }
}
