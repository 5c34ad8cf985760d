//! In-memory classification datasets and mini-batch sampling.
//!
//! Inputs are a `[len, input_dim]` tensor and targets a `[len, n_classes]`
//! tensor (one-hot for hard labels). Mini-batches are gathered into fresh
//! tensors so they can be fed straight into [`Mlp::forward`](crate::Mlp::forward).

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{Error, Result, Tensor};

#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Tensor,
    targets: Tensor,
}

impl Dataset {
    /// Pair a `[len, input_dim]` input matrix with a `[len, n_classes]` target matrix.
    pub fn new(inputs: Tensor, targets: Tensor) -> Result<Self> {
        if inputs.ndim() != 2 || targets.ndim() != 2 {
            return Err(Error::ShapeMismatch(format!(
                "inputs and targets must be matrices, got {:?} and {:?}",
                inputs.shape(),
                targets.shape()
            )));
        }
        if inputs.rows() != targets.rows() {
            return Err(Error::InvalidData(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.rows(),
                targets.rows()
            )));
        }
        if inputs.rows() == 0 {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if inputs.cols() == 0 || targets.cols() == 0 {
            return Err(Error::InvalidData(
                "input_dim and n_classes must be > 0".to_owned(),
            ));
        }
        Ok(Self { inputs, targets })
    }

    /// One-hot encode integer `labels` into `n_classes` columns.
    pub fn from_labels(inputs: Tensor, labels: &[usize], n_classes: usize) -> Result<Self> {
        if let Some((i, &bad)) = labels.iter().enumerate().find(|&(_, &l)| l >= n_classes) {
            return Err(Error::InvalidData(format!(
                "label {bad} at row {i} is out of range for {n_classes} classes"
            )));
        }
        let mut targets = Tensor::zeros(&[labels.len(), n_classes]);
        for (r, &label) in labels.iter().enumerate() {
            targets.row_mut(r)[label] = 1.0;
        }
        Self::new(inputs, targets)
    }

    /// Convenience constructor from per-sample rows (copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<Self> {
        Self::new(Tensor::from_rows(inputs)?, Tensor::from_rows(targets)?)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.inputs.cols()
    }

    #[inline]
    pub fn n_classes(&self) -> usize {
        self.targets.cols()
    }

    #[inline]
    pub fn inputs(&self) -> &Tensor {
        &self.inputs
    }

    #[inline]
    pub fn targets(&self) -> &Tensor {
        &self.targets
    }

    /// Gather the given samples into `(inputs, targets)` tensors.
    ///
    /// Panics if an index is out of range.
    pub fn batch(&self, indices: &[usize]) -> (Tensor, Tensor) {
        (
            self.inputs.gather_rows(indices),
            self.targets.gather_rows(indices),
        )
    }
}

/// Sample order across epochs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shuffle {
    /// Visit samples in storage order every epoch.
    #[default]
    None,
    /// Reshuffle at the start of every epoch with a seeded RNG.
    Seeded(u64),
}

/// Endless mini-batch sampler over `len` samples.
///
/// Each call to [`Batches::next_indices`] returns up to `batch_size` indices;
/// the last batch of an epoch may be shorter. A new epoch starts (and is
/// reshuffled) once every sample has been visited.
#[derive(Debug, Clone)]
pub struct Batches {
    order: Vec<usize>,
    cursor: usize,
    batch_size: usize,
    epoch: usize,
    rng: Option<StdRng>,
}

impl Batches {
    pub fn new(len: usize, batch_size: usize, shuffle: Shuffle) -> Result<Self> {
        if len == 0 {
            return Err(Error::InvalidData("cannot batch an empty dataset".to_owned()));
        }
        if batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
        }

        let rng = match shuffle {
            Shuffle::None => None,
            Shuffle::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
        };

        let mut batches = Self {
            order: (0..len).collect(),
            cursor: 0,
            batch_size,
            epoch: 0,
            rng,
        };
        batches.reshuffle();
        Ok(batches)
    }

    /// Number of completed passes over the data.
    #[inline]
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn next_indices(&mut self) -> &[usize] {
        if self.cursor >= self.order.len() {
            self.cursor = 0;
            self.epoch += 1;
            self.reshuffle();
        }
        let start = self.cursor;
        let end = (start + self.batch_size).min(self.order.len());
        self.cursor = end;
        &self.order[start..end]
    }

    fn reshuffle(&mut self) {
        if let Some(rng) = self.rng.as_mut() {
            self.order.shuffle(rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Dataset {
        let inputs = Tensor::from_vec((0..10).map(|v| v as f32).collect(), &[5, 2]).unwrap();
        Dataset::from_labels(inputs, &[0, 1, 2, 1, 0], 3).unwrap()
    }

    #[test]
    fn from_labels_one_hot_encodes() {
        let ds = toy();
        assert_eq!(ds.len(), 5);
        assert_eq!(ds.input_dim(), 2);
        assert_eq!(ds.n_classes(), 3);
        assert_eq!(ds.targets().row(2), &[0.0, 0.0, 1.0]);
        assert_eq!(ds.targets().argmax_rows(), vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn constructors_validate_shapes() {
        let inputs = Tensor::zeros(&[3, 2]);
        assert!(Dataset::from_labels(inputs.clone(), &[0, 1], 2).is_err());
        assert!(Dataset::from_labels(inputs.clone(), &[0, 1, 5], 2).is_err());
        assert!(Dataset::new(inputs, Tensor::zeros(&[3])).is_err());
        assert!(Dataset::from_rows(&[vec![1.0, 2.0]], &[vec![1.0]]).is_ok());
    }

    #[test]
    fn batch_gathers_matching_rows() {
        let ds = toy();
        let (x, t) = ds.batch(&[4, 2]);
        assert_eq!(x.data(), &[8.0, 9.0, 4.0, 5.0]);
        assert_eq!(t.argmax_rows(), vec![0, 2]);
    }

    #[test]
    fn unshuffled_batches_wrap_into_next_epoch() {
        let mut batches = Batches::new(5, 2, Shuffle::None).unwrap();
        assert_eq!(batches.next_indices(), &[0, 1]);
        assert_eq!(batches.next_indices(), &[2, 3]);
        assert_eq!(batches.next_indices(), &[4]);
        assert_eq!(batches.epoch(), 0);
        assert_eq!(batches.next_indices(), &[0, 1]);
        assert_eq!(batches.epoch(), 1);
    }

    #[test]
    fn seeded_shuffle_is_a_reproducible_permutation() {
        let collect = || {
            let mut b = Batches::new(10, 10, Shuffle::Seeded(3)).unwrap();
            b.next_indices().to_vec()
        };
        let a = collect();
        assert_eq!(a, collect());

        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn seeded_shuffle_reshuffles_each_epoch() {
        let mut b = Batches::new(16, 16, Shuffle::Seeded(7)).unwrap();
        let first = b.next_indices().to_vec();
        let second = b.next_indices().to_vec();
        assert_eq!(b.epoch(), 1);
        assert_ne!(first, second);

        let mut sorted = second;
        sorted.sort_unstable();
        assert_eq!(sorted, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn rejects_zero_batch_size() {
        assert!(Batches::new(4, 0, Shuffle::None).is_err());
    }
}
