//! Metrics.
//!
//! Metrics are evaluation helpers; they do not participate in backprop.

use crate::Tensor;

/// Fraction of rows whose argmax prediction matches the argmax of the target.
///
/// `predictions` and `targets` are `[batch, classes]`; targets are usually one-hot.
/// An empty batch has accuracy 0.
pub fn accuracy(predictions: &Tensor, targets: &Tensor) -> f32 {
    predictions.assert_same_shape(targets, "accuracy");
    let batch = predictions.rows();
    if batch == 0 {
        return 0.0;
    }

    let correct = predictions
        .argmax_rows()
        .into_iter()
        .zip(targets.argmax_rows())
        .filter(|(p, t)| p == t)
        .count();
    correct as f32 / batch as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_matching_argmax() {
        let preds = Tensor::from_rows(&[
            vec![0.1, 0.8, 0.1],
            vec![0.6, 0.3, 0.1],
            vec![0.2, 0.2, 0.6],
            vec![0.3, 0.4, 0.3],
        ])
        .unwrap();
        let targets = Tensor::from_rows(&[
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
        ])
        .unwrap();
        assert!((accuracy(&preds, &targets) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_batch_is_zero() {
        let empty = Tensor::zeros(&[0, 3]);
        assert_eq!(accuracy(&empty, &empty), 0.0);
    }
}
