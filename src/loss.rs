//! Loss functions over `[batch, classes]` predictions.
//!
//! The loss is averaged over the batch, so its gradient carries a `1 / batch`
//! factor. It is meant to be used like:
//!
//! - `probs = mlp.forward(x)`
//! - `grad = loss.backward(&probs, &targets)`
//! - `mlp.backward(&grad)`
//! - an optimizer step

use crate::Tensor;

/// Probabilities are clamped to this value before `ln` and division.
pub const PROB_FLOOR: f32 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Loss {
    /// Cross-entropy of a predicted distribution against (one-hot) targets.
    #[default]
    CrossEntropy,
}

impl Loss {
    #[inline]
    pub fn forward(self, pred: &Tensor, target: &Tensor) -> f32 {
        match self {
            Loss::CrossEntropy => cross_entropy(pred, target),
        }
    }

    /// Gradient of the loss w.r.t. `pred`.
    #[inline]
    pub fn backward(self, pred: &Tensor, target: &Tensor) -> Tensor {
        match self {
            Loss::CrossEntropy => cross_entropy_backward(pred, target),
        }
    }
}

/// `-(1/B) Σ_b Σ_c t[b,c] · ln p[b,c]`
pub fn cross_entropy(probs: &Tensor, target: &Tensor) -> f32 {
    probs.assert_same_shape(target, "cross_entropy");
    let batch = probs.rows();
    if batch == 0 {
        return 0.0;
    }

    let mut sum = 0.0_f32;
    for (&p, &t) in probs.data().iter().zip(target.data()) {
        if t != 0.0 {
            sum -= t * p.max(PROB_FLOOR).ln();
        }
    }
    sum / batch as f32
}

/// `dL/dp = -t / (B · p)`
pub fn cross_entropy_backward(probs: &Tensor, target: &Tensor) -> Tensor {
    probs.assert_same_shape(target, "cross_entropy_backward");
    let inv_batch = 1.0 / probs.rows().max(1) as f32;
    probs.zip_map(target, |p, t| -t / p.max(PROB_FLOOR) * inv_batch)
}
