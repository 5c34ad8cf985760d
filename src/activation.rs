//! Parameter-free layers: ReLU and Softmax.
//!
//! Both cache what their backward pass needs from the most recent forward pass:
//! ReLU keeps a mask of the strictly positive inputs, Softmax keeps its output
//! distribution. Neither produces parameter gradients.

use crate::Tensor;

/// Elementwise `max(0, x)`.
#[derive(Debug, Clone, Default)]
pub struct Relu {
    mask: Option<Mask>,
}

#[derive(Debug, Clone)]
struct Mask {
    positive: Vec<bool>,
    shape: Vec<usize>,
}

impl Relu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&mut self, input: &Tensor) -> Tensor {
        self.mask = Some(Mask {
            positive: input.data().iter().map(|&x| x > 0.0).collect(),
            shape: input.shape().to_vec(),
        });
        input.map(|x| if x > 0.0 { x } else { 0.0 })
    }

    /// Passes the gradient through where the forward input was `> 0`, zero elsewhere.
    pub fn backward(&mut self, grad_output: &Tensor) -> Tensor {
        let Some(mask) = self.mask.as_ref() else {
            panic!("relu backward called before forward");
        };
        assert_eq!(
            grad_output.shape(),
            mask.shape.as_slice(),
            "relu backward: grad shape {:?} does not match forward output {:?}",
            grad_output.shape(),
            mask.shape
        );

        let mut grad_input = grad_output.clone();
        for (g, &keep) in grad_input.data_mut().iter_mut().zip(&mask.positive) {
            if !keep {
                *g = 0.0;
            }
        }
        grad_input
    }
}

/// Row-wise normalized exponential over `[batch, classes]`.
#[derive(Debug, Clone, Default)]
pub struct Softmax {
    output: Option<Tensor>,
}

impl Softmax {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&mut self, input: &Tensor) -> Tensor {
        assert_eq!(
            input.ndim(),
            2,
            "softmax forward: expected [batch, classes], got {:?}",
            input.shape()
        );

        let mut output = input.clone();
        for r in 0..output.rows() {
            softmax_in_place(output.row_mut(r));
        }
        self.output = Some(output.clone());
        output
    }

    /// Jacobian-vector product per row: `y ⊙ (g − Σ g ⊙ y)`.
    pub fn backward(&mut self, grad_output: &Tensor) -> Tensor {
        let Some(output) = self.output.as_ref() else {
            panic!("softmax backward called before forward");
        };
        assert_eq!(
            grad_output.shape(),
            output.shape(),
            "softmax backward: grad shape {:?} does not match forward output {:?}",
            grad_output.shape(),
            output.shape()
        );

        let mut grad_input = grad_output.clone();
        for r in 0..output.rows() {
            let y = output.row(r);
            let g = grad_input.row_mut(r);
            let dot: f32 = g.iter().zip(y).map(|(&g, &y)| g * y).sum();
            for (g, &y) in g.iter_mut().zip(y) {
                *g = y * (*g - dot);
            }
        }
        grad_input
    }
}

/// Max-shifted softmax of one row.
fn softmax_in_place(row: &mut [f32]) {
    let Some(max) = row.iter().copied().reduce(f32::max) else {
        return;
    };
    let mut sum = 0.0_f32;
    for v in row.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    let inv = 1.0 / sum;
    for v in row.iter_mut() {
        *v *= inv;
    }
}
