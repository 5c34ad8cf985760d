use std::fmt;

use crate::{Linear, Relu, Softmax, Tensor};

/// One stage of an [`Mlp`](crate::Mlp).
///
/// Every variant follows the same contract: `forward` caches what `backward`
/// needs, and each `backward` must be preceded by a `forward` on the same
/// instance whose output has the shape of the incoming gradient.
#[derive(Debug, Clone)]
pub enum Layer {
    Linear(Linear),
    Relu(Relu),
    Softmax(Softmax),
}

/// Structural description of a layer, without parameters or caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Linear {
        in_features: usize,
        out_features: usize,
    },
    Relu,
    Softmax,
}

impl Layer {
    pub fn forward(&mut self, input: &Tensor) -> Tensor {
        match self {
            Layer::Linear(l) => l.forward(input),
            Layer::Relu(l) => l.forward(input),
            Layer::Softmax(l) => l.forward(input),
        }
    }

    pub fn backward(&mut self, grad_output: &Tensor) -> Tensor {
        match self {
            Layer::Linear(l) => l.backward(grad_output),
            Layer::Relu(l) => l.backward(grad_output),
            Layer::Softmax(l) => l.backward(grad_output),
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::Linear(l) => LayerKind::Linear {
                in_features: l.in_features(),
                out_features: l.out_features(),
            },
            Layer::Relu(_) => LayerKind::Relu,
            Layer::Softmax(_) => LayerKind::Softmax,
        }
    }

    #[inline]
    pub fn as_linear(&self) -> Option<&Linear> {
        match self {
            Layer::Linear(l) => Some(l),
            _ => None,
        }
    }

    #[inline]
    pub fn as_linear_mut(&mut self) -> Option<&mut Linear> {
        match self {
            Layer::Linear(l) => Some(l),
            _ => None,
        }
    }

    #[inline]
    pub fn num_params(&self) -> usize {
        self.as_linear().map_or(0, Linear::num_params)
    }
}

impl From<Linear> for Layer {
    fn from(value: Linear) -> Self {
        Layer::Linear(value)
    }
}

impl From<Relu> for Layer {
    fn from(value: Relu) -> Self {
        Layer::Relu(value)
    }
}

impl From<Softmax> for Layer {
    fn from(value: Softmax) -> Self {
        Layer::Softmax(value)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Linear {
                in_features,
                out_features,
            } => write!(f, "Linear({in_features}→{out_features})"),
            LayerKind::Relu => f.write_str("ReLU"),
            LayerKind::Softmax => f.write_str("Softmax"),
        }
    }
}
