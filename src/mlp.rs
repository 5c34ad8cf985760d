use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Error, Init, Layer, LayerKind, Linear, MlpBuilder, Result, Tensor};

/// Feed-forward network: an ordered, fixed sequence of layers.
///
/// `forward` runs the layers in construction order and `backward` runs them in
/// reverse. After `backward`, every Linear layer holds the gradients of its
/// weight and bias; an optimizer reads them through [`Mlp::linear_layers_mut`].
#[derive(Debug, Clone)]
pub struct Mlp {
    layers: Vec<Layer>,
    input_dim: usize,
    output_dim: usize,
}

impl Mlp {
    /// Build `n_inputs → n_hidden… → n_classes` with ReLU between hidden layers
    /// and a Softmax head, using the default weight init.
    pub fn new_with_seed(
        n_inputs: usize,
        n_hidden: &[usize],
        n_classes: usize,
        seed: u64,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(n_inputs, n_hidden, n_classes, Init::default(), &mut rng)
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        n_inputs: usize,
        n_hidden: &[usize],
        n_classes: usize,
        init: Init,
        rng: &mut R,
    ) -> Result<Self> {
        MlpBuilder::new(n_inputs, n_classes)?
            .hidden_layers(n_hidden)?
            .init(init)
            .build_with_rng(rng)
    }

    /// Assemble a network from existing layers.
    ///
    /// The first and last parameterized layers fix the input/output widths, and
    /// consecutive Linear layers must agree on their shared dimension.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        let mut dims: Option<(usize, usize)> = None;
        for (idx, layer) in layers.iter().enumerate() {
            let Some(linear) = layer.as_linear() else {
                continue;
            };
            dims = match dims {
                None => Some((linear.in_features(), linear.out_features())),
                Some((input_dim, prev_out)) => {
                    if linear.in_features() != prev_out {
                        return Err(Error::ShapeMismatch(format!(
                            "layer {idx} expects {} features but the previous linear layer produces {prev_out}",
                            linear.in_features()
                        )));
                    }
                    Some((input_dim, linear.out_features()))
                }
            };
        }

        let Some((input_dim, output_dim)) = dims else {
            return Err(Error::InvalidConfig(
                "mlp must contain at least one linear layer".to_owned(),
            ));
        };

        Ok(Self {
            layers,
            input_dim,
            output_dim,
        })
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(Layer::kind).collect()
    }

    pub fn num_params(&self) -> usize {
        self.layers.iter().map(Layer::num_params).sum()
    }

    pub fn linear_layers(&self) -> impl Iterator<Item = &Linear> {
        self.layers.iter().filter_map(Layer::as_linear)
    }

    pub fn linear_layers_mut(&mut self) -> impl Iterator<Item = &mut Linear> {
        self.layers.iter_mut().filter_map(Layer::as_linear_mut)
    }

    /// Forward pass over a `[batch, input_dim]` batch.
    ///
    /// Returns one probability distribution per row. Panics on a shape mismatch;
    /// use [`Mlp::predict`] for a checked variant.
    pub fn forward(&mut self, input: &Tensor) -> Tensor {
        let mut layers = self.layers.iter_mut();
        let Some(first) = layers.next() else {
            return input.clone();
        };
        let mut out = first.forward(input);
        for layer in layers {
            out = layer.forward(&out);
        }
        out
    }

    /// Backward pass from `dL/d(output)`, returning `dL/d(input)`.
    ///
    /// Must follow a `forward` on the same batch. Overwrites the gradients held
    /// by every Linear layer.
    pub fn backward(&mut self, grad_output: &Tensor) -> Tensor {
        let mut layers = self.layers.iter_mut().rev();
        let Some(last) = layers.next() else {
            return grad_output.clone();
        };
        let mut grad = last.backward(grad_output);
        for layer in layers {
            grad = layer.backward(&grad);
        }
        grad
    }

    /// Shape-checked forward pass.
    pub fn predict(&mut self, input: &Tensor) -> Result<Tensor> {
        if input.ndim() != 2 || input.shape()[1] != self.input_dim {
            return Err(Error::ShapeMismatch(format!(
                "input shape {:?} does not match [batch, {}]",
                input.shape(),
                self.input_dim
            )));
        }
        Ok(self.forward(input))
    }

    pub fn zero_grad(&mut self) {
        for linear in self.linear_layers_mut() {
            linear.zero_grad();
        }
    }
}
