//! Fully connected layer: `y = x · W + b`.
//!
//! Shapes:
//! - `x`: `[batch, in_features]`
//! - `W`: `[in_features, out_features]`
//! - `b`: `[out_features]`
//! - `y`: `[batch, out_features]`
//!
//! Backward (overwrite semantics, gradients are replaced on every call):
//!
//! ```text
//! grad_W = xᵀ · grad_y
//! grad_b = sum(grad_y, axis = 0)
//! grad_x = grad_y · Wᵀ
//! ```

use rand::Rng;
use rand::distributions::{Distribution, Uniform};
use rand_distr::Normal;

use crate::{Error, Result, Tensor};

/// Weight initialization scheme. Biases always start at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// `N(0, std²)`.
    Normal { std: f32 },
    /// Xavier/Glorot uniform: `U(-a, a)` with `a = sqrt(6 / (in + out))`.
    Xavier,
    /// He/Kaiming uniform: `U(-a, a)` with `a = sqrt(6 / in)`.
    He,
}

impl Default for Init {
    fn default() -> Self {
        Init::Normal { std: 1e-4 }
    }
}

impl Init {
    pub fn validate(self) -> Result<()> {
        match self {
            Init::Normal { std } if !(std.is_finite() && std > 0.0) => Err(
                Error::InvalidConfig(format!("normal init std must be finite and > 0, got {std}")),
            ),
            Init::Normal { .. } | Init::Xavier | Init::He => Ok(()),
        }
    }

    fn sample<R: Rng + ?Sized>(
        self,
        in_features: usize,
        out_features: usize,
        rng: &mut R,
    ) -> Result<Vec<f32>> {
        let n = in_features * out_features;
        let values = match self {
            Init::Normal { std } => {
                let dist = Normal::new(0.0_f32, std)
                    .map_err(|e| Error::InvalidConfig(format!("normal init: {e}")))?;
                (0..n).map(|_| dist.sample(rng)).collect()
            }
            Init::Xavier | Init::He => {
                let fan = match self {
                    Init::Xavier => in_features + out_features,
                    _ => in_features,
                };
                let limit = (6.0 / fan as f32).sqrt();
                let dist = Uniform::new_inclusive(-limit, limit);
                (0..n).map(|_| dist.sample(rng)).collect()
            }
        };
        Ok(values)
    }
}

#[derive(Debug, Clone)]
pub struct Linear {
    weight: Tensor,
    bias: Tensor,
    grad_weight: Tensor,
    grad_bias: Tensor,
    /// Input of the most recent `forward`, read by `backward`.
    input: Option<Tensor>,
}

impl Linear {
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        init: Init,
        rng: &mut R,
    ) -> Result<Self> {
        if in_features == 0 || out_features == 0 {
            return Err(Error::InvalidConfig(format!(
                "linear dims must be > 0, got {in_features}x{out_features}"
            )));
        }
        init.validate()?;

        let weight = Tensor::from_vec(
            init.sample(in_features, out_features, rng)?,
            &[in_features, out_features],
        )?;
        let bias = Tensor::zeros(&[out_features]);
        Self::from_parts(weight, bias)
    }

    /// Build a layer from explicit parameters.
    ///
    /// `weight` must be `[in_features, out_features]` and `bias` `[out_features]`,
    /// both finite.
    pub fn from_parts(weight: Tensor, bias: Tensor) -> Result<Self> {
        if weight.ndim() != 2 {
            return Err(Error::ShapeMismatch(format!(
                "weight must be [in_features, out_features], got {:?}",
                weight.shape()
            )));
        }
        let (in_features, out_features) = (weight.shape()[0], weight.shape()[1]);
        if in_features == 0 || out_features == 0 {
            return Err(Error::InvalidConfig(format!(
                "linear dims must be > 0, got {in_features}x{out_features}"
            )));
        }
        if bias.shape() != [out_features] {
            return Err(Error::ShapeMismatch(format!(
                "bias shape {:?} does not match out_features {out_features}",
                bias.shape()
            )));
        }
        if !weight.is_finite() || !bias.is_finite() {
            return Err(Error::InvalidData(
                "linear parameters must be finite".to_owned(),
            ));
        }

        Ok(Self {
            grad_weight: Tensor::zeros(weight.shape()),
            grad_bias: Tensor::zeros(bias.shape()),
            weight,
            bias,
            input: None,
        })
    }

    #[inline]
    pub fn in_features(&self) -> usize {
        self.weight.shape()[0]
    }

    #[inline]
    pub fn out_features(&self) -> usize {
        self.weight.shape()[1]
    }

    #[inline]
    pub fn num_params(&self) -> usize {
        self.weight.len() + self.bias.len()
    }

    pub fn forward(&mut self, input: &Tensor) -> Tensor {
        assert!(
            input.ndim() == 2 && input.cols() == self.in_features(),
            "linear forward: input shape {:?} does not match [batch, {}]",
            input.shape(),
            self.in_features()
        );

        let mut output = input.matmul(&self.weight);
        output.add_row(&self.bias);
        self.input = Some(input.clone());
        output
    }

    /// Stores `grad_weight` / `grad_bias` and returns the gradient w.r.t. the input.
    ///
    /// Panics if called before `forward` or if `grad_output` is not shaped like
    /// the last forward output.
    pub fn backward(&mut self, grad_output: &Tensor) -> Tensor {
        let Some(input) = self.input.as_ref() else {
            panic!("linear backward called before forward");
        };
        assert_eq!(
            grad_output.shape(),
            &[input.rows(), self.out_features()],
            "linear backward: grad shape {:?} does not match forward output [{}, {}]",
            grad_output.shape(),
            input.rows(),
            self.out_features()
        );

        self.grad_weight = input.t_matmul(grad_output);
        self.grad_bias = grad_output.sum_rows();
        grad_output.matmul_t(&self.weight)
    }

    #[inline]
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    #[inline]
    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    /// Weight values, row-major `[in_features, out_features]`. The shape is fixed.
    #[inline]
    pub fn weight_mut(&mut self) -> &mut [f32] {
        self.weight.data_mut()
    }

    #[inline]
    pub fn bias_mut(&mut self) -> &mut [f32] {
        self.bias.data_mut()
    }

    #[inline]
    pub fn grad_weight(&self) -> &Tensor {
        &self.grad_weight
    }

    #[inline]
    pub fn grad_bias(&self) -> &Tensor {
        &self.grad_bias
    }

    pub fn zero_grad(&mut self) {
        self.grad_weight.fill(0.0);
        self.grad_bias.fill(0.0);
    }

    /// `(parameter, gradient)` pairs: weight first, then bias.
    pub(crate) fn params_and_grads_mut(&mut self) -> [(&mut Tensor, &Tensor); 2] {
        [
            (&mut self.weight, &self.grad_weight),
            (&mut self.bias, &self.grad_bias),
        ]
    }
}
