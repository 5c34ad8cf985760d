//! Optimizers.
//!
//! An optimizer is the consumer of the gradients that [`Mlp::backward`] leaves
//! in every Linear layer: it reads them, moves the parameters, and resets them
//! before the next forward pass.
//!
//! Optimizer *state* (momentum buffers) lives outside the model and is owned by
//! the training loop.

use crate::{Error, Mlp, Result, Tensor};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Optimizer {
    /// `param -= lr * grad`
    #[default]
    Sgd,
    /// `v = momentum * v + grad; param -= lr * v`
    SgdMomentum { momentum: f32 },
}

impl Optimizer {
    pub fn validate(self) -> Result<()> {
        match self {
            Optimizer::Sgd => Ok(()),
            Optimizer::SgdMomentum { momentum } => {
                if !(momentum.is_finite() && (0.0..1.0).contains(&momentum)) {
                    return Err(Error::InvalidConfig(format!(
                        "momentum must be finite and in [0,1), got {momentum}"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Allocate optimizer state for `model`.
    pub fn state(self, model: &Mlp) -> Result<OptimizerState> {
        self.validate()?;

        Ok(match self {
            Optimizer::Sgd => OptimizerState::Sgd,
            Optimizer::SgdMomentum { momentum } => OptimizerState::SgdMomentum {
                momentum,
                velocity: model
                    .linear_layers()
                    .flat_map(|l| {
                        [
                            Tensor::zeros(l.weight().shape()),
                            Tensor::zeros(l.bias().shape()),
                        ]
                    })
                    .collect(),
            },
        })
    }
}

#[derive(Debug, Clone, Default)]
pub enum OptimizerState {
    #[default]
    Sgd,
    SgdMomentum {
        momentum: f32,
        /// One buffer per parameter tensor, weight then bias for each Linear layer.
        velocity: Vec<Tensor>,
    },
}

impl OptimizerState {
    /// Apply one update from the gradients stored in `model`, then zero them.
    pub fn step(&mut self, model: &mut Mlp, lr: f32) {
        assert!(lr.is_finite() && lr > 0.0, "lr must be finite and > 0");

        match self {
            OptimizerState::Sgd => {
                for linear in model.linear_layers_mut() {
                    for (param, grad) in linear.params_and_grads_mut() {
                        param.axpy(-lr, grad);
                    }
                }
            }
            OptimizerState::SgdMomentum { momentum, velocity } => {
                let mut buffers = velocity.iter_mut();
                for linear in model.linear_layers_mut() {
                    for (param, grad) in linear.params_and_grads_mut() {
                        let Some(v) = buffers.next() else {
                            panic!("optimizer state was built for a different model");
                        };
                        for (v, &g) in v.data_mut().iter_mut().zip(grad.data()) {
                            *v = momentum.mul_add(*v, g);
                        }
                        param.axpy(-lr, v);
                    }
                }
            }
        }

        model.zero_grad();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{Layer, Linear, Softmax};

    fn unit_model(w: f32, b: f32) -> Mlp {
        let linear = Linear::from_parts(
            Tensor::from_vec(vec![w], &[1, 1]).unwrap(),
            Tensor::from_vec(vec![b], &[1]).unwrap(),
        )
        .unwrap();
        Mlp::from_layers(vec![Layer::from(linear), Layer::from(Softmax::new())]).unwrap()
    }

    /// Runs a backward that leaves grad_weight = x * g and grad_bias = g.
    fn set_grads(model: &mut Mlp, x: f32, g: f32) {
        let linear = model.linear_layers_mut().next().unwrap();
        linear.forward(&Tensor::from_vec(vec![x], &[1, 1]).unwrap());
        linear.backward(&Tensor::from_vec(vec![g], &[1, 1]).unwrap());
    }

    fn params(model: &Mlp) -> (f32, f32) {
        let linear = model.linear_layers().next().unwrap();
        (linear.weight().data()[0], linear.bias().data()[0])
    }

    #[test]
    fn momentum_must_be_in_unit_interval() {
        assert!(Optimizer::SgdMomentum { momentum: 1.0 }.validate().is_err());
        assert!(Optimizer::SgdMomentum { momentum: -0.1 }.validate().is_err());
        assert!(Optimizer::SgdMomentum { momentum: 0.9 }.validate().is_ok());
    }

    #[test]
    fn sgd_moves_against_gradient_and_resets_it() {
        let mut model = unit_model(1.0, 2.0);
        set_grads(&mut model, 3.0, 1.0);

        let mut opt = Optimizer::Sgd.state(&model).unwrap();
        opt.step(&mut model, 0.1);

        let (w, b) = params(&model);
        assert!((w - (1.0 - 0.1 * 3.0)).abs() < 1e-6);
        assert!((b - (2.0 - 0.1 * 1.0)).abs() < 1e-6);

        let linear = model.linear_layers().next().unwrap();
        assert_eq!(linear.grad_weight().data(), &[0.0]);
        assert_eq!(linear.grad_bias().data(), &[0.0]);
    }

    #[test]
    fn momentum_accumulates_velocity() {
        let mut model = unit_model(0.0, 0.0);
        let mut opt = Optimizer::SgdMomentum { momentum: 0.5 }
            .state(&model)
            .unwrap();

        set_grads(&mut model, 1.0, 1.0);
        opt.step(&mut model, 1.0);
        // v = 1, param = -1
        assert!((params(&model).1 - -1.0).abs() < 1e-6);

        set_grads(&mut model, 1.0, 1.0);
        opt.step(&mut model, 1.0);
        // v = 0.5 * 1 + 1 = 1.5, param = -2.5
        assert!((params(&model).1 - -2.5).abs() < 1e-6);
    }
}
