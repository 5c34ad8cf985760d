//! A small feed-forward network with explicit forward/backward passes.
//!
//! `ffnet` builds a multilayer perceptron from three layer modules (Linear,
//! ReLU, Softmax) and drives them by hand: no autodiff, no graph. Each layer
//! caches what it needs during `forward` and consumes it in `backward`.
//!
//! # Architecture
//!
//! [`Mlp::new_with_seed`]`(n_inputs, &hidden, n_classes, seed)` builds
//!
//! - `[Linear(n_inputs→n_classes), Softmax]` when `hidden` is empty, or
//! - `Linear(n_inputs→h1), ReLU, …, Linear(hk→n_classes), Softmax` otherwise.
//!
//! # Panics vs `Result`
//!
//! - Hot path (panics on misuse): [`Mlp::forward`], [`Mlp::backward`] and the
//!   per-layer `forward`/`backward`. A shape mismatch there is a programmer
//!   error and fails fast via `assert!`.
//! - Checked API: builders, [`Tensor::from_vec`], [`Dataset`], [`Mlp::predict`],
//!   [`Mlp::fit`], [`Mlp::evaluate`] return [`Result`].
//!
//! # Data layout
//!
//! - Scalars are `f32`, tensors are row-major.
//! - Batches are `[batch, features]`; Linear weights are `[in_features, out_features]`.
//!
//! # Quick start
//!
//! ```rust
//! use ffnet::{Init, Loss, Mlp, Optimizer, Tensor};
//!
//! # fn main() -> ffnet::Result<()> {
//! let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0);
//! let mut mlp = Mlp::new_with_rng(4, &[8], 3, Init::He, &mut rng)?;
//! let mut opt = Optimizer::Sgd.state(&mlp)?;
//!
//! let x = Tensor::from_rows(&[vec![0.1, 0.2, 0.3, 0.4], vec![1.0, 0.0, -1.0, 0.5]])?;
//! let t = Tensor::from_rows(&[vec![1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0]])?;
//!
//! let probs = mlp.forward(&x);
//! let _loss = Loss::CrossEntropy.forward(&probs, &t);
//! let d_input = mlp.backward(&Loss::CrossEntropy.backward(&probs, &t));
//! assert_eq!(d_input.shape(), &[2, 4]);
//! opt.step(&mut mlp, 1e-2);
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Construction and training emit [`tracing`] events (`debug` per step, `info`
//! per checkpoint). Install a subscriber in the binary to see them.

pub mod activation;
pub mod builder;
pub mod data;
pub mod error;
pub mod layer;
pub mod linear;
pub mod loss;
pub(crate) mod matmul;
pub mod metrics;
pub mod mlp;
pub mod optim;
pub mod tensor;
pub mod train;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use activation::{Relu, Softmax};
pub use builder::MlpBuilder;
pub use data::{Batches, Dataset, Shuffle};
pub use error::{Error, Result};
pub use layer::{Layer, LayerKind};
pub use linear::{Init, Linear};
pub use loss::Loss;
pub use mlp::Mlp;
pub use optim::{Optimizer, OptimizerState};
pub use tensor::Tensor;
pub use train::{Checkpoint, EvalReport, FitConfig, FitReport};
