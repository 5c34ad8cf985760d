use crate::{Batches, Dataset, Error, Loss, Mlp, Optimizer, Result, Shuffle, metrics};

/// Training configuration for [`Mlp::fit`].
///
/// Defaults follow the classic numpy-MLP coursework setup: 1500 steps of plain
/// SGD on mini-batches of 200 with `lr = 2e-3`, evaluating every 100 steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    pub max_steps: usize,
    pub batch_size: usize,
    pub lr: f32,
    /// Evaluate every `eval_freq` steps (and always after the last step).
    pub eval_freq: usize,
    pub optimizer: Optimizer,
    pub loss: Loss,
    pub shuffle: Shuffle,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_steps: 1500,
            batch_size: 200,
            lr: 2e-3,
            eval_freq: 100,
            optimizer: Optimizer::Sgd,
            loss: Loss::CrossEntropy,
            shuffle: Shuffle::Seeded(42),
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(Error::InvalidConfig("max_steps must be > 0".to_owned()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
        }
        if self.eval_freq == 0 {
            return Err(Error::InvalidConfig("eval_freq must be > 0".to_owned()));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "lr must be finite and > 0, got {}",
                self.lr
            )));
        }
        self.optimizer.validate()
    }
}

/// Loss and accuracy over a whole dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalReport {
    pub loss: f32,
    pub accuracy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    pub step: usize,
    pub epoch: usize,
    /// Loss of the mini-batch trained on at `step`.
    pub train_loss: f32,
    pub eval: EvalReport,
}

#[derive(Debug, Clone, Default)]
pub struct FitReport {
    /// Mini-batch loss for every step.
    pub train_losses: Vec<f32>,
    pub checkpoints: Vec<Checkpoint>,
}

impl FitReport {
    #[inline]
    pub fn last(&self) -> Option<&Checkpoint> {
        self.checkpoints.last()
    }
}

impl Mlp {
    /// Train with mini-batch gradient descent.
    ///
    /// Each step draws a batch, runs forward, the loss gradient, backward and an
    /// optimizer step. Checkpoints evaluate on `eval` when given, otherwise on
    /// `train`.
    pub fn fit(
        &mut self,
        train: &Dataset,
        eval: Option<&Dataset>,
        cfg: FitConfig,
    ) -> Result<FitReport> {
        cfg.validate()?;
        self.check_dataset(train, "train")?;
        if let Some(eval) = eval {
            self.check_dataset(eval, "eval")?;
        }

        let mut batches = Batches::new(train.len(), cfg.batch_size, cfg.shuffle)?;
        let mut opt = cfg.optimizer.state(self)?;
        let mut report = FitReport {
            train_losses: Vec::with_capacity(cfg.max_steps),
            checkpoints: Vec::with_capacity(cfg.max_steps / cfg.eval_freq + 1),
        };

        self.zero_grad();
        for step in 1..=cfg.max_steps {
            let (x, t) = train.batch(batches.next_indices());

            let probs = self.forward(&x);
            let loss = cfg.loss.forward(&probs, &t);
            if !loss.is_finite() {
                return Err(Error::InvalidData(format!(
                    "training loss became non-finite at step {step}"
                )));
            }
            let grad = cfg.loss.backward(&probs, &t);
            self.backward(&grad);
            opt.step(self, cfg.lr);

            report.train_losses.push(loss);
            tracing::debug!(step, loss, "train step");

            if step % cfg.eval_freq == 0 || step == cfg.max_steps {
                let eval_report = self.evaluate(eval.unwrap_or(train), cfg.loss)?;
                tracing::info!(
                    step,
                    epoch = batches.epoch(),
                    train_loss = loss,
                    eval_loss = eval_report.loss,
                    eval_accuracy = eval_report.accuracy,
                    "checkpoint"
                );
                report.checkpoints.push(Checkpoint {
                    step,
                    epoch: batches.epoch(),
                    train_loss: loss,
                    eval: eval_report,
                });
            }
        }

        Ok(report)
    }

    /// Full-batch loss and accuracy over `data`.
    pub fn evaluate(&mut self, data: &Dataset, loss: Loss) -> Result<EvalReport> {
        self.check_dataset(data, "dataset")?;
        let probs = self.forward(data.inputs());
        Ok(EvalReport {
            loss: loss.forward(&probs, data.targets()),
            accuracy: metrics::accuracy(&probs, data.targets()),
        })
    }

    fn check_dataset(&self, data: &Dataset, what: &str) -> Result<()> {
        if data.input_dim() != self.input_dim() {
            return Err(Error::ShapeMismatch(format!(
                "{what} input_dim {} does not match model input_dim {}",
                data.input_dim(),
                self.input_dim()
            )));
        }
        if data.n_classes() != self.output_dim() {
            return Err(Error::ShapeMismatch(format!(
                "{what} n_classes {} does not match model output_dim {}",
                data.n_classes(),
                self.output_dim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{Init, MlpBuilder, Tensor};

    fn blobs(n_per_class: usize, seed: u64) -> Dataset {
        let centers = [[-2.0_f32, -2.0], [2.0, -2.0], [0.0, 2.0]];
        let mut rng = StdRng::seed_from_u64(seed);
        let mut xs = Vec::with_capacity(centers.len() * n_per_class * 2);
        let mut labels = Vec::with_capacity(centers.len() * n_per_class);
        for (class, c) in centers.iter().enumerate() {
            for _ in 0..n_per_class {
                xs.push(c[0] + rng.gen_range(-0.5..0.5));
                xs.push(c[1] + rng.gen_range(-0.5..0.5));
                labels.push(class);
            }
        }
        let inputs = Tensor::from_vec(xs, &[labels.len(), 2]).unwrap();
        Dataset::from_labels(inputs, &labels, centers.len()).unwrap()
    }

    fn model() -> Mlp {
        MlpBuilder::new(2, 3)
            .unwrap()
            .hidden_layer(16)
            .unwrap()
            .init(Init::He)
            .build_with_seed(0)
            .unwrap()
    }

    #[test]
    fn fit_learns_separable_blobs() {
        let train = blobs(64, 0);
        let test = blobs(32, 1);
        let mut mlp = model();

        let before = mlp.evaluate(&test, Loss::CrossEntropy).unwrap();
        let report = mlp
            .fit(
                &train,
                Some(&test),
                FitConfig {
                    max_steps: 300,
                    batch_size: 32,
                    lr: 0.1,
                    eval_freq: 50,
                    ..FitConfig::default()
                },
            )
            .unwrap();

        assert_eq!(report.train_losses.len(), 300);
        assert_eq!(
            report.checkpoints.iter().map(|c| c.step).collect::<Vec<_>>(),
            [50, 100, 150, 200, 250, 300]
        );

        let last = report.last().unwrap();
        assert!(last.eval.loss < before.loss);
        assert!(last.eval.accuracy > 0.95, "accuracy {}", last.eval.accuracy);
    }

    #[test]
    fn final_step_is_always_checkpointed() {
        let train = blobs(8, 2);
        let mut mlp = model();
        let report = mlp
            .fit(
                &train,
                None,
                FitConfig {
                    max_steps: 7,
                    batch_size: 4,
                    eval_freq: 5,
                    ..FitConfig::default()
                },
            )
            .unwrap();
        let steps: Vec<usize> = report.checkpoints.iter().map(|c| c.step).collect();
        assert_eq!(steps, [5, 7]);
    }

    #[test]
    fn seeded_fit_is_reproducible() {
        let train = blobs(16, 5);
        let cfg = FitConfig {
            max_steps: 30,
            batch_size: 8,
            lr: 0.05,
            eval_freq: 10,
            ..FitConfig::default()
        };

        let run = || {
            let mut mlp = model();
            let report = mlp.fit(&train, None, cfg).unwrap();
            let weights: Vec<Tensor> = mlp.linear_layers().map(|l| l.weight().clone()).collect();
            (report.train_losses, weights)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn momentum_training_runs() {
        let train = blobs(16, 3);
        let mut mlp = model();
        let report = mlp
            .fit(
                &train,
                None,
                FitConfig {
                    max_steps: 20,
                    batch_size: 8,
                    lr: 0.05,
                    optimizer: Optimizer::SgdMomentum { momentum: 0.9 },
                    ..FitConfig::default()
                },
            )
            .unwrap();
        assert!(report.train_losses.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn fit_rejects_bad_config_and_mismatched_data() {
        let train = blobs(4, 0);
        let mut mlp = model();

        let cfg = FitConfig {
            max_steps: 0,
            ..FitConfig::default()
        };
        assert!(matches!(
            mlp.fit(&train, None, cfg),
            Err(Error::InvalidConfig(_))
        ));

        let wide = Dataset::from_labels(Tensor::zeros(&[2, 5]), &[0, 1], 3).unwrap();
        assert!(matches!(
            mlp.fit(&train, Some(&wide), FitConfig::default()),
            Err(Error::ShapeMismatch(_))
        ));
        assert!(matches!(
            mlp.evaluate(&wide, Loss::CrossEntropy),
            Err(Error::ShapeMismatch(_))
        ));
    }
}
