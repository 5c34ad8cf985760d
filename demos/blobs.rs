use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ffnet::{Dataset, FitConfig, Init, Loss, MlpBuilder, Optimizer, Shuffle, Tensor};

/// Three Gaussian-ish blobs in 2D, one per class.
fn blobs(n_per_class: usize, rng: &mut StdRng) -> ffnet::Result<Dataset> {
    let centers = [[-1.0_f32, -1.0], [1.0, -1.0], [0.0, 1.0]];
    let mut xs = Vec::with_capacity(centers.len() * n_per_class * 2);
    let mut labels = Vec::with_capacity(centers.len() * n_per_class);

    for (class, center) in centers.iter().enumerate() {
        for _ in 0..n_per_class {
            xs.push(center[0] + rng.gen_range(-0.4..0.4));
            xs.push(center[1] + rng.gen_range(-0.4..0.4));
            labels.push(class);
        }
    }

    let inputs = Tensor::from_vec(xs, &[labels.len(), 2])?;
    Dataset::from_labels(inputs, &labels, centers.len())
}

fn main() -> ffnet::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut rng = StdRng::seed_from_u64(0);
    let train = blobs(256, &mut rng)?;
    let test = blobs(64, &mut rng)?;

    let mut mlp = MlpBuilder::new(2, 3)?
        .hidden_layers(&[32, 16])?
        .init(Init::He)
        .build_with_seed(0)?;

    let report = mlp.fit(
        &train,
        Some(&test),
        FitConfig {
            max_steps: 600,
            batch_size: 64,
            lr: 0.05,
            eval_freq: 100,
            optimizer: Optimizer::SgdMomentum { momentum: 0.9 },
            loss: Loss::CrossEntropy,
            shuffle: Shuffle::Seeded(42),
        },
    )?;

    if let Some(last) = report.last() {
        println!(
            "step={} test_loss={:.4} test_accuracy={:.3}",
            last.step, last.eval.loss, last.eval.accuracy
        );
    }
    Ok(())
}
