use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ffnet::{Init, Loss, Mlp, Tensor};
use rand::SeedableRng;
use rand::rngs::StdRng;

const BATCH: usize = 200;
const SIZES: (usize, &[usize], usize) = (3072, &[100], 10);

fn model() -> Mlp {
    let (n_inputs, hidden, n_classes) = SIZES;
    let mut rng = StdRng::seed_from_u64(0);
    Mlp::new_with_rng(n_inputs, hidden, n_classes, Init::He, &mut rng).unwrap()
}

fn batch() -> (Tensor, Tensor) {
    let x = Tensor::from_vec(vec![0.1_f32; BATCH * SIZES.0], &[BATCH, SIZES.0]).unwrap();
    let mut t = Tensor::zeros(&[BATCH, SIZES.2]);
    for r in 0..BATCH {
        t.row_mut(r)[r % SIZES.2] = 1.0;
    }
    (x, t)
}

fn mlp_forward_bench(c: &mut Criterion) {
    let mut mlp = model();
    let (x, _) = batch();

    c.bench_function("mlp_forward_200x3072_100_10", |b| {
        b.iter(|| black_box(mlp.forward(black_box(&x))))
    });
}

fn mlp_backward_bench(c: &mut Criterion) {
    let mut mlp = model();
    let (x, t) = batch();
    let probs = mlp.forward(&x);
    let grad = Loss::CrossEntropy.backward(&probs, &t);

    c.bench_function("mlp_backward_200x3072_100_10", |b| {
        b.iter(|| black_box(mlp.backward(black_box(&grad))))
    });
}

criterion_group!(benches, mlp_forward_bench, mlp_backward_bench);
criterion_main!(benches);
