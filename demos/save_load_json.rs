#[cfg(not(feature = "serde"))]
fn main() {
    println!("enable the `serde` feature: cargo run --example save_load_json --features serde");
}

#[cfg(feature = "serde")]
fn main() -> ffnet::Result<()> {
    use ffnet::{Dataset, FitConfig, Init, MlpBuilder, Tensor};

    // XOR as a two-class problem.
    let inputs = Tensor::from_rows(&[
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ])?;
    let train = Dataset::from_labels(inputs, &[0, 1, 1, 0], 2)?;

    let mut mlp = MlpBuilder::new(2, 2)?
        .hidden_layer(8)?
        .init(Init::He)
        .build_with_seed(0)?;

    mlp.fit(
        &train,
        None,
        FitConfig {
            max_steps: 2_000,
            batch_size: 4,
            lr: 0.1,
            eval_freq: 500,
            ..FitConfig::default()
        },
    )?;

    let path = "target/tmp_mlp.json";
    mlp.save_json(path)?;

    let mut loaded = ffnet::Mlp::load_json(path)?;
    let probs = loaded.predict(train.inputs())?;
    println!("saved and loaded model: {path}");
    println!("predicted classes: {:?}", probs.argmax_rows());
    Ok(())
}
