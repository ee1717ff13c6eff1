use femur_mlp::{Dataset, FitConfig, NetworkBuilder, NeuralNetwork, Vector};

fn main() -> femur_mlp::Result<()> {
    env_logger::init();

    // Classic XOR dataset.
    let xs: Vec<Vector<f64>> = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
        .iter()
        .map(|x| Vector::from_vec(x.to_vec()))
        .collect();
    let ys: Vec<Vector<f64>> = [0.0, 1.0, 1.0, 0.0]
        .iter()
        .map(|&y| Vector::from_vec(vec![y]))
        .collect();
    let train = Dataset::from_rows(xs.clone(), ys)?;

    // 2 -> 4 -> 1 network, sigmoid everywhere.
    let mut net: NeuralNetwork<f64> = NetworkBuilder::new(2)?
        .add_layer(4)?
        .add_layer(1)?
        .learning_rate(0.5)?
        .build()?;

    let report = net.fit(
        &train,
        FitConfig {
            epochs: 2_000,
            verbose: true,
        },
    )?;

    let mse = net.evaluate_mse(&train)?;
    println!(
        "first_epoch_loss={:?} last_epoch_loss={:?} train_mse={mse}",
        report.initial_loss(),
        report.final_loss()
    );

    for (x, y) in xs.iter().zip(net.predict_all(&xs)?) {
        println!("x={x} y={y}");
    }

    Ok(())
}
