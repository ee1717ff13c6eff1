use femur_mlp::{NeuralNetwork, Vector};

fn main() -> femur_mlp::Result<()> {
    let xs: Vec<Vector<f64>> = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
        .iter()
        .map(|x| Vector::from_vec(x.to_vec()))
        .collect();
    let ys: Vec<Vector<f64>> = [0.0, 1.0, 1.0, 0.0]
        .iter()
        .map(|&y| Vector::from_vec(vec![y]))
        .collect();

    let mut net = NeuralNetwork::new(&[2, 4, 1], 0.5)?;
    net.train(&xs, &ys, 500, false)?;

    let path = std::env::temp_dir().join("femur_mlp_demo.nn");
    net.save(&path)?;
    let loaded = NeuralNetwork::<f64>::load(&path)?;
    println!("saved and loaded model: {}", path.display());
    println!("{}", loaded.to_token_string());

    #[cfg(feature = "serde")]
    {
        let json_path = std::env::temp_dir().join("femur_mlp_demo.json");
        loaded.save_json(&json_path)?;
        let from_json = NeuralNetwork::<f64>::load_json(&json_path)?;
        println!("json round trip equal: {}", from_json == loaded);
    }

    let probe = &xs[1];
    println!(
        "original={} loaded={}",
        net.predict(probe)?,
        loaded.predict(probe)?
    );
    Ok(())
}
