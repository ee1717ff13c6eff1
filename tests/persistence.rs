use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use femur_mlp::{Error, NeuralNetwork, Vector};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("femur_mlp_{name}_{}", std::process::id()))
}

fn trained() -> NeuralNetwork<f64> {
    let xs: Vec<Vector<f64>> = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
        .iter()
        .map(|x| Vector::from_vec(x.to_vec()))
        .collect();
    let ys: Vec<Vector<f64>> = [0.0, 1.0, 1.0, 0.0]
        .iter()
        .map(|&y| Vector::from_vec(vec![y]))
        .collect();
    let mut net = NeuralNetwork::new(&[2, 4, 1], 0.5).unwrap();
    net.train(&xs, &ys, 50, false).unwrap();
    net
}

#[test]
fn save_load_round_trip_preserves_predictions() {
    let net = trained();
    let probe = Vector::from_vec(vec![0.3, 0.9]);
    let before = net.predict(&probe).unwrap();

    let path = temp_path("round_trip.nn");
    net.save(&path).unwrap();
    let loaded = NeuralNetwork::<f64>::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let after = loaded.predict(&probe).unwrap();
    assert_eq!(after.len(), before.len());
    for (a, b) in after.iter().zip(before.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
    }
    assert_eq!(net.predict(&probe).unwrap(), before);
    assert_eq!(loaded, net);
}

#[test]
fn loaded_model_keeps_training_like_the_original() {
    let mut net = trained();
    let mut loaded = NeuralNetwork::from_token_str(&net.to_token_string()).unwrap();

    let x = Vector::from_vec(vec![1.0, 0.0]);
    let y = Vector::from_vec(vec![1.0]);
    assert_eq!(net.backward(&x, &y).unwrap(), loaded.backward(&x, &y).unwrap());
    assert_eq!(net, loaded);
}

#[test]
fn saved_file_follows_the_token_layout() {
    let net = trained();
    let text = net.to_token_string();
    let tokens: Vec<&str> = text.split_whitespace().collect();

    assert_eq!(&tokens[..7], &["3", "2", "4", "1", "0.5", "sigmoid", "meanSquaredError"]);
    // 4x2 weights + 4 biases, then 1x4 weights + 1 bias, each with a shape header.
    assert_eq!(tokens.len(), 7 + (2 + 8 + 4) + (2 + 4 + 1));
    assert_eq!(&tokens[7..9], &["4", "2"]);
}

#[test]
fn truncated_file_is_malformed() {
    let net = trained();
    let text = net.to_token_string();
    let cut: Vec<&str> = text.split_whitespace().collect();
    let cut = cut[..cut.len() - 1].join(" ");

    let path = temp_path("truncated.nn");
    std::fs::write(&path, cut).unwrap();
    let err = NeuralNetwork::<f64>::load(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(err, Error::MalformedModel(_)));
}

#[test]
fn unreadable_and_unwritable_paths_are_io_errors() {
    let missing = temp_path("does_not_exist.nn");
    let _ = std::fs::remove_file(&missing);
    assert!(matches!(
        NeuralNetwork::<f64>::load(&missing),
        Err(Error::Io(_))
    ));

    let dir = temp_path("no_such_dir").join("model.nn");
    assert!(matches!(trained().save(&dir), Err(Error::Io(_))));
}

#[test]
fn f32_models_round_trip_exactly() {
    let net = NeuralNetwork::new(&[4, 3, 4], 0.25_f32).unwrap();
    let loaded = NeuralNetwork::<f32>::from_token_str(&net.to_token_string()).unwrap();
    assert_eq!(loaded, net);
}
