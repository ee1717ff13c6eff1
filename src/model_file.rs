//! Model persistence.
//!
//! Models are stored as a whitespace-delimited token stream:
//!
//! ```text
//! L
//! n_0 n_1 ... n_{L-1}
//! learning_rate
//! activation_name
//! loss_name
//! rows cols          \
//! w_00 ... w_0c      |  once per weight layer;
//! ...                |  rows == n_{k+1}, cols == n_k
//! b_0 ... b_r        /
//! ```
//!
//! Line breaks are only cosmetic; the reader splits on any whitespace. Numbers
//! are written with Rust's shortest round-trip formatting, so a saved model
//! reloads bit for bit.
//!
//! [`ModelSnapshot`] is the validated, representation-independent form shared by
//! the token stream and the JSON format in [`crate::serde_model`].

use std::fmt::Write as _;
use std::io::{Read, Write};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::linalg::{Matrix, Real, Vector};
use crate::loss::Loss;
use crate::network::NeuralNetwork;
use crate::{Error, Result};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSnapshot<T> {
    pub layers: Vec<usize>,
    pub learning_rate: T,
    pub activation: String,
    pub loss: String,
    pub params: Vec<LayerSnapshot<T>>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSnapshot<T> {
    pub rows: usize,
    pub cols: usize,
    /// Row-major (rows, cols).
    pub weights: Vec<T>,
    pub biases: Vec<T>,
}

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedModel(msg.into())
}

impl<T: Real> ModelSnapshot<T> {
    pub fn validate(&self) -> Result<()> {
        if self.layers.len() < 2 {
            return Err(malformed(format!(
                "layer count must be >= 2, got {}",
                self.layers.len()
            )));
        }
        if self.layers.contains(&0) {
            return Err(malformed("all layer sizes must be > 0"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > T::zero()) {
            return Err(malformed(format!(
                "learning rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        Activation::from_name(&self.activation)?;
        Loss::from_name(&self.loss)?;

        if self.params.len() != self.layers.len() - 1 {
            return Err(malformed(format!(
                "expected {} weight layers, got {}",
                self.layers.len() - 1,
                self.params.len()
            )));
        }
        for (k, layer) in self.params.iter().enumerate() {
            layer.validate(k, self.layers[k], self.layers[k + 1])?;
        }
        Ok(())
    }

    fn write_tokens(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "{}", self.layers.len())?;
        writeln!(out, "{}", join(&self.layers))?;
        writeln!(out, "{}", self.learning_rate)?;
        writeln!(out, "{}", self.activation)?;
        writeln!(out, "{}", self.loss)?;
        for layer in &self.params {
            writeln!(out, "{} {}", layer.rows, layer.cols)?;
            for row in layer.weights.chunks(layer.cols.max(1)) {
                writeln!(out, "{}", join(row))?;
            }
            writeln!(out, "{}", join(&layer.biases))?;
        }
        Ok(())
    }

    /// Parse and validate a token stream.
    pub fn from_token_str(s: &str) -> Result<Self> {
        let mut tokens = Tokens::new(s);

        let count = tokens.next_usize("layer count")?;
        if count < 2 {
            return Err(malformed(format!("layer count must be >= 2, got {count}")));
        }
        let mut layers = Vec::new();
        for i in 0..count {
            let size = tokens.next_usize(&format!("size of layer {i}"))?;
            if size == 0 {
                return Err(malformed(format!("layer {i} has size 0")));
            }
            layers.push(size);
        }

        let learning_rate = tokens.next_real("learning rate")?;
        let activation = tokens.next_word("activation name")?.to_owned();
        let loss = tokens.next_word("loss name")?.to_owned();

        // Declared sizes are untrusted: never pre-size buffers from them.
        let mut params = Vec::new();
        for k in 0..count - 1 {
            let rows = tokens.next_usize(&format!("row count of layer {k}"))?;
            let cols = tokens.next_usize(&format!("column count of layer {k}"))?;
            check_layer_shape(k, rows, cols, layers[k], layers[k + 1])?;

            let mut weights = Vec::new();
            for i in 0..weight_count(k, rows, cols)? {
                weights.push(tokens.next_real(&format!("weight {i} of layer {k}"))?);
            }
            let mut biases = Vec::new();
            for i in 0..rows {
                biases.push(tokens.next_real(&format!("bias {i} of layer {k}"))?);
            }
            params.push(LayerSnapshot {
                rows,
                cols,
                weights,
                biases,
            });
        }

        if let Some(extra) = tokens.next() {
            return Err(malformed(format!("unexpected trailing token {extra:?}")));
        }

        let snapshot = Self {
            layers,
            learning_rate,
            activation,
            loss,
            params,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

impl<T: Real> LayerSnapshot<T> {
    fn validate(&self, k: usize, fan_in: usize, fan_out: usize) -> Result<()> {
        check_layer_shape(k, self.rows, self.cols, fan_in, fan_out)?;
        let expected = weight_count(k, self.rows, self.cols)?;
        if self.weights.len() != expected {
            return Err(malformed(format!(
                "layer {k} has {} weights, expected {expected}",
                self.weights.len()
            )));
        }
        if self.biases.len() != self.rows {
            return Err(malformed(format!(
                "layer {k} has {} biases, expected {}",
                self.biases.len(),
                self.rows
            )));
        }
        if self.weights.iter().chain(&self.biases).any(|v| !v.is_finite()) {
            return Err(malformed(format!(
                "layer {k} parameters must be finite"
            )));
        }
        Ok(())
    }
}

fn check_layer_shape(
    k: usize,
    rows: usize,
    cols: usize,
    fan_in: usize,
    fan_out: usize,
) -> Result<()> {
    if rows != fan_out || cols != fan_in {
        return Err(malformed(format!(
            "layer {k} has shape ({rows}, {cols}), expected ({fan_out}, {fan_in})"
        )));
    }
    Ok(())
}

fn weight_count(k: usize, rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or_else(|| malformed(format!("layer {k} shape ({rows}, {cols}) overflows")))
}

fn join<V: std::fmt::Display>(values: &[V]) -> String {
    let mut s = String::new();
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        let _ = write!(s, "{v}");
    }
    s
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            inner: s.split_whitespace(),
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        self.inner.next()
    }

    fn next_word(&mut self, what: &str) -> Result<&'a str> {
        self.next()
            .ok_or_else(|| malformed(format!("missing {what}")))
    }

    fn next_usize(&mut self, what: &str) -> Result<usize> {
        let tok = self.next_word(what)?;
        tok.parse()
            .map_err(|_| malformed(format!("invalid {what} {tok:?}")))
    }

    fn next_real<T: Real>(&mut self, what: &str) -> Result<T> {
        let tok = self.next_word(what)?;
        let value: T = tok
            .parse()
            .map_err(|_| malformed(format!("invalid {what} {tok:?}")))?;
        if !value.is_finite() {
            return Err(malformed(format!("{what} must be finite, got {tok:?}")));
        }
        Ok(value)
    }
}

impl<T: Real> From<&NeuralNetwork<T>> for ModelSnapshot<T> {
    fn from(net: &NeuralNetwork<T>) -> Self {
        let params = net
            .weights()
            .iter()
            .zip(net.biases())
            .map(|(w, b)| LayerSnapshot {
                rows: w.rows(),
                cols: w.cols(),
                weights: w.as_slice().to_vec(),
                biases: b.to_vec(),
            })
            .collect();
        Self {
            layers: net.layers().to_vec(),
            learning_rate: net.learning_rate(),
            activation: net.activation().name().to_owned(),
            loss: net.loss().name().to_owned(),
            params,
        }
    }
}

impl<T: Real> TryFrom<ModelSnapshot<T>> for NeuralNetwork<T> {
    type Error = Error;

    fn try_from(value: ModelSnapshot<T>) -> std::result::Result<Self, Self::Error> {
        value.validate()?;

        let activation = Activation::from_name(&value.activation)?;
        let loss = Loss::from_name(&value.loss)?;
        let mut weights = Vec::with_capacity(value.params.len());
        let mut biases = Vec::with_capacity(value.params.len());
        for layer in value.params {
            weights.push(Matrix::from_shape_vec((layer.rows, layer.cols), layer.weights)?);
            biases.push(Vector::from_vec(layer.biases));
        }

        NeuralNetwork::from_parts(
            value.layers,
            weights,
            biases,
            value.learning_rate,
            activation,
            loss,
        )
    }
}

impl<T: Real> NeuralNetwork<T> {
    /// Render the model as a token stream.
    pub fn to_token_string(&self) -> String {
        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = ModelSnapshot::from(self).write_tokens(&mut out);
        out
    }

    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        writer
            .write_all(self.to_token_string().as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| Error::Io(format!("failed to write model: {e}")))
    }

    pub fn from_token_str(s: &str) -> Result<Self> {
        ModelSnapshot::from_token_str(s)?.try_into()
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut s = String::new();
        reader
            .read_to_string(&mut s)
            .map_err(|e| Error::Io(format!("failed to read model: {e}")))?;
        Self::from_token_str(&s)
    }

    /// Write the model to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        std::fs::write(p, self.to_token_string())
            .map_err(|e| Error::Io(format!("failed to write {}: {e}", p.display())))?;
        log::info!("saved model {:?} to {}", self.layers(), p.display());
        Ok(())
    }

    /// Read a model previously written by [`NeuralNetwork::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::Io(format!("failed to read {}: {e}", p.display())))?;
        let net = Self::from_token_str(&s)?;
        log::info!("loaded model {:?} from {}", net.layers(), p.display());
        Ok(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = "2\n2 1\n0.5\nsigmoid\nmeanSquaredError\n1 2\n0.25 -1.5\n0.125\n";

    fn tiny() -> NeuralNetwork<f64> {
        NeuralNetwork::from_parts(
            vec![2, 1],
            vec![Matrix::from_shape_vec((1, 2), vec![0.25, -1.5]).unwrap()],
            vec![Vector::from_vec(vec![0.125])],
            0.5,
            Activation::Sigmoid,
            Loss::MeanSquaredError,
        )
        .unwrap()
    }

    #[test]
    fn token_layout_is_stable() {
        assert_eq!(tiny().to_token_string(), TINY);
        assert_eq!(NeuralNetwork::<f64>::from_token_str(TINY).unwrap(), tiny());
    }

    #[test]
    fn line_breaks_are_not_significant() {
        let flat = TINY.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(NeuralNetwork::<f64>::from_token_str(&flat).unwrap(), tiny());
    }

    #[test]
    fn round_trip_is_exact() {
        let net = NeuralNetwork::new(&[3, 5, 2], 0.3_f32).unwrap();
        let loaded = NeuralNetwork::from_token_str(&net.to_token_string()).unwrap();
        assert_eq!(loaded, net);
    }

    #[test]
    fn writer_and_reader_round_trip() {
        let net = NeuralNetwork::new(&[2, 3, 1], 0.5_f64).unwrap();
        let mut buf = Vec::new();
        net.to_writer(&mut buf).unwrap();
        let loaded = NeuralNetwork::from_reader(buf.as_slice()).unwrap();
        assert_eq!(loaded, net);
    }

    fn rejects(s: &str) {
        let err = NeuralNetwork::<f64>::from_token_str(s).unwrap_err();
        assert!(matches!(err, Error::MalformedModel(_)), "{s:?} gave {err}");
    }

    #[test]
    fn malformed_streams_are_rejected() {
        rejects("");
        rejects("1\n2\n0.5\nsigmoid\nmeanSquaredError\n");
        rejects("2\n2 0\n0.5\nsigmoid\nmeanSquaredError\n0 2\n");
        rejects("two\n2 1\n");
        rejects(&TINY.replace("0.5\n", "-0.5\n"));
        rejects(&TINY.replace("sigmoid", "relu"));
        rejects(&TINY.replace("meanSquaredError", "crossEntropy"));
        rejects(&TINY.replace("1 2\n", "2 1\n"));
        rejects(&TINY.replace("-1.5", "NaN"));
        rejects(&TINY.replace("-1.5", "x"));
        rejects(TINY.trim_end_matches("0.125\n"));
        rejects(&format!("{TINY}7\n"));
    }

    #[test]
    fn huge_declared_shapes_are_rejected_without_allocating() {
        let overflow = "2\n4294967296 4294967296\n0.5\nsigmoid\nmeanSquaredError\n\
                        4294967296 4294967296\n1\n";
        rejects(overflow);
        rejects(&overflow.replace("4294967296", "1000000000"));
        rejects("18446744073709551615\n2 1\n");
    }

    #[test]
    fn snapshot_with_overflowing_shape_is_malformed() {
        let snap = ModelSnapshot::<f64> {
            layers: vec![usize::MAX, usize::MAX],
            learning_rate: 0.5,
            activation: "sigmoid".to_owned(),
            loss: "meanSquaredError".to_owned(),
            params: vec![LayerSnapshot {
                rows: usize::MAX,
                cols: usize::MAX,
                weights: vec![0.0],
                biases: vec![0.0],
            }],
        };
        assert!(matches!(snap.validate(), Err(Error::MalformedModel(_))));
    }

    #[test]
    fn snapshot_validation_catches_bad_parameters() {
        let mut snap = ModelSnapshot::from(&tiny());
        assert!(snap.validate().is_ok());

        snap.params[0].biases.push(0.0);
        assert!(matches!(snap.validate(), Err(Error::MalformedModel(_))));

        let mut snap = ModelSnapshot::from(&tiny());
        snap.params.clear();
        assert!(NeuralNetwork::try_from(snap).is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("femur_mlp_model_file_missing.nn");
        let _ = std::fs::remove_file(&path);
        let err = NeuralNetwork::<f64>::load(&path).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "femur_mlp_model_file_{}.nn",
            std::process::id()
        ));
        let net = NeuralNetwork::new(&[2, 2, 1], 0.5_f64).unwrap();
        net.save(&path).unwrap();
        let loaded = NeuralNetwork::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, net);
    }
}
