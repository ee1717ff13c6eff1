//! Multi-epoch training loop and dataset-level helpers.

use crate::data::Dataset;
use crate::linalg::{Real, Vector, real_from_usize};
use crate::loss::LossFunction;
use crate::network::NeuralNetwork;
use crate::{Checked, Degraded, Error, Result};

/// Epochs between verbose progress messages.
const LOG_EVERY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitConfig {
    pub epochs: usize,
    /// Log progress every 100th epoch and on the last one.
    pub verbose: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            verbose: false,
        }
    }
}

/// Mean loss of every epoch, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport<T> {
    pub losses: Vec<T>,
}

impl<T: Copy> FitReport<T> {
    pub fn initial_loss(&self) -> Option<T> {
        self.losses.first().copied()
    }

    pub fn final_loss(&self) -> Option<T> {
        self.losses.last().copied()
    }
}

impl<T: Real> NeuralNetwork<T> {
    /// Online gradient descent over `(inputs[i], targets[i])` pairs, in order.
    ///
    /// Each epoch calls [`NeuralNetwork::backward`] once per example and records
    /// the epoch's mean loss. Returns the loss history (length `epochs`).
    ///
    /// Differing counts, no examples at all, or any example whose lengths do
    /// not fit the network degrade to an empty history before any weight is
    /// touched.
    pub fn train(
        &mut self,
        inputs: &[Vector<T>],
        targets: &[Vector<T>],
        epochs: usize,
        verbose: bool,
    ) -> Checked<Vec<T>> {
        if let Err(e) = self.check_examples(inputs, targets) {
            return Err(Degraded::new(e, Vec::new()));
        }

        if inputs.is_empty() {
            return Err(Degraded::new(
                Error::InvalidConfig("no training examples".into()),
                Vec::new(),
            ));
        }

        let mut history = Vec::with_capacity(epochs);
        let n: T = real_from_usize(inputs.len());

        for epoch in 0..epochs {
            let mut total = T::zero();
            for (input, target) in inputs.iter().zip(targets) {
                match self.backward(input, target) {
                    Ok(loss) => total = total + loss,
                    Err(e) => return Err(Degraded::new(e, history)),
                }
            }

            let mean = total / n;
            history.push(mean);

            let epoch = epoch + 1;
            if verbose && (epoch.is_multiple_of(LOG_EVERY) || epoch == epochs) {
                log::info!("epoch {epoch:>5} - loss: {mean:.6}");
            }
        }

        Ok(history)
    }

    /// Train on a [`Dataset`], validating configuration up front.
    pub fn fit(&mut self, train: &Dataset<T>, cfg: FitConfig) -> Result<FitReport<T>> {
        if cfg.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be > 0".to_owned()));
        }
        self.check_dataset(train)?;

        let losses = self.train(train.inputs(), train.targets(), cfg.epochs, cfg.verbose)?;
        Ok(FitReport { losses })
    }

    /// Predict an output for every input. Fails on the first input of the wrong
    /// length.
    pub fn predict_all(&self, inputs: &[Vector<T>]) -> Result<Vec<Vector<T>>> {
        inputs
            .iter()
            .map(|x| self.predict(x).map_err(Error::from))
            .collect()
    }

    /// Mean per-example loss over a dataset, without updating the network.
    pub fn evaluate_mse(&self, data: &Dataset<T>) -> Result<T> {
        self.check_dataset(data)?;

        let mut total = T::zero();
        for (input, target) in data.iter() {
            let out = self.forward(input)?;
            total = total + self.loss().loss(&out, target)?;
        }
        Ok(total / real_from_usize(data.len()))
    }

    fn check_dataset(&self, data: &Dataset<T>) -> Result<()> {
        if data.input_dim() != self.input_dim() {
            return Err(Error::DimensionMismatch(format!(
                "dataset input_dim {} does not match model input_dim {}",
                data.input_dim(),
                self.input_dim()
            )));
        }
        if data.target_dim() != self.output_dim() {
            return Err(Error::DimensionMismatch(format!(
                "dataset target_dim {} does not match model output_dim {}",
                data.target_dim(),
                self.output_dim()
            )));
        }
        Ok(())
    }

    fn check_examples(&self, inputs: &[Vector<T>], targets: &[Vector<T>]) -> Result<()> {
        if inputs.len() != targets.len() {
            return Err(Error::DimensionMismatch(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        for (i, (x, y)) in inputs.iter().zip(targets).enumerate() {
            if x.len() != self.input_dim() {
                return Err(Error::DimensionMismatch(format!(
                    "input {i} has len {}, expected {}",
                    x.len(),
                    self.input_dim()
                )));
            }
            if y.len() != self.output_dim() {
                return Err(Error::DimensionMismatch(format!(
                    "target {i} has len {}, expected {}",
                    y.len(),
                    self.output_dim()
                )));
            }
        }
        Ok(())
    }
}
