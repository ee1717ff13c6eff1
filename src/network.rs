//! Feed-forward network trained by per-example gradient descent.
//!
//! Layer `k` maps `layers[k]` inputs to `layers[k + 1]` outputs with a weight
//! matrix of shape `(layers[k + 1], layers[k])` and a bias vector of length
//! `layers[k + 1]`:
//!
//! - `z_k = W_k a_{k-1} + b_k`
//! - `a_k = σ(z_k)`, with `a_0` the input
//!
//! The forward pass returns an explicit [`ForwardTrace`] holding every `a_k` and
//! `z_k`. Backprop consumes a trace instead of reading state left behind on the
//! network, so `forward` only needs `&self`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::activation::{Activation, ActivationFunction};
use crate::builder::{InitStream, NetworkBuilder};
use crate::linalg::{Matrix, Real, Vector};
use crate::loss::{Loss, LossFunction};
use crate::{Checked, Degraded, Error, Result};

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork<T> {
    layers: Vec<usize>,
    weights: Vec<Matrix<T>>,
    biases: Vec<Vector<T>>,
    learning_rate: T,
    activation: Activation,
    loss: Loss,
}

/// Activations and pre-activations of one forward pass.
///
/// `activations()` has one entry per layer size (index 0 is the input);
/// `pre_activations()` has one entry per weight layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardTrace<T> {
    activations: Vec<Vector<T>>,
    pre_activations: Vec<Vector<T>>,
}

impl<T> ForwardTrace<T> {
    #[inline]
    pub fn input(&self) -> &Vector<T> {
        &self.activations[0]
    }

    #[inline]
    pub fn output(&self) -> &Vector<T> {
        &self.activations[self.activations.len() - 1]
    }

    #[inline]
    pub fn activations(&self) -> &[Vector<T>] {
        &self.activations
    }

    #[inline]
    pub fn pre_activations(&self) -> &[Vector<T>] {
        &self.pre_activations
    }

    pub fn into_output(mut self) -> Vector<T> {
        let last = self.activations.len() - 1;
        self.activations.swap_remove(last)
    }
}

/// Parameter gradients for one example, plus that example's loss.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients<T> {
    d_weights: Vec<Matrix<T>>,
    d_biases: Vec<Vector<T>>,
    loss: T,
}

impl<T: Copy> Gradients<T> {
    #[inline]
    pub fn d_weights(&self, layer_idx: usize) -> &Matrix<T> {
        &self.d_weights[layer_idx]
    }

    #[inline]
    pub fn d_biases(&self, layer_idx: usize) -> &Vector<T> {
        &self.d_biases[layer_idx]
    }

    #[inline]
    pub fn loss(&self) -> T {
        self.loss
    }
}

pub(crate) fn validate_layer_sizes(layers: &[usize]) -> Result<()> {
    if layers.len() < 2 {
        return Err(Error::InvalidConfig(
            "layers must include input and output sizes".to_owned(),
        ));
    }
    if layers.contains(&0) {
        return Err(Error::InvalidConfig(
            "all layer sizes must be > 0".to_owned(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_learning_rate<T: Real>(lr: T) -> Result<()> {
    if !(lr.is_finite() && lr > T::zero()) {
        return Err(Error::InvalidConfig(format!(
            "learning rate must be finite and > 0, got {lr}"
        )));
    }
    Ok(())
}

impl<T: Real> NeuralNetwork<T> {
    /// Sigmoid/MSE network with weights drawn from [`DEFAULT_SEED`].
    pub fn new(layers: &[usize], learning_rate: T) -> Result<Self> {
        NetworkBuilder::from_sizes(layers)?
            .learning_rate(learning_rate)?
            .build()
    }

    pub fn new_with_seed(layers: &[usize], learning_rate: T, seed: u64) -> Result<Self> {
        NetworkBuilder::from_sizes(layers)?
            .learning_rate(learning_rate)?
            .seed(seed)
            .build()
    }

    /// Assemble a network from explicit parameters, checking every layer shape.
    pub fn from_parts(
        layers: Vec<usize>,
        weights: Vec<Matrix<T>>,
        biases: Vec<Vector<T>>,
        learning_rate: T,
        activation: Activation,
        loss: Loss,
    ) -> Result<Self> {
        validate_layer_sizes(&layers)?;
        validate_learning_rate(learning_rate)?;

        let depth = layers.len() - 1;
        if weights.len() != depth || biases.len() != depth {
            return Err(Error::DimensionMismatch(format!(
                "{} layer sizes need {depth} weight matrices and bias vectors, got {} and {}",
                layers.len(),
                weights.len(),
                biases.len()
            )));
        }
        for k in 0..depth {
            let expected = (layers[k + 1], layers[k]);
            if weights[k].shape() != expected {
                return Err(Error::DimensionMismatch(format!(
                    "layer {k} weights have shape {:?}, expected {expected:?}",
                    weights[k].shape()
                )));
            }
            if biases[k].len() != layers[k + 1] {
                return Err(Error::DimensionMismatch(format!(
                    "layer {k} biases have length {}, expected {}",
                    biases[k].len(),
                    layers[k + 1]
                )));
            }
        }

        Ok(Self {
            layers,
            weights,
            biases,
            learning_rate,
            activation,
            loss,
        })
    }

    /// Redraw every weight from `N(0, sqrt(2 / (fan_in + fan_out)))` and zero the
    /// biases.
    ///
    /// With [`InitStream::Sequential`] one generator seeded with `seed` is consumed
    /// layer after layer, so layer `k + 1` continues the stream where layer `k`
    /// stopped. [`InitStream::PerLayer`] gives each layer its own generator.
    pub fn initialize(&mut self, seed: u64, stream: InitStream) -> Result<()> {
        let mut shared = StdRng::seed_from_u64(seed);

        for k in 0..self.weights.len() {
            let (fan_in, fan_out) = (self.layers[k], self.layers[k + 1]);
            let std_dev = (2.0 / (fan_in + fan_out) as f64).sqrt();
            let normal = Normal::new(0.0, std_dev)
                .map_err(|e| Error::InvalidConfig(format!("layer {k} init: {e}")))?;

            self.weights[k] = match stream {
                InitStream::Sequential => sample_weights(fan_out, fan_in, &normal, &mut shared),
                InitStream::PerLayer => {
                    let mut rng = StdRng::seed_from_u64(layer_seed(seed, k));
                    sample_weights(fan_out, fan_in, &normal, &mut rng)
                }
            };
            self.biases[k] = Vector::zeros(fan_out);

            log::debug!("layer {k}: {fan_out}x{fan_in} weights, std {std_dev:.6}");
        }

        Ok(())
    }

    /// Layer sizes, input first.
    #[inline]
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.layers[0]
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1]
    }

    /// Number of weight layers (`layers().len() - 1`).
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn learning_rate(&self) -> T {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: T) -> Result<()> {
        validate_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    #[inline]
    pub fn weights(&self) -> &[Matrix<T>] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[Vector<T>] {
        &self.biases
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[inline]
    pub fn loss(&self) -> Loss {
        self.loss
    }

    /// Forward pass keeping every activation and pre-activation.
    pub fn forward_trace(&self, input: &Vector<T>) -> Result<ForwardTrace<T>> {
        if input.len() != self.input_dim() {
            return Err(Error::DimensionMismatch(format!(
                "input length {} does not match input layer size {}",
                input.len(),
                self.input_dim()
            )));
        }

        let mut activations = Vec::with_capacity(self.layers.len());
        let mut pre_activations = Vec::with_capacity(self.weights.len());
        let mut current = input.clone();

        for (w, b) in self.weights.iter().zip(&self.biases) {
            let z = w.checked_mul_vec(&current)?.checked_add(b)?;
            let a = self.activation.apply_vec(&z);
            activations.push(std::mem::replace(&mut current, a));
            pre_activations.push(z);
        }
        activations.push(current);

        Ok(ForwardTrace {
            activations,
            pre_activations,
        })
    }

    /// Network output for `input`.
    ///
    /// A wrong input length degrades to a zero vector of `output_dim()`.
    pub fn forward(&self, input: &Vector<T>) -> Checked<Vector<T>> {
        match self.forward_trace(input) {
            Ok(trace) => Ok(trace.into_output()),
            Err(e) => Err(Degraded::new(e, Vector::zeros(self.output_dim()))),
        }
    }

    /// Inference only: same as [`NeuralNetwork::forward`], no trace is kept.
    #[inline]
    pub fn predict(&self, input: &Vector<T>) -> Checked<Vector<T>> {
        self.forward(input)
    }

    /// Backprop for one example. Does not modify the network.
    ///
    /// - output error: `δ_L = dL/da_L ⊙ σ'(z_L)`
    /// - hidden errors: `δ_k = (W_{k+1}ᵀ δ_{k+1}) ⊙ σ'(z_k)`
    /// - `dL/dW_k = δ_k ⊗ a_{k-1}`, `dL/db_k = δ_k`
    pub fn gradients(&self, trace: &ForwardTrace<T>, target: &Vector<T>) -> Result<Gradients<T>> {
        self.check_trace(trace)?;
        if target.len() != self.output_dim() {
            return Err(Error::DimensionMismatch(format!(
                "target length {} does not match output layer size {}",
                target.len(),
                self.output_dim()
            )));
        }

        let output = trace.output();
        let loss = self.loss.loss(output, target)?;
        let d_output = self.loss.derivative(output, target)?;

        let last = self.weights.len() - 1;
        let mut deltas = Vec::with_capacity(self.weights.len());
        deltas.push(
            d_output.checked_hadamard(
                &self
                    .activation
                    .derivative_vec(&trace.pre_activations[last]),
            )?,
        );

        for k in (0..last).rev() {
            let upstream = &deltas[deltas.len() - 1];
            let weighted = self.weights[k + 1].transpose().checked_mul_vec(upstream)?;
            let delta = weighted
                .checked_hadamard(&self.activation.derivative_vec(&trace.pre_activations[k]))?;
            deltas.push(delta);
        }
        deltas.reverse();

        let d_weights = deltas
            .iter()
            .zip(&trace.activations)
            .map(|(delta, a_prev)| delta.outer(a_prev))
            .collect();

        Ok(Gradients {
            d_weights,
            d_biases: deltas,
            loss,
        })
    }

    /// Gradient descent step: `W_k -= lr * dW_k`, `b_k -= lr * db_k`.
    ///
    /// All shapes are checked before anything is written.
    pub fn apply_gradients(&mut self, grads: &Gradients<T>) -> Result<()> {
        if grads.d_weights.len() != self.weights.len() || grads.d_biases.len() != self.biases.len()
        {
            return Err(Error::DimensionMismatch(format!(
                "gradients cover {} layers, network has {}",
                grads.d_weights.len(),
                self.weights.len()
            )));
        }
        for k in 0..self.weights.len() {
            if grads.d_weights[k].shape() != self.weights[k].shape()
                || grads.d_biases[k].len() != self.biases[k].len()
            {
                return Err(Error::DimensionMismatch(format!(
                    "layer {k} gradient shapes do not match the network"
                )));
            }
        }

        let lr = self.learning_rate;
        for k in 0..self.weights.len() {
            self.weights[k] = self.weights[k].checked_sub(&grads.d_weights[k].scale(lr))?;
            self.biases[k] = self.biases[k].checked_sub(&grads.d_biases[k].scale(lr))?;
        }
        Ok(())
    }

    /// Backprop + update from an existing trace. Returns the example loss.
    pub fn backward_with_trace(&mut self, trace: &ForwardTrace<T>, target: &Vector<T>) -> Result<T> {
        let grads = self.gradients(trace, target)?;
        self.apply_gradients(&grads)?;
        Ok(grads.loss)
    }

    /// One step of online gradient descent on a single example.
    ///
    /// Runs the forward pass itself; returns the loss before the update.
    pub fn backward(&mut self, input: &Vector<T>, target: &Vector<T>) -> Result<T> {
        let trace = self.forward_trace(input)?;
        self.backward_with_trace(&trace, target)
    }

    fn check_trace(&self, trace: &ForwardTrace<T>) -> Result<()> {
        let shapes_match = trace.activations.len() == self.layers.len()
            && trace.pre_activations.len() == self.weights.len()
            && trace
                .activations
                .iter()
                .zip(&self.layers)
                .all(|(a, &size)| a.len() == size)
            && trace
                .pre_activations
                .iter()
                .zip(&self.layers[1..])
                .all(|(z, &size)| z.len() == size);
        if !shapes_match {
            return Err(Error::DimensionMismatch(
                "forward trace was not produced by a network of this shape".to_owned(),
            ));
        }
        Ok(())
    }
}

fn sample_weights<T: Real, R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    normal: &Normal<f64>,
    rng: &mut R,
) -> Matrix<T> {
    let data = (0..rows * cols)
        .map(|_| T::from(normal.sample(&mut *rng)).unwrap_or_else(T::zero))
        .collect();
    Matrix::from_parts(rows, cols, data)
}

#[inline]
fn layer_seed(seed: u64, layer_idx: usize) -> u64 {
    // Layer 0 keeps `seed` itself.
    seed ^ (layer_idx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
