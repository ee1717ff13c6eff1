//! Network builder.
//!
//! `NetworkBuilder` makes the model structure explicit (layer sizes, learning rate,
//! seed) and validates it before any weights are allocated. Every network uses
//! Xavier/Glorot initialization with zero biases.

use crate::activation::Activation;
use crate::linalg::{Matrix, Real, Vector, real_from_usize};
use crate::loss::Loss;
use crate::network::{DEFAULT_SEED, NeuralNetwork, validate_learning_rate};
use crate::{Error, Result};

/// How the weight initializer consumes random numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitStream {
    /// One generator for the whole network, drawn layer after layer.
    #[default]
    Sequential,
    /// An independent generator per layer, derived from the seed and layer index.
    PerLayer,
}

#[derive(Debug, Clone)]
/// Builder for a [`NeuralNetwork`].
///
/// ```rust
/// use femur_mlp::{InitStream, NetworkBuilder, NeuralNetwork};
///
/// # fn main() -> femur_mlp::Result<()> {
/// let net: NeuralNetwork<f64> = NetworkBuilder::new(2)?
///     .add_layer(4)?
///     .add_layer(1)?
///     .learning_rate(0.5)?
///     .seed(7)
///     .init_stream(InitStream::PerLayer)
///     .build()?;
/// assert_eq!(net.layers(), &[2, 4, 1]);
/// # Ok(())
/// # }
/// ```
pub struct NetworkBuilder<T> {
    layers: Vec<usize>,
    learning_rate: T,
    seed: u64,
    init_stream: InitStream,
    activation: Activation,
    loss: Loss,
}

impl<T: Real> NetworkBuilder<T> {
    /// Start building a network that accepts inputs of length `input_dim`.
    ///
    /// The learning rate defaults to `0.1` and the seed to [`DEFAULT_SEED`].
    pub fn new(input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidConfig("input_dim must be > 0".to_owned()));
        }
        Ok(Self {
            layers: vec![input_dim],
            learning_rate: T::one() / real_from_usize(10),
            seed: DEFAULT_SEED,
            init_stream: InitStream::default(),
            activation: Activation::default(),
            loss: Loss::default(),
        })
    }

    /// Convenience constructor from a full sizes list, input first.
    pub fn from_sizes(sizes: &[usize]) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(Error::InvalidConfig(
                "sizes must include input and output dims".to_owned(),
            ));
        }
        if sizes.contains(&0) {
            return Err(Error::InvalidConfig(
                "all layer sizes must be > 0".to_owned(),
            ));
        }

        let mut b = Self::new(sizes[0])?;
        for &out_dim in &sizes[1..] {
            b = b.add_layer(out_dim)?;
        }
        Ok(b)
    }

    /// Append a layer with `out_dim` outputs.
    pub fn add_layer(mut self, out_dim: usize) -> Result<Self> {
        if out_dim == 0 {
            return Err(Error::InvalidConfig("layer out_dim must be > 0".to_owned()));
        }
        self.layers.push(out_dim);
        Ok(self)
    }

    pub fn learning_rate(mut self, learning_rate: T) -> Result<Self> {
        validate_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(self)
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn init_stream(mut self, init_stream: InitStream) -> Self {
        self.init_stream = init_stream;
        self
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn loss(mut self, loss: Loss) -> Self {
        self.loss = loss;
        self
    }

    /// Allocate the network and draw its initial weights.
    pub fn build(self) -> Result<NeuralNetwork<T>> {
        if self.layers.len() < 2 {
            return Err(Error::InvalidConfig(
                "network must have at least one layer after the input".to_owned(),
            ));
        }

        let weights = self
            .layers
            .windows(2)
            .map(|w| Matrix::zeros(w[1], w[0]))
            .collect();
        let biases = self.layers[1..].iter().map(|&n| Vector::zeros(n)).collect();

        let mut net = NeuralNetwork::from_parts(
            self.layers,
            weights,
            biases,
            self.learning_rate,
            self.activation,
            self.loss,
        )?;
        net.initialize(self.seed, self.init_stream)?;

        log::debug!(
            "built network {:?} (lr {}, seed {}, {:?})",
            net.layers(),
            net.learning_rate(),
            self.seed,
            self.init_stream
        );
        Ok(net)
    }
}
