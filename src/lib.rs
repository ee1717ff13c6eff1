//! A from-scratch dense linear algebra layer and a sigmoid/MSE multilayer
//! perceptron, built for autoencoding triangle meshes.
//!
//! `femur-mlp` keeps every piece small and readable: row-major [`Vector`] /
//! [`Matrix`] containers, pluggable activation and loss functions, a feed-forward
//! [`NeuralNetwork`] trained by per-example gradient descent, a plain-text model
//! format, and a Wavefront OBJ reader/writer for the mesh data it trains on.
//!
//! # Degrade vs `Result`
//!
//! The crate exposes two kinds of fallible operations:
//!
//! - Shape-dependent arithmetic and inference return [`Checked<V>`]. On failure
//!   the error arrives together with a well-defined fallback value (a zero
//!   vector, the unchanged left operand, an empty matrix, an empty loss
//!   history). Callers either branch on it or collapse it with
//!   [`Fallback::or_fallback`], which logs the error.
//!   - [`Vector::checked_add`], [`Matrix::checked_mul_vec`], ...
//!   - [`NeuralNetwork::forward`], [`NeuralNetwork::train`]
//!   - the `+`, `-`, `*` operators (always degrade)
//!
//! - Configuration, persistence, and backprop return [`Result`].
//!   - [`NetworkBuilder::build`], [`NeuralNetwork::load`], [`NeuralNetwork::backward`]
//!
//! # Data layout and shapes
//!
//! - Element types are generic: any [`linalg::Scalar`] for the containers, any
//!   [`linalg::Real`] (`f32`, `f64`) for the network.
//! - Matrices are row-major. Layer `k` has weights of shape
//!   `(layers[k + 1], layers[k])` and biases of length `layers[k + 1]`.
//! - Meshes are flattened to stacked columns: all x, then all y, then all z.
//!
//! # Quick start
//!
//! ```rust
//! use femur_mlp::{NeuralNetwork, Vector};
//!
//! # fn main() -> femur_mlp::Result<()> {
//! let xs: Vec<Vector<f64>> = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]
//!     .iter()
//!     .map(|x| Vector::from_vec(x.to_vec()))
//!     .collect();
//! let ys: Vec<Vector<f64>> = [0.0, 1.0, 1.0, 0.0]
//!     .iter()
//!     .map(|&y| Vector::from_vec(vec![y]))
//!     .collect();
//!
//! let mut net = NeuralNetwork::new(&[2, 4, 1], 0.5)?;
//! let losses = net.train(&xs, &ys, 2000, false)?;
//! assert!(losses[losses.len() - 1] < losses[0]);
//!
//! let restored = NeuralNetwork::from_token_str(&net.to_token_string())?;
//! assert_eq!(restored.predict(&xs[1])?, net.predict(&xs[1])?);
//! # Ok(())
//! # }
//! ```
//!
//! # Custom training loops
//!
//! [`NeuralNetwork::backward`] is forward pass + [`NeuralNetwork::gradients`] +
//! [`NeuralNetwork::apply_gradients`]. The pieces are public, so gradients can be
//! inspected before they are applied:
//!
//! ```rust
//! use femur_mlp::{NetworkBuilder, NeuralNetwork, Vector};
//!
//! # fn main() -> femur_mlp::Result<()> {
//! let mut net: NeuralNetwork<f32> = NetworkBuilder::new(3)?
//!     .add_layer(8)?
//!     .add_layer(3)?
//!     .learning_rate(0.2)?
//!     .build()?;
//!
//! let x = Vector::from_vec(vec![0.1_f32, -0.2, 0.3]);
//! let trace = net.forward_trace(&x)?;
//! let grads = net.gradients(&trace, &x)?;
//! assert_eq!(grads.d_weights(0).shape(), (8, 3));
//! net.apply_gradients(&grads)?;
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod data;
pub mod error;
pub mod linalg;
pub mod loss;
pub mod mesh;
pub mod model_file;
pub mod network;
pub mod train;

#[cfg(feature = "serde")]
pub mod serde_model;

pub use activation::{Activation, ActivationFunction, Sigmoid};
pub use builder::{InitStream, NetworkBuilder};
pub use data::Dataset;
pub use error::{Checked, Degraded, Error, Fallback, Result};
pub use linalg::{Matrix, SquareMatrix, Vector};
pub use loss::{Loss, LossFunction, MeanSquaredError};
pub use mesh::ObjMesh;
pub use model_file::{LayerSnapshot, ModelSnapshot};
pub use network::{ForwardTrace, Gradients, NeuralNetwork};
pub use train::{FitConfig, FitReport};
