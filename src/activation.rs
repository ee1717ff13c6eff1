//! Activation functions.
//!
//! A layer computes a pre-activation `z = W a + b` and then applies an activation
//! element-wise: `a' = activation(z)`.
//!
//! Derivatives are evaluated at the *pre-activation* value `z`, so implementations
//! recompute the activation internally instead of assuming the caller already
//! applied it.

use crate::linalg::{Real, Vector};
use crate::{Error, Result};

/// An element-wise activation and its derivative.
pub trait ActivationFunction<T: Real> {
    /// Identifier written to model files.
    fn name(&self) -> &'static str;

    fn apply(&self, x: T) -> T;

    /// `d apply / dx`, evaluated at the pre-activation value `x`.
    fn derivative(&self, x: T) -> T;

    fn apply_vec(&self, z: &Vector<T>) -> Vector<T> {
        z.map(|x| self.apply(x))
    }

    fn derivative_vec(&self, z: &Vector<T>) -> Vector<T> {
        z.map(|x| self.derivative(x))
    }

    fn apply_all(&self, zs: &[Vector<T>]) -> Vec<Vector<T>> {
        zs.iter().map(|z| self.apply_vec(z)).collect()
    }

    fn derivative_all(&self, zs: &[Vector<T>]) -> Vec<Vector<T>> {
        zs.iter().map(|z| self.derivative_vec(z)).collect()
    }
}

/// Logistic sigmoid `1 / (1 + e^-x)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sigmoid;

impl Sigmoid {
    pub const NAME: &'static str = "sigmoid";
}

impl<T: Real> ActivationFunction<T> for Sigmoid {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[inline]
    fn apply(&self, x: T) -> T {
        sigmoid(x)
    }

    #[inline]
    fn derivative(&self, x: T) -> T {
        let s = sigmoid(x);
        s * (T::one() - s)
    }
}

/// Activation selected by a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    Sigmoid,
}

impl Activation {
    pub const fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => Sigmoid::NAME,
        }
    }

    /// Parse a persisted identifier.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            Sigmoid::NAME => Ok(Activation::Sigmoid),
            other => Err(Error::MalformedModel(format!(
                "unknown activation function {other:?}"
            ))),
        }
    }
}

impl<T: Real> ActivationFunction<T> for Activation {
    fn name(&self) -> &'static str {
        Activation::name(*self)
    }

    #[inline]
    fn apply(&self, x: T) -> T {
        match self {
            Activation::Sigmoid => ActivationFunction::<T>::apply(&Sigmoid, x),
        }
    }

    #[inline]
    fn derivative(&self, x: T) -> T {
        match self {
            Activation::Sigmoid => ActivationFunction::<T>::derivative(&Sigmoid, x),
        }
    }
}

#[inline]
fn sigmoid<T: Real>(x: T) -> T {
    // Numerically stable sigmoid.
    if x >= T::zero() {
        let z = (-x).exp();
        T::one() / (T::one() + z)
    } else {
        let z = x.exp();
        z / (T::one() + z)
    }
}
