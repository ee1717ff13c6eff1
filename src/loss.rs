//! Loss functions.
//!
//! Used by backprop like:
//!
//! - run the forward pass to get a prediction `ŷ`
//! - compute the example loss `L(ŷ, y)` and its gradient `dL/dŷ`
//! - feed `dL/dŷ` into the output-layer error term

use crate::linalg::{Real, Vector, real_from_usize};
use crate::{Checked, Degraded, Error, Result};

/// A vector-wise loss and its gradient w.r.t. the prediction.
pub trait LossFunction<T: Real> {
    /// Identifier written to model files.
    fn name(&self) -> &'static str;

    /// Loss value. Degrades to zero when the lengths differ.
    fn loss(&self, predicted: &Vector<T>, target: &Vector<T>) -> Checked<T>;

    /// `dL/d(predicted)`. Degrades to a zero vector of `predicted.len()` when the
    /// lengths differ.
    fn derivative(&self, predicted: &Vector<T>, target: &Vector<T>) -> Checked<Vector<T>>;
}

/// Mean squared error `L = (1/n) Σ (ŷᵢ - yᵢ)²`, gradient `2(ŷᵢ - yᵢ)/n`.
///
/// Empty vectors have zero loss and an empty gradient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanSquaredError;

impl MeanSquaredError {
    pub const NAME: &'static str = "meanSquaredError";
}

fn check_lengths<T: Real>(predicted: &Vector<T>, target: &Vector<T>) -> Result<()> {
    if predicted.len() != target.len() {
        return Err(Error::DimensionMismatch(format!(
            "prediction length {} does not match target length {}",
            predicted.len(),
            target.len()
        )));
    }
    Ok(())
}

impl<T: Real> LossFunction<T> for MeanSquaredError {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn loss(&self, predicted: &Vector<T>, target: &Vector<T>) -> Checked<T> {
        if let Err(e) = check_lengths(predicted, target) {
            return Err(Degraded::new(e, T::zero()));
        }
        if predicted.is_empty() {
            return Ok(T::zero());
        }

        let sum_sq = predicted
            .iter()
            .zip(target.iter())
            .fold(T::zero(), |acc, (&p, &t)| {
                let diff = p - t;
                diff.mul_add(diff, acc)
            });
        Ok(sum_sq / real_from_usize(predicted.len()))
    }

    fn derivative(&self, predicted: &Vector<T>, target: &Vector<T>) -> Checked<Vector<T>> {
        if let Err(e) = check_lengths(predicted, target) {
            return Err(Degraded::new(e, Vector::zeros(predicted.len())));
        }

        let n: T = real_from_usize(predicted.len());
        let two = T::one() + T::one();
        Ok(predicted
            .iter()
            .zip(target.iter())
            .map(|(&p, &t)| two * (p - t) / n)
            .collect())
    }
}

/// Loss selected by a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Loss {
    #[default]
    MeanSquaredError,
}

impl Loss {
    pub const fn name(self) -> &'static str {
        match self {
            Loss::MeanSquaredError => MeanSquaredError::NAME,
        }
    }

    /// Parse a persisted identifier.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            MeanSquaredError::NAME => Ok(Loss::MeanSquaredError),
            other => Err(Error::MalformedModel(format!(
                "unknown loss function {other:?}"
            ))),
        }
    }
}

impl<T: Real> LossFunction<T> for Loss {
    fn name(&self) -> &'static str {
        Loss::name(*self)
    }

    fn loss(&self, predicted: &Vector<T>, target: &Vector<T>) -> Checked<T> {
        match self {
            Loss::MeanSquaredError => MeanSquaredError.loss(predicted, target),
        }
    }

    fn derivative(&self, predicted: &Vector<T>, target: &Vector<T>) -> Checked<Vector<T>> {
        match self {
            Loss::MeanSquaredError => MeanSquaredError.derivative(predicted, target),
        }
    }
}
