//! Dataset helpers.
//!
//! Training walks the examples in order, one input/target pair at a time, so a
//! `Dataset` simply owns two equally long lists of [`Vector`]s whose lengths are
//! validated once at construction.

use crate::linalg::{Real, Vector};
use crate::{Error, Result};

/// A supervised dataset: inputs (X) and targets (Y).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<T> {
    inputs: Vec<Vector<T>>,
    targets: Vec<Vector<T>>,
    input_dim: usize,
    target_dim: usize,
}

impl<T: Real> Dataset<T> {
    /// Build a dataset from per-sample rows.
    pub fn from_rows(inputs: Vec<Vector<T>>, targets: Vec<Vector<T>>) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidConfig(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.is_empty() {
            return Err(Error::InvalidConfig("dataset must not be empty".to_owned()));
        }

        let input_dim = uniform_dim("input", &inputs)?;
        let target_dim = uniform_dim("target", &targets)?;

        Ok(Self {
            inputs,
            targets,
            input_dim,
            target_dim,
        })
    }

    /// Autoencoder dataset: every sample is its own target.
    pub fn autoencoder(samples: Vec<Vector<T>>) -> Result<Self> {
        let targets = samples.clone();
        Self::from_rows(samples, targets)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    pub fn inputs(&self) -> &[Vector<T>] {
        &self.inputs
    }

    #[inline]
    pub fn targets(&self) -> &[Vector<T>] {
        &self.targets
    }

    /// Iterate over `(input, target)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Vector<T>, &Vector<T>)> {
        self.inputs.iter().zip(&self.targets)
    }
}

fn uniform_dim<T: Real>(what: &str, rows: &[Vector<T>]) -> Result<usize> {
    let dim = rows.first().map(Vector::len).unwrap_or(0);
    if dim == 0 {
        return Err(Error::InvalidConfig(format!("{what}_dim must be > 0")));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(Error::InvalidConfig(format!(
                "{what} row {i} has len {}, expected {dim}",
                row.len()
            )));
        }
    }
    Ok(dim)
}
