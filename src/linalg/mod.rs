//! Dense linear algebra.
//!
//! `Vector`, `Matrix`, and `SquareMatrix` are small row-major containers over any
//! [`Scalar`] element type (integers included). Shapes are fixed at construction.
//!
//! Arithmetic that can fail on incompatible shapes comes in two flavors:
//!
//! - `checked_*` methods returning [`crate::Checked`], which carries the
//!   `DimensionMismatch` error and the operation's fallback value;
//! - `std::ops` operators on the same types, which log the error and return the
//!   fallback (see [`crate::Fallback`]).
//!
//! Element access is always bounds-checked: `get`/`set` report
//! `IndexOutOfBounds`, while the `Index`/`IndexMut` operators are the fast path
//! and panic on an out-of-range index.

use std::fmt;
use std::str::FromStr;

use num_traits::{Float, Num};

pub mod matrix;
pub mod square;
pub mod vector;

pub use matrix::Matrix;
pub use square::SquareMatrix;
pub use vector::Vector;

/// Element type accepted by the linear algebra containers.
pub trait Scalar: Copy + PartialEq + fmt::Debug + Num {}

impl<T> Scalar for T where T: Copy + PartialEq + fmt::Debug + Num {}

/// Floating-point element type used by activations, losses, and the network.
pub trait Real: Scalar + Float + fmt::Display + FromStr {}

impl<T> Real for T where T: Scalar + Float + fmt::Display + FromStr {}

/// Converts a count into `T`. Float casts from `usize` only round, they never fail.
#[inline]
pub(crate) fn real_from_usize<T: Real>(n: usize) -> T {
    T::from(n).unwrap_or_else(T::max_value)
}
