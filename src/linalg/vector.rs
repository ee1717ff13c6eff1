use std::fmt;
use std::iter::FromIterator;
use std::ops::{Add, Index, IndexMut, Mul, Sub};
use std::slice::Iter;

use crate::linalg::{Matrix, Scalar};
use crate::{Checked, Degraded, Error, Fallback, Result};

/// Fixed-length 1-D container.
///
/// The length is set at construction and never changes. Equality is exact:
/// same length and every element `==`.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T> {
    data: Vec<T>,
}

impl<T: Scalar> Vector<T> {
    /// Zero-filled vector of length `len`.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![T::zero(); len],
        }
    }

    /// Vector of length `len` with every element set to `value`.
    pub fn filled(len: usize, value: T) -> Self {
        Self {
            data: vec![value; len],
        }
    }

    /// Vector of length `len` initialized from `values`.
    ///
    /// Missing trailing elements stay zero; extra values are ignored.
    pub fn from_values(len: usize, values: &[T]) -> Self {
        let mut v = Self::zeros(len);
        for (dst, &src) in v.data.iter_mut().zip(values) {
            *dst = src;
        }
        v
    }

    /// Takes ownership of `data`; the vector length is `data.len()`.
    #[inline]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        self.data.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }

    /// True iff every element compares equal to zero (exact comparison).
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|v| *v == T::zero())
    }

    pub fn get(&self, idx: usize) -> Result<T> {
        self.data.get(idx).copied().ok_or_else(|| {
            Error::IndexOutOfBounds(format!(
                "index {idx} for vector of length {}",
                self.len()
            ))
        })
    }

    pub fn set(&mut self, idx: usize, value: T) -> Result<()> {
        let len = self.len();
        match self.data.get_mut(idx) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds(format!(
                "index {idx} for vector of length {len}"
            ))),
        }
    }

    pub fn map<U: Scalar, F: FnMut(T) -> U>(&self, mut f: F) -> Vector<U> {
        Vector::from_vec(self.data.iter().map(|&v| f(v)).collect())
    }

    /// Element-wise multiplication by `scalar`.
    pub fn scale(&self, scalar: T) -> Self {
        self.map(|v| v * scalar)
    }

    /// Element-wise sum. On length mismatch degrades to `self` unchanged.
    pub fn checked_add(&self, other: &Self) -> Checked<Self> {
        self.zip_checked(other, "addition", |a, b| a + b)
    }

    /// Element-wise difference. On length mismatch degrades to `self` unchanged.
    pub fn checked_sub(&self, other: &Self) -> Checked<Self> {
        self.zip_checked(other, "subtraction", |a, b| a - b)
    }

    /// Dot product. On length mismatch degrades to zero.
    pub fn checked_dot(&self, other: &Self) -> Checked<T> {
        if let Err(e) = self.check_same_len(other, "dot product") {
            return Err(Degraded::new(e, T::zero()));
        }
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b))
    }

    /// Element-wise (Hadamard) product. On length mismatch degrades to a zero
    /// vector of `self.len()`.
    pub fn checked_hadamard(&self, other: &Self) -> Checked<Self> {
        if let Err(e) = self.check_same_len(other, "hadamard product") {
            return Err(Degraded::new(e, Self::zeros(self.len())));
        }
        Ok(self.zip_with(other, |a, b| a * b))
    }

    /// See [`Vector::checked_dot`]; logs and returns zero on mismatch.
    pub fn dot(&self, other: &Self) -> T {
        self.checked_dot(other).or_fallback()
    }

    /// See [`Vector::checked_hadamard`]; logs and returns a zero vector on mismatch.
    pub fn hadamard(&self, other: &Self) -> Self {
        self.checked_hadamard(other).or_fallback()
    }

    /// Outer product `self ⊗ other`, shape `(self.len(), other.len())`.
    pub fn outer(&self, other: &Self) -> Matrix<T> {
        let mut data = Vec::with_capacity(self.len() * other.len());
        for &a in &self.data {
            for &b in &other.data {
                data.push(a * b);
            }
        }
        Matrix::from_parts(self.len(), other.len(), data)
    }

    fn check_same_len(&self, other: &Self, op: &str) -> Result<()> {
        if self.len() != other.len() {
            return Err(Error::DimensionMismatch(format!(
                "vector {op} requires equal lengths, got {} and {}",
                self.len(),
                other.len()
            )));
        }
        Ok(())
    }

    fn zip_with<F: Fn(T, T) -> T>(&self, other: &Self, f: F) -> Self {
        Self::from_vec(
            self.data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        )
    }

    fn zip_checked<F: Fn(T, T) -> T>(&self, other: &Self, op: &str, f: F) -> Checked<Self> {
        match self.check_same_len(other, op) {
            Ok(()) => Ok(self.zip_with(other, f)),
            Err(e) => Err(Degraded::new(e, self.clone())),
        }
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vector<T>> for Vec<T> {
    fn from(value: Vector<T>) -> Self {
        value.data
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T: Scalar> Add<&Vector<T>> for &Vector<T> {
    type Output = Vector<T>;

    fn add(self, rhs: &Vector<T>) -> Self::Output {
        self.checked_add(rhs).or_fallback()
    }
}

impl<T: Scalar> Add for Vector<T> {
    type Output = Vector<T>;

    fn add(self, rhs: Vector<T>) -> Self::Output {
        &self + &rhs
    }
}

impl<T: Scalar> Sub<&Vector<T>> for &Vector<T> {
    type Output = Vector<T>;

    fn sub(self, rhs: &Vector<T>) -> Self::Output {
        self.checked_sub(rhs).or_fallback()
    }
}

impl<T: Scalar> Sub for Vector<T> {
    type Output = Vector<T>;

    fn sub(self, rhs: Vector<T>) -> Self::Output {
        &self - &rhs
    }
}

impl<T: Scalar> Mul<T> for &Vector<T> {
    type Output = Vector<T>;

    fn mul(self, rhs: T) -> Self::Output {
        self.scale(rhs)
    }
}

impl<T: Scalar> Mul<T> for Vector<T> {
    type Output = Vector<T>;

    fn mul(self, rhs: T) -> Self::Output {
        self.scale(rhs)
    }
}

impl<T: fmt::Display> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, value) in self.data.iter().enumerate() {
            write!(f, "{value}")?;
            if idx + 1 != self.data.len() {
                write!(f, ", ")?;
            }
        }
        write!(f, "]")
    }
}
