use std::ops::Deref;

use crate::linalg::{Matrix, Scalar, Vector};
use crate::{Error, Result};

/// A [`Matrix`] whose row and column counts are equal.
///
/// Squareness is checked once at construction. Read access goes through
/// `Deref<Target = Matrix<T>>`. There is no `DerefMut`: the inner matrix is only
/// mutated through the shape-preserving setters below.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix<T> {
    inner: Matrix<T>,
}

impl<T: Scalar> SquareMatrix<T> {
    pub fn new(size: usize) -> Self {
        Self {
            inner: Matrix::zeros(size, size),
        }
    }

    pub fn filled(size: usize, value: T) -> Self {
        Self {
            inner: Matrix::filled(size, size, value),
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut inner = Matrix::zeros(size, size);
        for i in 0..size {
            inner[(i, i)] = T::one();
        }
        Self { inner }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.inner.rows()
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        self.inner.set(row, col, value)
    }

    pub fn set_row(&mut self, row: usize, values: &Vector<T>) -> Result<()> {
        self.inner.set_row(row, values)
    }

    pub fn set_col(&mut self, col: usize, values: &Vector<T>) -> Result<()> {
        self.inner.set_col(col, values)
    }

    #[inline]
    pub fn as_matrix(&self) -> &Matrix<T> {
        &self.inner
    }

    #[inline]
    pub fn into_inner(self) -> Matrix<T> {
        self.inner
    }
}

impl<T> Deref for SquareMatrix<T> {
    type Target = Matrix<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: Scalar> TryFrom<Matrix<T>> for SquareMatrix<T> {
    type Error = Error;

    fn try_from(value: Matrix<T>) -> std::result::Result<Self, Self::Error> {
        if value.rows() != value.cols() {
            return Err(Error::DimensionMismatch(format!(
                "square matrix requires rows == cols, got ({}, {})",
                value.rows(),
                value.cols()
            )));
        }
        Ok(Self { inner: value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_are_square() {
        let d: SquareMatrix<f32> = SquareMatrix::new(2);
        assert_eq!(d.shape(), (2, 2));
        assert!(d.is_zero());

        let e = SquareMatrix::filled(2, 5.0_f32);
        assert_eq!(e.size(), 2);
        assert_eq!(e.as_slice(), &[5.0, 5.0, 5.0, 5.0]);
        assert_eq!(e.clone(), e);
    }

    #[test]
    fn try_from_rejects_rectangular_matrices() {
        let rect: Matrix<i32> = Matrix::zeros(2, 3);
        let err = SquareMatrix::try_from(rect).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch(_)));

        let sq: Matrix<i32> = Matrix::filled(3, 3, 1);
        assert_eq!(SquareMatrix::try_from(sq).unwrap().size(), 3);
    }

    #[test]
    fn identity_is_neutral_for_matmul() {
        let a = Matrix::from_shape_vec((2, 2), vec![1, 2, 3, 4]).unwrap();
        let id = SquareMatrix::identity(2);
        assert_eq!(a.checked_matmul(&id).unwrap(), a);
        assert_eq!(id.checked_matmul(&a).unwrap(), a);
    }

    #[test]
    fn setters_keep_shape() {
        let mut s = SquareMatrix::new(2);
        s.set(0, 1, 7).unwrap();
        s.set_row(1, &Vector::from_vec(vec![1, 2])).unwrap();
        assert!(s.set_col(0, &Vector::from_vec(vec![1, 2, 3])).is_err());
        assert_eq!(s.as_slice(), &[0, 7, 1, 2]);
        assert_eq!(s.into_inner().shape(), (2, 2));
    }
}
