use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, Sub};

use crate::linalg::{Scalar, Vector};
use crate::{Checked, Degraded, Error, Fallback, Result};

/// Fixed-shape 2-D container, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> Matrix<T> {
    /// Shape invariant `data.len() == rows * cols` is the caller's responsibility.
    #[inline]
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major element buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn check_index(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::IndexOutOfBounds(format!(
                "element ({row}, {col}) for matrix of shape ({}, {})",
                self.rows, self.cols
            )));
        }
        Ok(())
    }
}

impl<T: Scalar> Matrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_parts(rows, cols, vec![T::zero(); rows * cols])
    }

    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_parts(rows, cols, vec![value; rows * cols])
    }

    /// Build from a row-major buffer.
    pub fn from_shape_vec(shape: (usize, usize), data: Vec<T>) -> Result<Self> {
        let (rows, cols) = shape;
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            Error::DimensionMismatch(format!("matrix shape ({rows}, {cols}) overflows"))
        })?;
        if data.len() != expected {
            return Err(Error::DimensionMismatch(format!(
                "buffer of length {} does not fit shape ({rows}, {cols})",
                data.len()
            )));
        }
        Ok(Self::from_parts(rows, cols, data))
    }

    /// True iff every element compares equal to zero (exact comparison).
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|v| *v == T::zero())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.check_index(row, col)?;
        Ok(self.data[self.offset(row, col)])
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        self.check_index(row, col)?;
        let idx = self.offset(row, col);
        self.data[idx] = value;
        Ok(())
    }

    /// Copy of row `row`. Out of range degrades to a zero vector of length `cols`.
    pub fn row(&self, row: usize) -> Checked<Vector<T>> {
        if row >= self.rows {
            return Err(Degraded::new(
                Error::IndexOutOfBounds(format!("row {row} of {}", self.rows)),
                Vector::zeros(self.cols),
            ));
        }
        let start = self.offset(row, 0);
        Ok(Vector::from_vec(self.data[start..start + self.cols].to_vec()))
    }

    /// Copy of column `col`. Out of range degrades to a zero vector of length `rows`.
    pub fn col(&self, col: usize) -> Checked<Vector<T>> {
        if col >= self.cols {
            return Err(Degraded::new(
                Error::IndexOutOfBounds(format!("column {col} of {}", self.cols)),
                Vector::zeros(self.rows),
            ));
        }
        Ok((0..self.rows)
            .map(|r| self.data[self.offset(r, col)])
            .collect())
    }

    /// Overwrite row `row`; `values.len()` must equal `cols`.
    pub fn set_row(&mut self, row: usize, values: &Vector<T>) -> Result<()> {
        if row >= self.rows {
            return Err(Error::IndexOutOfBounds(format!("row {row} of {}", self.rows)));
        }
        if values.len() != self.cols {
            return Err(Error::DimensionMismatch(format!(
                "row of length {} for matrix with {} columns",
                values.len(),
                self.cols
            )));
        }
        let start = self.offset(row, 0);
        self.data[start..start + self.cols].copy_from_slice(values.as_slice());
        Ok(())
    }

    /// Overwrite column `col`; `values.len()` must equal `rows`.
    pub fn set_col(&mut self, col: usize, values: &Vector<T>) -> Result<()> {
        if col >= self.cols {
            return Err(Error::IndexOutOfBounds(format!(
                "column {col} of {}",
                self.cols
            )));
        }
        if values.len() != self.rows {
            return Err(Error::DimensionMismatch(format!(
                "column of length {} for matrix with {} rows",
                values.len(),
                self.rows
            )));
        }
        for (r, &v) in values.iter().enumerate() {
            let idx = self.offset(r, col);
            self.data[idx] = v;
        }
        Ok(())
    }

    pub fn map<U: Scalar, F: FnMut(T) -> U>(&self, mut f: F) -> Matrix<U> {
        Matrix::from_parts(self.rows, self.cols, self.data.iter().map(|&v| f(v)).collect())
    }

    pub fn scale(&self, scalar: T) -> Self {
        self.map(|v| v * scalar)
    }

    /// Element-wise sum. On shape mismatch degrades to `self` unchanged.
    pub fn checked_add(&self, other: &Self) -> Checked<Self> {
        self.zip_checked(other, "addition", |a, b| a + b)
    }

    /// Element-wise difference. On shape mismatch degrades to `self` unchanged.
    pub fn checked_sub(&self, other: &Self) -> Checked<Self> {
        self.zip_checked(other, "subtraction", |a, b| a - b)
    }

    /// Matrix product `self · other`.
    ///
    /// Requires `self.cols() == other.rows()`; otherwise degrades to an empty
    /// `(0, 0)` matrix.
    pub fn checked_matmul(&self, other: &Self) -> Checked<Self> {
        if self.cols != other.rows {
            return Err(Degraded::new(
                Error::DimensionMismatch(format!(
                    "matrix product of ({}, {}) and ({}, {})",
                    self.rows, self.cols, other.rows, other.cols
                )),
                Self::zeros(0, 0),
            ));
        }

        let (m, k, n) = (self.rows, self.cols, other.cols);
        let mut out = Self::zeros(m, n);
        for i in 0..m {
            let a_row = &self.data[i * k..(i + 1) * k];
            for j in 0..n {
                let mut acc = T::zero();
                for p in 0..k {
                    acc = acc + a_row[p] * other.data[p * n + j];
                }
                out.data[i * n + j] = acc;
            }
        }
        Ok(out)
    }

    /// Matrix-vector product `self · vec`.
    ///
    /// Requires `self.cols() == vec.len()`; otherwise degrades to a zero vector
    /// of length `rows`.
    pub fn checked_mul_vec(&self, vec: &Vector<T>) -> Checked<Vector<T>> {
        if self.cols != vec.len() {
            return Err(Degraded::new(
                Error::DimensionMismatch(format!(
                    "matrix ({}, {}) times vector of length {}",
                    self.rows,
                    self.cols,
                    vec.len()
                )),
                Vector::zeros(self.rows),
            ));
        }

        let x = vec.as_slice();
        Ok((0..self.rows)
            .map(|r| {
                let row = &self.data[r * self.cols..(r + 1) * self.cols];
                row.iter()
                    .zip(x)
                    .fold(T::zero(), |acc, (&w, &xi)| acc + w * xi)
            })
            .collect())
    }

    /// New `(cols, rows)` matrix; `self` is untouched.
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                data.push(self.data[self.offset(r, c)]);
            }
        }
        Self::from_parts(self.cols, self.rows, data)
    }

    fn zip_checked<F: Fn(T, T) -> T>(&self, other: &Self, op: &str, f: F) -> Checked<Self> {
        if self.shape() != other.shape() {
            return Err(Degraded::new(
                Error::DimensionMismatch(format!(
                    "matrix {op} requires equal shapes, got ({}, {}) and ({}, {})",
                    self.rows, self.cols, other.rows, other.cols
                )),
                self.clone(),
            ));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self::from_parts(self.rows, self.cols, data))
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    /// Panics if the index is out of range.
    #[inline]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        assert!(
            index.0 < self.rows && index.1 < self.cols,
            "index ({}, {}) out of bounds for shape ({}, {})",
            index.0,
            index.1,
            self.rows,
            self.cols
        );
        &self.data[self.offset(index.0, index.1)]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        assert!(
            index.0 < self.rows && index.1 < self.cols,
            "index ({}, {}) out of bounds for shape ({}, {})",
            index.0,
            index.1,
            self.rows,
            self.cols
        );
        let offset = self.offset(index.0, index.1);
        &mut self.data[offset]
    }
}

impl<T: Scalar> Add<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn add(self, rhs: &Matrix<T>) -> Self::Output {
        self.checked_add(rhs).or_fallback()
    }
}

impl<T: Scalar> Sub<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn sub(self, rhs: &Matrix<T>) -> Self::Output {
        self.checked_sub(rhs).or_fallback()
    }
}

impl<T: Scalar> Mul<&Matrix<T>> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: &Matrix<T>) -> Self::Output {
        self.checked_matmul(rhs).or_fallback()
    }
}

impl<T: Scalar> Mul<&Vector<T>> for &Matrix<T> {
    type Output = Vector<T>;

    fn mul(self, rhs: &Vector<T>) -> Self::Output {
        self.checked_mul_vec(rhs).or_fallback()
    }
}

impl<T: Scalar> Mul<T> for &Matrix<T> {
    type Output = Matrix<T>;

    fn mul(self, rhs: T) -> Self::Output {
        self.scale(rhs)
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for r in 0..self.rows {
            write!(f, "[")?;
            for c in 0..self.cols {
                write!(f, "{}", self.data[self.offset(r, c)])?;
                if c + 1 != self.cols {
                    write!(f, ", ")?;
                }
            }
            write!(f, "]")?;
            if r + 1 != self.rows {
                write!(f, ",\n ")?;
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: usize, cols: usize, data: &[i64]) -> Matrix<i64> {
        Matrix::from_shape_vec((rows, cols), data.to_vec()).unwrap()
    }

    #[test]
    fn from_shape_vec_validates_length() {
        assert!(Matrix::from_shape_vec((2, 2), vec![1, 2, 3, 4]).is_ok());
        let err = Matrix::from_shape_vec((2, 2), vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch(_)));
    }

    #[test]
    fn zero_and_filled_construction() {
        let z: Matrix<f32> = Matrix::zeros(3, 2);
        assert_eq!(z.shape(), (3, 2));
        assert!(z.is_zero());

        let f = Matrix::filled(2, 3, 1.0_f32);
        assert!(!f.is_zero());
        assert_ne!(z, f);
        assert_eq!(f.clone(), f);
    }

    #[test]
    fn rows_and_columns_round_trip() {
        let mut a = m(2, 3, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(a.row(1).unwrap().as_slice(), &[4, 5, 6]);
        assert_eq!(a.col(2).unwrap().as_slice(), &[3, 6]);

        a.set_row(0, &Vector::from_vec(vec![7, 8, 9])).unwrap();
        a.set_col(1, &Vector::from_vec(vec![0, 0])).unwrap();
        assert_eq!(a.as_slice(), &[7, 0, 9, 4, 0, 6]);
    }

    #[test]
    fn out_of_range_row_or_col_degrades_to_other_dimension() {
        let a = m(2, 3, &[1, 2, 3, 4, 5, 6]);

        let err = a.row(2).unwrap_err();
        assert!(matches!(err.error(), Error::IndexOutOfBounds(_)));
        assert_eq!(err.fallback(), &Vector::zeros(3));

        let err = a.col(3).unwrap_err();
        assert!(matches!(err.error(), Error::IndexOutOfBounds(_)));
        assert_eq!(err.fallback(), &Vector::zeros(2));
    }

    #[test]
    fn set_row_and_col_reject_wrong_lengths() {
        let mut a = m(2, 2, &[1, 2, 3, 4]);
        let err = a.set_row(0, &Vector::from_vec(vec![1, 2, 3])).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch(_)));
        let err = a.set_col(5, &Vector::from_vec(vec![1, 2])).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds(_)));
        assert_eq!(a.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn element_access_is_bounds_checked() {
        let mut a: Matrix<f64> = Matrix::zeros(2, 2);
        assert!(a.set(1, 1, 3.5).is_ok());
        assert_eq!(a.get(1, 1), Ok(3.5));
        assert_eq!(a[(1, 1)], 3.5);
        assert!(matches!(a.set(2, 0, 1.0), Err(Error::IndexOutOfBounds(_))));
        assert!(matches!(a.get(0, 2), Err(Error::IndexOutOfBounds(_))));
    }

    #[test]
    #[should_panic]
    fn index_operator_panics_out_of_range() {
        let a: Matrix<f64> = Matrix::zeros(2, 2);
        let _ = a[(0, 2)];
    }

    #[test]
    fn elementwise_and_scalar_arithmetic() {
        let g = m(2, 2, &[1, 2, 3, 4]);
        let h = &g * 2;
        assert_eq!(h.as_slice(), &[2, 4, 6, 8]);
        let i = &h + &g;
        assert_eq!(i.as_slice(), &[3, 6, 9, 12]);
        let j = &i - &g;
        assert_eq!(j, h);
    }

    #[test]
    fn add_and_sub_mismatch_degrade_to_left_operand() {
        let a = m(2, 2, &[1, 2, 3, 4]);
        let b = m(2, 3, &[1, 1, 1, 1, 1, 1]);

        let err = a.checked_add(&b).unwrap_err();
        assert!(matches!(err.error(), Error::DimensionMismatch(_)));
        assert_eq!(err.fallback(), &a);

        let err = a.checked_sub(&b).unwrap_err();
        assert_eq!(err.into_fallback(), a);

        assert_eq!(&a + &b, a);
        assert_eq!(&a - &b, a);
    }

    #[test]
    fn matmul_matches_hand_computation() {
        let g = m(2, 2, &[1, 2, 3, 4]);
        let j = m(2, 2, &[2, 4, 6, 8]);
        assert_eq!((&g * &j).as_slice(), &[14, 20, 30, 44]);

        let a = m(2, 3, &[1, 2, 3, 4, 5, 6]);
        let b = m(3, 1, &[1, 0, -1]);
        let c = a.checked_matmul(&b).unwrap();
        assert_eq!(c.shape(), (2, 1));
        assert_eq!(c.as_slice(), &[-2, -2]);
    }

    #[test]
    fn matmul_mismatch_degrades_to_empty_matrix() {
        let a = m(2, 3, &[1, 2, 3, 4, 5, 6]);
        let b = m(2, 2, &[1, 2, 3, 4]);
        let err = a.checked_matmul(&b).unwrap_err();
        assert!(matches!(err.error(), Error::DimensionMismatch(_)));
        assert_eq!(err.fallback().shape(), (0, 0));
        assert_eq!((&a * &b).shape(), (0, 0));
    }

    #[test]
    fn matrix_vector_product() {
        let g = m(2, 2, &[1, 2, 3, 4]);
        let v = Vector::from_vec(vec![1, 2]);
        assert_eq!((&g * &v).as_slice(), &[5, 11]);
    }

    #[test]
    fn matrix_vector_mismatch_degrades_to_zero_vector_of_row_count() {
        let a = m(3, 2, &[1, 2, 3, 4, 5, 6]);
        let v = Vector::from_vec(vec![1, 2, 3]);
        let err = a.checked_mul_vec(&v).unwrap_err();
        assert!(matches!(err.error(), Error::DimensionMismatch(_)));
        assert_eq!(err.fallback(), &Vector::zeros(3));
        assert_eq!(&a * &v, Vector::zeros(3));
    }

    #[test]
    fn transpose_swaps_shape_without_touching_source() {
        let a = m(2, 3, &[1, 2, 3, 4, 5, 6]);
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.as_slice(), &[1, 4, 2, 5, 3, 6]);
        assert_eq!(a.as_slice(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn display_nests_rows() {
        let a = m(2, 2, &[1, 2, 3, 4]);
        assert_eq!(a.to_string(), "[[1, 2],\n [3, 4]]");
    }
}
