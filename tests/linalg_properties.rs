use approx::assert_relative_eq;
use femur_mlp::{Error, Fallback, Matrix, SquareMatrix, Vector};

fn m(rows: usize, cols: usize, data: &[i64]) -> Matrix<i64> {
    Matrix::from_shape_vec((rows, cols), data.to_vec()).unwrap()
}

#[test]
fn add_then_subtract_is_identity() {
    let a = Vector::from_vec(vec![1.5_f64, -2.0, 3.25]);
    let b = Vector::from_vec(vec![0.5_f64, 4.0, -1.0]);
    assert_eq!(&(&a + &b) - &b, a);

    let ma = m(2, 2, &[1, 2, 3, 4]);
    let mb = m(2, 2, &[-5, 6, 7, 0]);
    assert_eq!(&(&ma + &mb) - &mb, ma);
}

#[test]
fn matmul_is_associative() {
    let a = m(2, 3, &[1, 2, 3, 4, 5, 6]);
    let b = m(3, 2, &[7, 8, 9, 10, 11, 12]);
    let c = m(2, 2, &[1, -1, 2, 0]);

    let left = a.checked_matmul(&b).unwrap().checked_matmul(&c).unwrap();
    let right = a.checked_matmul(&b.checked_matmul(&c).unwrap()).unwrap();
    assert_eq!(left, right);
    assert_eq!(&(&a * &b) * &c, left);
}

#[test]
fn float_add_then_subtract_is_identity_within_tolerance() {
    let a = Vector::from_vec(vec![0.1_f64, 0.7, -0.3, 1e-3]);
    let b = Vector::from_vec(vec![0.2_f64, 0.9, 0.6, 3.3]);
    let back = &(&a + &b) - &b;
    assert_eq!(back.len(), a.len());
    for (x, y) in back.iter().zip(a.iter()) {
        assert_relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-12);
    }

    let ma = Matrix::from_shape_vec((2, 2), vec![0.1_f64, 0.2, 0.3, 0.7]).unwrap();
    let mb = Matrix::from_shape_vec((2, 2), vec![1.1_f64, -0.9, 2.3, 0.01]).unwrap();
    let back = &(&ma + &mb) - &mb;
    for (x, y) in back.as_slice().iter().zip(ma.as_slice()) {
        assert_relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-12);
    }
}

#[test]
fn float_matmul_is_associative_within_tolerance() {
    let a = Matrix::from_shape_vec((2, 3), vec![0.1_f64, 0.7, -0.3, 1.9, 0.01, 2.2]).unwrap();
    let b = Matrix::from_shape_vec((3, 2), vec![0.3_f64, -1.7, 0.6, 0.11, 4.1, 0.9]).unwrap();
    let c = Matrix::from_shape_vec((2, 2), vec![0.7_f64, 0.1, -0.2, 1.3]).unwrap();

    let left = a.checked_matmul(&b).unwrap().checked_matmul(&c).unwrap();
    let right = a.checked_matmul(&b.checked_matmul(&c).unwrap()).unwrap();
    assert_eq!(left.shape(), right.shape());
    for (x, y) in left.as_slice().iter().zip(right.as_slice()) {
        assert_relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-12);
    }
}

#[test]
fn transpose_twice_is_identity() {
    let a = m(2, 3, &[1, 2, 3, 4, 5, 6]);
    assert_eq!(a.transpose().shape(), (3, 2));
    assert_eq!(a.transpose().transpose(), a);
}

#[test]
fn zero_detection_is_exact() {
    assert!(Vector::<f32>::zeros(4).is_zero());
    assert!(Matrix::<f32>::zeros(2, 3).is_zero());
    assert!(!Vector::from_vec(vec![0.0_f32, 1e-30]).is_zero());
    assert!(!Matrix::filled(1, 1, f32::MIN_POSITIVE).is_zero());
    assert!(Vector::<f64>::zeros(0).is_zero());
    assert!(Matrix::<i32>::zeros(0, 0).is_zero());
}

#[test]
fn matrix_times_vector_matches_hand_computation() {
    let a = m(2, 3, &[1, 2, 3, 4, 5, 6]);
    let x = Vector::from_vec(vec![1, 0, -1]);
    assert_eq!(a.checked_mul_vec(&x).unwrap().as_slice(), &[-2, -2]);
    assert_eq!((&a * &x).as_slice(), &[-2, -2]);
}

#[test]
fn outer_product_shape_and_values() {
    let u = Vector::from_vec(vec![1, 2]);
    let v = Vector::from_vec(vec![3, 4, 5]);
    let o = u.outer(&v);
    assert_eq!(o.shape(), (2, 3));
    assert_eq!(o.as_slice(), &[3, 4, 5, 6, 8, 10]);
}

#[test]
fn vector_addition_mismatch_returns_left_operand() {
    let a = Vector::from_vec(vec![1, 2, 3]);
    let b = Vector::from_vec(vec![1, 2]);
    let err = a.checked_add(&b).unwrap_err();
    assert!(matches!(err.error(), Error::DimensionMismatch(_)));
    assert_eq!(err.fallback(), &a);
    assert_eq!(&a + &b, a);
    assert_eq!(&a - &b, a);
}

#[test]
fn dot_mismatch_returns_zero() {
    let a = Vector::from_vec(vec![1.0_f64, 2.0]);
    let b = Vector::from_vec(vec![1.0_f64]);
    assert_eq!(*a.checked_dot(&b).unwrap_err().fallback(), 0.0);
    assert_eq!(a.dot(&b), 0.0);
    assert_eq!(a.dot(&a), 5.0);
}

#[test]
fn hadamard_mismatch_returns_zero_vector() {
    let a = Vector::from_vec(vec![1, 2, 3]);
    let b = Vector::from_vec(vec![4]);
    assert_eq!(a.hadamard(&b), Vector::zeros(3));
    assert_eq!(a.hadamard(&a).as_slice(), &[1, 4, 9]);
}

#[test]
fn matrix_addition_mismatch_returns_left_operand() {
    let a = m(2, 2, &[1, 2, 3, 4]);
    let b = m(2, 3, &[0; 6]);
    assert_eq!(a.checked_add(&b).unwrap_err().into_fallback(), a);
    assert_eq!(a.checked_sub(&b).or_fallback(), a);
}

#[test]
fn matmul_mismatch_returns_empty_matrix() {
    let a = m(2, 3, &[0; 6]);
    let b = m(2, 3, &[0; 6]);
    let err = a.checked_matmul(&b).unwrap_err();
    assert!(matches!(err.error(), Error::DimensionMismatch(_)));
    assert_eq!(err.fallback().shape(), (0, 0));
    assert_eq!((&a * &b).shape(), (0, 0));
}

#[test]
fn matrix_vector_mismatch_returns_zero_vector_of_row_count() {
    let a = m(2, 3, &[1; 6]);
    let x = Vector::from_vec(vec![1, 1]);
    assert_eq!(a.checked_mul_vec(&x).unwrap_err().into_fallback(), Vector::zeros(2));
    assert_eq!(&a * &x, Vector::zeros(2));
}

#[test]
fn bounds_are_checked() {
    let mut v = Vector::from_vec(vec![1, 2]);
    assert!(matches!(v.get(2), Err(Error::IndexOutOfBounds(_))));
    assert!(v.set(5, 0).is_err());
    assert_eq!(v.get(1), Ok(2));

    let mut a = m(2, 2, &[1, 2, 3, 4]);
    assert!(matches!(a.get(0, 2), Err(Error::IndexOutOfBounds(_))));
    assert!(a.set(2, 0, 9).is_err());
    assert_eq!(a.row(7).unwrap_err().into_fallback(), Vector::zeros(2));
    assert_eq!(a.col(7).or_fallback(), Vector::zeros(2));
    assert!(matches!(
        a.set_row(0, &Vector::zeros(3)),
        Err(Error::DimensionMismatch(_))
    ));
    assert_eq!(a, m(2, 2, &[1, 2, 3, 4]));
}

#[test]
#[should_panic]
fn index_operator_panics_out_of_range() {
    let a = m(2, 2, &[1, 2, 3, 4]);
    let _ = a[(2, 0)];
}

#[test]
fn square_matrix_behaves_like_its_inner_matrix() {
    let id: SquareMatrix<i64> = SquareMatrix::identity(3);
    let a = m(3, 3, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    assert_eq!(id.checked_matmul(&a).unwrap(), a);
    assert_eq!(id.transpose(), *id);
    assert!(SquareMatrix::try_from(m(2, 3, &[0; 6])).is_err());
}

#[test]
fn display_formats() {
    let v = Vector::from_vec(vec![1, 2, 3]);
    assert_eq!(v.to_string(), "[1, 2, 3]");
    let a = m(2, 2, &[1, 2, 3, 4]);
    assert_eq!(a.to_string(), "[[1, 2],\n [3, 4]]");
}
