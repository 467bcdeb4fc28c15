use approx::abs_diff_eq;

use crate::tensor::Tensor;
use crate::types::Numeric;

/// Checks if two tensors are approximately equal (shape and data within tolerance).
/// Panics if shapes differ or data differs significantly.
///
/// NaN in `expected_data` only matches NaN.
pub fn check_tensor_near<T: Numeric>(
    actual: &Tensor<T>,
    expected_shape: &[usize],
    expected_data: &[T],
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data = actual.to_vec();
    assert_eq!(
        actual_data.len(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        let a = a.to_f64().unwrap_or(f64::NAN);
        let e = e.to_f64().unwrap_or(f64::NAN);
        if e.is_nan() && a.is_nan() {
            continue;
        }
        if !abs_diff_eq!(a, e, epsilon = tolerance) {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i,
                a,
                e,
                (a - e).abs(),
                tolerance
            );
        }
    }
}

/// Positions (row-major) of the non-zero elements of `tensor`.
pub fn nonzero_positions<T: Numeric>(tensor: &Tensor<T>) -> Vec<usize> {
    tensor
        .iter()
        .enumerate()
        .filter(|(_, x)| *x != T::zero())
        .map(|(i, _)| i)
        .collect()
}
