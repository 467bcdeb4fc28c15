use super::*;
use crate::autograd::grad_check::{check_grad, GradCheckConfig};
use crate::utils::testing::check_tensor_near;

#[test]
fn test_prod_all_no_zeros() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![1.0f64, 2.0, 3.0, 4.0], vec![2, 2])?;
    let (out, ctx) = prod_op(&t, ReduceDim::All, false)?;
    check_tensor_near(&out, &[1], &[24.0], 1e-9);

    let grads = ctx.backward(&Tensor::new(vec![2.0], vec![1])?)?;
    check_tensor_near(grads[0].as_tensor().unwrap(), &[2, 2], &[48.0, 24.0, 16.0, 12.0], 1e-9);
    assert!(!grads[1].is_grad() && !grads[2].is_grad());
    Ok(())
}

#[test]
fn test_prod_all_single_zero() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![2.0f64, 0.0, 3.0, 5.0], vec![2, 2])?;
    let (out, ctx) = prod_op(&t, ReduceDim::All, false)?;
    check_tensor_near(&out, &[1], &[0.0], 1e-12);

    let grads = ctx.backward(&Tensor::new(vec![1.0], vec![1])?)?;
    check_tensor_near(grads[0].as_tensor().unwrap(), &[2, 2], &[0.0, 30.0, 0.0, 0.0], 1e-9);
    Ok(())
}

#[test]
fn test_prod_all_two_zeros_is_zero() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![0.0f32, 2.0, 0.0, 7.0], vec![4])?;
    let (_, ctx) = prod_op(&t, ReduceDim::All, false)?;
    let grads = ctx.backward(&Tensor::new(vec![123.0f32], vec![1])?)?;
    check_tensor_near(grads[0].as_tensor().unwrap(), &[4], &[0.0; 4], 0.0);
    Ok(())
}

#[test]
fn test_prod_dim_mixed_rows() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![1.0f64, 2.0, 3.0, 0.0], vec![2, 2])?;
    let (out, ctx) = prod_op(&t, ReduceDim::Axis(1), false)?;
    check_tensor_near(&out, &[2], &[2.0, 0.0], 1e-12);

    let grads = ctx.backward(&Tensor::new(vec![1.0, 1.0], vec![2])?)?;
    check_tensor_near(grads[0].as_tensor().unwrap(), &[2, 2], &[2.0, 1.0, 0.0, 3.0], 1e-12);
    Ok(())
}

#[test]
fn test_prod_dim_two_zeros_in_slice() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![0.0f64, 4.0, 0.0, 2.0, 3.0, 5.0], vec![2, 3])?;
    let (out, ctx) = prod_op(&t, ReduceDim::Axis(-1), true)?;
    check_tensor_near(&out, &[2, 1], &[0.0, 30.0], 1e-12);

    let grads = ctx.backward(&Tensor::new(vec![9.0, 1.0], vec![2, 1])?)?;
    check_tensor_near(
        grads[0].as_tensor().unwrap(),
        &[2, 3],
        &[0.0, 0.0, 0.0, 15.0, 10.0, 6.0],
        1e-12,
    );
    Ok(())
}

#[test]
fn test_prod_dim_no_zeros_axis0() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3])?;
    let (out, ctx) = prod_op(&t, ReduceDim::Axis(0), false)?;
    check_tensor_near(&out, &[3], &[4.0, 10.0, 18.0], 1e-12);
    let grads = ctx.backward(&Tensor::new(vec![1.0, 2.0, 3.0], vec![3])?)?;
    check_tensor_near(
        grads[0].as_tensor().unwrap(),
        &[2, 3],
        &[4.0, 10.0, 18.0, 1.0, 4.0, 9.0],
        1e-12,
    );
    Ok(())
}

#[test]
fn test_prod_rank1_dim_single_zero() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![2.0f64, 3.0, 0.0, 4.0], vec![4])?;
    let (out, ctx) = prod_op(&t, ReduceDim::Axis(0), false)?;
    check_tensor_near(&out, &[1], &[0.0], 1e-12);
    let grads = ctx.backward(&Tensor::new(vec![0.5], vec![1])?)?;
    check_tensor_near(grads[0].as_tensor().unwrap(), &[4], &[0.0, 0.0, 12.0, 0.0], 1e-12);
    Ok(())
}

#[test]
fn test_safe_path_matches_closed_form_in_the_limit() -> Result<(), ReductGradError> {
    let eps = 1e-9;
    let with_zero = Tensor::new(vec![1.5f64, -2.0, 0.0, 0.5], vec![4])?;
    let perturbed = Tensor::new(vec![1.5f64, -2.0, eps, 0.5], vec![4])?;
    let g = Tensor::new(vec![1.0], vec![1])?;

    let (_, safe_ctx) = prod_op(&with_zero, ReduceDim::All, false)?;
    let (_, closed_ctx) = prod_op(&perturbed, ReduceDim::All, false)?;
    let safe = safe_ctx.backward(&g)?[0].as_tensor().unwrap().to_vec();
    let closed = closed_ctx.backward(&g)?[0].as_tensor().unwrap().to_vec();
    for (s, c) in safe.iter().zip(closed.iter()) {
        approx::assert_abs_diff_eq!(*s, *c, epsilon = 1e-6);
    }
    Ok(())
}

#[test]
fn test_safe_zeros_backward_size_one_axis() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![0.0f64, 7.0], vec![2, 1])?;
    let g = Tensor::new(vec![3.0, 4.0], vec![2, 1])?;
    let grad = safe_zeros_backward(&t, 1, &g)?;
    check_tensor_near(&grad, &[2, 1], &[3.0, 4.0], 0.0);
    Ok(())
}

#[test]
fn test_prod_grad_check() {
    let t = Tensor::new(vec![0.5, -1.5, 2.0, 1.2, 0.8, -0.9], vec![3, 2]).unwrap();
    let g = Tensor::new(vec![1.0, 0.5, -2.0], vec![3]).unwrap();
    let result = check_grad(
        |x: &Tensor<f64>| prod_op(x, ReduceDim::Axis(1), false),
        &t,
        &g,
        &GradCheckConfig::default(),
    );
    assert!(result.is_ok(), "{:?}", result);
}
