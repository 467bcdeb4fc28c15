use super::*;
use crate::autograd::grad_check::{check_grad, GradCheckConfig};
use crate::utils::testing::{check_tensor_near, nonzero_positions};

fn grid() -> Tensor<f64> {
    // [[3, 1, 4],
    //  [1, 5, 9]]
    Tensor::new(vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0], vec![2, 3]).unwrap()
}

#[test]
fn test_descriptor_table() {
    for kind in SelectionKind::ALL {
        assert_eq!(kind.descriptor().kind, kind);
    }
    assert!(SelectionKind::Max.descriptor().has_all_reduce);
    assert!(SelectionKind::Min.descriptor().has_all_reduce);
    assert!(!SelectionKind::Mode.descriptor().has_all_reduce);
    assert!(!SelectionKind::Median.descriptor().has_all_reduce);
    assert_eq!(SelectionKind::Kthvalue.descriptor().extra_arg_arity, 1);
    assert_eq!(SelectionKind::Median.to_string(), "median");
}

#[test]
fn test_max_all_forward_backward() -> Result<(), ReductGradError> {
    let (out, ctx) = max_op(&grid(), ReduceDim::All, false)?;
    assert!(out.indices().is_none());
    check_tensor_near(out.values(), &[1], &[9.0], 0.0);

    let grads = ctx.backward(&Tensor::new(vec![2.5], vec![1])?)?;
    check_tensor_near(
        grads[0].as_tensor().unwrap(),
        &[2, 3],
        &[0.0, 0.0, 0.0, 0.0, 0.0, 2.5],
        0.0,
    );
    assert!(grads[1..].iter().all(|g| !g.is_grad()));
    Ok(())
}

#[test]
fn test_max_all_tie_goes_to_first_position() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![1.0f32, 7.0, 2.0, 7.0], vec![2, 2])?;
    let (_, ctx) = max_op(&t, ReduceDim::All, false)?;
    let grads = ctx.backward(&Tensor::new(vec![1.0f32], vec![1])?)?;
    assert_eq!(nonzero_positions(grads[0].as_tensor().unwrap()), vec![1]);
    Ok(())
}

#[test]
fn test_min_all_tie_goes_to_first_position() -> Result<(), ReductGradError> {
    let (out, ctx) = min_op(&grid(), ReduceDim::All, false)?;
    check_tensor_near(out.values(), &[1], &[1.0], 0.0);
    let grads = ctx.backward(&Tensor::new(vec![-1.0], vec![1])?)?;
    check_tensor_near(
        grads[0].as_tensor().unwrap(),
        &[2, 3],
        &[0.0, -1.0, 0.0, 0.0, 0.0, 0.0],
        0.0,
    );
    Ok(())
}

#[test]
fn test_max_all_nan_selects_first_nan() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![1.0f64, f64::NAN, 3.0, f64::NAN], vec![4])?;
    let (out, ctx) = max_op(&t, ReduceDim::All, false)?;
    assert!(out.values().item()?.is_nan());
    let grads = ctx.backward(&Tensor::new(vec![1.0], vec![1])?)?;
    assert_eq!(nonzero_positions(grads[0].as_tensor().unwrap()), vec![1]);
    Ok(())
}

#[test]
fn test_max_dim_scatter() -> Result<(), ReductGradError> {
    let (out, ctx) = max_op(&grid(), ReduceDim::Axis(1), false)?;
    check_tensor_near(out.values(), &[2], &[4.0, 9.0], 0.0);
    assert_eq!(out.indices().unwrap().to_vec(), vec![2, 2]);

    let grads = ctx.backward(&Tensor::new(vec![10.0, 20.0], vec![2])?)?;
    check_tensor_near(
        grads[0].as_tensor().unwrap(),
        &[2, 3],
        &[0.0, 0.0, 10.0, 0.0, 0.0, 20.0],
        0.0,
    );
    Ok(())
}

#[test]
fn test_min_dim_keep_dim_axis0() -> Result<(), ReductGradError> {
    let (out, ctx) = min_op(&grid(), ReduceDim::Axis(0), true)?;
    check_tensor_near(out.values(), &[1, 3], &[1.0, 1.0, 4.0], 0.0);
    assert_eq!(out.indices().unwrap().to_vec(), vec![1, 0, 0]);

    let grads = ctx.backward(&Tensor::new(vec![1.0, 2.0, 3.0], vec![1, 3])?)?;
    check_tensor_near(
        grads[0].as_tensor().unwrap(),
        &[2, 3],
        &[0.0, 2.0, 3.0, 1.0, 0.0, 0.0],
        0.0,
    );
    Ok(())
}

#[test]
fn test_median_defaults_to_last_axis() -> Result<(), ReductGradError> {
    let (out, ctx) = median_op(&grid(), ReduceDim::All, false)?;
    check_tensor_near(out.values(), &[2], &[3.0, 5.0], 0.0);
    assert_eq!(out.indices().unwrap().to_vec(), vec![0, 1]);
    assert_eq!(ctx.context().dim, Some(1));

    let grads = ctx.backward(&Tensor::new(vec![1.0, 1.0], vec![2])?)?;
    assert_eq!(nonzero_positions(grads[0].as_tensor().unwrap()), vec![0, 4]);
    Ok(())
}

#[test]
fn test_median_even_count_is_lower_median() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![4.0f64, 1.0, 3.0, 2.0], vec![4])?;
    let (out, _) = median_op(&t, ReduceDim::Axis(0), false)?;
    check_tensor_near(out.values(), &[1], &[2.0], 0.0);
    assert_eq!(out.indices().unwrap().to_vec(), vec![3]);
    Ok(())
}

#[test]
fn test_mode_dim() -> Result<(), ReductGradError> {
    let t = Tensor::new(vec![2.0f64, 5.0, 2.0, 5.0, 7.0, 7.0, 1.0, 7.0], vec![2, 4])?;
    let (out, ctx) = mode_op(&t, ReduceDim::Axis(1), false)?;
    // Row 0: 2 and 5 tie, the smaller value wins at its last occurrence.
    check_tensor_near(out.values(), &[2], &[2.0, 7.0], 0.0);
    assert_eq!(out.indices().unwrap().to_vec(), vec![2, 3]);

    let grads = ctx.backward(&Tensor::new(vec![1.0, 1.0], vec![2])?)?;
    assert_eq!(nonzero_positions(grads[0].as_tensor().unwrap()), vec![2, 7]);
    Ok(())
}

#[test]
fn test_kthvalue() -> Result<(), ReductGradError> {
    let (out, ctx) = kthvalue_op(&grid(), 2, ReduceDim::Axis(-1), true)?;
    check_tensor_near(out.values(), &[2, 1], &[3.0, 5.0], 0.0);
    assert_eq!(out.indices().unwrap().to_vec(), vec![0, 1]);

    let grads = ctx.backward(&Tensor::new(vec![0.5, -0.5], vec![2, 1])?)?;
    check_tensor_near(
        grads[0].as_tensor().unwrap(),
        &[2, 3],
        &[0.5, 0.0, 0.0, 0.0, -0.5, 0.0],
        0.0,
    );
    Ok(())
}

#[test]
fn test_kthvalue_k_out_of_range() {
    for k in [0, 4] {
        let result = kthvalue_op(&grid(), k, ReduceDim::Axis(1), false);
        assert!(matches!(result, Err(ReductGradError::InvalidArgument(_))));
    }
}

#[test]
fn test_extra_arg_arity_checked() {
    let result = selection_op(&grid(), SelectionKind::Max, ReduceDim::Axis(0), false, &[1]);
    assert!(matches!(result, Err(ReductGradError::InvalidArgument(_))));
    let result = selection_op(&grid(), SelectionKind::Kthvalue, ReduceDim::Axis(0), false, &[]);
    assert!(matches!(result, Err(ReductGradError::InvalidArgument(_))));
}

#[test]
fn test_arity_checked_before_global_reduction() {
    let result = selection_op(&grid(), SelectionKind::Min, ReduceDim::All, false, &[2]);
    assert!(matches!(result, Err(ReductGradError::InvalidArgument(_))));
}

#[test]
fn test_bind_maps_kinds_onto_substrate() {
    assert_eq!(SelectionKind::Kthvalue.bind(&[3]), Ok(BoundSelection::Kthvalue(3)));
    assert_eq!(SelectionKind::Median.bind(&[]), Ok(BoundSelection::Median));
    assert!(SelectionKind::Mode.bind(&[1, 2]).is_err());

    // Exactly the kinds flagged with `has_all_reduce` expose a global form.
    let t = grid();
    for kind in SelectionKind::ALL {
        let args: &[usize] = if kind == SelectionKind::Kthvalue { &[1] } else { &[] };
        let bound = kind.bind(args).unwrap();
        assert_eq!(bound.reduce_all(&t).is_some(), kind.descriptor().has_all_reduce, "{}", kind);
    }
}

#[test]
fn test_mode_without_axis_on_rank0_input() {
    let t = Tensor::scalar(4.0f64);
    let result = mode_op(&t, ReduceDim::All, false);
    assert!(matches!(result, Err(ReductGradError::InvalidAxis { axis: -1, rank: 0 })));
}

#[test]
fn test_empty_reductions_fail() -> Result<(), ReductGradError> {
    let empty = Tensor::<f64>::new(vec![], vec![2, 0])?;
    assert!(matches!(
        max_op(&empty, ReduceDim::All, false),
        Err(ReductGradError::EmptyReduction { .. })
    ));
    assert!(matches!(
        median_op(&empty, ReduceDim::Axis(1), false),
        Err(ReductGradError::EmptyReduction { .. })
    ));
    Ok(())
}

#[test]
fn test_selection_backward_shape_mismatch() -> Result<(), ReductGradError> {
    let (_, ctx) = max_op(&grid(), ReduceDim::Axis(0), false)?;
    let result = ctx.backward(&Tensor::new(vec![1.0, 1.0], vec![2])?);
    assert!(matches!(result, Err(ReductGradError::ShapeMismatch { .. })));
    Ok(())
}

#[test]
fn test_max_dim_grad_check() {
    let t = Tensor::new(vec![0.3, -1.0, 2.2, 1.7, 0.4, -0.6], vec![2, 3]).unwrap();
    let g = Tensor::new(vec![1.5, -0.5, 2.0], vec![3]).unwrap();
    let result = check_grad(
        |x: &Tensor<f64>| max_op(x, ReduceDim::Axis(0), false).map(|(out, ctx)| (out.into_values(), ctx)),
        &t,
        &g,
        &GradCheckConfig::default(),
    );
    assert!(result.is_ok(), "{:?}", result);
}
