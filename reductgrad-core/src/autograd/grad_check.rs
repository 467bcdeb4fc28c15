use approx::relative_eq;
use log::{debug, trace};
use thiserror::Error;

use crate::autograd::backward_op::BackwardOp;
use crate::error::ReductGradError;
use crate::tensor::Tensor;
use crate::types::Numeric;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed at element index {element_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(ReductGradError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(ReductGradError),
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(ReductGradError),
    #[error("Backward pass returned no gradient for the input tensor.")]
    MissingAnalyticalGrad,
    #[error("Analytical gradient shape {actual:?} does not match input shape {expected:?}")]
    GradientShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("Numerical gradient is NaN or infinite for element {element_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Analytical gradient is NaN or infinite for element {element_index}. Value: {value:?}")]
    AnalyticalGradNaNOrInfinite { element_index: usize, value: f64 },
}

impl From<ReductGradError> for GradCheckError {
    fn from(err: ReductGradError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Step size and acceptance threshold of the finite-difference check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckConfig {
    /// Perturbation applied to each input element (central differences).
    pub epsilon: f64,
    /// Absolute and relative tolerance between analytical and numerical gradients.
    pub tolerance: f64,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        GradCheckConfig {
            epsilon: 1e-6,
            tolerance: 1e-4,
        }
    }
}

/// Checks a rule's analytical gradient against central finite differences.
///
/// The scalar loss is `sum(forward(input) * grad_output)`, whose derivative with respect to
/// the input is exactly what `backward(grad_output)` must return in slot 0.
pub fn check_grad<T, C, F, const N: usize>(
    forward: F,
    input: &Tensor<T>,
    grad_output: &Tensor<T>,
    config: &GradCheckConfig,
) -> Result<(), GradCheckError>
where
    T: Numeric,
    C: BackwardOp<T, N>,
    F: Fn(&Tensor<T>) -> Result<(Tensor<T>, C), ReductGradError>,
{
    // --- Analytical gradient ---
    let (_, ctx) = forward(input).map_err(GradCheckError::ForwardPassError)?;
    let grads = ctx
        .backward(grad_output)
        .map_err(GradCheckError::BackwardPassError)?;
    let analytical = grads
        .into_iter()
        .next()
        .and_then(|slot| slot.into_tensor())
        .ok_or(GradCheckError::MissingAnalyticalGrad)?;
    if analytical.shape() != input.shape() {
        return Err(GradCheckError::GradientShapeMismatch {
            expected: input.shape(),
            actual: analytical.shape(),
        });
    }
    let analytical_data: Vec<f64> = analytical.iter().map(to_f64).collect();

    // --- Numerical gradient ---
    let shape = input.shape();
    let original: Vec<f64> = input.iter().map(to_f64).collect();
    let loss_at = |data: &[f64]| -> Result<f64, GradCheckError> {
        let perturbed = Tensor::new(
            data.iter().map(|&x| T::from_f64_lossy(x)).collect(),
            shape.clone(),
        )?;
        let (output, _) = forward(&perturbed).map_err(GradCheckError::ForwardPassError)?;
        calculate_loss(&output, grad_output)
    };

    for (elem_idx, &analytical_grad) in analytical_data.iter().enumerate() {
        let mut data_plus = original.clone();
        data_plus[elem_idx] += config.epsilon;
        let loss_plus = loss_at(&data_plus)?;

        let mut data_minus = original.clone();
        data_minus[elem_idx] -= config.epsilon;
        let loss_minus = loss_at(&data_minus)?;

        let numerical_grad = (loss_plus - loss_minus) / (2.0 * config.epsilon);
        trace!(
            "check_grad: element {} analytical {} numerical {}",
            elem_idx,
            analytical_grad,
            numerical_grad
        );

        if !numerical_grad.is_finite() {
            return Err(GradCheckError::NumericalGradNaNOrInfinite {
                element_index: elem_idx,
                loss_plus,
                loss_minus,
            });
        }
        if !analytical_grad.is_finite() {
            return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                element_index: elem_idx,
                value: analytical_grad,
            });
        }
        if !relative_eq!(
            analytical_grad,
            numerical_grad,
            epsilon = config.tolerance,
            max_relative = config.tolerance
        ) {
            return Err(GradCheckError::GradientMismatch {
                element_index: elem_idx,
                analytical_grad,
                numerical_grad,
                difference: (analytical_grad - numerical_grad).abs(),
            });
        }
    }
    debug!("check_grad: {} elements verified", analytical_data.len());
    Ok(())
}

fn to_f64<T: Numeric>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Scalar loss `sum(output * output_grad)`, accumulated in f64.
fn calculate_loss<T: Numeric>(output: &Tensor<T>, output_grad: &Tensor<T>) -> Result<f64, GradCheckError> {
    if output.shape() != output_grad.shape() {
        return Err(GradCheckError::TensorError(ReductGradError::ShapeMismatch {
            expected: output.shape(),
            actual: output_grad.shape(),
            operation: "calculate_loss (grad_check)".to_string(),
        }));
    }
    Ok(output
        .iter()
        .zip(output_grad.iter())
        .map(|(o, g)| to_f64(o) * to_f64(g))
        .sum())
}
