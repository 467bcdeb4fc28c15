use std::marker::PhantomData;

use log::debug;

use crate::autograd::backward_op::{input_grad_only, BackwardOp, Gradients};
use crate::error::ReductGradError;
use crate::tensor::Tensor;
use crate::types::Numeric;

use super::utils::{ReduceDim, ReductionContext};

/// Backward operation context for `sum_op`.
///
/// The gradient of a sum does not depend on the input values, so only the reduction
/// layout is saved.
#[derive(Debug, Clone)]
pub struct SumBackward<T: Numeric> {
    pub(crate) ctx: ReductionContext,
    _marker: PhantomData<T>,
}

impl<T: Numeric> SumBackward<T> {
    pub fn context(&self) -> &ReductionContext {
        &self.ctx
    }
}

impl<T: Numeric> BackwardOp<T, 3> for SumBackward<T> {
    /// Every input element contributes with weight 1, so `grad_output` is replicated back
    /// over the reduced elements. Slots: (input, dim, keep_dim).
    fn backward(&self, grad_output: &Tensor<T>) -> Result<Gradients<T, 3>, ReductGradError> {
        self.ctx.check_grad_output(grad_output, "sum_backward")?;
        let grad_input = match self.ctx.dim {
            None => self.ctx.broadcast_to_input(grad_output)?,
            Some(dim) => {
                let grad = self.ctx.restore_reduced_axis(grad_output)?;
                grad.repeat(&self.ctx.repeats_along(dim))?
            }
        };
        Ok(input_grad_only(grad_input))
    }
}

/// Sums `input` over all elements or along one axis.
///
/// Returns the output together with the context needed by the backward pass. The global
/// form returns a single-element tensor of shape `[1]`.
pub fn sum_op<T: Numeric>(
    input: &Tensor<T>,
    dim: ReduceDim,
    keep_dim: bool,
) -> Result<(Tensor<T>, SumBackward<T>), ReductGradError> {
    let resolved = dim.resolve(input.rank())?;
    let output = match resolved {
        None => Tensor::new(vec![input.sum_all()], vec![1])?,
        Some(d) => input.sum_dim(d, keep_dim)?,
    };
    debug!("sum_op: {:?} -> {:?} ({:?})", input.shape(), output.shape(), dim);
    let ctx = ReductionContext::new(resolved, keep_dim, input.shape(), output.shape());
    Ok((
        output,
        SumBackward {
            ctx,
            _marker: PhantomData,
        },
    ))
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
