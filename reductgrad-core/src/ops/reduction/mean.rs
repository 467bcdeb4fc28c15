use std::marker::PhantomData;

use log::debug;

use crate::autograd::backward_op::{input_grad_only, BackwardOp, Gradients};
use crate::error::ReductGradError;
use crate::tensor::Tensor;
use crate::types::Numeric;

use super::utils::{ReduceDim, ReductionContext};

/// Backward operation context for `mean_op`.
#[derive(Debug, Clone)]
pub struct MeanBackward<T: Numeric> {
    pub(crate) ctx: ReductionContext,
    _marker: PhantomData<T>,
}

impl<T: Numeric> MeanBackward<T> {
    pub fn context(&self) -> &ReductionContext {
        &self.ctx
    }
}

impl<T: Numeric> BackwardOp<T, 3> for MeanBackward<T> {
    /// Replicates `grad_output` like the sum rule, then divides by the number of averaged
    /// elements. Slots: (input, dim, keep_dim).
    fn backward(&self, grad_output: &Tensor<T>) -> Result<Gradients<T, 3>, ReductGradError> {
        self.ctx.check_grad_output(grad_output, "mean_backward")?;
        let replicated = match self.ctx.dim {
            None => self.ctx.broadcast_to_input(grad_output)?,
            Some(dim) => self
                .ctx
                .restore_reduced_axis(grad_output)?
                .repeat(&self.ctx.repeats_along(dim))?,
        };
        let count = T::from_count(self.ctx.reduced_count());
        Ok(input_grad_only(replicated.div_scalar(count)))
    }
}

/// Arithmetic mean over all elements or along one axis.
///
/// Averaging zero elements yields NaN, as the division by the count does.
pub fn mean_op<T: Numeric>(
    input: &Tensor<T>,
    dim: ReduceDim,
    keep_dim: bool,
) -> Result<(Tensor<T>, MeanBackward<T>), ReductGradError> {
    let resolved = dim.resolve(input.rank())?;
    let output = match resolved {
        None => Tensor::new(vec![input.mean_all()], vec![1])?,
        Some(d) => input.mean_dim(d, keep_dim)?,
    };
    debug!("mean_op: {:?} -> {:?} ({:?})", input.shape(), output.shape(), dim);
    let ctx = ReductionContext::new(resolved, keep_dim, input.shape(), output.shape());
    Ok((
        output,
        MeanBackward {
            ctx,
            _marker: PhantomData,
        },
    ))
}

#[cfg(test)]
#[path = "mean_test.rs"]
mod tests;
