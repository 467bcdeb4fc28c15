use log::{debug, trace};

use crate::autograd::backward_op::{input_grad_only, BackwardOp, Gradients};
use crate::error::ReductGradError;
use crate::tensor::create::{ones, zeros_like};
use crate::tensor::Tensor;
use crate::types::Numeric;

use super::utils::{ReduceDim, ReductionContext};

/// Backward operation context for `prod_op`.
///
/// Saves the input and the forward output, both needed by the quotient rule.
#[derive(Debug, Clone)]
pub struct ProdBackward<T: Numeric> {
    pub(crate) ctx: ReductionContext,
    pub(crate) input: Tensor<T>,
    pub(crate) output: Tensor<T>,
}

impl<T: Numeric> ProdBackward<T> {
    pub fn context(&self) -> &ReductionContext {
        &self.ctx
    }

    fn backward_all(&self, grad_output: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
        let zero_count = self.input.eq_scalar(T::zero()).count_true();
        match zero_count {
            0 => {
                debug!("prod_backward (all): no zeros, quotient rule");
                self.ctx
                    .broadcast_to_input(&grad_output.mul(&self.output)?)?
                    .div(&self.input)
            }
            1 => {
                debug!("prod_backward (all): single zero, exclusive cumprod");
                let numel = self.input.numel();
                let flat = self.input.reshape(vec![numel])?;
                safe_zeros_backward(&flat, 0, grad_output)?.reshape(self.ctx.input_shape.clone())
            }
            n => {
                debug!("prod_backward (all): {} zeros, gradient vanishes", n);
                zeros_like(&self.input)
            }
        }
    }

    fn backward_dim(&self, dim: usize, grad_output: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
        let grad = self.ctx.restore_reduced_axis(grad_output)?;
        let output = self.ctx.restore_reduced_axis(&self.output)?;
        let zeros_per_slice = self.input.eq_scalar(T::zero()).count_true_dim(dim, true)?;
        let total_zeros: i64 = zeros_per_slice.iter().sum();
        trace!("prod_backward (dim {}): zeros per slice {:?}", dim, zeros_per_slice.to_vec());
        if total_zeros == 0 {
            debug!("prod_backward (dim {}): no zeros, quotient rule", dim);
            grad.mul(&output)?.expand(&self.ctx.input_shape)?.div(&self.input)
        } else {
            debug!("prod_backward (dim {}): {} zeros, exclusive cumprod", dim, total_zeros);
            safe_zeros_backward(&self.input, dim, &grad)
        }
    }
}

impl<T: Numeric> BackwardOp<T, 3> for ProdBackward<T> {
    /// Slots: (input, dim, keep_dim).
    fn backward(&self, grad_output: &Tensor<T>) -> Result<Gradients<T, 3>, ReductGradError> {
        self.ctx.check_grad_output(grad_output, "prod_backward")?;
        let grad_input = match self.ctx.dim {
            None => self.backward_all(grad_output)?,
            Some(dim) => self.backward_dim(dim, grad_output)?,
        };
        Ok(input_grad_only(grad_input))
    }
}

/// Gradient of a product along `dim` that stays finite when a slice holds a zero.
///
/// The derivative with respect to each element is the product of all the other elements
/// of its slice, built as the product of an exclusive cumulative product running forward
/// and one running backward. `grad` must have `input`'s shape with size 1 at `dim` (or
/// broadcast to it). Exact as long as each slice contains at most one zero; slices with
/// more zeros correctly get an all-zero gradient.
pub fn safe_zeros_backward<T: Numeric>(
    input: &Tensor<T>,
    dim: usize,
    grad: &Tensor<T>,
) -> Result<Tensor<T>, ReductGradError> {
    let shape = input.shape();
    let size = input.size(dim as isize)?;
    if size <= 1 {
        return grad.expand(&shape)?.contiguous();
    }

    let mut ones_shape = shape.clone();
    ones_shape[dim] = 1;
    let ones = ones::<T>(&ones_shape)?;

    // Products of strictly earlier elements: [1, x0, x0*x1, ...].
    let exclusive_forward =
        Tensor::cat(&[ones.clone(), input.narrow(dim, 0, size - 1)?], dim)?.cumprod(dim)?;
    // Products of strictly later elements, built on the reversed axis.
    let exclusive_reverse = Tensor::cat(&[ones, input.narrow(dim, 1, size - 1)?.flip(dim)?], dim)?
        .cumprod(dim)?
        .flip(dim)?;

    grad.expand(&shape)?
        .mul(&exclusive_forward.mul(&exclusive_reverse)?)
}

/// Product over all elements or along one axis.
pub fn prod_op<T: Numeric>(
    input: &Tensor<T>,
    dim: ReduceDim,
    keep_dim: bool,
) -> Result<(Tensor<T>, ProdBackward<T>), ReductGradError> {
    let resolved = dim.resolve(input.rank())?;
    let output = match resolved {
        None => Tensor::new(vec![input.prod_all()], vec![1])?,
        Some(d) => input.prod_dim(d, keep_dim)?,
    };
    debug!("prod_op: {:?} -> {:?} ({:?})", input.shape(), output.shape(), dim);
    let ctx = ReductionContext::new(resolved, keep_dim, input.shape(), output.shape());
    Ok((
        output.clone(),
        ProdBackward {
            ctx,
            input: input.clone(),
            output,
        },
    ))
}

#[cfg(test)]
#[path = "prod_test.rs"]
mod tests;
