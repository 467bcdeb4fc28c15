use log::{debug, warn};

use crate::autograd::backward_op::{input_grad_only, BackwardOp, Gradients};
use crate::error::ReductGradError;
use crate::tensor::Tensor;
use crate::types::Numeric;

use super::utils::{ReduceDim, ReductionContext};

/// Backward operation context for `norm_op`.
///
/// Saves the input and the computed norm (the scalar norm for the global form, the
/// per-slice norms otherwise).
#[derive(Debug, Clone)]
pub struct NormBackward<T: Numeric> {
    pub(crate) ctx: ReductionContext,
    pub(crate) p: T,
    pub(crate) input: Tensor<T>,
    pub(crate) norm: Tensor<T>,
}

impl<T: Numeric> NormBackward<T> {
    pub fn context(&self) -> &ReductionContext {
        &self.ctx
    }

    pub fn p(&self) -> T {
        self.p
    }

    fn is_euclidean(&self) -> bool {
        self.p == T::one() + T::one()
    }

    /// `x * |x|^(p - 2)`, i.e. `sign(x) * |x|^(p - 1)`, taken as 0 at `x = 0`.
    fn weighted_input(&self) -> Tensor<T> {
        let exponent = self.p - (T::one() + T::one());
        self.input.map(|x| {
            if x == T::zero() {
                T::zero()
            } else {
                x * x.abs().powf(exponent)
            }
        })
    }
}

impl<T: Numeric> BackwardOp<T, 4> for NormBackward<T> {
    /// Slots: (input, p, dim, keep_dim).
    ///
    /// A slice whose norm is zero gets a zero gradient.
    fn backward(&self, grad_output: &Tensor<T>) -> Result<Gradients<T, 4>, ReductGradError> {
        self.ctx.check_grad_output(grad_output, "norm_backward")?;
        let (grad, norm) = match self.ctx.dim {
            None => (
                self.ctx.broadcast_to_input(grad_output)?,
                self.ctx.broadcast_to_input(&self.norm)?,
            ),
            Some(_) => (
                self.ctx.restore_reduced_axis(grad_output)?,
                self.ctx.restore_reduced_axis(&self.norm)?,
            ),
        };
        if norm.iter().any(|n| n == T::zero()) {
            warn!("norm_backward: zero norm encountered, gradient set to zero for that slice");
        }

        let grad_input = if self.is_euclidean() {
            debug!("norm_backward: p = 2 closed form");
            self.input.mul(&grad.div_or_zero(&norm)?)?
        } else {
            debug!("norm_backward: general p = {:?}", self.p);
            let denominator = norm.powf(self.p - T::one());
            self.weighted_input().mul(&grad.div_or_zero(&denominator)?)?
        };
        Ok(input_grad_only(grad_input))
    }
}

/// p-norm over all elements or along one axis: `(sum |x|^p)^(1/p)`.
///
/// `p` must be finite and strictly positive.
pub fn norm_op<T: Numeric>(
    input: &Tensor<T>,
    p: f64,
    dim: ReduceDim,
    keep_dim: bool,
) -> Result<(Tensor<T>, NormBackward<T>), ReductGradError> {
    if !p.is_finite() || p <= 0.0 {
        return Err(ReductGradError::InvalidArgument(format!(
            "norm: p must be finite and positive, got {}",
            p
        )));
    }
    let p_t = T::from_f64_lossy(p);
    let resolved = dim.resolve(input.rank())?;
    let output = match resolved {
        None => Tensor::new(vec![input.norm_all(p_t)], vec![1])?,
        Some(d) => input.norm_dim(p_t, d, keep_dim)?,
    };
    debug!("norm_op (p = {}): {:?} -> {:?} ({:?})", p, input.shape(), output.shape(), dim);
    let ctx = ReductionContext::new(resolved, keep_dim, input.shape(), output.shape());
    Ok((
        output.clone(),
        NormBackward {
            ctx,
            p: p_t,
            input: input.clone(),
            norm: output,
        },
    ))
}

#[cfg(test)]
#[path = "norm_test.rs"]
mod tests;
