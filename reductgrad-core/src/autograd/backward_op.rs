use std::fmt::Debug;

use crate::error::ReductGradError;
use crate::tensor::Tensor;
use crate::types::{Element, Numeric};

/// Gradient slot for one forward input.
///
/// Non-tensor inputs (a reduction dimension, the `keep_dim` flag, `k`, `p`) and
/// non-differentiable ones always receive `NoGradient`.
#[derive(Debug, Clone, PartialEq)]
pub enum InputGrad<T: Element> {
    Grad(Tensor<T>),
    NoGradient,
}

impl<T: Element> InputGrad<T> {
    pub fn is_grad(&self) -> bool {
        matches!(self, InputGrad::Grad(_))
    }

    pub fn as_tensor(&self) -> Option<&Tensor<T>> {
        match self {
            InputGrad::Grad(t) => Some(t),
            InputGrad::NoGradient => None,
        }
    }

    pub fn into_tensor(self) -> Option<Tensor<T>> {
        match self {
            InputGrad::Grad(t) => Some(t),
            InputGrad::NoGradient => None,
        }
    }
}

/// The result of a backward pass: one slot per forward input, in input order.
pub type Gradients<T, const N: usize> = [InputGrad<T>; N];

/// Builds a gradient tuple carrying `grad_input` in slot 0 and `NoGradient` elsewhere.
pub(crate) fn input_grad_only<T: Element, const N: usize>(grad_input: Tensor<T>) -> Gradients<T, N> {
    let mut grads: Gradients<T, N> = std::array::from_fn(|_| InputGrad::NoGradient);
    if let Some(first) = grads.first_mut() {
        *first = InputGrad::Grad(grad_input);
    }
    grads
}

/// Defines the interface for the backward pass of a differentiable reduction.
///
/// The implementing struct is the invocation context: it is built by the forward function,
/// holds everything the backward pass needs (dimension, `keep_dim`, shapes, saved tensors)
/// and is never shared with another invocation. `N` is the number of forward inputs.
///
/// The trait requires `Debug + Send + Sync` so that contexts can be handed to an engine
/// running backward passes on worker threads.
pub trait BackwardOp<T: Numeric, const N: usize>: Debug + Send + Sync {
    /// Maps the gradient of the forward output (`dL/dOutput`) to one gradient per input.
    ///
    /// # Arguments
    /// * `grad_output`: gradient flowing into the output; must have the output's shape.
    ///
    /// # Returns
    /// * `Ok(Gradients)`: slot `i` corresponds to forward input `i`. A gradient tensor
    ///   always has the shape of its input.
    /// * `Err(ReductGradError)`: if `grad_output` does not match the saved output shape.
    fn backward(&self, grad_output: &Tensor<T>) -> Result<Gradients<T, N>, ReductGradError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_grad_only() {
        let g = Tensor::new(vec![1.0f32, 2.0], vec![2]).unwrap();
        let grads: Gradients<f32, 3> = input_grad_only(g.clone());
        assert_eq!(grads[0], InputGrad::Grad(g));
        assert!(!grads[1].is_grad());
        assert_eq!(grads[2].as_tensor(), None);
    }
}
