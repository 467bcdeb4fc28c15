//! Dimension bookkeeping shared by the reduction rules.

use log::trace;

use crate::error::ReductGradError;
use crate::tensor::utils::normalize_dim;
use crate::tensor::Tensor;
use crate::types::Element;

/// Which elements a reduction aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReduceDim {
    /// Reduce over every element; the result is a single-element tensor.
    #[default]
    All,
    /// Reduce along one axis. Negative values count from the last axis.
    Axis(isize),
}

impl From<isize> for ReduceDim {
    fn from(dim: isize) -> Self {
        ReduceDim::Axis(dim)
    }
}

impl From<Option<isize>> for ReduceDim {
    fn from(dim: Option<isize>) -> Self {
        dim.map_or(ReduceDim::All, ReduceDim::Axis)
    }
}

impl ReduceDim {
    /// Resolves the axis against `rank`: `None` for `All`, the normalised axis otherwise.
    pub fn resolve(self, rank: usize) -> Result<Option<usize>, ReductGradError> {
        match self {
            ReduceDim::All => Ok(None),
            ReduceDim::Axis(dim) => normalize_dim(dim, rank).map(Some),
        }
    }
}

/// State every reduction saves for its backward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionContext {
    /// Resolved reduction axis; `None` means all elements were reduced.
    pub dim: Option<usize>,
    pub keep_dim: bool,
    pub input_shape: Vec<usize>,
    pub output_shape: Vec<usize>,
}

impl ReductionContext {
    pub(crate) fn new(dim: Option<usize>, keep_dim: bool, input_shape: Vec<usize>, output_shape: Vec<usize>) -> Self {
        ReductionContext {
            dim,
            keep_dim,
            input_shape,
            output_shape,
        }
    }

    /// True when the reduced axis was dropped from the output and has to be reinserted.
    ///
    /// Rank-1 inputs never need it: their output already keeps one element on that axis.
    pub fn needs_axis_reinsertion(&self) -> bool {
        self.dim.is_some() && !self.keep_dim && self.input_shape.len() != 1
    }

    /// Reinserts the reduced axis as size 1 on an output-shaped tensor, if it was dropped.
    pub fn restore_reduced_axis<T: Element>(&self, tensor: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
        match self.dim {
            Some(dim) if self.needs_axis_reinsertion() => {
                trace!("restoring axis {} on shape {:?}", dim, tensor.shape());
                tensor.unsqueeze(dim)
            }
            _ => Ok(tensor.clone()),
        }
    }

    /// Fails unless `grad_output` has the shape the forward pass produced.
    pub fn check_grad_output<T: Element>(&self, grad_output: &Tensor<T>, operation: &str) -> Result<(), ReductGradError> {
        let actual = grad_output.shape();
        if actual != self.output_shape {
            return Err(ReductGradError::ShapeMismatch {
                expected: self.output_shape.clone(),
                actual,
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Broadcasts a single-element gradient to the full input shape.
    pub fn broadcast_to_input<T: Element>(&self, single: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
        let rank = self.input_shape.len();
        single.reshape(vec![1; rank])?.expand(&self.input_shape)
    }

    /// Repeat counts that tile a keep-dim gradient back to the input shape along `dim`.
    pub fn repeats_along(&self, dim: usize) -> Vec<usize> {
        let mut repeats = vec![1; self.input_shape.len()];
        repeats[dim] = self.input_shape[dim];
        repeats
    }

    /// Number of elements aggregated into each output element.
    pub fn reduced_count(&self) -> usize {
        match self.dim {
            Some(dim) => self.input_shape[dim],
            None => self.input_shape.iter().product(),
        }
    }
}
