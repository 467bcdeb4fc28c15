//! Max, Min, Mode, Median and Kthvalue: reductions that pick one element per slice.
//!
//! All five share one forward and one backward. A [`SelectionKind`] tag selects the
//! substrate operation through a static descriptor table; the backward routes the
//! upstream gradient to the picked positions and leaves every other element at zero.

use std::fmt;

use log::{debug, trace};

use crate::autograd::backward_op::{input_grad_only, BackwardOp, Gradients};
use crate::error::ReductGradError;
use crate::tensor::create::zeros;
use crate::tensor::utils::normalize_dim;
use crate::tensor::Tensor;
use crate::types::Numeric;

use super::utils::{ReduceDim, ReductionContext};

/// The selection reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionKind {
    Max,
    Min,
    Mode,
    Median,
    Kthvalue,
}

/// Static capabilities of a selection reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionDescriptor {
    pub kind: SelectionKind,
    pub name: &'static str,
    /// Whether the operation has a global form that reduces every element at once.
    pub has_all_reduce: bool,
    /// Number of extra arguments passed ahead of the dimension (`k` for Kthvalue).
    pub extra_arg_arity: usize,
}

const SELECTION_TABLE: [SelectionDescriptor; 5] = [
    SelectionDescriptor {
        kind: SelectionKind::Max,
        name: "max",
        has_all_reduce: true,
        extra_arg_arity: 0,
    },
    SelectionDescriptor {
        kind: SelectionKind::Min,
        name: "min",
        has_all_reduce: true,
        extra_arg_arity: 0,
    },
    SelectionDescriptor {
        kind: SelectionKind::Mode,
        name: "mode",
        has_all_reduce: false,
        extra_arg_arity: 0,
    },
    SelectionDescriptor {
        kind: SelectionKind::Median,
        name: "median",
        has_all_reduce: false,
        extra_arg_arity: 0,
    },
    SelectionDescriptor {
        kind: SelectionKind::Kthvalue,
        name: "kthvalue",
        has_all_reduce: false,
        extra_arg_arity: 1,
    },
];

impl SelectionKind {
    pub const ALL: [SelectionKind; 5] = [
        SelectionKind::Max,
        SelectionKind::Min,
        SelectionKind::Mode,
        SelectionKind::Median,
        SelectionKind::Kthvalue,
    ];

    pub fn descriptor(self) -> &'static SelectionDescriptor {
        &SELECTION_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Binds the extra arguments to the kind, failing when their number does not match
    /// `extra_arg_arity`.
    fn bind(self, extra_args: &[usize]) -> Result<BoundSelection, ReductGradError> {
        match (self, extra_args) {
            (SelectionKind::Max, []) => Ok(BoundSelection::Max),
            (SelectionKind::Min, []) => Ok(BoundSelection::Min),
            (SelectionKind::Mode, []) => Ok(BoundSelection::Mode),
            (SelectionKind::Median, []) => Ok(BoundSelection::Median),
            (SelectionKind::Kthvalue, [k]) => Ok(BoundSelection::Kthvalue(*k)),
            (kind, args) => Err(ReductGradError::InvalidArgument(format!(
                "{} expects {} extra argument(s), got {}",
                kind.name(),
                kind.descriptor().extra_arg_arity,
                args.len()
            ))),
        }
    }
}

/// A selection kind together with its extra arguments, mapped onto the substrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundSelection {
    Max,
    Min,
    Mode,
    Median,
    Kthvalue(usize),
}

impl BoundSelection {
    /// Global form, if the operation has one.
    fn reduce_all<T: Numeric>(self, input: &Tensor<T>) -> Option<Result<T, ReductGradError>> {
        match self {
            BoundSelection::Max => Some(input.max_all()),
            BoundSelection::Min => Some(input.min_all()),
            BoundSelection::Mode | BoundSelection::Median | BoundSelection::Kthvalue(_) => None,
        }
    }

    /// Per-axis form returning `(values, indices)`.
    fn reduce_along<T: Numeric>(
        self,
        input: &Tensor<T>,
        dim: usize,
        keep_dim: bool,
    ) -> Result<(Tensor<T>, Tensor<i64>), ReductGradError> {
        match self {
            BoundSelection::Max => input.max_dim(dim, keep_dim),
            BoundSelection::Min => input.min_dim(dim, keep_dim),
            BoundSelection::Mode => input.mode_dim(dim, keep_dim),
            BoundSelection::Median => input.median_dim(dim, keep_dim),
            BoundSelection::Kthvalue(k) => input.kthvalue_dim(k, dim, keep_dim),
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Forward result of a selection reduction.
///
/// The global form yields only the value; the per-axis form also yields the position of
/// every picked element along the reduced axis. Indices never receive a gradient.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutput<T: Numeric> {
    Value(Tensor<T>),
    WithIndices { values: Tensor<T>, indices: Tensor<i64> },
}

impl<T: Numeric> SelectionOutput<T> {
    pub fn values(&self) -> &Tensor<T> {
        match self {
            SelectionOutput::Value(values) => values,
            SelectionOutput::WithIndices { values, .. } => values,
        }
    }

    pub fn indices(&self) -> Option<&Tensor<i64>> {
        match self {
            SelectionOutput::Value(_) => None,
            SelectionOutput::WithIndices { indices, .. } => Some(indices),
        }
    }

    pub fn into_values(self) -> Tensor<T> {
        match self {
            SelectionOutput::Value(values) => values,
            SelectionOutput::WithIndices { values, .. } => values,
        }
    }
}

/// Positions picked by the forward pass.
#[derive(Debug, Clone, PartialEq)]
enum SavedPositions {
    /// Coordinates of the single selected element of a global reduction.
    Global(Vec<usize>),
    /// Index along the reduced axis `dim` for every slice, shaped like the output.
    Axis { dim: usize, indices: Tensor<i64> },
}

/// Backward operation context for the selection reductions.
#[derive(Debug, Clone)]
pub struct SelectionBackward<T: Numeric> {
    kind: SelectionKind,
    pub(crate) ctx: ReductionContext,
    positions: SavedPositions,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Numeric> SelectionBackward<T> {
    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn context(&self) -> &ReductionContext {
        &self.ctx
    }
}

impl<T: Numeric> BackwardOp<T, 4> for SelectionBackward<T> {
    /// Slots: (input, dim, keep_dim, extra args), or (input, k, dim, keep_dim) for
    /// Kthvalue. Only the input receives a gradient.
    fn backward(&self, grad_output: &Tensor<T>) -> Result<Gradients<T, 4>, ReductGradError> {
        self.ctx.check_grad_output(grad_output, "selection_backward")?;
        let grad_input = zeros::<T>(&self.ctx.input_shape)?;
        let grad_input = match &self.positions {
            SavedPositions::Global(coords) => {
                trace!("{}_backward: gradient to {:?}", self.kind, coords);
                grad_input.index_put(coords, grad_output.item()?)?
            }
            SavedPositions::Axis { dim, indices } => {
                let grad = self.ctx.restore_reduced_axis(grad_output)?;
                let indices = self.ctx.restore_reduced_axis(indices)?;
                trace!("{}_backward: scatter along {} with {:?}", self.kind, dim, indices.shape());
                grad_input.scatter(*dim, &indices, &grad)?
            }
        };
        Ok(input_grad_only(grad_input))
    }
}

/// Shared forward of the selection reductions.
///
/// With `ReduceDim::All`, Max and Min reduce every element and select the first
/// occurrence (row-major) of the result. The other kinds have no global form and reduce
/// along the last axis instead. `extra_args` must hold exactly the number of extra
/// arguments the kind declares.
pub fn selection_op<T: Numeric>(
    input: &Tensor<T>,
    kind: SelectionKind,
    dim: ReduceDim,
    keep_dim: bool,
    extra_args: &[usize],
) -> Result<(SelectionOutput<T>, SelectionBackward<T>), ReductGradError> {
    let operation = kind.bind(extra_args)?;
    let input_shape = input.shape();

    let global = match dim {
        ReduceDim::All if kind.descriptor().has_all_reduce => operation.reduce_all(input),
        _ => None,
    };
    if let Some(value) = global {
        let value = value?;
        let position = input
            .same_as_scalar(value)
            .nonzero()
            .into_iter()
            .next()
            .ok_or_else(|| {
                ReductGradError::InternalError(format!("{}: reduced value not found in input", kind))
            })?;
        debug!("{}_op (all): {:?} selected at {:?}", kind, input_shape, position);
        let values = Tensor::new(vec![value], vec![1])?;
        let ctx = ReductionContext::new(None, keep_dim, input_shape, values.shape());
        return Ok((
            SelectionOutput::Value(values),
            SelectionBackward {
                kind,
                ctx,
                positions: SavedPositions::Global(position),
                _marker: std::marker::PhantomData,
            },
        ));
    }

    // Kinds without a global form reduce the last axis.
    let axis = match dim {
        ReduceDim::All => normalize_dim(-1, input.rank())?,
        ReduceDim::Axis(d) => normalize_dim(d, input.rank())?,
    };
    let (values, indices) = operation.reduce_along(input, axis, keep_dim)?;
    debug!(
        "{}_op (dim {}): {:?} -> {:?}",
        kind,
        axis,
        input_shape,
        values.shape()
    );
    let ctx = ReductionContext::new(Some(axis), keep_dim, input_shape, values.shape());
    Ok((
        SelectionOutput::WithIndices {
            values,
            indices: indices.clone(),
        },
        SelectionBackward {
            kind,
            ctx,
            positions: SavedPositions::Axis { dim: axis, indices },
            _marker: std::marker::PhantomData,
        },
    ))
}

pub fn max_op<T: Numeric>(
    input: &Tensor<T>,
    dim: ReduceDim,
    keep_dim: bool,
) -> Result<(SelectionOutput<T>, SelectionBackward<T>), ReductGradError> {
    selection_op(input, SelectionKind::Max, dim, keep_dim, &[])
}

pub fn min_op<T: Numeric>(
    input: &Tensor<T>,
    dim: ReduceDim,
    keep_dim: bool,
) -> Result<(SelectionOutput<T>, SelectionBackward<T>), ReductGradError> {
    selection_op(input, SelectionKind::Min, dim, keep_dim, &[])
}

/// Most frequent value per slice; ties go to the smallest value.
pub fn mode_op<T: Numeric>(
    input: &Tensor<T>,
    dim: ReduceDim,
    keep_dim: bool,
) -> Result<(SelectionOutput<T>, SelectionBackward<T>), ReductGradError> {
    selection_op(input, SelectionKind::Mode, dim, keep_dim, &[])
}

/// Lower median per slice.
pub fn median_op<T: Numeric>(
    input: &Tensor<T>,
    dim: ReduceDim,
    keep_dim: bool,
) -> Result<(SelectionOutput<T>, SelectionBackward<T>), ReductGradError> {
    selection_op(input, SelectionKind::Median, dim, keep_dim, &[])
}

/// `k`-th smallest value per slice, `k` counted from 1.
pub fn kthvalue_op<T: Numeric>(
    input: &Tensor<T>,
    k: usize,
    dim: ReduceDim,
    keep_dim: bool,
) -> Result<(SelectionOutput<T>, SelectionBackward<T>), ReductGradError> {
    selection_op(input, SelectionKind::Kthvalue, dim, keep_dim, &[k])
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod tests;
