// src/ops/reduction/mod.rs
// Differentiable reductions (Sum, Mean, Prod, the selection family, Norm)

pub mod mean;
pub mod norm;
pub mod prod;
pub mod selection;
pub mod sum;
pub mod utils;

pub use mean::{mean_op, MeanBackward};
pub use norm::{norm_op, NormBackward};
pub use prod::{prod_op, safe_zeros_backward, ProdBackward};
pub use selection::{
    kthvalue_op, max_op, median_op, min_op, mode_op, selection_op, SelectionBackward,
    SelectionDescriptor, SelectionKind, SelectionOutput,
};
pub use sum::{sum_op, SumBackward};
pub use utils::{ReduceDim, ReductionContext};
