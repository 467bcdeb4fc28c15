use num_traits::{Float, FromPrimitive, NumAssignOps};
use std::fmt::Debug;

/// Any type that can be stored inside a `Tensor`.
///
/// Float tensors carry values and gradients, `i64` tensors carry the positions chosen by
/// selection reductions and `bool` tensors are comparison masks.
pub trait Element: Copy + Debug + Default + PartialEq + Send + Sync + 'static {}

impl Element for f32 {}
impl Element for f64 {}
impl Element for i64 {}
impl Element for bool {}

/// Floating-point element types usable in differentiable operations.
pub trait Numeric: Element + Float + FromPrimitive + NumAssignOps {
    /// Converts a plain `f64` constant (exponents, counts) into the element type.
    fn from_f64_lossy(value: f64) -> Self {
        <Self as FromPrimitive>::from_f64(value).unwrap_or_else(Self::nan)
    }

    /// Converts an element count into the element type.
    fn from_count(count: usize) -> Self {
        <Self as FromPrimitive>::from_usize(count).unwrap_or_else(Self::nan)
    }
}

impl Numeric for f32 {}
impl Numeric for f64 {}
