//! Reverse-mode differentiation rules for reduction and selection tensor operations.
//!
//! The crate is organised in three layers:
//!
//! - [`tensor`]: an immutable, strided CPU tensor with the elementwise, reduction,
//!   selection and structural operations the rules are written against.
//! - [`autograd`]: the contract between a rule and the engine driving it
//!   ([`autograd::BackwardOp`], gradient slots) and a finite-difference gradient checker.
//! - [`ops::reduction`]: the rules themselves. Each `xxx_op` forward returns its output and
//!   a context; calling `backward` on that context maps the output gradient to the inputs.

pub mod autograd;
pub mod error;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod types;
pub mod utils;

pub use error::ReductGradError;
pub use tensor::Tensor;
pub use types::{Element, Numeric};

// Re-export traits required by public functions/structs
pub use num_traits;
