//! # Differentiable Operations Module (`ops`)
//!
//! Every operation is split in two halves:
//!
//! - **`_op` functions** run the forward computation on the tensor substrate and return the
//!   output together with the context the backward pass needs.
//! - **`Backward` structs** are those contexts. Each one implements
//!   [`BackwardOp`](../autograd/backward_op/trait.BackwardOp.html) and maps the gradient of
//!   the output to one gradient slot per forward input.
//!
//! A context is built by exactly one forward call and consumed by the matching backward call;
//! nothing is shared between invocations, so independent calls may run on different threads.
//!
//! ## Key Submodules:
//!
//! - [`reduction`]: sum, mean, prod, max/min/mode/median/kthvalue and p-norm.

pub mod reduction;
