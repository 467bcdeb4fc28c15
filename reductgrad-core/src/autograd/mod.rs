// src/autograd/mod.rs

pub mod backward_op;
pub mod grad_check;

pub use backward_op::{BackwardOp, Gradients, InputGrad};
pub use grad_check::{check_grad, GradCheckConfig, GradCheckError};
