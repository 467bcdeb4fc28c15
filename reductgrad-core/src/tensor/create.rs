// src/tensor/create.rs

use ::rand::Rng;
use ::rand_distr::{Distribution, StandardNormal};

use crate::error::ReductGradError;
use crate::tensor::Tensor;
use crate::types::{Element, Numeric};

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros<T: Numeric>(shape: &[usize]) -> Result<Tensor<T>, ReductGradError> {
    full(shape, T::zero())
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones<T: Numeric>(shape: &[usize]) -> Result<Tensor<T>, ReductGradError> {
    full(shape, T::one())
}

/// Creates a new tensor filled with a specific value with the specified shape.
pub fn full<T: Element>(shape: &[usize], value: T) -> Result<Tensor<T>, ReductGradError> {
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a new tensor filled with zeros, having the same shape as the input tensor.
pub fn zeros_like<T: Numeric>(tensor: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
    zeros(&tensor.shape())
}

/// Creates a new tensor filled with ones, having the same shape as the input tensor.
pub fn ones_like<T: Numeric>(tensor: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
    ones(&tensor.shape())
}

/// 1-D tensor of values `start, start + step, ...` strictly below `end`.
pub fn arange<T: Numeric>(start: T, end: T, step: T) -> Result<Tensor<T>, ReductGradError> {
    if (end > start && step <= T::zero()) || (end < start && step >= T::zero()) || step == T::zero() {
        return Err(ReductGradError::InvalidArgument(format!(
            "Invalid step {:?} for arange({:?}, {:?})",
            step, start, end
        )));
    }
    let numel = ((end - start) / step).ceil().to_usize().unwrap_or(0);
    let data_vec: Vec<T> = (0..numel)
        .map(|i| start + T::from_count(i) * step)
        .collect();
    Tensor::new(data_vec, vec![numel])
}

/// Tensor of values drawn uniformly from `[0, 1)`.
pub fn rand<T: Numeric>(shape: &[usize], rng: &mut impl Rng) -> Result<Tensor<T>, ReductGradError> {
    let numel = shape.iter().product();
    let data_vec: Vec<T> = (0..numel)
        .map(|_| T::from_f64_lossy(rng.gen::<f64>()))
        .collect();
    Tensor::new(data_vec, shape.to_vec())
}

/// Tensor of values drawn from the standard normal distribution.
pub fn randn<T: Numeric>(shape: &[usize], rng: &mut impl Rng) -> Result<Tensor<T>, ReductGradError> {
    let numel = shape.iter().product();
    let data_vec: Vec<T> = (0..numel)
        .map(|_| {
            let sample: f64 = StandardNormal.sample(rng);
            T::from_f64_lossy(sample)
        })
        .collect();
    Tensor::new(data_vec, shape.to_vec())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
