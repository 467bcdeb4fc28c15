use std::sync::Arc;

use crate::error::ReductGradError;
use crate::tensor::utils::{broadcast_shapes, calculate_strides};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::{Element, Numeric};

impl<T: Element> Tensor<T> {
    /// Applies `f` to every element, producing a new contiguous tensor.
    pub fn map<U: Element, F>(&self, f: F) -> Tensor<U>
    where
        F: Fn(T) -> U,
    {
        let data: Vec<U> = self.iter().map(f).collect();
        Tensor::from_data(TensorData {
            buffer: Arc::new(data),
            shape: self.shape(),
            strides: calculate_strides(&self.data.shape),
            offset: 0,
        })
    }

    /// Combines two tensors element-wise after broadcasting them to a common shape.
    pub fn zip_with<U: Element, R: Element, F>(
        &self,
        other: &Tensor<U>,
        f: F,
    ) -> Result<Tensor<R>, ReductGradError>
    where
        F: Fn(T, U) -> R,
    {
        let out_shape = broadcast_shapes(&self.data.shape, &other.data.shape)?;
        let lhs = self.expand(&out_shape)?;
        let rhs = other.expand(&out_shape)?;
        let data: Vec<R> = lhs.iter().zip(rhs.iter()).map(|(a, b)| f(a, b)).collect();
        Tensor::new(data, out_shape)
    }
}

impl<T: Numeric> Tensor<T> {
    /// Element-wise (broadcasting) addition.
    pub fn add(&self, other: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Element-wise (broadcasting) subtraction.
    pub fn sub(&self, other: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Element-wise (broadcasting) multiplication.
    pub fn mul(&self, other: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Element-wise (broadcasting) division. Division by zero follows IEEE semantics.
    pub fn div(&self, other: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
        self.zip_with(other, |a, b| a / b)
    }

    /// Element-wise division where a zero divisor yields zero instead of inf/NaN.
    pub fn div_or_zero(&self, other: &Tensor<T>) -> Result<Tensor<T>, ReductGradError> {
        self.zip_with(other, |a, b| if b == T::zero() { T::zero() } else { a / b })
    }

    pub fn mul_scalar(&self, scalar: T) -> Tensor<T> {
        self.map(|a| a * scalar)
    }

    pub fn div_scalar(&self, scalar: T) -> Tensor<T> {
        self.map(|a| a / scalar)
    }

    pub fn abs(&self) -> Tensor<T> {
        self.map(|a| a.abs())
    }

    /// Raises every element to the power `exponent`.
    pub fn powf(&self, exponent: T) -> Tensor<T> {
        self.map(|a| a.powf(exponent))
    }
}
