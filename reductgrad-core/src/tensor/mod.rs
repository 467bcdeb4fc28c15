// src/tensor/mod.rs

use std::fmt;
use std::sync::Arc;

use crate::error::ReductGradError;
use crate::tensor_data::TensorData;
use crate::types::Element;

pub mod create;
pub mod iter_utils;
pub mod utils;

mod arithmetic_methods;
mod comparison_methods;
mod reduction_methods;
mod selection_methods;
mod structural_methods;
mod view_methods;

pub use create::{arange, full, ones, ones_like, rand, randn, zeros, zeros_like};

use iter_utils::StridedOffsetIter;
use utils::normalize_dim;

/// Represents a multi-dimensional array (tensor).
///
/// `Tensor` wraps an `Arc<TensorData<T>>`, so clones are cheap and share the buffer.
/// Tensors are immutable once built: every operation allocates its result (or builds a
/// view sharing the input buffer), which makes concurrent reads from several threads safe
/// without any locking.
pub struct Tensor<T: Element> {
    pub(crate) data: Arc<TensorData<T>>,
}

impl<T: Element> Clone for Tensor<T> {
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Element> Tensor<T> {
    /// Creates a new contiguous tensor from row-major `data_vec` and `shape`.
    pub fn new(data_vec: Vec<T>, shape: Vec<usize>) -> Result<Self, ReductGradError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(tensor_data),
        })
    }

    /// Creates a 0-dimensional tensor holding `value`.
    pub fn scalar(value: T) -> Self {
        Tensor {
            data: Arc::new(TensorData {
                buffer: Arc::new(vec![value]),
                shape: vec![],
                strides: vec![],
                offset: 0,
            }),
        }
    }

    pub(crate) fn from_data(tensor_data: TensorData<T>) -> Self {
        Tensor {
            data: Arc::new(tensor_data),
        }
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.data.shape.clone()
    }

    /// Returns a clone of the tensor's strides.
    pub fn strides(&self) -> Vec<usize> {
        self.data.strides.clone()
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.data.shape.len()
    }

    /// Size along `dim` (negative values count from the end).
    pub fn size(&self, dim: isize) -> Result<usize, ReductGradError> {
        let dim = normalize_dim(dim, self.rank())?;
        Ok(self.data.shape[dim])
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.data.numel()
    }

    /// Checks if the tensor is contiguous in memory.
    pub fn is_contiguous(&self) -> bool {
        self.data.is_contiguous()
    }

    /// Iterates over the elements in logical row-major order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let buffer = &self.data.buffer;
        StridedOffsetIter::new(&self.data.shape, &self.data.strides, self.data.offset)
            .map(move |offset| buffer[offset])
    }

    /// Copies the elements into a `Vec` in logical row-major order.
    pub fn to_vec(&self) -> Vec<T> {
        if self.is_contiguous() {
            let start = self.data.offset;
            return self.data.buffer[start..start + self.numel()].to_vec();
        }
        self.iter().collect()
    }

    /// Returns a contiguous tensor with the same logical content.
    ///
    /// If already contiguous the buffer is shared, otherwise the data is copied.
    pub fn contiguous(&self) -> Result<Tensor<T>, ReductGradError> {
        if self.is_contiguous() && self.data.offset == 0 && self.data.buffer.len() == self.numel() {
            return Ok(self.clone());
        }
        Tensor::new(self.to_vec(), self.shape())
    }

    /// Returns the single value of a one-element tensor.
    pub fn item(&self) -> Result<T, ReductGradError> {
        if self.numel() != 1 {
            return Err(ReductGradError::ShapeMismatch {
                expected: vec![1],
                actual: self.shape(),
                operation: "item".to_string(),
            });
        }
        Ok(self.data.buffer[self.data.offset])
    }

    /// Reads the element at `coords`.
    pub fn at(&self, coords: &[usize]) -> Result<T, ReductGradError> {
        let in_bounds = coords.len() == self.rank()
            && coords.iter().zip(self.data.shape.iter()).all(|(&c, &d)| c < d);
        if !in_bounds {
            return Err(ReductGradError::IndexOutOfBounds {
                index: coords.to_vec(),
                shape: self.shape(),
            });
        }
        Ok(self.data.buffer[self.data.get_offset(coords)])
    }
}

impl<T: Element> PartialEq for Tensor<T> {
    /// Two tensors are equal when they have the same shape and the same logical elements,
    /// regardless of their memory layout.
    fn eq(&self, other: &Self) -> bool {
        self.data.shape == other.data.shape && self.iter().eq(other.iter())
    }
}

impl<T: Element> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.data.shape)
            .field("data", &self.to_vec())
            .finish()
    }
}
