// src/tensor_data.rs
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::ReductGradError;
use crate::tensor::utils::calculate_strides;
use crate::types::Element;

/// Internal storage and metadata for a Tensor.
///
/// This struct holds the shared data buffer together with the layout (shape, strides,
/// offset) describing how this tensor reads it. Several `TensorData` may share a single
/// buffer: views such as `narrow` or `expand` only build new layout metadata.
#[derive(Debug)]
pub struct TensorData<T: Element> {
    /// The underlying buffer, shared between a tensor and its views.
    pub(crate) buffer: Arc<Vec<T>>,
    /// The shape (dimensions) of the tensor.
    pub(crate) shape: Vec<usize>,
    /// Jump in the buffer required to move one step along each dimension.
    /// A stride of 0 marks a broadcast (expanded) dimension.
    pub(crate) strides: Vec<usize>,
    /// The offset into the buffer for the first element (used for views).
    pub(crate) offset: usize,
}

impl<T: Element> TensorData<T> {
    /// Creates a new contiguous `TensorData` owning `data_vec`.
    ///
    /// # Errors
    /// Returns `ReductGradError::TensorCreationError` if the length of `data_vec` does not match
    /// the total number of elements specified by `shape`.
    pub fn new(data_vec: Vec<T>, shape: Vec<usize>) -> Result<Self, ReductGradError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(ReductGradError::TensorCreationError { data_len, shape });
        }

        let strides = calculate_strides(&shape);
        Ok(TensorData {
            buffer: Arc::new(data_vec),
            shape,
            strides,
            offset: 0,
        })
    }

    /// Creates a new `TensorData` representing a view of an existing buffer.
    ///
    /// No memory is allocated: the buffer `Arc` is shared and only the layout changes.
    pub(crate) fn new_view(
        buffer: Arc<Vec<T>>,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<usize>,
    ) -> Result<Self, ReductGradError> {
        if shape.len() != strides.len() {
            return Err(ReductGradError::InternalError(format!(
                "View rank mismatch: shape {:?} vs strides {:?}",
                shape, strides
            )));
        }
        // The last reachable element must lie inside the buffer.
        let numel: usize = shape.iter().product();
        if numel > 0 {
            let max_offset = offset
                + shape
                    .iter()
                    .zip(strides.iter())
                    .map(|(&dim, &stride)| (dim - 1) * stride)
                    .sum::<usize>();
            if max_offset >= buffer.len() {
                return Err(ReductGradError::IndexOutOfBounds {
                    index: vec![max_offset],
                    shape: vec![buffer.len()],
                });
            }
        }
        Ok(TensorData {
            buffer,
            shape,
            strides,
            offset,
        })
    }

    /// Number of logical elements.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// True when the logical row-major order matches the buffer order starting at `offset`.
    pub fn is_contiguous(&self) -> bool {
        let mut expected_stride = 1;
        for (&dim, &stride) in self.shape.iter().zip(self.strides.iter()).rev() {
            if dim == 1 {
                continue;
            }
            if stride != expected_stride {
                return false;
            }
            expected_stride *= dim;
        }
        true
    }

    /// Physical offset in the buffer for the given logical coordinates.
    pub fn get_offset(&self, coords: &[usize]) -> usize {
        self.offset
            + coords
                .iter()
                .zip(self.strides.iter())
                .map(|(&c, &s)| c * s)
                .sum::<usize>()
    }
}
