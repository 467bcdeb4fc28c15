use crate::error::ReductGradError;
use crate::tensor::utils::calculate_strides;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::Element;

impl<T: Element> Tensor<T> {
    /// Returns a tensor with the same elements and a new shape.
    ///
    /// Shares the buffer when the tensor is contiguous, copies otherwise.
    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Tensor<T>, ReductGradError> {
        let new_numel: usize = new_shape.iter().product();
        if new_numel != self.numel() {
            return Err(ReductGradError::ShapeMismatch {
                expected: self.shape(),
                actual: new_shape,
                operation: "reshape".to_string(),
            });
        }
        let source = self.contiguous()?;
        let strides = calculate_strides(&new_shape);
        let view = TensorData::new_view(
            source.data.buffer.clone(),
            source.data.offset,
            new_shape,
            strides,
        )?;
        Ok(Tensor::from_data(view))
    }

    /// Inserts a dimension of size 1 at `dim` (`0..=rank`).
    pub fn unsqueeze(&self, dim: usize) -> Result<Tensor<T>, ReductGradError> {
        let rank = self.rank();
        if dim > rank {
            return Err(ReductGradError::InvalidAxis {
                axis: dim as isize,
                rank: rank + 1,
            });
        }
        let mut shape = self.shape();
        let mut strides = self.strides();
        // The stride of a size-1 axis is never used to step; keep it layout-consistent.
        let new_stride = if dim < rank { strides[dim] * shape[dim] } else { 1 };
        shape.insert(dim, 1);
        strides.insert(dim, new_stride);
        let view = TensorData::new_view(self.data.buffer.clone(), self.data.offset, shape, strides)?;
        Ok(Tensor::from_data(view))
    }

    /// Broadcasts the tensor to `target_shape` without copying (stride-0 view).
    ///
    /// Leading dimensions may be added; existing dimensions must match or be 1.
    pub fn expand(&self, target_shape: &[usize]) -> Result<Tensor<T>, ReductGradError> {
        let shape = &self.data.shape;
        let rank = shape.len();
        let target_rank = target_shape.len();
        let incompatible = || ReductGradError::BroadcastError {
            shape1: shape.clone(),
            shape2: target_shape.to_vec(),
        };
        if target_rank < rank {
            return Err(incompatible());
        }
        let rank_diff = target_rank - rank;
        let mut new_strides = vec![0; target_rank];
        for i in 0..rank {
            let target_dim = target_shape[rank_diff + i];
            if shape[i] == target_dim {
                new_strides[rank_diff + i] = self.data.strides[i];
            } else if shape[i] == 1 {
                new_strides[rank_diff + i] = 0;
            } else {
                return Err(incompatible());
            }
        }
        let view = TensorData::new_view(
            self.data.buffer.clone(),
            self.data.offset,
            target_shape.to_vec(),
            new_strides,
        )?;
        Ok(Tensor::from_data(view))
    }

    /// Contiguous sub-slice `[start, start + length)` along `dim`, as a view.
    pub fn narrow(&self, dim: usize, start: usize, length: usize) -> Result<Tensor<T>, ReductGradError> {
        let rank = self.rank();
        if dim >= rank {
            return Err(ReductGradError::InvalidAxis {
                axis: dim as isize,
                rank,
            });
        }
        let dim_size = self.data.shape[dim];
        if start + length > dim_size {
            return Err(ReductGradError::IndexOutOfBounds {
                index: vec![start + length],
                shape: self.shape(),
            });
        }
        let mut shape = self.shape();
        shape[dim] = length;
        let offset = if length > 0 {
            self.data.offset + start * self.data.strides[dim]
        } else {
            self.data.offset
        };
        let view = TensorData::new_view(self.data.buffer.clone(), offset, shape, self.strides())?;
        Ok(Tensor::from_data(view))
    }

    /// Tiles the tensor `repeats[i]` times along each dimension `i`.
    ///
    /// `repeats` must have exactly one entry per dimension.
    pub fn repeat(&self, repeats: &[usize]) -> Result<Tensor<T>, ReductGradError> {
        let shape = self.shape();
        if repeats.len() != shape.len() {
            return Err(ReductGradError::ShapeMismatch {
                expected: shape,
                actual: repeats.to_vec(),
                operation: "repeat".to_string(),
            });
        }
        let out_shape: Vec<usize> = shape.iter().zip(repeats).map(|(&d, &r)| d * r).collect();
        let out_numel: usize = out_shape.iter().product();
        let mut out = Vec::with_capacity(out_numel);
        let mut coords = vec![0; shape.len()];
        for linear in 0..out_numel {
            let mut remaining = linear;
            for d in (0..out_shape.len()).rev() {
                coords[d] = (remaining % out_shape[d]) % shape[d];
                remaining /= out_shape[d];
            }
            out.push(self.data.buffer[self.data.get_offset(&coords)]);
        }
        Tensor::new(out, out_shape)
    }
}

#[cfg(test)]
#[path = "view_methods_test.rs"]
mod tests;
