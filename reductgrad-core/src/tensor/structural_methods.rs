use crate::error::ReductGradError;
use crate::tensor::utils::{calculate_strides, index_to_coord, split_at_dim};
use crate::tensor::Tensor;
use crate::types::{Element, Numeric};

impl<T: Element> Tensor<T> {
    fn check_dim(&self, dim: usize) -> Result<(), ReductGradError> {
        if dim >= self.rank() {
            return Err(ReductGradError::InvalidAxis {
                axis: dim as isize,
                rank: self.rank(),
            });
        }
        Ok(())
    }

    /// Concatenates `tensors` along `dim`. All other dimensions must agree.
    pub fn cat(tensors: &[Tensor<T>], dim: usize) -> Result<Tensor<T>, ReductGradError> {
        let first = tensors.first().ok_or_else(|| {
            ReductGradError::InvalidArgument("cat: cannot concatenate an empty list of tensors".to_string())
        })?;
        first.check_dim(dim)?;
        let reference = first.shape();
        let mut out_shape = reference.clone();
        out_shape[dim] = 0;
        for t in tensors {
            let shape = t.shape();
            let compatible = shape.len() == reference.len()
                && shape
                    .iter()
                    .zip(reference.iter())
                    .enumerate()
                    .all(|(d, (a, b))| d == dim || a == b);
            if !compatible {
                return Err(ReductGradError::ShapeMismatch {
                    expected: reference,
                    actual: shape,
                    operation: "cat".to_string(),
                });
            }
            out_shape[dim] += shape[dim];
        }

        let (outer, _, inner) = split_at_dim(&out_shape, dim);
        let parts: Vec<Vec<T>> = tensors.iter().map(|t| t.to_vec()).collect();
        let mut out = Vec::with_capacity(out_shape.iter().product());
        for o in 0..outer {
            for (t, data) in tensors.iter().zip(parts.iter()) {
                let block = t.data.shape[dim] * inner;
                out.extend_from_slice(&data[o * block..(o + 1) * block]);
            }
        }
        Tensor::new(out, out_shape)
    }

    /// Selects the slices `indices` along `dim`, in the given order.
    pub fn index_select(&self, dim: usize, indices: &[usize]) -> Result<Tensor<T>, ReductGradError> {
        self.check_dim(dim)?;
        let shape = self.shape();
        let (outer, dim_size, inner) = split_at_dim(&shape, dim);
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= dim_size) {
            return Err(ReductGradError::IndexOutOfBounds {
                index: vec![bad],
                shape,
            });
        }
        let data = self.to_vec();
        let mut out = Vec::with_capacity(outer * indices.len() * inner);
        for o in 0..outer {
            for &idx in indices {
                let start = (o * dim_size + idx) * inner;
                out.extend_from_slice(&data[start..start + inner]);
            }
        }
        let mut out_shape = shape;
        out_shape[dim] = indices.len();
        Tensor::new(out, out_shape)
    }

    /// Reverses the order of the elements along `dim`.
    pub fn flip(&self, dim: usize) -> Result<Tensor<T>, ReductGradError> {
        self.check_dim(dim)?;
        let reversed: Vec<usize> = (0..self.data.shape[dim]).rev().collect();
        self.index_select(dim, &reversed)
    }

    /// Returns a copy of `self` where, for every position `p` of `index`, the element at
    /// `p` with coordinate `dim` replaced by `index[p]` is overwritten by `src[p]`.
    ///
    /// `index` and `src` must share a shape of the same rank as `self`, no larger than
    /// `self` outside of `dim`.
    pub fn scatter(
        &self,
        dim: usize,
        index: &Tensor<i64>,
        src: &Tensor<T>,
    ) -> Result<Tensor<T>, ReductGradError> {
        self.check_dim(dim)?;
        let shape = self.shape();
        let index_shape = index.shape();
        if index_shape != src.shape() {
            return Err(ReductGradError::ShapeMismatch {
                expected: index_shape,
                actual: src.shape(),
                operation: "scatter (src)".to_string(),
            });
        }
        let fits = index_shape.len() == shape.len()
            && index_shape
                .iter()
                .zip(shape.iter())
                .enumerate()
                .all(|(d, (&i, &s))| d == dim || i <= s);
        if !fits {
            return Err(ReductGradError::ShapeMismatch {
                expected: shape,
                actual: index_shape,
                operation: "scatter (index)".to_string(),
            });
        }

        let strides = calculate_strides(&shape);
        let mut out = self.to_vec();
        for (linear, (idx, value)) in index.iter().zip(src.iter()).enumerate() {
            let mut coord = index_to_coord(linear, &index_shape);
            if idx < 0 || idx as usize >= shape[dim] {
                coord[dim] = idx.max(0) as usize;
                return Err(ReductGradError::IndexOutOfBounds { index: coord, shape });
            }
            coord[dim] = idx as usize;
            let target: usize = coord.iter().zip(strides.iter()).map(|(c, s)| c * s).sum();
            out[target] = value;
        }
        Tensor::new(out, shape)
    }

    /// Returns a copy of `self` with the element at `coords` replaced by `value`.
    pub fn index_put(&self, coords: &[usize], value: T) -> Result<Tensor<T>, ReductGradError> {
        let shape = self.shape();
        let in_bounds = coords.len() == shape.len()
            && coords.iter().zip(shape.iter()).all(|(&c, &d)| c < d);
        if !in_bounds {
            return Err(ReductGradError::IndexOutOfBounds {
                index: coords.to_vec(),
                shape,
            });
        }
        let strides = calculate_strides(&shape);
        let target: usize = coords.iter().zip(strides.iter()).map(|(c, s)| c * s).sum();
        let mut out = self.to_vec();
        out[target] = value;
        Tensor::new(out, shape)
    }
}

impl<T: Numeric> Tensor<T> {
    /// Inclusive cumulative product along `dim`.
    pub fn cumprod(&self, dim: usize) -> Result<Tensor<T>, ReductGradError> {
        self.check_dim(dim)?;
        let shape = self.shape();
        let (outer, dim_size, inner) = split_at_dim(&shape, dim);
        let mut out = self.to_vec();
        for o in 0..outer {
            for i in 0..inner {
                let mut running = T::one();
                for k in 0..dim_size {
                    let pos = (o * dim_size + k) * inner + i;
                    running *= out[pos];
                    out[pos] = running;
                }
            }
        }
        Tensor::new(out, shape)
    }
}

#[cfg(test)]
#[path = "structural_methods_test.rs"]
mod tests;
