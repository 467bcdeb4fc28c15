use crate::error::ReductGradError;
use crate::tensor::utils::{reduced_shape, split_at_dim};
use crate::tensor::Tensor;
use crate::types::{Element, Numeric};

impl<T: Element> Tensor<T> {
    /// Applies `reduce` to every 1-D lane along `dim`, producing one value per lane.
    ///
    /// Lanes are visited in the row-major order of the output, so the result buffer is
    /// directly laid out for the shape given by `reduced_shape`.
    pub(crate) fn reduce_lanes<R, F>(
        &self,
        dim: usize,
        keep_dim: bool,
        mut reduce: F,
    ) -> Result<Tensor<R>, ReductGradError>
    where
        R: Element,
        F: FnMut(&[T]) -> Result<R, ReductGradError>,
    {
        let shape = self.shape();
        if dim >= shape.len() {
            return Err(ReductGradError::InvalidAxis {
                axis: dim as isize,
                rank: shape.len(),
            });
        }
        let data = self.to_vec();
        let (outer, dim_size, inner) = split_at_dim(&shape, dim);
        let mut out = Vec::with_capacity(outer * inner);
        let mut lane = Vec::with_capacity(dim_size);
        for o in 0..outer {
            let base = o * dim_size * inner;
            for i in 0..inner {
                lane.clear();
                lane.extend((0..dim_size).map(|k| data[base + k * inner + i]));
                out.push(reduce(&lane)?);
            }
        }
        Tensor::new(out, reduced_shape(&shape, dim, keep_dim))
    }
}

impl Tensor<bool> {
    /// Number of `true` elements in every lane along `dim`.
    pub fn count_true_dim(&self, dim: usize, keep_dim: bool) -> Result<Tensor<i64>, ReductGradError> {
        self.reduce_lanes(dim, keep_dim, |lane| {
            Ok(lane.iter().filter(|flag| **flag).count() as i64)
        })
    }
}

fn lane_norm<T: Numeric>(lane: &[T], p: T) -> T {
    let two = T::one() + T::one();
    if p == two {
        lane.iter().fold(T::zero(), |acc, &x| acc + x * x).sqrt()
    } else {
        lane.iter()
            .fold(T::zero(), |acc, &x| acc + x.abs().powf(p))
            .powf(T::one() / p)
    }
}

impl<T: Numeric> Tensor<T> {
    /// Sum of all elements.
    pub fn sum_all(&self) -> T {
        self.iter().fold(T::zero(), |acc, x| acc + x)
    }

    /// Product of all elements.
    pub fn prod_all(&self) -> T {
        self.iter().fold(T::one(), |acc, x| acc * x)
    }

    /// Mean of all elements (NaN for an empty tensor).
    pub fn mean_all(&self) -> T {
        self.sum_all() / T::from_count(self.numel())
    }

    /// p-norm of all elements.
    pub fn norm_all(&self, p: T) -> T {
        lane_norm(&self.to_vec(), p)
    }

    pub fn sum_dim(&self, dim: usize, keep_dim: bool) -> Result<Tensor<T>, ReductGradError> {
        self.reduce_lanes(dim, keep_dim, |lane| {
            Ok(lane.iter().fold(T::zero(), |acc, &x| acc + x))
        })
    }

    pub fn prod_dim(&self, dim: usize, keep_dim: bool) -> Result<Tensor<T>, ReductGradError> {
        self.reduce_lanes(dim, keep_dim, |lane| {
            Ok(lane.iter().fold(T::one(), |acc, &x| acc * x))
        })
    }

    pub fn mean_dim(&self, dim: usize, keep_dim: bool) -> Result<Tensor<T>, ReductGradError> {
        self.reduce_lanes(dim, keep_dim, |lane| {
            let sum = lane.iter().fold(T::zero(), |acc, &x| acc + x);
            Ok(sum / T::from_count(lane.len()))
        })
    }

    pub fn norm_dim(&self, p: T, dim: usize, keep_dim: bool) -> Result<Tensor<T>, ReductGradError> {
        self.reduce_lanes(dim, keep_dim, |lane| Ok(lane_norm(lane, p)))
    }
}

#[cfg(test)]
#[path = "reduction_methods_test.rs"]
mod tests;
