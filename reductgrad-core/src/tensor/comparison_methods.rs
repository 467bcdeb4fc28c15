use crate::error::ReductGradError;
use crate::tensor::utils::index_to_coord;
use crate::tensor::Tensor;
use crate::types::{Element, Numeric};

impl<T: Numeric> Tensor<T> {
    /// Element-wise (broadcasting) equality, producing a boolean mask.
    pub fn eq_tensor(&self, other: &Tensor<T>) -> Result<Tensor<bool>, ReductGradError> {
        self.zip_with(other, |a, b| a == b)
    }

    /// Mask of the elements equal to `value`.
    pub fn eq_scalar(&self, value: T) -> Tensor<bool> {
        self.map(|a| a == value)
    }

    /// Mask of the elements identical to `value`, where NaN matches NaN.
    pub(crate) fn same_as_scalar(&self, value: T) -> Tensor<bool> {
        if value.is_nan() {
            self.map(|a| a.is_nan())
        } else {
            self.eq_scalar(value)
        }
    }
}

impl Tensor<bool> {
    /// Coordinates of all `true` elements, in row-major order.
    pub fn nonzero(&self) -> Vec<Vec<usize>> {
        let shape = self.shape();
        self.iter()
            .enumerate()
            .filter(|(_, flag)| *flag)
            .map(|(linear, _)| index_to_coord(linear, &shape))
            .collect()
    }

    /// Number of `true` elements.
    pub fn count_true(&self) -> usize {
        self.iter().filter(|flag| *flag).count()
    }
}

impl<T: Element> Tensor<T> {
    /// Converts a mask into a tensor of `T` ones and zeros.
    pub fn from_mask(mask: &Tensor<bool>, on: T, off: T) -> Tensor<T> {
        mask.map(|flag| if flag { on } else { off })
    }
}
