use std::cmp::max;

use crate::error::ReductGradError;

/// Calculates the contiguous (row-major) strides for a given shape.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Determines the output shape resulting from broadcasting two input shapes.
///
/// Follows NumPy/PyTorch broadcasting rules:
/// 1. If the shapes have different numbers of dimensions, prepend 1s to the shorter shape.
/// 2. Compare dimensions element-wise from right to left.
/// 3. Dimensions are compatible if they are equal, or one of them is 1.
pub fn broadcast_shapes(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>, ReductGradError> {
    let rank_a = shape_a.len();
    let rank_b = shape_b.len();
    let max_rank = max(rank_a, rank_b);
    let mut result_shape = vec![0; max_rank];

    for i in 0..max_rank {
        let dim_a = shape_a.get(rank_a.wrapping_sub(1 + i)).copied().unwrap_or(1);
        let dim_b = shape_b.get(rank_b.wrapping_sub(1 + i)).copied().unwrap_or(1);

        result_shape[max_rank - 1 - i] = if dim_a == dim_b {
            dim_a
        } else if dim_a == 1 {
            dim_b
        } else if dim_b == 1 {
            dim_a
        } else {
            return Err(ReductGradError::BroadcastError {
                shape1: shape_a.to_vec(),
                shape2: shape_b.to_vec(),
            });
        };
    }
    Ok(result_shape)
}

/// Converts a row-major linear index into coordinates for `shape`.
pub fn index_to_coord(index: usize, shape: &[usize]) -> Vec<usize> {
    let mut coord = vec![0; shape.len()];
    let mut remaining = index;
    for dim in (0..shape.len()).rev() {
        let size = shape[dim];
        if size > 0 {
            coord[dim] = remaining % size;
            remaining /= size;
        }
    }
    coord
}

/// Normalises a possibly negative dimension index against `rank`.
///
/// `-1` refers to the last axis. Fails with `InvalidAxis` when out of range.
pub fn normalize_dim(dim: isize, rank: usize) -> Result<usize, ReductGradError> {
    let rank_i = rank as isize;
    let resolved = if dim < 0 { dim + rank_i } else { dim };
    if resolved < 0 || resolved >= rank_i {
        return Err(ReductGradError::InvalidAxis { axis: dim, rank });
    }
    Ok(resolved as usize)
}

/// Splits `shape` around `dim` into (outer, dim_size, inner) element counts.
///
/// A row-major buffer for `shape` is then addressed as
/// `outer_idx * dim_size * inner + k * inner + inner_idx`.
pub(crate) fn split_at_dim(shape: &[usize], dim: usize) -> (usize, usize, usize) {
    let outer: usize = shape[..dim].iter().product();
    let inner: usize = shape[dim + 1..].iter().product();
    (outer, shape[dim], inner)
}

/// Output shape of a per-axis reduction of `shape` along `dim`.
///
/// With `keep_dim` the reduced axis stays as size 1. Without it the axis is removed,
/// except for rank-1 inputs which keep a single element (`[1]`) rather than becoming 0-d.
pub fn reduced_shape(shape: &[usize], dim: usize, keep_dim: bool) -> Vec<usize> {
    let mut out = shape.to_vec();
    if keep_dim || shape.len() == 1 {
        out[dim] = 1;
    } else {
        out.remove(dim);
    }
    out
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
