//! Selection reductions: each lane is reduced to one of its own elements, and the
//! position of that element along the reduced axis is reported next to the value.

use std::cmp::Ordering;

use crate::error::ReductGradError;
use crate::tensor::Tensor;
use crate::types::Numeric;

/// Orders floats with NaN sorting after every number.
fn nan_last_cmp<T: Numeric>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b)
        .unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Lane positions sorted by value; equal values keep their original order.
fn stable_argsort<T: Numeric>(lane: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..lane.len()).collect();
    order.sort_by(|&i, &j| nan_last_cmp(&lane[i], &lane[j]));
    order
}

/// First position holding the extreme value under `better`; a NaN wins immediately.
fn first_extreme<T: Numeric>(lane: &[T], better: impl Fn(T, T) -> bool) -> usize {
    let mut best = 0;
    for (i, &x) in lane.iter().enumerate() {
        if x.is_nan() {
            return i;
        }
        if better(x, lane[best]) {
            best = i;
        }
    }
    best
}

pub(crate) fn pick_max<T: Numeric>(lane: &[T]) -> usize {
    first_extreme(lane, |x, best| x > best)
}

pub(crate) fn pick_min<T: Numeric>(lane: &[T]) -> usize {
    first_extreme(lane, |x, best| x < best)
}

/// Lower median (`(n - 1) / 2`-th smallest).
pub(crate) fn pick_median<T: Numeric>(lane: &[T]) -> usize {
    stable_argsort(lane)[(lane.len() - 1) / 2]
}

/// `k`-th smallest value, 1-based.
pub(crate) fn pick_kth<T: Numeric>(lane: &[T], k: usize) -> Result<usize, ReductGradError> {
    if k == 0 || k > lane.len() {
        return Err(ReductGradError::InvalidArgument(format!(
            "kthvalue: k = {} out of range for a dimension of size {}",
            k,
            lane.len()
        )));
    }
    Ok(stable_argsort(lane)[k - 1])
}

/// Most frequent value; ties go to the smallest value, reported at its last occurrence.
pub(crate) fn pick_mode<T: Numeric>(lane: &[T]) -> usize {
    let order = stable_argsort(lane);
    let mut best_pos = order[0];
    let mut best_count = 0;
    let mut run_start = 0;
    while run_start < order.len() {
        let value = lane[order[run_start]];
        let mut run_end = run_start + 1;
        while run_end < order.len() && lane[order[run_end]] == value {
            run_end += 1;
        }
        let count = run_end - run_start;
        if count > best_count {
            best_count = count;
            best_pos = order[run_end - 1];
        }
        run_start = run_end;
    }
    best_pos
}

impl<T: Numeric> Tensor<T> {
    fn select_lanes<F>(
        &self,
        dim: usize,
        keep_dim: bool,
        operation: &str,
        mut pick: F,
    ) -> Result<(Tensor<T>, Tensor<i64>), ReductGradError>
    where
        F: FnMut(&[T]) -> Result<usize, ReductGradError>,
    {
        let mut values = Vec::new();
        let indices = self.reduce_lanes(dim, keep_dim, |lane| {
            if lane.is_empty() {
                return Err(ReductGradError::EmptyReduction {
                    operation: operation.to_string(),
                });
            }
            let position = pick(lane)?;
            values.push(lane[position]);
            Ok(position as i64)
        })?;
        let values = Tensor::new(values, indices.shape())?;
        Ok((values, indices))
    }

    fn select_all<F>(&self, operation: &str, pick: F) -> Result<T, ReductGradError>
    where
        F: Fn(&[T]) -> usize,
    {
        let data = self.to_vec();
        if data.is_empty() {
            return Err(ReductGradError::EmptyReduction {
                operation: operation.to_string(),
            });
        }
        Ok(data[pick(&data)])
    }

    /// Largest element (NaN if any element is NaN).
    pub fn max_all(&self) -> Result<T, ReductGradError> {
        self.select_all("max_all", pick_max)
    }

    /// Smallest element (NaN if any element is NaN).
    pub fn min_all(&self) -> Result<T, ReductGradError> {
        self.select_all("min_all", pick_min)
    }

    pub fn max_dim(&self, dim: usize, keep_dim: bool) -> Result<(Tensor<T>, Tensor<i64>), ReductGradError> {
        self.select_lanes(dim, keep_dim, "max_dim", |lane| Ok(pick_max(lane)))
    }

    pub fn min_dim(&self, dim: usize, keep_dim: bool) -> Result<(Tensor<T>, Tensor<i64>), ReductGradError> {
        self.select_lanes(dim, keep_dim, "min_dim", |lane| Ok(pick_min(lane)))
    }

    pub fn mode_dim(&self, dim: usize, keep_dim: bool) -> Result<(Tensor<T>, Tensor<i64>), ReductGradError> {
        self.select_lanes(dim, keep_dim, "mode_dim", |lane| Ok(pick_mode(lane)))
    }

    pub fn median_dim(&self, dim: usize, keep_dim: bool) -> Result<(Tensor<T>, Tensor<i64>), ReductGradError> {
        self.select_lanes(dim, keep_dim, "median_dim", |lane| Ok(pick_median(lane)))
    }

    pub fn kthvalue_dim(
        &self,
        k: usize,
        dim: usize,
        keep_dim: bool,
    ) -> Result<(Tensor<T>, Tensor<i64>), ReductGradError> {
        self.select_lanes(dim, keep_dim, "kthvalue_dim", |lane| pick_kth(lane, k))
    }
}

#[cfg(test)]
#[path = "selection_methods_test.rs"]
mod tests;
