//! Iteration helpers walking a strided layout in logical (row-major) order.

/// Iterator over the physical buffer offsets of a strided layout, in row-major logical order.
///
/// Uses an N-dimensional counter so that views (non-contiguous strides, stride-0 broadcast
/// dimensions, non-zero offsets) are read in the same order as a contiguous tensor would be.
#[derive(Debug, Clone)]
pub struct StridedOffsetIter<'a> {
    shape: &'a [usize],
    strides: &'a [usize],
    coords: Vec<usize>,
    current_offset: usize,
    remaining: usize,
}

impl<'a> StridedOffsetIter<'a> {
    pub fn new(shape: &'a [usize], strides: &'a [usize], offset: usize) -> Self {
        let remaining = shape.iter().product();
        StridedOffsetIter {
            shape,
            strides,
            coords: vec![0; shape.len()],
            current_offset: offset,
            remaining,
        }
    }
}

impl<'a> Iterator for StridedOffsetIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.current_offset;
        self.remaining -= 1;

        if self.remaining > 0 {
            // Increment coordinates (N-dimensional counter logic)
            let mut dim = self.shape.len();
            while dim > 0 {
                dim -= 1;
                self.coords[dim] += 1;
                self.current_offset += self.strides[dim];
                if self.coords[dim] < self.shape[dim] {
                    break;
                }
                self.current_offset -= self.coords[dim] * self.strides[dim];
                self.coords[dim] = 0;
            }
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> ExactSizeIterator for StridedOffsetIter<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_order() {
        let shape = [2, 3];
        let strides = [3, 1];
        let offsets: Vec<usize> = StridedOffsetIter::new(&shape, &strides, 0).collect();
        assert_eq!(offsets, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_transposed_order() {
        // A [3, 2] view over a [2, 3] buffer.
        let shape = [3, 2];
        let strides = [1, 3];
        let offsets: Vec<usize> = StridedOffsetIter::new(&shape, &strides, 0).collect();
        assert_eq!(offsets, vec![0, 3, 1, 4, 2, 5]);
    }

    #[test]
    fn test_broadcast_and_offset() {
        let shape = [2, 3];
        let strides = [0, 1];
        let offsets: Vec<usize> = StridedOffsetIter::new(&shape, &strides, 4).collect();
        assert_eq!(offsets, vec![4, 5, 6, 4, 5, 6]);
    }

    #[test]
    fn test_scalar_and_empty() {
        let offsets: Vec<usize> = StridedOffsetIter::new(&[], &[], 2).collect();
        assert_eq!(offsets, vec![2]);
        let shape = [2, 0];
        let strides = [0, 1];
        assert_eq!(StridedOffsetIter::new(&shape, &strides, 0).count(), 0);
    }
}
