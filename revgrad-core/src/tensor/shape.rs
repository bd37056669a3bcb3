use std::ops::Index;

use crate::error::RevGradError;

/// An ordered sequence of dimension extents.
///
/// Immutable once constructed; a `Tensor` replaces its `Shape` wholesale on
/// reshape rather than mutating extents in place. Two shapes are equal iff
/// their extents match pairwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Total number of elements: the product of all extents (1 for an empty
    /// dimension list).
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Converts a flat row-major index into per-dimension coordinates.
    pub fn unravel_index(&self, index: usize) -> Result<Vec<usize>, RevGradError> {
        if index >= self.size() {
            return Err(RevGradError::IndexOutOfRange {
                index: vec![index],
                shape: self.dims.clone(),
            });
        }
        let mut coords = vec![0; self.rank()];
        let mut rest = index;
        for i in (0..self.rank()).rev() {
            coords[i] = rest % self.dims[i];
            rest /= self.dims[i];
        }
        Ok(coords)
    }

    /// Broadcast compatibility, matching dimensions from the right: each
    /// pair of aligned extents must be equal or contain a 1, with a shape of
    /// smaller rank treated as left-padded with 1s.
    pub fn broadcastable(&self, other: &Shape) -> bool {
        let max_rank = self.rank().max(other.rank());
        for i in 0..max_rank {
            let a = self
                .dims
                .get(self.rank().wrapping_sub(1 + i))
                .copied()
                .unwrap_or(1);
            let b = other
                .dims
                .get(other.rank().wrapping_sub(1 + i))
                .copied()
                .unwrap_or(1);
            if a != b && a != 1 && b != 1 {
                return false;
            }
        }
        true
    }

    /// Computes the broadcast result shape of two compatible shapes, failing
    /// with `ShapeMismatch` otherwise.
    pub fn broadcast(a: &Shape, b: &Shape) -> Result<Shape, RevGradError> {
        if !a.broadcastable(b) {
            return Err(RevGradError::ShapeMismatch {
                operation: "broadcast".to_string(),
                lhs: a.dims.clone(),
                rhs: b.dims.clone(),
            });
        }
        let max_rank = a.rank().max(b.rank());
        let mut dims = vec![0; max_rank];
        for i in 0..max_rank {
            let da = a
                .dims
                .get(a.rank().wrapping_sub(1 + i))
                .copied()
                .unwrap_or(1);
            let db = b
                .dims
                .get(b.rank().wrapping_sub(1 + i))
                .copied()
                .unwrap_or(1);
            dims[max_rank - 1 - i] = da.max(db);
        }
        Ok(Shape::new(dims))
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims.to_vec())
    }
}

impl Index<usize> for Shape {
    type Output = usize;

    fn index(&self, i: usize) -> &usize {
        &self.dims[i]
    }
}
