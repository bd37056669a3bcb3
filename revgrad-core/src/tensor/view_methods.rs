// View operations: reshape/flatten reuse the storage order untouched, while
// transpose/slice re-alias the same node handles into a new layout. None of
// them copy values, so gradient flow into the source is unaffected.

use std::ops::Range;

use crate::error::RevGradError;
use crate::tensor::{Shape, Tensor};

impl Tensor {
    /// Reinterprets the storage under a new shape of the same total size.
    /// The result shares the same node identities in the same order.
    pub fn reshape(&self, shape: Shape) -> Result<Tensor, RevGradError> {
        if shape.size() != self.size() {
            return Err(RevGradError::ShapeMismatch {
                operation: "reshape".to_string(),
                lhs: self.shape().dims().to_vec(),
                rhs: shape.dims().to_vec(),
            });
        }
        Ok(Tensor::from_nodes(shape, self.nodes().to_vec()))
    }

    /// Reshape to rank 1.
    pub fn flatten(&self) -> Tensor {
        Tensor::from_nodes(Shape::new(vec![self.size()]), self.nodes().to_vec())
    }

    /// Rank-2 transpose. The result aliases the source nodes in transposed
    /// order.
    pub fn transpose(&self) -> Result<Tensor, RevGradError> {
        if self.shape().rank() != 2 {
            return Err(RevGradError::ShapeMismatch {
                operation: "transpose".to_string(),
                lhs: self.shape().dims().to_vec(),
                rhs: vec![],
            });
        }
        let rows = self.shape()[0];
        let cols = self.shape()[1];
        let mut nodes = Vec::with_capacity(self.size());
        for j in 0..cols {
            for i in 0..rows {
                nodes.push(self.nodes()[i * cols + j]);
            }
        }
        Ok(Tensor::from_nodes(Shape::new(vec![cols, rows]), nodes))
    }

    /// Half-open range per dimension. The result aliases the selected source
    /// nodes.
    pub fn slice(&self, ranges: &[Range<usize>]) -> Result<Tensor, RevGradError> {
        let dims = self.shape().dims();
        if ranges.len() != dims.len() {
            return Err(RevGradError::ShapeMismatch {
                operation: "slice".to_string(),
                lhs: dims.to_vec(),
                rhs: vec![ranges.len()],
            });
        }
        for (r, &d) in ranges.iter().zip(dims) {
            if r.start > r.end || r.end > d {
                return Err(RevGradError::IndexOutOfRange {
                    index: vec![r.start, r.end],
                    shape: dims.to_vec(),
                });
            }
        }
        let out_dims: Vec<usize> = ranges.iter().map(|r| r.end - r.start).collect();
        let out_shape = Shape::new(out_dims);
        let mut nodes = Vec::with_capacity(out_shape.size());
        for flat in 0..out_shape.size() {
            let coords = out_shape.unravel_index(flat)?;
            let mut src = 0;
            for ((c, r), &d) in coords.iter().zip(ranges).zip(dims) {
                src = src * d + (r.start + c);
            }
            nodes.push(self.nodes()[src]);
        }
        Ok(Tensor::from_nodes(out_shape, nodes))
    }
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::tensor::create;

    #[test]
    fn flatten_keeps_node_identity() {
        let mut g = Graph::new();
        let a = create::full(&mut g, Shape::new(vec![2, 3]), 5.0);
        let b = a.flatten();
        assert_eq!(b.shape(), &Shape::new(vec![6]));
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(b.value(&g, &[0]).unwrap(), 5.0);
    }

    #[test]
    fn reshape_round_trip_preserves_nodes_and_grads() {
        let mut g = Graph::new();
        let a = Tensor::from_values(&mut g, Shape::new(vec![2, 3]), &[1., 2., 3., 4., 5., 6.])
            .unwrap();
        let s = a.sum(&mut g);
        s.backward(&mut g);
        let b = a.reshape(Shape::new(vec![3, 2])).unwrap();
        let c = b.reshape(Shape::new(vec![2, 3])).unwrap();
        assert_eq!(c.nodes(), a.nodes());
        assert_eq!(c.values(&g), a.values(&g));
        assert_eq!(c.grads(&g), vec![1.0; 6]);
    }

    #[test]
    fn reshape_size_mismatch() {
        let mut g = Graph::new();
        let a = create::zeros(&mut g, Shape::new(vec![2, 3]));
        assert!(matches!(
            a.reshape(Shape::new(vec![4, 2])),
            Err(RevGradError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn transpose_reorders_aliases() {
        let mut g = Graph::new();
        let a = Tensor::from_values(&mut g, Shape::new(vec![2, 3]), &[1., 2., 3., 4., 5., 6.])
            .unwrap();
        let b = a.transpose().unwrap();
        assert_eq!(b.shape(), &Shape::new(vec![3, 2]));
        assert_eq!(b.values(&g), vec![1., 4., 2., 5., 3., 6.]);
        assert_eq!(b.value(&g, &[0, 1]).unwrap(), 4.0);
        // Same underlying node.
        assert_eq!(b.node(&[1, 0]).unwrap(), a.node(&[0, 1]).unwrap());
    }

    #[test]
    fn transpose_requires_rank_2() {
        let mut g = Graph::new();
        let a = create::zeros(&mut g, Shape::new(vec![2, 3, 4]));
        assert!(a.transpose().is_err());
    }

    #[test]
    fn slice_half_open_ranges() {
        let mut g = Graph::new();
        let a = Tensor::from_values(&mut g, Shape::new(vec![2, 3]), &[1., 2., 3., 4., 5., 6.])
            .unwrap();
        let b = a.slice(&[0..2, 1..3]).unwrap();
        assert_eq!(b.shape(), &Shape::new(vec![2, 2]));
        assert_eq!(b.values(&g), vec![2., 3., 5., 6.]);
        // Aliased, not copied: gradient flows into the source.
        let s = b.sum(&mut g);
        s.backward(&mut g);
        assert_eq!(a.grads(&g), vec![0., 1., 1., 0., 1., 1.]);
    }

    #[test]
    fn slice_errors() {
        let mut g = Graph::new();
        let a = create::zeros(&mut g, Shape::new(vec![2, 3]));
        assert!(matches!(
            a.slice(&[0..2]),
            Err(RevGradError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            a.slice(&[0..2, 1..4]),
            Err(RevGradError::IndexOutOfRange { .. })
        ));
    }
}
