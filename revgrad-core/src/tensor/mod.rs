// The tensor layer: a flat, row-major sequence of scalar nodes tagged with
// a Shape. Every operation is expressed purely in terms of graph node
// operations, so differentiability falls out of the scalar rules.

pub mod create;
pub mod shape;
mod view_methods;

pub use shape::Shape;

use crate::error::RevGradError;
use crate::graph::{Graph, NodeId};
use crate::ops;

/// A dense N-dimensional array of scalar graph nodes.
///
/// The storage holds `NodeId` handles into a [`Graph`]; cloning a `Tensor`
/// aliases the same nodes (same values, same gradients). The tensor itself
/// owns no float data: reads and writes go through the graph that allocated
/// its nodes. Tensor lifetime and graph-generation lifetime are independent;
/// a tensor whose nodes were released by a graph reset is invalid.
#[derive(Debug, Clone)]
pub struct Tensor {
    shape: Shape,
    nodes: Vec<NodeId>,
}

impl Tensor {
    /// Builds a tensor of fresh leaf nodes from row-major `values`.
    ///
    /// Fails with `ShapeMismatch` if `values.len() != shape.size()`.
    pub fn from_values(
        graph: &mut Graph,
        shape: Shape,
        values: &[f32],
    ) -> Result<Self, RevGradError> {
        if values.len() != shape.size() {
            return Err(RevGradError::ShapeMismatch {
                operation: "from_values".to_string(),
                lhs: shape.dims().to_vec(),
                rhs: vec![values.len()],
            });
        }
        let nodes = values.iter().map(|&v| graph.leaf(v)).collect();
        Ok(Tensor { shape, nodes })
    }

    /// Wraps existing node handles in a tensor. Internal: callers must
    /// guarantee `nodes.len() == shape.size()`.
    pub(crate) fn from_nodes(shape: Shape, nodes: Vec<NodeId>) -> Self {
        debug_assert_eq!(nodes.len(), shape.size());
        Tensor { shape, nodes }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// The underlying node handles in row-major order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Row-major flat offset for a full coordinate tuple, with bounds checks.
    fn flat_index(&self, idxs: &[usize]) -> Result<usize, RevGradError> {
        let out_of_range = || RevGradError::IndexOutOfRange {
            index: idxs.to_vec(),
            shape: self.shape.dims().to_vec(),
        };
        if idxs.len() != self.shape.rank() {
            return Err(out_of_range());
        }
        let mut flat = 0;
        for (&i, &d) in idxs.iter().zip(self.shape.dims()) {
            if i >= d {
                return Err(out_of_range());
            }
            flat = flat * d + i;
        }
        Ok(flat)
    }

    /// The scalar node at the given coordinates.
    pub fn node(&self, idxs: &[usize]) -> Result<NodeId, RevGradError> {
        Ok(self.nodes[self.flat_index(idxs)?])
    }

    pub fn value(&self, graph: &Graph, idxs: &[usize]) -> Result<f32, RevGradError> {
        Ok(graph.value(self.node(idxs)?))
    }

    pub fn grad(&self, graph: &Graph, idxs: &[usize]) -> Result<f32, RevGradError> {
        Ok(graph.grad(self.node(idxs)?))
    }

    /// Replaces the node at the given coordinates with a fresh leaf,
    /// discarding any graph history recorded at that slot.
    pub fn set(
        &mut self,
        graph: &mut Graph,
        idxs: &[usize],
        value: f32,
    ) -> Result<(), RevGradError> {
        let flat = self.flat_index(idxs)?;
        self.nodes[flat] = graph.leaf(value);
        Ok(())
    }

    pub fn values(&self, graph: &Graph) -> Vec<f32> {
        self.nodes.iter().map(|&id| graph.value(id)).collect()
    }

    pub fn grads(&self, graph: &Graph) -> Vec<f32> {
        self.nodes.iter().map(|&id| graph.grad(id)).collect()
    }

    // --- Backward ---

    /// Backward pass seeded with 1 at every element.
    pub fn backward(&self, graph: &mut Graph) {
        for &id in &self.nodes {
            graph.backward_seeded(id, 1.0);
        }
    }

    /// Backward pass with one seed gradient per element, row-major.
    pub fn backward_seeded(
        &self,
        graph: &mut Graph,
        seeds: &[f32],
    ) -> Result<(), RevGradError> {
        if seeds.len() != self.size() {
            return Err(RevGradError::ShapeMismatch {
                operation: "backward_seeded".to_string(),
                lhs: self.shape.dims().to_vec(),
                rhs: vec![seeds.len()],
            });
        }
        for (&id, &seed) in self.nodes.iter().zip(seeds) {
            graph.backward_seeded(id, seed);
        }
        Ok(())
    }

    // --- Elementwise arithmetic ---

    pub fn add(&self, graph: &mut Graph, other: &Tensor) -> Result<Tensor, RevGradError> {
        ops::arithmetic::add_op(graph, self, other)
    }

    pub fn sub(&self, graph: &mut Graph, other: &Tensor) -> Result<Tensor, RevGradError> {
        ops::arithmetic::sub_op(graph, self, other)
    }

    pub fn mul(&self, graph: &mut Graph, other: &Tensor) -> Result<Tensor, RevGradError> {
        ops::arithmetic::mul_op(graph, self, other)
    }

    pub fn div(&self, graph: &mut Graph, other: &Tensor) -> Result<Tensor, RevGradError> {
        ops::arithmetic::div_op(graph, self, other)
    }

    // --- Linear algebra ---

    pub fn matmul(&self, graph: &mut Graph, other: &Tensor) -> Result<Tensor, RevGradError> {
        ops::linalg::matmul_op(graph, self, other)
    }

    // --- Reductions ---

    /// Sum of all elements, as a singleton tensor.
    pub fn sum(&self, graph: &mut Graph) -> Tensor {
        ops::reduction::sum_op(graph, self)
    }

    /// Sum along one axis; the reduced axis is removed from the shape.
    pub fn sum_axis(&self, graph: &mut Graph, axis: usize) -> Result<Tensor, RevGradError> {
        ops::reduction::sum_axis_op(graph, self, axis)
    }

    /// Maximum of all elements, as a singleton tensor. Tied maxima split the
    /// incoming gradient equally.
    pub fn max(&self, graph: &mut Graph) -> Tensor {
        ops::reduction::max_op(graph, self)
    }

    /// Maximum along one axis; the reduced axis is removed from the shape.
    pub fn max_axis(&self, graph: &mut Graph, axis: usize) -> Result<Tensor, RevGradError> {
        ops::reduction::max_axis_op(graph, self, axis)
    }

    // --- Activations ---

    pub fn exp(&self, graph: &mut Graph) -> Tensor {
        ops::activation::exp_op(graph, self)
    }

    pub fn relu(&self, graph: &mut Graph) -> Tensor {
        ops::activation::relu_op(graph, self)
    }

    pub fn sigmoid(&self, graph: &mut Graph) -> Tensor {
        ops::activation::sigmoid_op(graph, self)
    }

    /// Column-wise softmax over a (features, batch) tensor; rank-1 input is
    /// treated as a single column.
    pub fn softmax(&self, graph: &mut Graph) -> Result<Tensor, RevGradError> {
        ops::activation::softmax_op(graph, self)
    }

    /// Column-wise log-softmax, computed directly for stability.
    pub fn log_softmax(&self, graph: &mut Graph) -> Result<Tensor, RevGradError> {
        ops::activation::log_softmax_op(graph, self)
    }
}

// --- Tests ---
