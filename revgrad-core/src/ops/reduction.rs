// Sum and max reductions, full and per-axis.

use crate::error::RevGradError;
use crate::graph::{Graph, NodeId};
use crate::tensor::{Shape, Tensor};

/// Shape left after removing `axis`; a rank-1 input reduces to a singleton.
fn reduced_shape(dims: &[usize], axis: usize) -> Shape {
    let mut out: Vec<usize> = dims.to_vec();
    out.remove(axis);
    if out.is_empty() {
        out.push(1);
    }
    Shape::new(out)
}

/// Applies `reduce` to every reduction group along `axis`, producing one
/// output node per retained index, in row-major output order.
fn reduce_axis<F>(
    graph: &mut Graph,
    tensor: &Tensor,
    axis: usize,
    operation: &str,
    mut reduce: F,
) -> Result<Tensor, RevGradError>
where
    F: FnMut(&mut Graph, &[NodeId]) -> NodeId,
{
    let dims = tensor.shape().dims();
    if axis >= dims.len() {
        return Err(RevGradError::ShapeMismatch {
            operation: operation.to_string(),
            lhs: dims.to_vec(),
            rhs: vec![axis],
        });
    }
    let axis_len = dims[axis];
    let inner: usize = dims[axis + 1..].iter().product();
    let outer: usize = dims[..axis].iter().product();

    let mut nodes = Vec::with_capacity(outer * inner);
    let mut group = Vec::with_capacity(axis_len);
    for o in 0..outer {
        for i in 0..inner {
            group.clear();
            for k in 0..axis_len {
                group.push(tensor.nodes()[o * axis_len * inner + k * inner + i]);
            }
            nodes.push(reduce(graph, &group));
        }
    }
    Ok(Tensor::from_nodes(reduced_shape(dims, axis), nodes))
}

/// Sum of all elements as a singleton tensor; each input receives one
/// backward edge of weight 1.
pub fn sum_op(graph: &mut Graph, tensor: &Tensor) -> Tensor {
    let node = graph.sum_of(tensor.nodes());
    Tensor::from_nodes(Shape::new(vec![1]), vec![node])
}

pub fn sum_axis_op(
    graph: &mut Graph,
    tensor: &Tensor,
    axis: usize,
) -> Result<Tensor, RevGradError> {
    reduce_axis(graph, tensor, axis, "sum_axis", |g, group| g.sum_of(group))
}

/// Maximum of all elements as a singleton tensor; inputs tied at the
/// maximum split the incoming gradient equally.
pub fn max_op(graph: &mut Graph, tensor: &Tensor) -> Tensor {
    let node = graph.max_of(tensor.nodes());
    Tensor::from_nodes(Shape::new(vec![1]), vec![node])
}

pub fn max_axis_op(
    graph: &mut Graph,
    tensor: &Tensor,
    axis: usize,
) -> Result<Tensor, RevGradError> {
    reduce_axis(graph, tensor, axis, "max_axis", |g, group| g.max_of(group))
}

#[cfg(test)]
#[path = "reduction_test.rs"]
mod tests;
