// Elementwise binary operations with broadcasting.

use crate::error::RevGradError;
use crate::graph::{Graph, NodeId};
use crate::tensor::{Shape, Tensor};

/// Maps result coordinates to a flat offset in an operand of `dims`,
/// right-aligning the ranks and pinning size-1 dimensions to coordinate 0.
fn operand_index(coords: &[usize], dims: &[usize]) -> usize {
    let rank_diff = coords.len() - dims.len();
    let mut flat = 0;
    for (i, &d) in dims.iter().enumerate() {
        let c = if d == 1 { 0 } else { coords[rank_diff + i] };
        flat = flat * d + c;
    }
    flat
}

/// Shared skeleton for the elementwise binary ops: computes the broadcast
/// result shape, then builds one result node per output element from the
/// coordinate-mapped operand nodes.
fn broadcast_binary<F>(
    graph: &mut Graph,
    a: &Tensor,
    b: &Tensor,
    operation: &str,
    mut op: F,
) -> Result<Tensor, RevGradError>
where
    F: FnMut(&mut Graph, NodeId, NodeId) -> NodeId,
{
    let shape = Shape::broadcast(a.shape(), b.shape()).map_err(|_| {
        RevGradError::ShapeMismatch {
            operation: operation.to_string(),
            lhs: a.shape().dims().to_vec(),
            rhs: b.shape().dims().to_vec(),
        }
    })?;
    let mut nodes = Vec::with_capacity(shape.size());
    for flat in 0..shape.size() {
        let coords = shape.unravel_index(flat)?;
        let x = a.nodes()[operand_index(&coords, a.shape().dims())];
        let y = b.nodes()[operand_index(&coords, b.shape().dims())];
        nodes.push(op(graph, x, y));
    }
    Ok(Tensor::from_nodes(shape, nodes))
}

pub fn add_op(graph: &mut Graph, a: &Tensor, b: &Tensor) -> Result<Tensor, RevGradError> {
    broadcast_binary(graph, a, b, "add", |g, x, y| g.add(x, y))
}

pub fn sub_op(graph: &mut Graph, a: &Tensor, b: &Tensor) -> Result<Tensor, RevGradError> {
    broadcast_binary(graph, a, b, "sub", |g, x, y| g.sub(x, y))
}

pub fn mul_op(graph: &mut Graph, a: &Tensor, b: &Tensor) -> Result<Tensor, RevGradError> {
    broadcast_binary(graph, a, b, "mul", |g, x, y| g.mul(x, y))
}

pub fn div_op(graph: &mut Graph, a: &Tensor, b: &Tensor) -> Result<Tensor, RevGradError> {
    broadcast_binary(graph, a, b, "div", |g, x, y| g.div(x, y))
}

#[cfg(test)]
#[path = "arithmetic_test.rs"]
mod tests;
