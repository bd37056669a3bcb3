// Activation functions, all expressed as compositions of the primitive
// scalar ops so their gradients need no separate formulas.

use crate::error::RevGradError;
use crate::graph::{Graph, NodeId};
use crate::tensor::{Shape, Tensor};

pub fn exp_op(graph: &mut Graph, tensor: &Tensor) -> Tensor {
    let nodes = tensor.nodes().iter().map(|&x| graph.exp(x)).collect();
    Tensor::from_nodes(tensor.shape().clone(), nodes)
}

pub fn relu_op(graph: &mut Graph, tensor: &Tensor) -> Tensor {
    let nodes = tensor.nodes().iter().map(|&x| graph.relu(x)).collect();
    Tensor::from_nodes(tensor.shape().clone(), nodes)
}

/// Numerically stable two-branch sigmoid.
///
/// For x > 0 computes 1/(1+exp(-x)); otherwise exp(x)/(1+exp(x)). Both
/// branches only ever exponentiate a non-positive argument, so exp cannot
/// overflow.
pub fn sigmoid_op(graph: &mut Graph, tensor: &Tensor) -> Tensor {
    let nodes = tensor
        .nodes()
        .iter()
        .map(|&x| {
            if graph.value(x) > 0.0 {
                let n = graph.neg(x);
                let e = graph.exp(n);
                let one = graph.leaf(1.0);
                let denom = graph.add(one, e);
                let one = graph.leaf(1.0);
                graph.div(one, denom)
            } else {
                let e = graph.exp(x);
                let one = graph.leaf(1.0);
                let denom = graph.add(one, e);
                graph.div(e, denom)
            }
        })
        .collect();
    Tensor::from_nodes(tensor.shape().clone(), nodes)
}

/// Interprets the tensor as columns: rank 2 is (features, batch), rank 1 is
/// a single column. Anything else is a shape mismatch.
fn columns(tensor: &Tensor, operation: &str) -> Result<(usize, usize), RevGradError> {
    match tensor.shape().dims() {
        [features] => Ok((*features, 1)),
        [features, batch] => Ok((*features, *batch)),
        dims => Err(RevGradError::ShapeMismatch {
            operation: operation.to_string(),
            lhs: dims.to_vec(),
            rhs: vec![],
        }),
    }
}

/// Per-column exp nodes and their fan-in sums.
fn column_exp_sums(
    graph: &mut Graph,
    tensor: &Tensor,
    features: usize,
    batch: usize,
) -> (Vec<Vec<NodeId>>, Vec<NodeId>) {
    let mut exps = Vec::with_capacity(batch);
    let mut sums = Vec::with_capacity(batch);
    for b in 0..batch {
        let col: Vec<NodeId> = (0..features)
            .map(|f| graph.exp(tensor.nodes()[f * batch + b]))
            .collect();
        sums.push(graph.sum_of(&col));
        exps.push(col);
    }
    (exps, sums)
}

/// Column-wise softmax: exp(x_f) / Σ_f exp(x_f) per batch column.
pub fn softmax_op(graph: &mut Graph, tensor: &Tensor) -> Result<Tensor, RevGradError> {
    let (features, batch) = columns(tensor, "softmax")?;
    let (exps, sums) = column_exp_sums(graph, tensor, features, batch);
    let mut nodes = Vec::with_capacity(tensor.size());
    for f in 0..features {
        for b in 0..batch {
            nodes.push(graph.div(exps[b][f], sums[b]));
        }
    }
    Ok(Tensor::from_nodes(tensor.shape().clone(), nodes))
}

/// Column-wise log-softmax, computed directly as x_f - ln(Σ_f exp(x_f)).
pub fn log_softmax_op(graph: &mut Graph, tensor: &Tensor) -> Result<Tensor, RevGradError> {
    let (features, batch) = columns(tensor, "log_softmax")?;
    let (_exps, sums) = column_exp_sums(graph, tensor, features, batch);
    let log_sums: Vec<NodeId> = sums.into_iter().map(|s| graph.ln(s)).collect();
    let mut nodes = Vec::with_capacity(tensor.size());
    for f in 0..features {
        for b in 0..batch {
            nodes.push(graph.sub(tensor.nodes()[f * batch + b], log_sums[b]));
        }
    }
    Ok(Tensor::from_nodes(tensor.shape().clone(), nodes))
}

// --- Tests ---
