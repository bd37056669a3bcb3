// Matrix multiply.

use crate::error::RevGradError;
use crate::graph::Graph;
use crate::tensor::{Shape, Tensor};

/// Promotes a 1-D operand to rank 2: the left operand becomes a row vector,
/// the right a column vector. Flat storage order is unchanged.
fn promoted_dims(dims: &[usize], as_row: bool) -> Option<(usize, usize)> {
    match dims.len() {
        1 if as_row => Some((1, dims[0])),
        1 => Some((dims[0], 1)),
        2 => Some((dims[0], dims[1])),
        _ => None,
    }
}

/// Output element (i, j) is a sum of products over the shared dimension;
/// gradient correctness follows from the elementwise mul/sum rules alone.
pub fn matmul_op(graph: &mut Graph, a: &Tensor, b: &Tensor) -> Result<Tensor, RevGradError> {
    let mismatch = || RevGradError::ShapeMismatch {
        operation: "matmul".to_string(),
        lhs: a.shape().dims().to_vec(),
        rhs: b.shape().dims().to_vec(),
    };
    let (rows_a, cols_a) = promoted_dims(a.shape().dims(), true).ok_or_else(mismatch)?;
    let (rows_b, cols_b) = promoted_dims(b.shape().dims(), false).ok_or_else(mismatch)?;
    if cols_a != rows_b {
        return Err(mismatch());
    }

    let mut nodes = Vec::with_capacity(rows_a * cols_b);
    let mut products = Vec::with_capacity(cols_a);
    for i in 0..rows_a {
        for j in 0..cols_b {
            products.clear();
            for k in 0..cols_a {
                let x = a.nodes()[i * cols_a + k];
                let y = b.nodes()[k * cols_b + j];
                products.push(graph.mul(x, y));
            }
            nodes.push(graph.sum_of(&products));
        }
    }
    Ok(Tensor::from_nodes(Shape::new(vec![rows_a, cols_b]), nodes))
}

// --- Tests ---
