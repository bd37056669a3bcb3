// Finite-difference verification of the backward pass.

use approx::relative_eq;

use crate::graph::{Graph, NodeId};

/// Checks analytic gradients against central finite differences.
///
/// `f` builds an expression over the supplied leaves and returns its root
/// node. The expression is rebuilt in a fresh graph for every perturbed
/// evaluation, so `f` must be deterministic in the leaf values.
///
/// Returns `Err` with a description of the first disagreeing input, using a
/// relative tolerance (with `tolerance` also as the absolute epsilon for
/// near-zero gradients).
pub fn check_gradients<F>(
    f: F,
    inputs: &[f32],
    step: f32,
    tolerance: f32,
) -> Result<(), String>
where
    F: Fn(&mut Graph, &[NodeId]) -> NodeId,
{
    let eval = |values: &[f32]| -> f32 {
        let mut graph = Graph::new();
        let leaves: Vec<NodeId> = values.iter().map(|&v| graph.leaf(v)).collect();
        let root = f(&mut graph, &leaves);
        graph.value(root)
    };

    let mut graph = Graph::new();
    let leaves: Vec<NodeId> = inputs.iter().map(|&v| graph.leaf(v)).collect();
    let root = f(&mut graph, &leaves);
    graph.backward(root);
    let analytic: Vec<f32> = leaves.iter().map(|&id| graph.grad(id)).collect();

    let mut perturbed = inputs.to_vec();
    for i in 0..inputs.len() {
        perturbed[i] = inputs[i] + step;
        let plus = eval(&perturbed);
        perturbed[i] = inputs[i] - step;
        let minus = eval(&perturbed);
        perturbed[i] = inputs[i];

        let numeric = (plus - minus) / (2.0 * step);
        if !relative_eq!(
            analytic[i],
            numeric,
            epsilon = tolerance,
            max_relative = tolerance
        ) {
            return Err(format!(
                "gradient mismatch for input {}: analytic {} vs numeric {}",
                i, analytic[i], numeric
            ));
        }
    }
    Ok(())
}
