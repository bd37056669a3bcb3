// Tensor creation helpers.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::graph::Graph;
use crate::tensor::{Shape, Tensor};

/// Creates a tensor of fresh leaves, all holding `value`.
pub fn full(graph: &mut Graph, shape: Shape, value: f32) -> Tensor {
    let nodes = (0..shape.size()).map(|_| graph.leaf(value)).collect();
    Tensor::from_nodes(shape, nodes)
}

/// Creates a tensor of fresh zero leaves.
pub fn zeros(graph: &mut Graph, shape: Shape) -> Tensor {
    full(graph, shape, 0.0)
}

/// Creates a tensor of leaves drawn uniformly from [0, 0.1).
pub fn rand_uniform<R: Rng + ?Sized>(graph: &mut Graph, shape: Shape, rng: &mut R) -> Tensor {
    let dist = Uniform::new(0.0f32, 0.1);
    let nodes = (0..shape.size())
        .map(|_| graph.leaf(dist.sample(rng)))
        .collect();
    Tensor::from_nodes(shape, nodes)
}

/// Creates a tensor of leaves drawn from the He (Kaiming-normal)
/// distribution: N(0, sqrt(2 / fan_in)).
pub fn rand_he<R: Rng + ?Sized>(
    graph: &mut Graph,
    shape: Shape,
    fan_in: usize,
    rng: &mut R,
) -> Tensor {
    let std_dev = (2.0 / fan_in as f32).sqrt();
    let nodes = (0..shape.size())
        .map(|_| {
            let z: f32 = StandardNormal.sample(rng);
            graph.leaf(z * std_dev)
        })
        .collect();
    Tensor::from_nodes(shape, nodes)
}
