// Stochastic gradient descent with momentum.

use log::debug;

use revgrad_core::{Graph, NodeId};

use crate::Optimizer;

/// Per-parameter update rule: v = momentum·v − lr·grad; value += v.
///
/// Holds the flat parameter list (leaf node handles) and one velocity slot
/// per parameter. With momentum 0 this degenerates to plain gradient
/// descent.
#[derive(Debug)]
pub struct Sgd {
    params: Vec<NodeId>,
    learning_rate: f32,
    momentum: f32,
    velocity: Vec<f32>,
}

impl Sgd {
    /// Momentum defaults to 0.9.
    pub fn new(params: Vec<NodeId>, learning_rate: f32) -> Self {
        Self::with_momentum(params, learning_rate, 0.9)
    }

    pub fn with_momentum(params: Vec<NodeId>, learning_rate: f32, momentum: f32) -> Self {
        let velocity = vec![0.0; params.len()];
        Sgd {
            params,
            learning_rate,
            momentum,
            velocity,
        }
    }
}

impl Optimizer for Sgd {
    fn zero_grad(&self, graph: &mut Graph) {
        for &p in &self.params {
            graph.set_grad(p, 0.0);
        }
    }

    fn step(&mut self, graph: &mut Graph) {
        debug!("sgd step over {} parameters", self.params.len());
        for (i, &p) in self.params.iter().enumerate() {
            let v = self.momentum * self.velocity[i] - self.learning_rate * graph.grad(p);
            self.velocity[i] = v;
            let updated = graph.value(p) + v;
            graph.set_value(p, updated);
        }
    }
}
