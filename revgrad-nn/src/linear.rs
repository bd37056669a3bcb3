// Fully connected layer.

use rand::Rng;

use revgrad_core::tensor::create;
use revgrad_core::{Graph, NodeId, RevGradError, Shape, Tensor};

use crate::Module;

/// A fully connected layer: y = W x + b over column-major batches.
///
/// Input is (in_features, batch); output is (out_features, batch). The
/// weight is He-initialized by fan-in, the bias starts at zero. Both are
/// leaf tensors and must be allocated before the training generation mark so
/// they survive graph resets.
#[derive(Debug, Clone)]
pub struct Linear {
    pub weights: Tensor,
    pub bias: Tensor,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    pub fn new<R: Rng + ?Sized>(
        graph: &mut Graph,
        in_features: usize,
        out_features: usize,
        rng: &mut R,
    ) -> Self {
        let weights = create::rand_he(
            graph,
            Shape::new(vec![out_features, in_features]),
            in_features,
            rng,
        );
        let bias = create::zeros(graph, Shape::new(vec![out_features, 1]));
        Linear {
            weights,
            bias,
            in_features,
            out_features,
        }
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    fn forward(&self, graph: &mut Graph, input: &Tensor) -> Result<Tensor, RevGradError> {
        let product = self.weights.matmul(graph, input)?;
        product.add(graph, &self.bias)
    }

    fn parameters(&self) -> Vec<NodeId> {
        let mut params = self.weights.nodes().to_vec();
        params.extend_from_slice(self.bias.nodes());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn forward_applies_weights_and_bias() {
        let mut g = Graph::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut layer = Linear::new(&mut g, 2, 2, &mut rng);
        // Overwrite the random init with a known matrix.
        for (i, v) in [1.0, 2.0, 3.0, 4.0].iter().enumerate() {
            g.set_value(layer.weights.nodes()[i], *v);
        }
        layer.bias.set(&mut g, &[0, 0], 0.5).unwrap();
        layer.bias.set(&mut g, &[1, 0], -0.5).unwrap();

        let x = Tensor::from_values(&mut g, Shape::new(vec![2, 1]), &[10., 20.]).unwrap();
        let y = layer.forward(&mut g, &x).unwrap();
        assert_eq!(y.shape(), &Shape::new(vec![2, 1]));
        assert_eq!(y.values(&g), vec![50.5, 109.5]);
    }

    #[test]
    fn bias_broadcasts_across_batch() {
        let mut g = Graph::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut layer = Linear::new(&mut g, 1, 2, &mut rng);
        g.set_value(layer.weights.nodes()[0], 0.0);
        g.set_value(layer.weights.nodes()[1], 0.0);
        layer.bias.set(&mut g, &[0, 0], 1.0).unwrap();
        layer.bias.set(&mut g, &[1, 0], 2.0).unwrap();

        let x = Tensor::from_values(&mut g, Shape::new(vec![1, 3]), &[5., 6., 7.]).unwrap();
        let y = layer.forward(&mut g, &x).unwrap();
        // Every column receives the same per-feature bias.
        assert_eq!(y.values(&g), vec![1., 1., 1., 2., 2., 2.]);
    }

    #[test]
    fn parameters_cover_weights_and_bias() {
        let mut g = Graph::new();
        let mut rng = StdRng::seed_from_u64(1);
        let layer = Linear::new(&mut g, 3, 4, &mut rng);
        assert_eq!(layer.parameters().len(), 3 * 4 + 4);
    }
}
