// Trains a tiny feed-forward network on a two-class toy problem: samples
// with the first feature set belong to class 1, samples with the second
// feature set to class 0.

use rand::rngs::StdRng;
use rand::SeedableRng;

use revgrad_core::{Graph, NodeId, RevGradError, Shape, Tensor};
use revgrad_nn::{Linear, Loss, Module, MseLoss, Optimizer, Sgd};

struct Net {
    l1: Linear,
    l2: Linear,
    l3: Linear,
}

impl Net {
    fn new(graph: &mut Graph, rng: &mut StdRng) -> Self {
        Net {
            l1: Linear::new(graph, 2, 8, rng),
            l2: Linear::new(graph, 8, 4, rng),
            l3: Linear::new(graph, 4, 1, rng),
        }
    }
}

impl Module for Net {
    fn forward(&self, graph: &mut Graph, input: &Tensor) -> Result<Tensor, RevGradError> {
        let y = self.l1.forward(graph, input)?;
        let y = y.relu(graph);
        let y = self.l2.forward(graph, &y)?;
        let y = y.relu(graph);
        let y = self.l3.forward(graph, &y)?;
        Ok(y.sigmoid(graph))
    }

    fn parameters(&self) -> Vec<NodeId> {
        let mut params = self.l1.parameters();
        params.extend(self.l2.parameters());
        params.extend(self.l3.parameters());
        params
    }
}

fn main() -> Result<(), RevGradError> {
    let mut graph = Graph::new();
    let mut rng = StdRng::seed_from_u64(42);

    // Samples stored row-wise, transposed into (features, batch).
    #[rustfmt::skip]
    let samples = Tensor::from_values(
        &mut graph,
        Shape::new(vec![8, 2]),
        &[
            1., 0.,
            1., 0.,
            1., 0.,
            1., 0.,
            0., 1.,
            0., 1.,
            0., 1.,
            0., 1.,
        ],
    )?;
    let x = samples.transpose()?;
    let labels = Tensor::from_values(
        &mut graph,
        Shape::new(vec![8]),
        &[1., 1., 1., 1., 0., 0., 0., 0.],
    )?;

    let net = Net::new(&mut graph, &mut rng);
    let mse = MseLoss;
    let mut sgd = Sgd::new(net.parameters(), 0.1);

    // Everything above survives resets; everything below is rebuilt each
    // iteration.
    let mark = graph.mark();

    for iteration in 0..=500 {
        let prediction = net.forward(&mut graph, &x)?.flatten();
        let loss = mse.compute(&mut graph, &prediction, &labels)?;

        sgd.zero_grad(&mut graph);
        loss.backward(&mut graph);
        sgd.step(&mut graph);

        if iteration % 100 == 0 {
            println!("iteration {:3}: loss {:.6}", iteration, loss.values(&graph)[0]);
            println!("  prediction: {:?}", prediction.values(&graph));
        }
        graph.reset(mark);
    }

    Ok(())
}
