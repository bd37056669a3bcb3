// Loss functions: thin differentiable reductions over core tensor ops.

use revgrad_core::tensor::create;
use revgrad_core::{Graph, RevGradError, Shape, Tensor};

/// Two tensors in, singleton tensor out.
pub trait Loss {
    fn compute(
        &self,
        graph: &mut Graph,
        prediction: &Tensor,
        target: &Tensor,
    ) -> Result<Tensor, RevGradError>;
}

/// Mean squared error: sum((p - t)²) / 2n over the flattened inputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MseLoss;

impl Loss for MseLoss {
    fn compute(
        &self,
        graph: &mut Graph,
        prediction: &Tensor,
        target: &Tensor,
    ) -> Result<Tensor, RevGradError> {
        if prediction.size() != target.size() {
            return Err(RevGradError::ShapeMismatch {
                operation: "mse".to_string(),
                lhs: prediction.shape().dims().to_vec(),
                rhs: target.shape().dims().to_vec(),
            });
        }
        let n = prediction.size();
        let p = prediction.flatten();
        let t = target.flatten();
        let diff = p.sub(graph, &t)?;
        let squared = diff.mul(graph, &diff)?;
        let total = squared.sum(graph);
        let denom = create::full(graph, Shape::new(vec![1]), 2.0 * n as f32);
        total.div(graph, &denom)
    }
}

/// Negative log-likelihood over (features, batch) log-probabilities and
/// one-hot targets: -mean(sum(target * prediction, axis 0)).
#[derive(Debug, Default, Clone, Copy)]
pub struct NllLoss;

impl Loss for NllLoss {
    fn compute(
        &self,
        graph: &mut Graph,
        prediction: &Tensor,
        target: &Tensor,
    ) -> Result<Tensor, RevGradError> {
        if prediction.shape() != target.shape() {
            return Err(RevGradError::ShapeMismatch {
                operation: "nll".to_string(),
                lhs: prediction.shape().dims().to_vec(),
                rhs: target.shape().dims().to_vec(),
            });
        }
        let batch = if prediction.shape().rank() == 2 {
            prediction.shape()[1]
        } else {
            1
        };
        let picked = target.mul(graph, prediction)?;
        let per_sample = picked.sum_axis(graph, 0)?;
        let total = per_sample.sum(graph);
        let denom = create::full(graph, Shape::new(vec![1]), batch as f32);
        let mean = total.div(graph, &denom)?;
        let zero = create::zeros(graph, Shape::new(vec![1]));
        zero.sub(graph, &mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mse_value_and_gradient() {
        let mut g = Graph::new();
        let p = Tensor::from_values(&mut g, Shape::new(vec![2]), &[0.5, 0.0]).unwrap();
        let t = Tensor::from_values(&mut g, Shape::new(vec![2]), &[1.0, 0.0]).unwrap();
        let loss = MseLoss.compute(&mut g, &p, &t).unwrap();
        assert_relative_eq!(loss.values(&g)[0], 0.0625);
        loss.backward(&mut g);
        assert_relative_eq!(p.grads(&g)[0], -0.25);
        assert_relative_eq!(p.grads(&g)[1], 0.0);
    }

    #[test]
    fn mse_size_mismatch() {
        let mut g = Graph::new();
        let p = Tensor::from_values(&mut g, Shape::new(vec![2]), &[0.5, 0.0]).unwrap();
        let t = Tensor::from_values(&mut g, Shape::new(vec![3]), &[1.0, 0.0, 0.0]).unwrap();
        assert!(MseLoss.compute(&mut g, &p, &t).is_err());
    }

    #[test]
    fn nll_picks_target_class() {
        let mut g = Graph::new();
        // Log-probabilities for 2 classes, 2 samples.
        let p = Tensor::from_values(
            &mut g,
            Shape::new(vec![2, 2]),
            &[-0.1, -2.0, -2.3, -0.14],
        )
        .unwrap();
        let t =
            Tensor::from_values(&mut g, Shape::new(vec![2, 2]), &[1., 0., 0., 1.]).unwrap();
        let loss = NllLoss.compute(&mut g, &p, &t).unwrap();
        // -( -0.1 + -0.14 ) / 2
        assert_relative_eq!(loss.values(&g)[0], 0.12, epsilon = 1e-6);
    }
}
