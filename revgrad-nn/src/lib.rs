// Collaborator layers around revgrad-core: a parameter-owning layer
// container, loss functions, and the update rule. These are capability
// seams, not an inheritance hierarchy: anything exposing parameters and a
// forward function can be trained.

pub mod linear;
pub mod loss;
pub mod sgd;

pub use linear::Linear;
pub use loss::{Loss, MseLoss, NllLoss};
pub use sgd::Sgd;

use revgrad_core::{Graph, NodeId, RevGradError, Tensor};

/// A parameter provider with a differentiable forward function.
pub trait Module {
    fn forward(&self, graph: &mut Graph, input: &Tensor) -> Result<Tensor, RevGradError>;

    /// The flat list of leaf nodes the optimizer updates.
    fn parameters(&self) -> Vec<NodeId>;
}

/// An update rule over a flat list of parameter leaves.
pub trait Optimizer {
    /// Zeroes the accumulated gradient of every parameter.
    fn zero_grad(&self, graph: &mut Graph);

    /// Applies one update step from the current gradients.
    fn step(&mut self, graph: &mut Graph);
}
