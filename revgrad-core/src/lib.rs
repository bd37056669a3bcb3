// Core crate of revgrad: the scalar computation graph, the iterative
// backward propagator, and the tensor layer built from scalar nodes.

pub mod error;
pub mod graph;
pub mod ops;
pub mod tensor;

pub use error::RevGradError;
pub use graph::{Graph, NodeId};
pub use tensor::{Shape, Tensor};
