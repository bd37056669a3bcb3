use thiserror::Error;

/// Custom error type for the revgrad engine.
///
/// Structural violations are the only recoverable errors the core reports;
/// numerical issues (division by zero, ln of a non-positive value, overflow)
/// deliberately propagate as IEEE infinities/NaNs through node values and
/// gradients.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq/Clone for easier testing
pub enum RevGradError {
    #[error("Shape mismatch during {operation}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        operation: String,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },

    #[error("Index {index:?} out of range for shape {shape:?}")]
    IndexOutOfRange {
        index: Vec<usize>,
        shape: Vec<usize>,
    },
}
