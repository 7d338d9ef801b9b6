use thiserror::Error;

/// Custom error type for the Dendrite framework.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum DendriteError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Dimension mismatch in {operation}: expected rank {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Operation {operation} expected {expected} tensors, got {actual}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },

    #[error("Backward called on a tensor without a creator (graph leaf).")]
    MissingCreator,

    #[error("Computation graph integrity violated: {0}")]
    GraphIntegrity(String),

    #[error("Backward of {operation} called before a successful forward.")]
    BackwardBeforeForward { operation: String },

    #[error("Numeric divergence: loss value is {value}")]
    NumericDivergence { value: f32 },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Buffer layout error: {0}")]
    BufferLayout(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<ndarray::ShapeError> for DendriteError {
    fn from(err: ndarray::ShapeError) -> Self {
        DendriteError::BufferLayout(err.to_string())
    }
}
