//! Dendrite: a define-by-run automatic differentiation engine with
//! recurrent layers (SimpleRNN, LSTM, GRU) trained through time and a family
//! of first-order optimizers keyed by parameter identity.

pub mod autograd;
pub mod buffer;
pub mod error;
pub mod model;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

// Re-export the types most callers touch directly.
pub use buffer::Buffer;
pub use error::DendriteError;
pub use model::{GraphModel, Model, Network, Sequential, Trainer};
pub use nn::{LayerConfig, Parameter};
pub use ops::Operation;
pub use optim::{Optimizer, OptimizerConfig};
pub use tensor::Tensor;
// Re-export traits required by public functions/structs
pub use num_traits;
