//! Model compositions and the training driver.
//!
//! - [`Sequential`]: an ordered list of operations; backward is list reversal.
//! - [`GraphModel`]: a user-written [`Network`] evaluated define-by-run;
//!   backward is the general graph traversal.
//! - [`Trainer`]: forward, loss, backward and optimizer update per batch.

pub mod graph_model;
pub mod sequential;
pub mod trainer;

pub use graph_model::{GraphModel, Network};
pub use sequential::Sequential;
pub use trainer::{ensure_finite, Trainer};

use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::parameter::Parameter;
use crate::nn::regularizers::Regularizer;

/// Model-level contract consumed by training loops and checkpointing.
pub trait Model {
    /// Evaluates the model. `training` switches stochastic layers on.
    fn forward(&mut self, x: &Buffer, training: bool) -> Result<Buffer, DendriteError>;

    /// Back-propagates `grad_output` from the last forward, accumulating
    /// parameter gradients, and returns the gradient w.r.t. the input.
    fn backward(&mut self, grad_output: &Buffer) -> Result<Buffer, DendriteError>;

    /// Every parameter, in a stable layer order.
    fn parameters(&self) -> Vec<Parameter>;

    fn regularizers(&self) -> Vec<Regularizer> {
        Vec::new()
    }

    /// Overwrites parameter values in [`parameters`](Model::parameters)
    /// order, e.g. from a checkpoint. Gradients and optimizer state are not
    /// touched.
    ///
    /// # Errors
    /// * `ArityMismatch` if the number of buffers differs from the number of
    ///   parameters (nothing is written).
    /// * `ShapeMismatch` if a buffer does not match its parameter's shape.
    fn load_parameters(&self, values: &[Buffer]) -> Result<(), DendriteError> {
        let params = self.parameters();
        if params.len() != values.len() {
            return Err(DendriteError::ArityMismatch {
                operation: "load_parameters".to_string(),
                expected: params.len(),
                actual: values.len(),
            });
        }
        for (param, value) in params.iter().zip(values) {
            param.set_value(value.clone())?;
        }
        log::debug!("Loaded {} parameter buffers", values.len());
        Ok(())
    }
}
