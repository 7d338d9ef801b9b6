//! Loss functions.
//!
//! A loss is an operation on `[prediction, target]` returning a 0-d scalar.
//! Its backward yields `grad * (p - t) / batch` for the prediction, where `p`
//! is the prediction after the loss's own output activation, and zeros for the
//! target.

pub mod mse;
pub mod sigmoid_cross_entropy;
pub mod softmax_cross_entropy;

pub use mse::{mse_op, MeanSquaredError};
pub use sigmoid_cross_entropy::{sigmoid_cross_entropy_op, SigmoidCrossEntropy};
pub use softmax_cross_entropy::{softmax, softmax_cross_entropy_op, SoftmaxCrossEntropy};

use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::ops::check_arity;

/// Floor added inside logarithms.
pub const EPSILON: f32 = 1e-7;

/// Validates `[prediction, target]` and returns the batch size.
pub(crate) fn check_loss_inputs(operation: &str, inputs: &[&Buffer]) -> Result<usize, DendriteError> {
    check_arity(operation, inputs, 2)?;
    let (p, t) = (inputs[0], inputs[1]);
    if p.shape() != t.shape() {
        return Err(DendriteError::ShapeMismatch {
            expected: p.shape().to_vec(),
            actual: t.shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    Ok(p.shape().first().copied().unwrap_or(1).max(1))
}

/// Backward shared by every loss: the `(p - t) / batch` term scaled by the
/// scalar upstream gradient, plus a zero gradient for the target.
pub(crate) fn loss_gradients(delta: &Buffer, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
    let scale = buffer::to_scalar(grad_output)?;
    Ok(vec![delta * scale, buffer::zeros(delta.shape())])
}

#[cfg(test)]
#[path = "losses_test.rs"]
mod tests;
