//! Optimizers for training neural networks.
//!
//! Every optimizer implements [`Optimizer`]: `update(params)` applies one
//! step to each parameter holding a gradient and resets that gradient.

pub mod adadelta;
pub mod adagrad;
pub mod adam;
pub mod nesterov;
pub mod optimizer_config;
pub mod optimizer_trait;
pub mod rmsprop;
pub mod rmsprop_graves;
pub mod sgd;

pub use adadelta::AdaDeltaOptimizer;
pub use adagrad::AdaGradOptimizer;
pub use adam::AdamOptimizer;
pub use nesterov::NesterovOptimizer;
pub use optimizer_config::OptimizerConfig;
pub use optimizer_trait::Optimizer;
pub use rmsprop::RmsPropOptimizer;
pub use rmsprop_graves::RmsPropGravesOptimizer;
pub use sgd::SgdOptimizer;

use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::parameter::ParamId;
use std::collections::HashMap;

/// Per-parameter auxiliary buffers, zero-initialised on first sight.
pub(crate) type ParamState = HashMap<ParamId, Buffer>;

pub(crate) fn state_entry<'a>(state: &'a mut ParamState, id: ParamId, shape: &[usize]) -> &'a mut Buffer {
    state.entry(id).or_insert_with(|| buffer::zeros(shape))
}

pub(crate) fn check_positive(optimizer: &str, name: &str, value: f32) -> Result<(), DendriteError> {
    if value.is_nan() || value <= 0.0 {
        return Err(DendriteError::ConfigurationError(format!(
            "{}: {} must be positive, got {}",
            optimizer, name, value
        )));
    }
    Ok(())
}

/// Decay rates must lie in `[0, 1)`.
pub(crate) fn check_decay(optimizer: &str, name: &str, value: f32) -> Result<(), DendriteError> {
    if !(0.0..1.0).contains(&value) {
        return Err(DendriteError::ConfigurationError(format!(
            "{}: {} must be in [0, 1), got {}",
            optimizer, name, value
        )));
    }
    Ok(())
}

pub(crate) fn check_grad_shape(optimizer: &str, value: &Buffer, grad: &Buffer) -> Result<(), DendriteError> {
    if value.shape() != grad.shape() {
        return Err(DendriteError::ShapeMismatch {
            expected: value.shape().to_vec(),
            actual: grad.shape().to_vec(),
            operation: format!("{} update", optimizer),
        });
    }
    Ok(())
}
