use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::nn::losses::{check_loss_inputs, loss_gradients};
use crate::ops::{apply_op, cached, Operation};
use crate::tensor::Tensor;

/// `0.5 * sum((p - t)^2) / batch`
#[derive(Debug, Clone, Default)]
pub struct MeanSquaredError {
    delta: Option<Buffer>,
}

impl Operation for MeanSquaredError {
    fn name(&self) -> &str {
        "MeanSquaredError"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        let batch = check_loss_inputs(self.name(), inputs)? as f32;
        let diff = inputs[0] - inputs[1];
        let loss = 0.5 * diff.iter().map(|d| d * d).sum::<f32>() / batch;
        self.delta = Some(diff / batch);
        Ok(buffer::scalar(loss))
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        loss_gradients(cached(&self.delta, "MeanSquaredError")?, grad_output)
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::MeanSquaredError
    }
}

pub fn mse_op(prediction: &Tensor, target: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(MeanSquaredError::default()), &[prediction, target])
}
