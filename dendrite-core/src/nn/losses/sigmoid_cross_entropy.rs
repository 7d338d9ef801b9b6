use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::nn::losses::{check_loss_inputs, loss_gradients, EPSILON};
use crate::ops::activation::sigmoid;
use crate::ops::{apply_op, cached, Operation};
use crate::tensor::Tensor;

/// Binary cross entropy of `sigmoid(logits)`:
/// `-sum(t * ln(p + eps) + (1 - t) * ln(1 - p + eps)) / batch`.
#[derive(Debug, Clone, Default)]
pub struct SigmoidCrossEntropy {
    delta: Option<Buffer>,
}

impl Operation for SigmoidCrossEntropy {
    fn name(&self) -> &str {
        "SigmoidCrossEntropy"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        let batch = check_loss_inputs(self.name(), inputs)? as f32;
        let p = sigmoid(inputs[0]);
        let t = inputs[1];
        let loss = -p
            .iter()
            .zip(t.iter())
            .map(|(&p, &t)| t * (p + EPSILON).ln() + (1.0 - t) * (1.0 - p + EPSILON).ln())
            .sum::<f32>()
            / batch;
        self.delta = Some((&p - t) / batch);
        Ok(buffer::scalar(loss))
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        loss_gradients(cached(&self.delta, "SigmoidCrossEntropy")?, grad_output)
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::SigmoidCrossEntropy
    }
}

pub fn sigmoid_cross_entropy_op(logits: &Tensor, target: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(SigmoidCrossEntropy::default()), &[logits, target])
}
