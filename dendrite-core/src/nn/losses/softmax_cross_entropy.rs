use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::nn::losses::{check_loss_inputs, loss_gradients, EPSILON};
use crate::ops::{apply_op, cached, Operation};
use crate::tensor::Tensor;
use ndarray::Axis;

/// Softmax over the last axis, shifted by the row maximum for stability.
pub fn softmax(x: &Buffer) -> Buffer {
    let last = Axis(x.ndim().saturating_sub(1));
    let max = x.map_axis(last, |row| row.fold(f32::NEG_INFINITY, |m, &v| m.max(v)));
    let shifted = x - &max.insert_axis(last);
    let exp = shifted.mapv(f32::exp);
    let sum = exp.sum_axis(last).insert_axis(last);
    exp / &sum
}

/// Cross entropy of `softmax(logits)` against one-hot (or soft) targets:
/// `-sum(t * ln(p + eps)) / batch`.
#[derive(Debug, Clone, Default)]
pub struct SoftmaxCrossEntropy {
    delta: Option<Buffer>,
}

impl Operation for SoftmaxCrossEntropy {
    fn name(&self) -> &str {
        "SoftmaxCrossEntropy"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        let batch = check_loss_inputs(self.name(), inputs)? as f32;
        let (logits, t) = (inputs[0], inputs[1]);
        if logits.ndim() == 0 {
            return Err(DendriteError::DimensionMismatch {
                expected: 2,
                actual: 0,
                operation: self.name().to_string(),
            });
        }
        let p = softmax(logits);
        let loss = -p
            .iter()
            .zip(t.iter())
            .map(|(&p, &t)| t * (p + EPSILON).ln())
            .sum::<f32>()
            / batch;
        self.delta = Some((&p - t) / batch);
        Ok(buffer::scalar(loss))
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        loss_gradients(cached(&self.delta, "SoftmaxCrossEntropy")?, grad_output)
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::SoftmaxCrossEntropy
    }
}

pub fn softmax_cross_entropy_op(logits: &Tensor, target: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(SoftmaxCrossEntropy::default()), &[logits, target])
}
