use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::activation::ActivationKind;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

/// Logistic function applied elementwise.
pub fn sigmoid(x: &Buffer) -> Buffer {
    x.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

#[derive(Debug, Clone, Default)]
pub struct Sigmoid {
    output: Option<Buffer>,
}

impl Operation for Sigmoid {
    fn name(&self) -> &str {
        "Sigmoid"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let y = sigmoid(inputs[0]);
        self.output = Some(y.clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let y = cached(&self.output, "Sigmoid")?;
        Ok(vec![grad_output * &y.mapv(|v| v * (1.0 - v))])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Activation(ActivationKind::Sigmoid)
    }
}

pub fn sigmoid_op(a: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Sigmoid::default()), &[a])
}
