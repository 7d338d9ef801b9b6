use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::activation::{sigmoid, ActivationKind};
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

/// `ln(1 + e^x)`
#[derive(Debug, Clone, Default)]
pub struct Softplus {
    input: Option<Buffer>,
}

impl Operation for Softplus {
    fn name(&self) -> &str {
        "Softplus"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let y = inputs[0].mapv(|v| v.exp().ln_1p());
        self.input = Some(inputs[0].clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let x = cached(&self.input, "Softplus")?;
        Ok(vec![grad_output * &sigmoid(x)])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Activation(ActivationKind::Softplus)
    }
}

pub fn softplus_op(a: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Softplus::default()), &[a])
}
