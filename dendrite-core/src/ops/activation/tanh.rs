use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::activation::ActivationKind;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Default)]
pub struct Tanh {
    output: Option<Buffer>,
}

impl Operation for Tanh {
    fn name(&self) -> &str {
        "Tanh"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let y = inputs[0].mapv(f32::tanh);
        self.output = Some(y.clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let y = cached(&self.output, "Tanh")?;
        Ok(vec![grad_output * &y.mapv(|v| 1.0 - v * v)])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Activation(ActivationKind::Tanh)
    }
}

pub fn tanh_op(a: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Tanh::default()), &[a])
}
