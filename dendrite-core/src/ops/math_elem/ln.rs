use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

/// Elementwise natural logarithm.
#[derive(Debug, Clone, Default)]
pub struct Ln {
    input: Option<Buffer>,
}

impl Operation for Ln {
    fn name(&self) -> &str {
        "Ln"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let y = inputs[0].mapv(f32::ln);
        self.input = Some(inputs[0].clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let x = cached(&self.input, "Ln")?;
        Ok(vec![grad_output / x])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Ln
    }
}

pub fn ln_op(a: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Ln::default()), &[a])
}
