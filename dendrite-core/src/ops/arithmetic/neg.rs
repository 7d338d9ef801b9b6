use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, check_arity, Operation};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Default)]
pub struct Neg;

impl Operation for Neg {
    fn name(&self) -> &str {
        "Neg"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        Ok(inputs[0].mapv(|v| -v))
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        Ok(vec![grad_output.mapv(|g| -g)])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Neg
    }
}

pub fn neg_op(a: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Neg), &[a])
}
