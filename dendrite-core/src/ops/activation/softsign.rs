use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::activation::ActivationKind;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

/// `x / (1 + |x|)`
#[derive(Debug, Clone, Default)]
pub struct Softsign {
    input: Option<Buffer>,
}

impl Operation for Softsign {
    fn name(&self) -> &str {
        "Softsign"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let y = inputs[0].mapv(|v| v / (1.0 + v.abs()));
        self.input = Some(inputs[0].clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let x = cached(&self.input, "Softsign")?;
        Ok(vec![grad_output * &x.mapv(|v| 1.0 / (1.0 + v.abs()).powi(2))])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Activation(ActivationKind::Softsign)
    }
}

pub fn softsign_op(a: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Softsign::default()), &[a])
}
