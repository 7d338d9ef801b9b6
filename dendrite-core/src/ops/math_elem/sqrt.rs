use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Default)]
pub struct Sqrt {
    output: Option<Buffer>,
}

impl Operation for Sqrt {
    fn name(&self) -> &str {
        "Sqrt"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let y = inputs[0].mapv(f32::sqrt);
        self.output = Some(y.clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        // d sqrt(x) = 1 / (2 sqrt(x))
        let y = cached(&self.output, "Sqrt")?;
        Ok(vec![grad_output / &y.mapv(|v| 2.0 * v)])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Sqrt
    }
}

pub fn sqrt_op(a: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Sqrt::default()), &[a])
}
