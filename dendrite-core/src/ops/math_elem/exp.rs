use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

/// Elementwise `e^x`. Backward reuses the cached output.
#[derive(Debug, Clone, Default)]
pub struct Exp {
    output: Option<Buffer>,
}

impl Operation for Exp {
    fn name(&self) -> &str {
        "Exp"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let y = inputs[0].mapv(f32::exp);
        self.output = Some(y.clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let y = cached(&self.output, "Exp")?;
        Ok(vec![grad_output * y])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Exp
    }
}

pub fn exp_op(a: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Exp::default()), &[a])
}
