use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::activation::ActivationKind;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

/// Exponential linear unit: `x` for positive inputs, `alpha * (e^x - 1)` otherwise.
#[derive(Debug, Clone)]
pub struct Elu {
    alpha: f32,
    input: Option<Buffer>,
}

impl Elu {
    pub fn new(alpha: f32) -> Self {
        Elu { alpha, input: None }
    }
}

impl Default for Elu {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Operation for Elu {
    fn name(&self) -> &str {
        "Elu"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let alpha = self.alpha;
        let y = inputs[0].mapv(|v| if v >= 0.0 { v } else { alpha * (v.exp() - 1.0) });
        self.input = Some(inputs[0].clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let x = cached(&self.input, "Elu")?;
        let alpha = self.alpha;
        Ok(vec![grad_output * &x.mapv(|v| if v >= 0.0 { 1.0 } else { alpha * v.exp() })])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Activation(ActivationKind::Elu { alpha: self.alpha })
    }
}

pub fn elu_op(a: &Tensor, alpha: f32) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Elu::new(alpha)), &[a])
}
