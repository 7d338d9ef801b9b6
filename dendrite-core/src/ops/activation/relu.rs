use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::activation::ActivationKind;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Default)]
pub struct Relu {
    input: Option<Buffer>,
}

impl Operation for Relu {
    fn name(&self) -> &str {
        "Relu"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let y = inputs[0].mapv(|v| v.max(0.0));
        self.input = Some(inputs[0].clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let x = cached(&self.input, "Relu")?;
        Ok(vec![grad_output * &x.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 })])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Activation(ActivationKind::Relu)
    }
}

/// ReLU with slope `alpha` for negative inputs (0.3 by default).
#[derive(Debug, Clone)]
pub struct LeakyRelu {
    alpha: f32,
    input: Option<Buffer>,
}

impl LeakyRelu {
    pub fn new(alpha: f32) -> Self {
        LeakyRelu { alpha, input: None }
    }
}

impl Default for LeakyRelu {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl Operation for LeakyRelu {
    fn name(&self) -> &str {
        "LeakyRelu"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let alpha = self.alpha;
        let y = inputs[0].mapv(|v| if v > 0.0 { v } else { alpha * v });
        self.input = Some(inputs[0].clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let x = cached(&self.input, "LeakyRelu")?;
        let alpha = self.alpha;
        Ok(vec![grad_output * &x.mapv(|v| if v > 0.0 { 1.0 } else { alpha })])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Activation(ActivationKind::LeakyRelu { alpha: self.alpha })
    }
}

pub fn relu_op(a: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Relu::default()), &[a])
}

pub fn leaky_relu_op(a: &Tensor, alpha: f32) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(LeakyRelu::new(alpha)), &[a])
}
