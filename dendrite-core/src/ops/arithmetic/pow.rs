use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

/// Raises every element to a fixed exponent.
#[derive(Debug, Clone)]
pub struct Pow {
    exponent: f32,
    input: Option<Buffer>,
}

impl Pow {
    pub fn new(exponent: f32) -> Self {
        Pow {
            exponent,
            input: None,
        }
    }

    pub fn exponent(&self) -> f32 {
        self.exponent
    }
}

impl Operation for Pow {
    fn name(&self) -> &str {
        "Pow"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let n = self.exponent;
        let y = inputs[0].mapv(|v| v.powf(n));
        self.input = Some(inputs[0].clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let x = cached(&self.input, "Pow")?;
        let n = self.exponent;
        Ok(vec![grad_output * &x.mapv(|v| n * v.powf(n - 1.0))])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Pow {
            exponent: self.exponent,
        }
    }
}

pub fn pow_op(a: &Tensor, exponent: f32) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Pow::new(exponent)), &[a])
}
