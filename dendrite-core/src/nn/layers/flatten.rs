use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{cached, check_arity, Operation};

/// Collapses every axis after the batch axis: `[N, d1, d2, ...] -> [N, d1*d2*...]`.
#[derive(Debug, Clone, Default)]
pub struct Flatten {
    input_shape: Option<Vec<usize>>,
}

impl Operation for Flatten {
    fn name(&self) -> &str {
        "Flatten"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let x = inputs[0];
        let batch = x.shape().first().copied().ok_or_else(|| DendriteError::DimensionMismatch {
            expected: 1,
            actual: 0,
            operation: "Flatten".to_string(),
        })?;
        let features: usize = x.shape()[1..].iter().product();
        let y = buffer::reshape(x, &[batch, features])?;
        self.input_shape = Some(x.shape().to_vec());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let shape = cached(&self.input_shape, "Flatten")?;
        Ok(vec![buffer::reshape(grad_output, shape)?])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Flatten
    }
}
