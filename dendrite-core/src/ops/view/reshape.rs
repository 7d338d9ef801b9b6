use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub struct Reshape {
    shape: Vec<usize>,
    input_shape: Option<Vec<usize>>,
}

impl Reshape {
    pub fn new(shape: Vec<usize>) -> Self {
        Reshape {
            shape,
            input_shape: None,
        }
    }
}

impl Operation for Reshape {
    fn name(&self) -> &str {
        "Reshape"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let y = buffer::reshape(inputs[0], &self.shape)?;
        self.input_shape = Some(inputs[0].shape().to_vec());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let shape = cached(&self.input_shape, "Reshape")?;
        Ok(vec![buffer::reshape(grad_output, shape)?])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Reshape {
            shape: self.shape.clone(),
        }
    }
}

pub fn reshape_op(a: &Tensor, shape: Vec<usize>) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Reshape::new(shape)), &[a])
}
