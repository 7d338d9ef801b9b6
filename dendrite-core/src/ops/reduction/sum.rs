use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::reduction::{check_axis, expand_reduced};
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;
use ndarray::Axis;

/// Sum along `axis`, optionally keeping it with size 1.
#[derive(Debug, Clone)]
pub struct Sum {
    axis: usize,
    keepdims: bool,
    input_shape: Option<Vec<usize>>,
}

impl Sum {
    pub fn new(axis: usize, keepdims: bool) -> Self {
        Sum {
            axis,
            keepdims,
            input_shape: None,
        }
    }
}

impl Operation for Sum {
    fn name(&self) -> &str {
        "Sum"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let x = inputs[0];
        check_axis("Sum", x, self.axis)?;
        let mut y = x.sum_axis(Axis(self.axis));
        if self.keepdims {
            y = y.insert_axis(Axis(self.axis));
        }
        self.input_shape = Some(x.shape().to_vec());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let shape = cached(&self.input_shape, "Sum")?;
        Ok(vec![expand_reduced(grad_output, shape, self.axis, self.keepdims)?])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Sum {
            axis: self.axis,
            keepdims: self.keepdims,
        }
    }
}

pub fn sum_op(a: &Tensor, axis: usize, keepdims: bool) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Sum::new(axis, keepdims)), &[a])
}
