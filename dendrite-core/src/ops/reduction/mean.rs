use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::reduction::{check_axis, expand_reduced};
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;
use ndarray::Axis;

/// Mean along `axis`, optionally keeping it with size 1.
#[derive(Debug, Clone)]
pub struct Mean {
    axis: usize,
    keepdims: bool,
    input_shape: Option<Vec<usize>>,
}

impl Mean {
    pub fn new(axis: usize, keepdims: bool) -> Self {
        Mean {
            axis,
            keepdims,
            input_shape: None,
        }
    }
}

impl Operation for Mean {
    fn name(&self) -> &str {
        "Mean"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let x = inputs[0];
        check_axis("Mean", x, self.axis)?;
        let n = x.shape()[self.axis] as f32;
        let mut y = x.sum_axis(Axis(self.axis)) / n;
        if self.keepdims {
            y = y.insert_axis(Axis(self.axis));
        }
        self.input_shape = Some(x.shape().to_vec());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let shape = cached(&self.input_shape, "Mean")?;
        let n = shape[self.axis] as f32;
        let spread = expand_reduced(grad_output, shape, self.axis, self.keepdims)?;
        Ok(vec![spread / n])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Mean {
            axis: self.axis,
            keepdims: self.keepdims,
        }
    }
}

pub fn mean_op(a: &Tensor, axis: usize, keepdims: bool) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Mean::new(axis, keepdims)), &[a])
}
