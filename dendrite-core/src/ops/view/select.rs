use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::ops::view::check_grad_shape;
use crate::tensor::Tensor;
use ndarray::Axis;

/// Picks one index of an axis, removing that axis (e.g. timestep `t` of a
/// `[batch, time, features]` sequence).
#[derive(Debug, Clone)]
pub struct Select {
    axis: usize,
    index: usize,
    input_shape: Option<Vec<usize>>,
}

impl Select {
    pub fn new(axis: usize, index: usize) -> Self {
        Select {
            axis,
            index,
            input_shape: None,
        }
    }
}

impl Operation for Select {
    fn name(&self) -> &str {
        "Select"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let x = inputs[0];
        if self.axis >= x.ndim() || self.index >= x.shape()[self.axis] {
            return Err(DendriteError::ShapeMismatch {
                expected: vec![self.axis, self.index],
                actual: x.shape().to_vec(),
                operation: "Select".to_string(),
            });
        }
        let y = x.index_axis(Axis(self.axis), self.index).to_owned();
        self.input_shape = Some(x.shape().to_vec());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let shape = cached(&self.input_shape, "Select")?;
        let mut expected = shape.clone();
        expected.remove(self.axis);
        check_grad_shape("Select", grad_output, &expected)?;
        let mut dx = buffer::zeros(shape);
        dx.index_axis_mut(Axis(self.axis), self.index)
            .assign(grad_output);
        Ok(vec![dx])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Select {
            axis: self.axis,
            index: self.index,
        }
    }
}

pub fn select_op(a: &Tensor, axis: usize, index: usize) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Select::new(axis, index)), &[a])
}
