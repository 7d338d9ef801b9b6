use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::ops::view::check_grad_shape;
use crate::tensor::Tensor;
use ndarray::{Axis, Slice};

/// Keeps the half-open range `start..end` of one axis.
#[derive(Debug, Clone)]
pub struct SliceAxis {
    axis: usize,
    start: usize,
    end: usize,
    input_shape: Option<Vec<usize>>,
}

impl SliceAxis {
    pub fn new(axis: usize, start: usize, end: usize) -> Self {
        SliceAxis {
            axis,
            start,
            end,
            input_shape: None,
        }
    }
}

impl Operation for SliceAxis {
    fn name(&self) -> &str {
        "SliceAxis"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let x = inputs[0];
        if self.axis >= x.ndim() || self.start > self.end || self.end > x.shape()[self.axis] {
            return Err(DendriteError::ShapeMismatch {
                expected: vec![self.axis, self.start, self.end],
                actual: x.shape().to_vec(),
                operation: "SliceAxis".to_string(),
            });
        }
        let y = x
            .slice_axis(Axis(self.axis), Slice::from(self.start..self.end))
            .to_owned();
        self.input_shape = Some(x.shape().to_vec());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let shape = cached(&self.input_shape, "SliceAxis")?;
        let mut expected = shape.clone();
        expected[self.axis] = self.end - self.start;
        check_grad_shape("SliceAxis", grad_output, &expected)?;
        let mut dx = buffer::zeros(shape);
        dx.slice_axis_mut(Axis(self.axis), Slice::from(self.start..self.end))
            .assign(grad_output);
        Ok(vec![dx])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::SliceAxis {
            axis: self.axis,
            start: self.start,
            end: self.end,
        }
    }
}

pub fn slice_op(a: &Tensor, axis: usize, start: usize, end: usize) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(SliceAxis::new(axis, start, end)), &[a])
}
