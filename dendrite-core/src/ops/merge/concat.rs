use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, cached, Operation};
use crate::tensor::Tensor;
use ndarray::{concatenate, Axis, Slice};

/// Joins inputs along an existing axis (the feature axis, 1, by default).
#[derive(Debug, Clone)]
pub struct Concatenate {
    axis: usize,
    sizes: Option<Vec<usize>>,
}

impl Concatenate {
    pub fn new(axis: usize) -> Self {
        Concatenate { axis, sizes: None }
    }
}

impl Default for Concatenate {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Operation for Concatenate {
    fn name(&self) -> &str {
        "Concatenate"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        let first = inputs.first().ok_or_else(|| DendriteError::ArityMismatch {
            operation: "Concatenate".to_string(),
            expected: 1,
            actual: 0,
        })?;
        if self.axis >= first.ndim() {
            return Err(DendriteError::DimensionMismatch {
                expected: self.axis + 1,
                actual: first.ndim(),
                operation: "Concatenate".to_string(),
            });
        }
        for x in inputs.iter().skip(1) {
            let compatible = x.ndim() == first.ndim()
                && x.shape()
                    .iter()
                    .zip(first.shape())
                    .enumerate()
                    .all(|(i, (a, b))| i == self.axis || a == b);
            if !compatible {
                return Err(DendriteError::ShapeMismatch {
                    expected: first.shape().to_vec(),
                    actual: x.shape().to_vec(),
                    operation: "Concatenate".to_string(),
                });
            }
        }
        let views: Vec<_> = inputs.iter().map(|x| x.view()).collect();
        let y = concatenate(Axis(self.axis), &views)?;
        self.sizes = Some(inputs.iter().map(|x| x.shape()[self.axis]).collect());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let sizes = cached(&self.sizes, "Concatenate")?;
        let mut start = 0;
        let mut grads = Vec::with_capacity(sizes.len());
        for &size in sizes {
            let part = grad_output.slice_axis(Axis(self.axis), Slice::from(start..start + size));
            grads.push(part.to_owned());
            start += size;
        }
        Ok(grads)
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Concatenate { axis: self.axis }
    }
}

pub fn concat_op(inputs: &[&Tensor], axis: usize) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Concatenate::new(axis)), inputs)
}
