use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, cached, Operation};
use crate::tensor::Tensor;
use ndarray::{stack, Axis};

/// Stacks equally-shaped inputs along a new axis.
#[derive(Debug, Clone)]
pub struct Stack {
    axis: usize,
    count: Option<usize>,
}

impl Stack {
    pub fn new(axis: usize) -> Self {
        Stack { axis, count: None }
    }
}

impl Operation for Stack {
    fn name(&self) -> &str {
        "Stack"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        let first = inputs.first().ok_or_else(|| DendriteError::ArityMismatch {
            operation: "Stack".to_string(),
            expected: 1,
            actual: 0,
        })?;
        if self.axis > first.ndim() {
            return Err(DendriteError::DimensionMismatch {
                expected: self.axis,
                actual: first.ndim(),
                operation: "Stack".to_string(),
            });
        }
        if let Some(x) = inputs.iter().find(|x| x.shape() != first.shape()) {
            return Err(DendriteError::ShapeMismatch {
                expected: first.shape().to_vec(),
                actual: x.shape().to_vec(),
                operation: "Stack".to_string(),
            });
        }
        let views: Vec<_> = inputs.iter().map(|x| x.view()).collect();
        let y = stack(Axis(self.axis), &views)?;
        self.count = Some(inputs.len());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let count = *cached(&self.count, "Stack")?;
        Ok((0..count)
            .map(|i| grad_output.index_axis(Axis(self.axis), i).to_owned())
            .collect())
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Stack { axis: self.axis }
    }
}

pub fn stack_op(inputs: &[&Tensor], axis: usize) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Stack::new(axis)), inputs)
}
