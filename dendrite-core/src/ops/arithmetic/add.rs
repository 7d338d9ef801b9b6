use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::arithmetic::broadcast_pair;
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::broadcast_utils::sum_to;
use crate::tensor::Tensor;

/// Elementwise addition with broadcasting.
#[derive(Debug, Clone, Default)]
pub struct Add {
    shapes: Option<(Vec<usize>, Vec<usize>)>,
}

impl Operation for Add {
    fn name(&self) -> &str {
        "Add"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 2)?;
        let pair = broadcast_pair(inputs[0], inputs[1])?;
        let y = &pair.a + &pair.b;
        self.shapes = Some((pair.a_shape, pair.b_shape));
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let (a_shape, b_shape) = cached(&self.shapes, "Add")?;
        Ok(vec![sum_to(grad_output, a_shape)?, sum_to(grad_output, b_shape)?])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Add
    }
}

/// Adds two tensors, broadcasting as needed.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Add::default()), &[a, b])
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
