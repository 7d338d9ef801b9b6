use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::arithmetic::{broadcast_pair, BroadcastPair};
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::broadcast_utils::sum_to;
use crate::tensor::Tensor;

/// Elementwise multiplication with broadcasting.
#[derive(Debug, Clone, Default)]
pub struct Mul {
    pair: Option<BroadcastPair>,
}

impl Operation for Mul {
    fn name(&self) -> &str {
        "Mul"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 2)?;
        let pair = broadcast_pair(inputs[0], inputs[1])?;
        let y = &pair.a * &pair.b;
        self.pair = Some(pair);
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let pair = cached(&self.pair, "Mul")?;
        let da = grad_output * &pair.b;
        let db = grad_output * &pair.a;
        Ok(vec![sum_to(&da, &pair.a_shape)?, sum_to(&db, &pair.b_shape)?])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Mul
    }
}

pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Mul::default()), &[a, b])
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
