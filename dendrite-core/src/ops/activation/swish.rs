use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::activation::{sigmoid, ActivationKind};
use crate::ops::{apply_op, cached, check_arity, Operation};
use crate::tensor::Tensor;

/// `x * sigmoid(x)`
#[derive(Debug, Clone, Default)]
pub struct Swish {
    cache: Option<(Buffer, Buffer)>,
}

impl Operation for Swish {
    fn name(&self) -> &str {
        "Swish"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let s = sigmoid(inputs[0]);
        let y = inputs[0] * &s;
        self.cache = Some((y.clone(), s));
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        // y' = y + s * (1 - y)
        let (y, s) = cached(&self.cache, "Swish")?;
        let local = y + &(s * &y.mapv(|v| 1.0 - v));
        Ok(vec![grad_output * &local])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Activation(ActivationKind::Swish)
    }
}

pub fn swish_op(a: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Swish::default()), &[a])
}
