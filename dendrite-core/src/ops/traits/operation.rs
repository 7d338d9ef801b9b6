use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::nn::parameter::Parameter;
use crate::nn::regularizers::Regularizer;
use crate::tensor::Tensor;
use std::fmt::Debug;

/// Defines the forward/backward contract shared by every layer and operation.
///
/// An operation may own parameters (shared handles) and may cache whatever its
/// backward needs. The cache belongs to one forward/backward pair: it is only
/// replaced by a successful forward.
///
/// Gradients with respect to owned parameters are accumulated into those
/// parameters during `backward`; only gradients with respect to the inputs are
/// returned.
pub trait Operation: OperationClone + Debug + Send + Sync {
    /// Short identifier used in errors and logs.
    fn name(&self) -> &str;

    /// Computes the output from `inputs` and records the backward state.
    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError>;

    /// Returns one gradient per forward input, each shaped exactly like that
    /// input, in forward order.
    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError>;

    /// Owned parameters, in a stable order.
    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    fn regularizers(&self) -> Vec<Regularizer> {
        Vec::new()
    }

    /// Switches stochastic behaviour (dropout) between training and inference.
    fn set_training(&mut self, _training: bool) {}

    /// Freezes or unfreezes every owned parameter.
    fn set_trainable(&mut self, trainable: bool) {
        for param in self.parameters() {
            param.set_trainable(trainable);
        }
    }

    /// Tagged description sufficient to rebuild an equivalent operation.
    fn config(&self) -> LayerConfig;

    /// Invokes a copy of this operation on tensors, recording it as the
    /// creator of the result. The copy shares this operation's parameters.
    fn call(&self, inputs: &[&Tensor]) -> Result<Tensor, DendriteError> {
        apply_op(self.boxed_clone(), inputs)
    }
}

/// Object-safe cloning for boxed operations.
pub trait OperationClone {
    fn boxed_clone(&self) -> Box<dyn Operation>;
}

impl<T> OperationClone for T
where
    T: 'static + Operation + Clone,
{
    fn boxed_clone(&self) -> Box<dyn Operation> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Operation> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Runs `op` forward on the values of `inputs` and returns the output tensor
/// tagged with its creator link.
pub fn apply_op(mut op: Box<dyn Operation>, inputs: &[&Tensor]) -> Result<Tensor, DendriteError> {
    let values: Vec<Buffer> = inputs.iter().map(|t| t.value()).collect();
    let refs: Vec<&Buffer> = values.iter().collect();
    let output = op.forward(&refs)?;
    log::trace!("{} forward -> {:?}", op.name(), output.shape());
    Ok(Tensor::with_creator(
        output,
        op,
        inputs.iter().map(|t| (*t).clone()).collect(),
    ))
}
