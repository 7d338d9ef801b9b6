use crate::buffer::Buffer;
use crate::nn::parameter::Parameter;
use crate::ops::Operation;
use crate::tensor::Tensor;
use std::fmt::{self, Debug};

/// The creator link of a non-leaf tensor: the operation instance that produced
/// it and the ordered input tensors that operation consumed.
pub struct Creator {
    pub(crate) op: Box<dyn Operation>,
    pub(crate) inputs: Vec<Tensor>,
}

impl Debug for Creator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creator")
            .field("op", &self.op.name())
            .field("inputs", &self.inputs.len())
            .finish()
    }
}

/// Internal state shared by all clones of a [`Tensor`].
#[derive(Debug)]
pub struct TensorData {
    pub(crate) value: Buffer,
    /// Gradient accumulator, only populated on leaves during backward.
    pub(crate) grad: Option<Buffer>,
    pub(crate) creator: Option<Creator>,
    /// Set once a backward pass has taken this node's creator. A consumed node
    /// is not a leaf and must not be reached by another traversal.
    pub(crate) consumed: bool,
    /// Set when the leaf stands for a learnable parameter.
    pub(crate) param: Option<Parameter>,
}

impl TensorData {
    pub(crate) fn leaf(value: Buffer) -> Self {
        TensorData {
            value,
            grad: None,
            creator: None,
            consumed: false,
            param: None,
        }
    }
}
