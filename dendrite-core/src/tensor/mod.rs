// src/tensor/mod.rs

use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::parameter::Parameter;
use crate::tensor_data::{Creator, TensorData};
use crate::ops::Operation;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod autograd_methods;
pub mod broadcast_utils;

/// A value flowing through the computation graph.
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally: clones are cheap handles
/// to the same node, so one tensor can feed several downstream operations and
/// the graph traversal can recognise it as a single fan-in point.
#[derive(Clone)]
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a leaf tensor from row-major data.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, DendriteError> {
        Ok(Self::from_buffer(buffer::from_vec(data_vec, &shape)?))
    }

    /// Wraps a buffer as a leaf tensor (no creator).
    pub fn from_buffer(value: Buffer) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(TensorData::leaf(value))),
        }
    }

    pub fn scalar(value: f32) -> Self {
        Self::from_buffer(buffer::scalar(value))
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self::from_buffer(buffer::zeros(shape))
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self::from_buffer(buffer::ones(shape))
    }

    pub(crate) fn parameter_leaf(param: Parameter) -> Self {
        let mut data = TensorData::leaf(param.value());
        data.param = Some(param);
        Tensor {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub(crate) fn with_creator(value: Buffer, op: Box<dyn Operation>, inputs: Vec<Tensor>) -> Self {
        let mut data = TensorData::leaf(value);
        data.creator = Some(Creator { op, inputs });
        Tensor {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub(crate) fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    pub(crate) fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Stable identity of this graph node, shared by all clones.
    pub(crate) fn node_id(&self) -> usize {
        Arc::as_ptr(&self.data) as *const () as usize
    }

    pub fn value(&self) -> Buffer {
        self.read_data().value.clone()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.read_data().value.shape().to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.read_data().value.ndim()
    }

    pub fn numel(&self) -> usize {
        self.read_data().value.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.read_data().creator.is_none()
    }

    /// True once a backward pass has run through this node.
    pub fn is_consumed(&self) -> bool {
        self.read_data().consumed
    }

    /// Name of the creator operation, if any.
    pub fn creator_name(&self) -> Option<String> {
        self.read_data().creator.as_ref().map(|c| c.op.name().to_string())
    }

    /// The parameter this leaf stands for, if any.
    pub fn parameter(&self) -> Option<Parameter> {
        self.read_data().param.clone()
    }

    /// Returns a new leaf holding a copy of this tensor's value.
    pub fn detach(&self) -> Tensor {
        Tensor::from_buffer(self.value())
    }

    pub fn ptr_eq(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        f.debug_struct("Tensor")
            .field("shape", &guard.value.shape())
            .field("creator", &guard.creator.as_ref().map(|c| c.op.name()))
            .field("value", &guard.value)
            .finish()
    }
}
