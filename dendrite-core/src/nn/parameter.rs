use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::init::Initializer;
use crate::tensor::broadcast_utils::sum_to;
use crate::tensor::Tensor;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// Stable identity of a [`Parameter`], assigned once at creation.
///
/// Optimizers key their per-parameter state on this id, never on the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u64);

impl ParamId {
    fn next() -> Self {
        ParamId(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
pub(crate) struct ParamData {
    value: Buffer,
    grad: Option<Buffer>,
    trainable: bool,
    initialized: bool,
    name: String,
}

/// A learnable tensor owned by one layer.
///
/// `Parameter` is a handle: clones share the same value and gradient
/// accumulator, which is how per-timestep cells and per-call graph nodes all
/// write into the one parameter their layer owns.
#[derive(Clone)]
pub struct Parameter {
    id: ParamId,
    inner: Arc<RwLock<ParamData>>,
}

impl Parameter {
    /// Creates an initialised parameter holding `value`.
    pub fn new(name: impl Into<String>, value: Buffer) -> Self {
        Self::from_data(ParamData {
            value,
            grad: None,
            trainable: true,
            initialized: true,
            name: name.into(),
        })
    }

    /// Creates a parameter whose value is materialised on the owning layer's
    /// first forward, once the input shape is known.
    pub fn deferred(name: impl Into<String>) -> Self {
        Self::from_data(ParamData {
            value: buffer::zeros(&[0]),
            grad: None,
            trainable: true,
            initialized: false,
            name: name.into(),
        })
    }

    fn from_data(data: ParamData) -> Self {
        Parameter {
            id: ParamId::next(),
            inner: Arc::new(RwLock::new(data)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ParamData> {
        self.inner.read().expect("RwLock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, ParamData> {
        self.inner.write().expect("RwLock poisoned")
    }

    pub fn id(&self) -> ParamId {
        self.id
    }

    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    pub fn value(&self) -> Buffer {
        self.read().value.clone()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.read().value.shape().to_vec()
    }

    pub fn is_initialized(&self) -> bool {
        self.read().initialized
    }

    /// Materialises a deferred parameter. Does nothing once initialised, so
    /// every clone of a layer may call it safely.
    pub fn initialize_with(
        &self,
        shape: &[usize],
        initializer: &Initializer,
        fan_in: usize,
    ) -> Result<(), DendriteError> {
        let mut guard = self.write();
        if guard.initialized {
            return Ok(());
        }
        guard.value = initializer.generate(shape, fan_in)?;
        guard.initialized = true;
        log::debug!("Initialised parameter '{}' with shape {:?}", guard.name, shape);
        Ok(())
    }

    /// Overwrites the value, e.g. when restoring a checkpoint.
    ///
    /// An initialised parameter only accepts a buffer of its current shape.
    pub fn set_value(&self, value: Buffer) -> Result<(), DendriteError> {
        let mut guard = self.write();
        if guard.initialized && guard.value.shape() != value.shape() {
            return Err(DendriteError::ShapeMismatch {
                expected: guard.value.shape().to_vec(),
                actual: value.shape().to_vec(),
                operation: format!("set_value({})", guard.name),
            });
        }
        guard.value = value;
        guard.initialized = true;
        Ok(())
    }

    pub fn grad(&self) -> Option<Buffer> {
        self.read().grad.clone()
    }

    pub fn has_gradient(&self) -> bool {
        self.read().grad.is_some()
    }

    pub fn is_trainable(&self) -> bool {
        self.read().trainable
    }

    /// Freezing a parameter also clears any gradient it already holds.
    pub fn set_trainable(&self, trainable: bool) {
        let mut guard = self.write();
        guard.trainable = trainable;
        if !trainable {
            guard.grad = None;
        }
    }

    /// Adds `delta` to the gradient accumulator, reducing broadcast axes first.
    ///
    /// Frozen parameters ignore the contribution and stay at the neutral state.
    pub fn accumulate_gradient(&self, delta: &Buffer) -> Result<(), DendriteError> {
        let mut guard = self.write();
        if !guard.trainable {
            return Ok(());
        }
        let reduced = sum_to(delta, guard.value.shape())?;
        match guard.grad.as_mut() {
            Some(existing) => *existing += &reduced,
            None => guard.grad = Some(reduced),
        }
        Ok(())
    }

    pub fn reset_gradient(&self) {
        self.write().grad = None;
    }

    /// Runs `update` on (value, gradient) when a gradient is present, then
    /// resets the gradient. Returns whether an update happened.
    pub fn apply_update<F>(&self, update: F) -> Result<bool, DendriteError>
    where
        F: FnOnce(&mut Buffer, &Buffer) -> Result<(), DendriteError>,
    {
        let mut guard = self.write();
        let grad = match guard.grad.take() {
            Some(grad) => grad,
            None => return Ok(false),
        };
        if let Err(err) = update(&mut guard.value, &grad) {
            guard.grad = Some(grad);
            return Err(err);
        }
        Ok(true)
    }

    /// Returns a leaf tensor bound to this parameter: gradients reaching the
    /// leaf during backward are accumulated into the parameter.
    pub fn as_tensor(&self) -> Tensor {
        Tensor::parameter_leaf(self.clone())
    }

    pub fn ptr_eq(&self, other: &Parameter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read();
        f.debug_struct("Parameter")
            .field("id", &self.id)
            .field("name", &guard.name)
            .field("shape", &guard.value.shape())
            .field("trainable", &guard.trainable)
            .field("has_grad", &guard.grad.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
