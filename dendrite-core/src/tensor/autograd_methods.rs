use crate::autograd::graph;
use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::tensor::broadcast_utils::sum_to;
use crate::tensor::Tensor;

impl Tensor {
    /// Returns a copy of the accumulated gradient, if any.
    pub fn grad(&self) -> Option<Buffer> {
        self.read_data().grad.clone()
    }

    /// Adds `delta` into this tensor's gradient accumulator, allocating it with
    /// the value's shape on first use. Broadcast axes are summed away first.
    ///
    /// When the tensor is a parameter leaf the contribution is forwarded to
    /// the parameter as well.
    pub fn accumulate_gradient(&self, delta: &Buffer) -> Result<(), DendriteError> {
        let mut guard = self.write_data();
        let reduced = sum_to(delta, guard.value.shape())?;
        if let Some(param) = guard.param.as_ref() {
            param.accumulate_gradient(&reduced)?;
        }
        match guard.grad.as_mut() {
            Some(existing) => *existing += &reduced,
            None => guard.grad = Some(reduced),
        }
        Ok(())
    }

    pub fn reset_gradient(&self) {
        self.write_data().grad = None;
    }

    /// Runs the reverse traversal from this tensor.
    ///
    /// `gradient` defaults to ones when this tensor holds a single element
    /// (a loss value). Otherwise it must match this tensor's shape exactly.
    ///
    /// # Errors
    /// * `MissingCreator` if this tensor is a leaf.
    /// * `ShapeMismatch` if `gradient` has the wrong shape or is omitted for a
    ///   non-scalar output.
    /// * Any error raised by an operation's backward.
    pub fn backward(&self, gradient: Option<Buffer>) -> Result<(), DendriteError> {
        let shape = self.shape();
        let grad_init = match gradient {
            Some(g) => {
                if g.shape() != shape.as_slice() {
                    return Err(DendriteError::ShapeMismatch {
                        expected: shape,
                        actual: g.shape().to_vec(),
                        operation: "backward".to_string(),
                    });
                }
                g
            }
            None => {
                if self.numel() != 1 {
                    return Err(DendriteError::ShapeMismatch {
                        expected: vec![],
                        actual: shape,
                        operation: "backward (implicit gradient)".to_string(),
                    });
                }
                buffer::ones(&shape)
            }
        };
        graph::backward(self, grad_init)
    }
}

#[cfg(test)]
#[path = "autograd_methods_test.rs"]
mod tests;
