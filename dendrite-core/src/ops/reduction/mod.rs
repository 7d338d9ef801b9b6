//! Reductions along one axis.

pub mod mean;
pub mod sum;

pub use mean::{mean_op, Mean};
pub use sum::{sum_op, Sum};

use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::tensor::broadcast_utils::broadcast_to;
use ndarray::Axis;

pub(crate) fn check_axis(operation: &str, x: &Buffer, axis: usize) -> Result<(), DendriteError> {
    if axis >= x.ndim() {
        return Err(DendriteError::DimensionMismatch {
            expected: axis + 1,
            actual: x.ndim(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

/// Spreads a reduced gradient back over the reduced axis.
pub(crate) fn expand_reduced(
    grad_output: &Buffer,
    input_shape: &[usize],
    axis: usize,
    keepdims: bool,
) -> Result<Buffer, DendriteError> {
    let kept = if keepdims {
        grad_output.clone()
    } else {
        grad_output.clone().insert_axis(Axis(axis))
    };
    broadcast_to(&kept, input_shape)
}

#[cfg(test)]
#[path = "reduction_test.rs"]
mod tests;
