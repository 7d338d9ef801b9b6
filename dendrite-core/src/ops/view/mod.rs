//! Operations that rearrange or pick out parts of a tensor.

pub mod reshape;
pub mod select;
pub mod slice;

pub use reshape::{reshape_op, Reshape};
pub use select::{select_op, Select};
pub use slice::{slice_op, SliceAxis};

use crate::buffer::Buffer;
use crate::error::DendriteError;

pub(crate) fn check_grad_shape(
    operation: &str,
    grad_output: &Buffer,
    expected: &[usize],
) -> Result<(), DendriteError> {
    if grad_output.shape() != expected {
        return Err(DendriteError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: grad_output.shape().to_vec(),
            operation: format!("{} backward", operation),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
