//! # Tensor Operations Module (`ops`)
//!
//! Every differentiable computation implements [`Operation`]. Operations are
//! grouped by family; each family also exposes `xxx_op` combinator functions
//! that run the operation on [`Tensor`](crate::tensor::Tensor)s and record it
//! as the creator of the result, which is how define-by-run graphs are built.
//!
//! ## Key Submodules:
//!
//! - [`arithmetic`]: broadcasting add, sub, mul, div, plus neg and pow.
//! - [`math_elem`]: exp, ln, sqrt.
//! - [`linalg`]: matrix dot product.
//! - [`reduction`]: sum and mean along an axis.
//! - [`merge`]: concatenate and stack.
//! - [`view`]: slice, select and reshape.
//! - [`activation`]: elementwise activation functions.

pub mod activation;
pub mod arithmetic;
pub mod linalg;
pub mod math_elem;
pub mod merge;
pub mod reduction;
pub mod traits;
pub mod view;

pub use traits::{apply_op, Operation, OperationClone};

use crate::buffer::Buffer;
use crate::error::DendriteError;

/// Checks the number of inputs handed to `operation`'s forward.
pub(crate) fn check_arity(
    operation: &str,
    inputs: &[&Buffer],
    expected: usize,
) -> Result<(), DendriteError> {
    if inputs.len() != expected {
        return Err(DendriteError::ArityMismatch {
            operation: operation.to_string(),
            expected,
            actual: inputs.len(),
        });
    }
    Ok(())
}

/// Borrows a forward cache, failing when backward runs without a forward.
pub(crate) fn cached<'a, T>(cache: &'a Option<T>, operation: &str) -> Result<&'a T, DendriteError> {
    cache.as_ref().ok_or_else(|| DendriteError::BackwardBeforeForward {
        operation: operation.to_string(),
    })
}

/// Checks the rank of an input.
pub(crate) fn check_rank(operation: &str, x: &Buffer, expected: usize) -> Result<(), DendriteError> {
    if x.ndim() != expected {
        return Err(DendriteError::DimensionMismatch {
            expected,
            actual: x.ndim(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}
