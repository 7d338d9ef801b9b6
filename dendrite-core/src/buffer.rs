//! Numeric storage shared by tensors, parameters and optimizer state.
//!
//! Every value and gradient in the engine is an owned, dynamically-ranked
//! `f32` array. The helpers below cover the handful of layout operations the
//! engine needs on top of `ndarray`.

use crate::error::DendriteError;
use ndarray::{ArrayD, Axis, IxDyn};
use num_traits::Float;

/// Owned n-dimensional `f32` array.
pub type Buffer = ArrayD<f32>;

/// Builds a buffer from row-major data, checking the element count.
pub fn from_vec(data: Vec<f32>, shape: &[usize]) -> Result<Buffer, DendriteError> {
    let expected: usize = shape.iter().product();
    if data.len() != expected {
        return Err(DendriteError::TensorCreationError {
            data_len: data.len(),
            shape: shape.to_vec(),
        });
    }
    Ok(ArrayD::from_shape_vec(IxDyn(shape), data)?)
}

pub fn zeros(shape: &[usize]) -> Buffer {
    ArrayD::zeros(IxDyn(shape))
}

pub fn ones(shape: &[usize]) -> Buffer {
    ArrayD::ones(IxDyn(shape))
}

/// 0-d buffer holding a single value.
pub fn scalar(value: f32) -> Buffer {
    ArrayD::from_elem(IxDyn(&[]), value)
}

/// Reshapes by copying elements in logical (row-major) order, so it works for
/// any memory layout, including transposed views turned owned.
pub fn reshape(x: &Buffer, shape: &[usize]) -> Result<Buffer, DendriteError> {
    let expected: usize = shape.iter().product();
    if x.len() != expected {
        return Err(DendriteError::ShapeMismatch {
            expected: shape.to_vec(),
            actual: x.shape().to_vec(),
            operation: "reshape".to_string(),
        });
    }
    Ok(ArrayD::from_shape_vec(IxDyn(shape), x.iter().copied().collect())?)
}

/// Sums along `axis`, keeping it with size 1.
pub fn sum_axis_keepdims(x: &Buffer, axis: usize) -> Buffer {
    x.sum_axis(Axis(axis)).insert_axis(Axis(axis))
}

/// Extracts the single value of a one-element buffer.
pub fn to_scalar(x: &Buffer) -> Result<f32, DendriteError> {
    if x.len() != 1 {
        return Err(DendriteError::ShapeMismatch {
            expected: vec![],
            actual: x.shape().to_vec(),
            operation: "to_scalar".to_string(),
        });
    }
    x.iter()
        .next()
        .copied()
        .ok_or_else(|| DendriteError::InternalError("empty scalar buffer".to_string()))
}

/// True when no element is NaN or infinite.
pub fn all_finite<'a, F, I>(values: I) -> bool
where
    F: Float + 'a,
    I: IntoIterator<Item = &'a F>,
{
    values.into_iter().all(|v| v.is_finite())
}
