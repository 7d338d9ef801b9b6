//! Broadcasting primitives used by the arithmetic operation family.
//!
//! Broadcasting is always materialised: `broadcast_to` replicates size-1 axes by
//! explicit concatenation and `sum_to` is its adjoint, reducing a gradient back
//! onto the shape of the input that was broadcast.

use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use ndarray::{concatenate, Axis};

/// Left-pads the lower-rank shape with size-1 dimensions until both ranks match.
pub fn align_ndim(shape_a: &[usize], shape_b: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let rank = shape_a.len().max(shape_b.len());
    (pad_left(shape_a, rank), pad_left(shape_b, rank))
}

fn pad_left(shape: &[usize], rank: usize) -> Vec<usize> {
    let mut padded = vec![1; rank - shape.len()];
    padded.extend_from_slice(shape);
    padded
}

/// Computes the common shape of two broadcast-compatible shapes.
pub fn broadcast_shape(shape_a: &[usize], shape_b: &[usize]) -> Result<Vec<usize>, DendriteError> {
    let (a, b) = align_ndim(shape_a, shape_b);
    a.iter()
        .zip(b.iter())
        .map(|(&da, &db)| match (da, db) {
            _ if da == db => Ok(da),
            (1, _) => Ok(db),
            (_, 1) => Ok(da),
            _ => Err(DendriteError::ShapeMismatch {
                expected: shape_a.to_vec(),
                actual: shape_b.to_vec(),
                operation: "broadcast".to_string(),
            }),
        })
        .collect()
}

/// Replicates every size-1 axis of `x` until it matches `target`.
pub fn broadcast_to(x: &Buffer, target: &[usize]) -> Result<Buffer, DendriteError> {
    if x.shape() == target {
        return Ok(x.clone());
    }
    if x.ndim() > target.len() {
        return Err(DendriteError::ShapeMismatch {
            expected: target.to_vec(),
            actual: x.shape().to_vec(),
            operation: "broadcast_to".to_string(),
        });
    }
    let aligned = pad_left(x.shape(), target.len());
    let mut out = buffer::reshape(x, &aligned)?;
    for (axis, (&have, &want)) in aligned.iter().zip(target.iter()).enumerate() {
        if have == want {
            continue;
        }
        if have != 1 {
            return Err(DendriteError::ShapeMismatch {
                expected: target.to_vec(),
                actual: x.shape().to_vec(),
                operation: "broadcast_to".to_string(),
            });
        }
        let replicated = {
            let copies = vec![out.view(); want];
            concatenate(Axis(axis), &copies)?
        };
        out = replicated;
    }
    Ok(out)
}

/// Reduces `x` onto `target` by summing every axis where `x` is larger.
///
/// The summed axes are kept with size 1 and the result is finally laid out with
/// exactly `target`'s shape, dropping the leading axes `align_ndim` added.
pub fn sum_to(x: &Buffer, target: &[usize]) -> Result<Buffer, DendriteError> {
    if x.shape() == target {
        return Ok(x.clone());
    }
    let mismatch = || DendriteError::ShapeMismatch {
        expected: target.to_vec(),
        actual: x.shape().to_vec(),
        operation: "sum_to".to_string(),
    };
    if target.len() > x.ndim() {
        return Err(mismatch());
    }
    let aligned = pad_left(target, x.ndim());
    let mut out = x.clone();
    for (axis, &want) in aligned.iter().enumerate() {
        let have = out.shape()[axis];
        if have == want {
            continue;
        }
        if want != 1 {
            return Err(mismatch());
        }
        out = buffer::sum_axis_keepdims(&out, axis);
    }
    buffer::reshape(&out, target)
}

#[cfg(test)]
#[path = "broadcast_utils_test.rs"]
mod tests;
