//! Broadcasting elementwise arithmetic.
//!
//! Binary operations forward under the broadcast shape of their inputs and
//! reduce each input's gradient back with `sum_to` in backward.

pub mod add;
pub mod div;
pub mod mul;
pub mod neg;
pub mod pow;
pub mod sub;

pub use add::{add_op, Add};
pub use div::{div_op, Div};
pub use mul::{mul_op, Mul};
pub use neg::{neg_op, Neg};
pub use pow::{pow_op, Pow};
pub use sub::{sub_op, Sub};

use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::tensor::broadcast_utils::{broadcast_shape, broadcast_to};

/// Inputs of a binary operation expanded to their common shape, together
/// with the original shapes their gradients must be reduced to.
#[derive(Debug, Clone)]
pub(crate) struct BroadcastPair {
    pub a: Buffer,
    pub b: Buffer,
    pub a_shape: Vec<usize>,
    pub b_shape: Vec<usize>,
}

pub(crate) fn broadcast_pair(x1: &Buffer, x2: &Buffer) -> Result<BroadcastPair, DendriteError> {
    let shape = broadcast_shape(x1.shape(), x2.shape())?;
    Ok(BroadcastPair {
        a: broadcast_to(x1, &shape)?,
        b: broadcast_to(x2, &shape)?,
        a_shape: x1.shape().to_vec(),
        b_shape: x2.shape().to_vec(),
    })
}
