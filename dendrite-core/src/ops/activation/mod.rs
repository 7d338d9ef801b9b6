//! Elementwise activation functions.

pub mod elu;
pub mod relu;
pub mod sigmoid;
pub mod softplus;
pub mod softsign;
pub mod swish;
pub mod tanh;

pub use elu::{elu_op, Elu};
pub use relu::{leaky_relu_op, relu_op, LeakyRelu, Relu};
pub use sigmoid::{sigmoid, sigmoid_op, Sigmoid};
pub use softplus::{softplus_op, Softplus};
pub use softsign::{softsign_op, Softsign};
pub use swish::{swish_op, Swish};
pub use tanh::{tanh_op, Tanh};

use crate::ops::Operation;

/// Closed set of activation kinds, used by layer configs and recurrent cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivationKind {
    Sigmoid,
    Tanh,
    Softsign,
    Softplus,
    Swish,
    Relu,
    LeakyRelu { alpha: f32 },
    Elu { alpha: f32 },
}

impl ActivationKind {
    pub fn build(&self) -> Box<dyn Operation> {
        match *self {
            ActivationKind::Sigmoid => Box::new(Sigmoid::default()),
            ActivationKind::Tanh => Box::new(Tanh::default()),
            ActivationKind::Softsign => Box::new(Softsign::default()),
            ActivationKind::Softplus => Box::new(Softplus::default()),
            ActivationKind::Swish => Box::new(Swish::default()),
            ActivationKind::Relu => Box::new(Relu::default()),
            ActivationKind::LeakyRelu { alpha } => Box::new(LeakyRelu::new(alpha)),
            ActivationKind::Elu { alpha } => Box::new(Elu::new(alpha)),
        }
    }
}

#[cfg(test)]
#[path = "activation_test.rs"]
mod tests;
