//! Weight penalties contributing both a loss term and a gradient term.

use crate::error::DendriteError;
use crate::nn::parameter::Parameter;

/// Penalty kind and strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegularizerKind {
    L1 { l1: f32 },
    L2 { l2: f32 },
    L1L2 { l1: f32, l2: f32 },
}

impl RegularizerKind {
    pub fn l1() -> Self {
        RegularizerKind::L1 { l1: 0.01 }
    }

    pub fn l2() -> Self {
        RegularizerKind::L2 { l2: 0.01 }
    }

    fn strengths(&self) -> (f32, f32) {
        match *self {
            RegularizerKind::L1 { l1 } => (l1, 0.0),
            RegularizerKind::L2 { l2 } => (0.0, l2),
            RegularizerKind::L1L2 { l1, l2 } => (l1, l2),
        }
    }
}

/// A penalty bound to one parameter.
#[derive(Debug, Clone)]
pub struct Regularizer {
    kind: RegularizerKind,
    param: Parameter,
}

impl Regularizer {
    pub fn new(kind: RegularizerKind, param: Parameter) -> Self {
        Regularizer { kind, param }
    }

    pub fn kind(&self) -> RegularizerKind {
        self.kind
    }

    pub fn parameter(&self) -> &Parameter {
        &self.param
    }

    /// `l1 * sum|w| + 0.5 * l2 * sum(w^2)`
    pub fn loss(&self) -> f32 {
        let (l1, l2) = self.kind.strengths();
        let w = self.param.value();
        let abs_sum: f32 = w.iter().map(|v| v.abs()).sum();
        let sq_sum: f32 = w.iter().map(|v| v * v).sum();
        l1 * abs_sum + 0.5 * l2 * sq_sum
    }

    /// Adds `l1 * sign(w) + l2 * w` to the parameter's gradient.
    pub fn accumulate_gradient(&self) -> Result<(), DendriteError> {
        let (l1, l2) = self.kind.strengths();
        let w = self.param.value();
        let grad = w.mapv(|v| l1 * sign(v) + l2 * v);
        self.param.accumulate_gradient(&grad)
    }
}

fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{check_buffer_near, create_test_buffer};
    use approx::assert_relative_eq;

    #[test]
    fn test_l1l2_loss_and_gradient() {
        let p = Parameter::new("w", create_test_buffer(vec![1.0, -2.0], &[2]));
        let reg = Regularizer::new(RegularizerKind::L1L2 { l1: 0.1, l2: 0.2 }, p.clone());
        assert_relative_eq!(reg.loss(), 0.1 * 3.0 + 0.5 * 0.2 * 5.0, epsilon = 1e-6);
        reg.accumulate_gradient().unwrap();
        check_buffer_near(&p.grad().unwrap(), &[2], &[0.1 + 0.2, -0.1 - 0.4], 1e-6);
    }

    #[test]
    fn test_frozen_parameter_not_penalised() {
        let p = Parameter::new("w", create_test_buffer(vec![1.0], &[1]));
        p.set_trainable(false);
        Regularizer::new(RegularizerKind::l2(), p.clone())
            .accumulate_gradient()
            .unwrap();
        assert!(!p.has_gradient());
    }
}
