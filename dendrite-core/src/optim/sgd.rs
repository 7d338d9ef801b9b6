use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::parameter::ParamId;
use crate::optim::{check_decay, check_grad_shape, check_positive, state_entry, Optimizer, OptimizerConfig, ParamState};

/// Gradient descent with optional momentum.
///
/// `amount = lr * g + momentum * v; v = amount; w -= amount`
#[derive(Debug, Clone)]
pub struct SgdOptimizer {
    lr: f32,
    momentum: f32,
    velocity: ParamState,
}

impl SgdOptimizer {
    pub fn new(lr: f32, momentum: f32) -> Result<Self, DendriteError> {
        check_positive("SGD", "learning rate", lr)?;
        check_decay("SGD", "momentum", momentum)?;
        Ok(SgdOptimizer {
            lr,
            momentum,
            velocity: ParamState::new(),
        })
    }

    pub fn lr(&self) -> f32 {
        self.lr
    }

    pub fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

impl Default for SgdOptimizer {
    fn default() -> Self {
        SgdOptimizer {
            lr: 0.01,
            momentum: 0.0,
            velocity: ParamState::new(),
        }
    }
}

impl Optimizer for SgdOptimizer {
    fn name(&self) -> &str {
        "SGD"
    }

    fn update_param(&mut self, id: ParamId, value: &mut Buffer, grad: &Buffer) -> Result<(), DendriteError> {
        check_grad_shape("SGD", value, grad)?;
        let mut amount = grad * self.lr;
        if self.momentum > 0.0 {
            let v = state_entry(&mut self.velocity, id, grad.shape());
            amount.scaled_add(self.momentum, &*v);
            v.assign(&amount);
        }
        *value -= &amount;
        Ok(())
    }

    fn config(&self) -> OptimizerConfig {
        OptimizerConfig::Sgd {
            lr: self.lr,
            momentum: self.momentum,
        }
    }
}

#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
