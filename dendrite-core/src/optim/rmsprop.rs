use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::parameter::ParamId;
use crate::optim::{check_decay, check_grad_shape, check_positive, state_entry, Optimizer, OptimizerConfig, ParamState};

/// `acc = alpha * acc + (1 - alpha) * g^2; w -= lr * g / sqrt(acc + eps)`
#[derive(Debug, Clone)]
pub struct RmsPropOptimizer {
    lr: f32,
    alpha: f32,
    eps: f32,
    square_avg: ParamState,
}

impl RmsPropOptimizer {
    pub fn new(lr: f32, alpha: f32, eps: f32) -> Result<Self, DendriteError> {
        check_positive("RMSProp", "learning rate", lr)?;
        check_decay("RMSProp", "alpha", alpha)?;
        check_positive("RMSProp", "epsilon", eps)?;
        Ok(RmsPropOptimizer {
            lr,
            alpha,
            eps,
            square_avg: ParamState::new(),
        })
    }
}

impl Default for RmsPropOptimizer {
    fn default() -> Self {
        RmsPropOptimizer {
            lr: 0.001,
            alpha: 0.9,
            eps: 1e-7,
            square_avg: ParamState::new(),
        }
    }
}

impl Optimizer for RmsPropOptimizer {
    fn name(&self) -> &str {
        "RMSProp"
    }

    fn update_param(&mut self, id: ParamId, value: &mut Buffer, grad: &Buffer) -> Result<(), DendriteError> {
        check_grad_shape("RMSProp", value, grad)?;
        let (lr, alpha, eps) = (self.lr, self.alpha, self.eps);
        let acc = state_entry(&mut self.square_avg, id, grad.shape());
        ndarray::Zip::from(value)
            .and(acc)
            .and(grad)
            .for_each(|w, a, &g| {
                *a = alpha * *a + (1.0 - alpha) * g * g;
                *w -= lr * g / (*a + eps).sqrt();
            });
        Ok(())
    }

    fn config(&self) -> OptimizerConfig {
        OptimizerConfig::RmsProp {
            lr: self.lr,
            alpha: self.alpha,
            eps: self.eps,
        }
    }
}

#[cfg(test)]
#[path = "rmsprop_test.rs"]
mod tests;
