use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::parameter::ParamId;
use crate::optim::{check_grad_shape, check_positive, state_entry, Optimizer, OptimizerConfig, ParamState};

/// `acc += g^2; w -= lr * g / sqrt(acc + eps)`
#[derive(Debug, Clone)]
pub struct AdaGradOptimizer {
    lr: f32,
    eps: f32,
    g_sq_sum: ParamState,
}

impl AdaGradOptimizer {
    pub fn new(lr: f32, eps: f32) -> Result<Self, DendriteError> {
        check_positive("AdaGrad", "learning rate", lr)?;
        check_positive("AdaGrad", "epsilon", eps)?;
        Ok(AdaGradOptimizer {
            lr,
            eps,
            g_sq_sum: ParamState::new(),
        })
    }
}

impl Default for AdaGradOptimizer {
    fn default() -> Self {
        AdaGradOptimizer {
            lr: 0.01,
            eps: 1e-7,
            g_sq_sum: ParamState::new(),
        }
    }
}

impl Optimizer for AdaGradOptimizer {
    fn name(&self) -> &str {
        "AdaGrad"
    }

    fn update_param(&mut self, id: ParamId, value: &mut Buffer, grad: &Buffer) -> Result<(), DendriteError> {
        check_grad_shape("AdaGrad", value, grad)?;
        let (lr, eps) = (self.lr, self.eps);
        let acc = state_entry(&mut self.g_sq_sum, id, grad.shape());
        *acc += &grad.mapv(|g| g * g);
        ndarray::Zip::from(value)
            .and(grad)
            .and(&*acc)
            .for_each(|w, &g, &a| *w -= lr * g / (a + eps).sqrt());
        Ok(())
    }

    fn config(&self) -> OptimizerConfig {
        OptimizerConfig::AdaGrad {
            lr: self.lr,
            eps: self.eps,
        }
    }
}

#[cfg(test)]
#[path = "adagrad_test.rs"]
mod tests;
