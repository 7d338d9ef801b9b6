use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::parameter::ParamId;
use crate::optim::{check_decay, check_grad_shape, check_positive, state_entry, Optimizer, OptimizerConfig, ParamState};

/// Adaptive delta: no global learning rate.
///
/// ```text
/// h = rho * h + (1 - rho) * g^2
/// v = sqrt(s + eps) / sqrt(h + eps) * g
/// s = rho * s + (1 - rho) * v^2
/// w -= v
/// ```
#[derive(Debug, Clone)]
pub struct AdaDeltaOptimizer {
    rho: f32,
    eps: f32,
    square_grad: ParamState,
    square_update: ParamState,
}

impl AdaDeltaOptimizer {
    pub fn new(rho: f32, eps: f32) -> Result<Self, DendriteError> {
        check_decay("AdaDelta", "rho", rho)?;
        check_positive("AdaDelta", "epsilon", eps)?;
        Ok(AdaDeltaOptimizer {
            rho,
            eps,
            square_grad: ParamState::new(),
            square_update: ParamState::new(),
        })
    }
}

impl Default for AdaDeltaOptimizer {
    fn default() -> Self {
        AdaDeltaOptimizer {
            rho: 0.95,
            eps: 1e-6,
            square_grad: ParamState::new(),
            square_update: ParamState::new(),
        }
    }
}

impl Optimizer for AdaDeltaOptimizer {
    fn name(&self) -> &str {
        "AdaDelta"
    }

    fn update_param(&mut self, id: ParamId, value: &mut Buffer, grad: &Buffer) -> Result<(), DendriteError> {
        check_grad_shape("AdaDelta", value, grad)?;
        let (rho, eps) = (self.rho, self.eps);
        let h = state_entry(&mut self.square_grad, id, grad.shape());
        let s = state_entry(&mut self.square_update, id, grad.shape());
        ndarray::Zip::from(value)
            .and(h)
            .and(s)
            .and(grad)
            .for_each(|w, h, s, &g| {
                *h = rho * *h + (1.0 - rho) * g * g;
                let v = (*s + eps).sqrt() / (*h + eps).sqrt() * g;
                *s = rho * *s + (1.0 - rho) * v * v;
                *w -= v;
            });
        Ok(())
    }

    fn config(&self) -> OptimizerConfig {
        OptimizerConfig::AdaDelta {
            rho: self.rho,
            eps: self.eps,
        }
    }
}
