use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::parameter::ParamId;
use crate::optim::{check_decay, check_grad_shape, check_positive, state_entry, Optimizer, OptimizerConfig, ParamState};

/// Adam: bias-corrected first and second moment estimates.
///
/// The step count `t` advances once per [`Optimizer::update`] call, shared by
/// every parameter of that call:
///
/// ```text
/// lr_t = lr * sqrt(1 - beta2^t) / (1 - beta1^t)
/// m += (1 - beta1) * (g - m)
/// v += (1 - beta2) * (g^2 - v)
/// w -= lr_t * m / sqrt(v + eps)
/// ```
#[derive(Debug, Clone)]
pub struct AdamOptimizer {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    t: u64,
    m: ParamState,
    v: ParamState,
}

impl AdamOptimizer {
    pub fn new(lr: f32, beta1: f32, beta2: f32, eps: f32) -> Result<Self, DendriteError> {
        check_positive("Adam", "learning rate", lr)?;
        check_decay("Adam", "beta1", beta1)?;
        check_decay("Adam", "beta2", beta2)?;
        check_positive("Adam", "epsilon", eps)?;
        Ok(AdamOptimizer {
            lr,
            beta1,
            beta2,
            eps,
            t: 0,
            m: ParamState::new(),
            v: ParamState::new(),
        })
    }

    /// Number of `update` calls so far.
    pub fn step_count(&self) -> u64 {
        self.t
    }

    fn corrected_lr(&self) -> f32 {
        let t = self.t.min(i32::MAX as u64) as i32;
        self.lr * (1.0 - self.beta2.powi(t)).sqrt() / (1.0 - self.beta1.powi(t))
    }
}

impl Default for AdamOptimizer {
    fn default() -> Self {
        AdamOptimizer {
            lr: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-7,
            t: 0,
            m: ParamState::new(),
            v: ParamState::new(),
        }
    }
}

impl Optimizer for AdamOptimizer {
    fn name(&self) -> &str {
        "Adam"
    }

    fn begin_step(&mut self) {
        self.t += 1;
        log::debug!("Adam: step {}", self.t);
    }

    fn update_param(&mut self, id: ParamId, value: &mut Buffer, grad: &Buffer) -> Result<(), DendriteError> {
        check_grad_shape("Adam", value, grad)?;
        if self.t == 0 {
            // Called outside `update`.
            self.t = 1;
        }
        let lr_t = self.corrected_lr();
        let (beta1, beta2, eps) = (self.beta1, self.beta2, self.eps);
        let m = state_entry(&mut self.m, id, grad.shape());
        let v = state_entry(&mut self.v, id, grad.shape());
        ndarray::Zip::from(value)
            .and(m)
            .and(v)
            .and(grad)
            .for_each(|w, m, v, &g| {
                *m += (1.0 - beta1) * (g - *m);
                *v += (1.0 - beta2) * (g * g - *v);
                *w -= lr_t * *m / (*v + eps).sqrt();
            });
        Ok(())
    }

    fn config(&self) -> OptimizerConfig {
        OptimizerConfig::Adam {
            lr: self.lr,
            beta1: self.beta1,
            beta2: self.beta2,
            eps: self.eps,
        }
    }
}

#[cfg(test)]
#[path = "adam_test.rs"]
mod tests;
