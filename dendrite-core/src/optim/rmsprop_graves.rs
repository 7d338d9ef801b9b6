use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::parameter::ParamId;
use crate::optim::{check_decay, check_grad_shape, check_positive, state_entry, Optimizer, OptimizerConfig, ParamState};

/// Graves' RMSProp: the squared-gradient average is centred by the decayed
/// gradient mean before the square root.
///
/// ```text
/// m = alpha * m + (1 - alpha) * g
/// v = alpha * v + (1 - alpha) * g^2
/// w -= lr * g / sqrt(v - m^2 + eps)
/// ```
#[derive(Debug, Clone)]
pub struct RmsPropGravesOptimizer {
    lr: f32,
    alpha: f32,
    eps: f32,
    grad_avg: ParamState,
    square_avg: ParamState,
}

impl RmsPropGravesOptimizer {
    pub fn new(lr: f32, alpha: f32, eps: f32) -> Result<Self, DendriteError> {
        check_positive("RMSPropGraves", "learning rate", lr)?;
        check_decay("RMSPropGraves", "alpha", alpha)?;
        check_positive("RMSPropGraves", "epsilon", eps)?;
        Ok(RmsPropGravesOptimizer {
            lr,
            alpha,
            eps,
            grad_avg: ParamState::new(),
            square_avg: ParamState::new(),
        })
    }
}

impl Default for RmsPropGravesOptimizer {
    fn default() -> Self {
        RmsPropGravesOptimizer {
            lr: 0.0001,
            alpha: 0.95,
            eps: 0.0001,
            grad_avg: ParamState::new(),
            square_avg: ParamState::new(),
        }
    }
}

impl Optimizer for RmsPropGravesOptimizer {
    fn name(&self) -> &str {
        "RMSPropGraves"
    }

    fn update_param(&mut self, id: ParamId, value: &mut Buffer, grad: &Buffer) -> Result<(), DendriteError> {
        check_grad_shape("RMSPropGraves", value, grad)?;
        let (lr, alpha, eps) = (self.lr, self.alpha, self.eps);
        let m = state_entry(&mut self.grad_avg, id, grad.shape());
        let v = state_entry(&mut self.square_avg, id, grad.shape());
        ndarray::Zip::from(value)
            .and(m)
            .and(v)
            .and(grad)
            .for_each(|w, m, v, &g| {
                *m = alpha * *m + (1.0 - alpha) * g;
                *v = alpha * *v + (1.0 - alpha) * g * g;
                *w -= lr * g / (*v - *m * *m + eps).sqrt();
            });
        Ok(())
    }

    fn config(&self) -> OptimizerConfig {
        OptimizerConfig::RmsPropGraves {
            lr: self.lr,
            alpha: self.alpha,
            eps: self.eps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::parameter::Parameter;
    use crate::utils::testing::{check_buffer_near, create_test_buffer};

    #[test]
    fn test_graves_step() {
        let p = Parameter::new("w", create_test_buffer(vec![1.0], &[1]));
        p.accumulate_gradient(&create_test_buffer(vec![0.5], &[1]))
            .unwrap();
        RmsPropGravesOptimizer::default()
            .update(&[p.clone()])
            .unwrap();
        check_buffer_near(&p.value(), &[1], &[0.999_543_1], 1e-6);
    }
}
