use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::parameter::ParamId;
use crate::optim::{check_decay, check_grad_shape, check_positive, state_entry, Optimizer, OptimizerConfig, ParamState};

/// Nesterov accelerated gradient.
///
/// `v = m * v - lr * g; w += m^2 * v - (1 + m) * lr * g`
#[derive(Debug, Clone)]
pub struct NesterovOptimizer {
    lr: f32,
    momentum: f32,
    velocity: ParamState,
}

impl NesterovOptimizer {
    pub fn new(lr: f32, momentum: f32) -> Result<Self, DendriteError> {
        check_positive("Nesterov", "learning rate", lr)?;
        check_decay("Nesterov", "momentum", momentum)?;
        Ok(NesterovOptimizer {
            lr,
            momentum,
            velocity: ParamState::new(),
        })
    }
}

impl Default for NesterovOptimizer {
    fn default() -> Self {
        NesterovOptimizer {
            lr: 0.01,
            momentum: 0.9,
            velocity: ParamState::new(),
        }
    }
}

impl Optimizer for NesterovOptimizer {
    fn name(&self) -> &str {
        "Nesterov"
    }

    fn update_param(&mut self, id: ParamId, value: &mut Buffer, grad: &Buffer) -> Result<(), DendriteError> {
        check_grad_shape("Nesterov", value, grad)?;
        let (lr, m) = (self.lr, self.momentum);
        let amount = grad * lr;
        let v = state_entry(&mut self.velocity, id, grad.shape());
        *v *= m;
        *v -= &amount;
        value.scaled_add(m * m, &*v);
        value.scaled_add(-(1.0 + m), &amount);
        Ok(())
    }

    fn config(&self) -> OptimizerConfig {
        OptimizerConfig::Nesterov {
            lr: self.lr,
            momentum: self.momentum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::parameter::Parameter;
    use crate::utils::testing::{check_buffer_near, create_test_buffer};

    #[test]
    fn test_nesterov_step() {
        let p = Parameter::new("w", create_test_buffer(vec![1.0, 2.0], &[2]));
        p.accumulate_gradient(&create_test_buffer(vec![0.5, 0.0], &[2]))
            .unwrap();
        NesterovOptimizer::new(0.1, 0.9)
            .unwrap()
            .update(&[p.clone()])
            .unwrap();
        // v = -0.05; w += 0.81 * v - 1.9 * 0.05
        check_buffer_near(&p.value(), &[2], &[0.8645, 2.0], 1e-6);
    }

    #[test]
    fn test_nesterov_defaults_and_validation() {
        assert_eq!(
            NesterovOptimizer::default().config(),
            OptimizerConfig::Nesterov {
                lr: 0.01,
                momentum: 0.9
            }
        );
        assert!(NesterovOptimizer::new(0.01, 1.5).is_err());
    }
}
