use crate::error::DendriteError;
use crate::optim::{
    AdaDeltaOptimizer, AdaGradOptimizer, AdamOptimizer, NesterovOptimizer, Optimizer,
    RmsPropGravesOptimizer, RmsPropOptimizer, SgdOptimizer,
};

/// Tagged optimizer hyperparameters, one variant per optimizer.
///
/// Auxiliary state (moments, step counts) is not part of the config; a built
/// optimizer starts fresh.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizerConfig {
    Sgd { lr: f32, momentum: f32 },
    Nesterov { lr: f32, momentum: f32 },
    AdaGrad { lr: f32, eps: f32 },
    RmsProp { lr: f32, alpha: f32, eps: f32 },
    AdaDelta { rho: f32, eps: f32 },
    Adam { lr: f32, beta1: f32, beta2: f32, eps: f32 },
    RmsPropGraves { lr: f32, alpha: f32, eps: f32 },
}

impl OptimizerConfig {
    /// Builds the described optimizer, validating its hyperparameters.
    pub fn build(&self) -> Result<Box<dyn Optimizer>, DendriteError> {
        Ok(match *self {
            OptimizerConfig::Sgd { lr, momentum } => Box::new(SgdOptimizer::new(lr, momentum)?),
            OptimizerConfig::Nesterov { lr, momentum } => {
                Box::new(NesterovOptimizer::new(lr, momentum)?)
            }
            OptimizerConfig::AdaGrad { lr, eps } => Box::new(AdaGradOptimizer::new(lr, eps)?),
            OptimizerConfig::RmsProp { lr, alpha, eps } => {
                Box::new(RmsPropOptimizer::new(lr, alpha, eps)?)
            }
            OptimizerConfig::AdaDelta { rho, eps } => Box::new(AdaDeltaOptimizer::new(rho, eps)?),
            OptimizerConfig::Adam {
                lr,
                beta1,
                beta2,
                eps,
            } => Box::new(AdamOptimizer::new(lr, beta1, beta2, eps)?),
            OptimizerConfig::RmsPropGraves { lr, alpha, eps } => {
                Box::new(RmsPropGravesOptimizer::new(lr, alpha, eps)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_roundtrip_through_config() {
        let defaults: Vec<Box<dyn Optimizer>> = vec![
            Box::new(SgdOptimizer::default()),
            Box::new(NesterovOptimizer::default()),
            Box::new(AdaGradOptimizer::default()),
            Box::new(RmsPropOptimizer::default()),
            Box::new(AdaDeltaOptimizer::default()),
            Box::new(AdamOptimizer::default()),
            Box::new(RmsPropGravesOptimizer::default()),
        ];
        for opt in defaults {
            let config = opt.config();
            let rebuilt = config.build().unwrap();
            assert_eq!(rebuilt.config(), config);
            assert_eq!(rebuilt.name(), opt.name());
        }
    }

    #[test]
    fn test_build_validates() {
        let err = OptimizerConfig::RmsProp {
            lr: 0.01,
            alpha: 2.0,
            eps: 1e-7,
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, DendriteError::ConfigurationError(_)));
    }
}
