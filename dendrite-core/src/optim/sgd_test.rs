use super::*;
use crate::nn::parameter::Parameter;
use crate::utils::testing::{check_buffer_near, create_test_buffer};

fn param_with_grad(value: f32, grad: f32) -> Parameter {
    let p = Parameter::new("w", create_test_buffer(vec![value], &[1]));
    p.accumulate_gradient(&create_test_buffer(vec![grad], &[1]))
        .unwrap();
    p
}

#[test]
fn test_sgd_plain_step() {
    let p = param_with_grad(1.0, 0.5);
    SgdOptimizer::new(0.1, 0.0).unwrap().update(&[p.clone()]).unwrap();
    check_buffer_near(&p.value(), &[1], &[0.95], 1e-6);
    assert!(!p.has_gradient());
}

#[test]
fn test_sgd_momentum_accumulates_velocity() {
    let p = param_with_grad(1.0, 0.5);
    let mut sgd = SgdOptimizer::new(0.1, 0.9).unwrap();
    sgd.update(&[p.clone()]).unwrap();
    check_buffer_near(&p.value(), &[1], &[0.95], 1e-6);
    p.accumulate_gradient(&create_test_buffer(vec![0.5], &[1]))
        .unwrap();
    sgd.update(&[p.clone()]).unwrap();
    // 0.05 + 0.9 * 0.05
    check_buffer_near(&p.value(), &[1], &[0.855], 1e-6);
}

#[test]
fn test_sgd_invalid_hyperparams() {
    assert!(SgdOptimizer::new(0.0, 0.0).is_err());
    assert!(SgdOptimizer::new(-0.1, 0.0).is_err());
    assert!(SgdOptimizer::new(0.1, 1.0).is_err());
    assert!(SgdOptimizer::new(0.1, -0.5).is_err());
}

#[test]
fn test_sgd_defaults() {
    let sgd = SgdOptimizer::default();
    assert_eq!(
        sgd.config(),
        OptimizerConfig::Sgd {
            lr: 0.01,
            momentum: 0.0
        }
    );
}
