use super::*;
use crate::nn::parameter::Parameter;
use crate::utils::testing::{check_buffer_near, create_test_buffer};

#[test]
fn test_rmsprop_basic_step() {
    let p = Parameter::new("w", create_test_buffer(vec![1.0], &[1]));
    p.accumulate_gradient(&create_test_buffer(vec![0.5], &[1]))
        .unwrap();
    RmsPropOptimizer::new(0.01, 0.9, 1e-7)
        .unwrap()
        .update(&[p.clone()])
        .unwrap();
    check_buffer_near(&p.value(), &[1], &[0.968_377_3], 1e-6);
}

#[test]
fn test_rmsprop_invalid_hyperparams() {
    assert!(RmsPropOptimizer::new(-0.01, 0.9, 1e-7).is_err());
    assert!(RmsPropOptimizer::new(0.01, -0.9, 1e-7).is_err());
    assert!(RmsPropOptimizer::new(0.01, 1.1, 1e-7).is_err());
    assert!(RmsPropOptimizer::new(0.01, 0.9, -1e-7).is_err());
}

#[test]
fn test_rmsprop_defaults() {
    assert_eq!(
        RmsPropOptimizer::default().config(),
        OptimizerConfig::RmsProp {
            lr: 0.001,
            alpha: 0.9,
            eps: 1e-7
        }
    );
}
