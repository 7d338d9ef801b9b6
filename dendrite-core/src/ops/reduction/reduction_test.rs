use super::*;
use crate::autograd::grad_check::check_grad;
use crate::ops::Operation;
use crate::utils::testing::{check_buffer_near, create_test_buffer, pattern_buffer};

#[test]
fn test_sum_keepdims_forward_backward() {
    let mut op = Sum::new(0, true);
    let x = create_test_buffer(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2]);
    let y = op.forward(&[&x]).unwrap();
    check_buffer_near(&y, &[1, 2], &[9.0, 12.0], 1e-6);
    let grads = op.backward(&create_test_buffer(vec![1.0, 2.0], &[1, 2])).unwrap();
    check_buffer_near(&grads[0], &[3, 2], &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0], 1e-6);
}

#[test]
fn test_sum_without_keepdims() {
    let mut op = Sum::new(1, false);
    let x = create_test_buffer(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let y = op.forward(&[&x]).unwrap();
    check_buffer_near(&y, &[2], &[6.0, 15.0], 1e-6);
    let grads = op.backward(&create_test_buffer(vec![1.0, -1.0], &[2])).unwrap();
    check_buffer_near(&grads[0], &[2, 3], &[1.0, 1.0, 1.0, -1.0, -1.0, -1.0], 1e-6);
}

#[test]
fn test_mean_divides_by_axis_length() {
    let mut op = Mean::new(0, true);
    let x = create_test_buffer(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let y = op.forward(&[&x]).unwrap();
    check_buffer_near(&y, &[1, 2], &[2.0, 3.0], 1e-6);
    let grads = op.backward(&crate::buffer::ones(&[1, 2])).unwrap();
    check_buffer_near(&grads[0], &[2, 2], &[0.5; 4], 1e-6);
}

#[test]
fn test_reduction_axis_out_of_range() {
    let mut op = Sum::new(2, true);
    let x = pattern_buffer(&[2, 2], 0);
    assert!(matches!(
        op.forward(&[&x]),
        Err(DendriteError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_reduction_grad_checks() {
    let x = pattern_buffer(&[3, 4], 1);
    check_grad(|t| sum_op(&t[0], 1, true), &[x.clone()], &pattern_buffer(&[3, 1], 2), 1e-2, 1e-2)
        .unwrap();
    check_grad(|t| mean_op(&t[0], 0, false), &[x], &pattern_buffer(&[4], 3), 1e-2, 1e-2).unwrap();
}
