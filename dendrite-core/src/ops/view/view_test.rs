use super::*;
use crate::autograd::grad_check::check_grad;
use crate::error::DendriteError;
use crate::ops::Operation;
use crate::utils::testing::{check_buffer_near, create_test_buffer, pattern_buffer};

#[test]
fn test_slice_backward_scatters_into_zeros() {
    let mut op = SliceAxis::new(1, 1, 3);
    let x = create_test_buffer(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let y = op.forward(&[&x]).unwrap();
    check_buffer_near(&y, &[2, 2], &[2.0, 3.0, 5.0, 6.0], 1e-6);
    let grads = op.backward(&crate::buffer::ones(&[2, 2])).unwrap();
    check_buffer_near(&grads[0], &[2, 3], &[0.0, 1.0, 1.0, 0.0, 1.0, 1.0], 1e-6);
}

#[test]
fn test_slice_out_of_range() {
    let mut op = SliceAxis::new(1, 2, 5);
    let x = pattern_buffer(&[2, 3], 0);
    assert!(matches!(
        op.forward(&[&x]),
        Err(DendriteError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_select_timestep() {
    let mut op = Select::new(1, 1);
    // [batch=2, time=2, features=1]
    let x = create_test_buffer(vec![1.0, 2.0, 3.0, 4.0], &[2, 2, 1]);
    let y = op.forward(&[&x]).unwrap();
    check_buffer_near(&y, &[2, 1], &[2.0, 4.0], 1e-6);
    let grads = op.backward(&create_test_buffer(vec![5.0, 6.0], &[2, 1])).unwrap();
    check_buffer_near(&grads[0], &[2, 2, 1], &[0.0, 5.0, 0.0, 6.0], 1e-6);
}

#[test]
fn test_reshape_round_trip_gradient() {
    let mut op = Reshape::new(vec![3, 2]);
    let x = pattern_buffer(&[2, 3], 0);
    op.forward(&[&x]).unwrap();
    let grads = op.backward(&crate::buffer::ones(&[3, 2])).unwrap();
    assert_eq!(grads[0].shape(), &[2, 3]);
}

#[test]
fn test_view_grad_checks() {
    let x = pattern_buffer(&[2, 3, 2], 0);
    check_grad(|t| select_op(&t[0], 1, 2), &[x.clone()], &pattern_buffer(&[2, 2], 1), 1e-2, 1e-2)
        .unwrap();
    check_grad(
        |t| slice_op(&t[0], 2, 0, 1),
        &[x.clone()],
        &pattern_buffer(&[2, 3, 1], 2),
        1e-2,
        1e-2,
    )
    .unwrap();
    check_grad(|t| reshape_op(&t[0], vec![6, 2]), &[x], &pattern_buffer(&[6, 2], 3), 1e-2, 1e-2)
        .unwrap();
}
