use super::*;
use crate::autograd::grad_check::check_grad;
use crate::ops::Operation;
use crate::utils::testing::{check_buffer_near, create_test_buffer, pattern_buffer};

#[test]
fn test_concatenate_default_feature_axis() {
    let mut op = Concatenate::default();
    let a = create_test_buffer(vec![1.0, 2.0], &[1, 2]);
    let b = create_test_buffer(vec![3.0, 4.0], &[1, 2]);
    let y = op.forward(&[&a, &b]).unwrap();
    check_buffer_near(&y, &[1, 4], &[1.0, 2.0, 3.0, 4.0], 1e-6);

    let grads = op
        .backward(&create_test_buffer(vec![5.0, 6.0, 7.0, 8.0], &[1, 4]))
        .unwrap();
    check_buffer_near(&grads[0], &[1, 2], &[5.0, 6.0], 1e-6);
    check_buffer_near(&grads[1], &[1, 2], &[7.0, 8.0], 1e-6);
}

#[test]
fn test_concatenate_uneven_widths() {
    let mut op = Concatenate::new(1);
    let a = pattern_buffer(&[2, 1], 0);
    let b = pattern_buffer(&[2, 3], 1);
    let y = op.forward(&[&a, &b]).unwrap();
    assert_eq!(y.shape(), &[2, 4]);
    let grads = op.backward(&crate::buffer::ones(&[2, 4])).unwrap();
    assert_eq!(grads[0].shape(), &[2, 1]);
    assert_eq!(grads[1].shape(), &[2, 3]);
}

#[test]
fn test_concatenate_shape_mismatch() {
    let mut op = Concatenate::new(1);
    let a = pattern_buffer(&[2, 1], 0);
    let b = pattern_buffer(&[3, 1], 0);
    assert!(matches!(
        op.forward(&[&a, &b]),
        Err(crate::error::DendriteError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_stack_new_axis() {
    let mut op = Stack::new(1);
    let a = create_test_buffer(vec![1.0, 2.0], &[2, 1]);
    let b = create_test_buffer(vec![3.0, 4.0], &[2, 1]);
    let y = op.forward(&[&a, &b]).unwrap();
    check_buffer_near(&y, &[2, 2, 1], &[1.0, 3.0, 2.0, 4.0], 1e-6);
    let grads = op.backward(&y).unwrap();
    check_buffer_near(&grads[0], &[2, 1], &[1.0, 2.0], 1e-6);
    check_buffer_near(&grads[1], &[2, 1], &[3.0, 4.0], 1e-6);
}

#[test]
fn test_merge_grad_checks() {
    let a = pattern_buffer(&[2, 3], 0);
    let b = pattern_buffer(&[2, 2], 4);
    check_grad(
        |t| concat_op(&[&t[0], &t[1]], 1),
        &[a.clone(), b],
        &pattern_buffer(&[2, 5], 1),
        1e-2,
        1e-2,
    )
    .unwrap();
    let c = pattern_buffer(&[2, 3], 8);
    check_grad(
        |t| stack_op(&[&t[0], &t[1]], 0),
        &[a, c],
        &pattern_buffer(&[2, 2, 3], 3),
        1e-2,
        1e-2,
    )
    .unwrap();
}
