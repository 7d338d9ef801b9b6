use super::*;
use crate::nn::parameter::Parameter;
use crate::ops::arithmetic::{add_op, mul_op};
use crate::ops::reduction::sum_op;
use crate::utils::testing::{check_buffer_near, create_test_buffer};

fn position(order: &[Tensor], t: &Tensor) -> usize {
    order
        .iter()
        .position(|n| n.ptr_eq(t))
        .expect("node missing from topological order")
}

#[test]
fn test_topological_sort_orders_inputs_first() {
    let x = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let a = mul_op(&x, &Tensor::scalar(2.0)).unwrap();
    let b = mul_op(&x, &Tensor::scalar(3.0)).unwrap();
    let y = add_op(&a, &b).unwrap();

    let order = topological_sort(&y);
    // x appears once even though two nodes consume it
    assert_eq!(order.iter().filter(|n| n.ptr_eq(&x)).count(), 1);
    assert_eq!(order.len(), 6);
    assert!(position(&order, &x) < position(&order, &a));
    assert!(position(&order, &x) < position(&order, &b));
    assert!(position(&order, &a) < position(&order, &y));
    assert!(position(&order, &b) < position(&order, &y));
    assert!(order.last().unwrap().ptr_eq(&y));
}

#[test]
fn test_fan_in_gradients_are_summed() {
    let x = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let a = mul_op(&x, &Tensor::scalar(2.0)).unwrap();
    let b = mul_op(&x, &Tensor::scalar(3.0)).unwrap();
    let y = add_op(&a, &b).unwrap();
    y.backward(Some(create_test_buffer(vec![1.0, 1.0], &[2])))
        .unwrap();
    check_buffer_near(&x.grad().unwrap(), &[2], &[5.0, 5.0], 1e-6);
}

#[test]
fn test_shared_intermediate_runs_backward_once() {
    // z feeds both sides of the product: d(z*z)/dx = 2z * dz/dx = 2 * (2x) * 2
    let x = Tensor::new(vec![1.0, -3.0], vec![2]).unwrap();
    let z = mul_op(&x, &Tensor::scalar(2.0)).unwrap();
    let y = sum_op(&mul_op(&z, &z).unwrap(), 0, false).unwrap();
    y.backward(None).unwrap();
    check_buffer_near(&x.grad().unwrap(), &[2], &[8.0, -24.0], 1e-5);
}

#[test]
fn test_backward_on_leaf_fails() {
    let x = Tensor::new(vec![1.0], vec![1]).unwrap();
    assert_eq!(
        backward(&x, create_test_buffer(vec![1.0], &[1])).unwrap_err(),
        DendriteError::MissingCreator
    );
}

#[test]
fn test_graph_is_consumed() {
    let x = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    let y = add_op(&x, &x).unwrap();
    assert!(!y.is_leaf());
    y.backward(Some(create_test_buffer(vec![1.0, 1.0], &[2])))
        .unwrap();
    assert!(y.is_leaf());
    assert!(y.is_consumed());
    assert!(matches!(
        y.backward(Some(create_test_buffer(vec![1.0, 1.0], &[2]))),
        Err(DendriteError::GraphIntegrity(_))
    ));
    check_buffer_near(&x.grad().unwrap(), &[2], &[2.0, 2.0], 1e-6);
}

#[test]
fn test_second_root_over_consumed_subgraph_fails() {
    let x = Tensor::new(vec![2.0], vec![1]).unwrap();
    let w = Tensor::new(vec![2.0], vec![1]).unwrap();
    let h = mul_op(&x, &w).unwrap();
    let y1 = mul_op(&h, &Tensor::scalar(2.0)).unwrap();
    let y2 = mul_op(&h, &Tensor::scalar(3.0)).unwrap();
    y1.backward(None).unwrap();
    check_buffer_near(&x.grad().unwrap(), &[1], &[4.0], 1e-6);

    let err = y2.backward(None).unwrap_err();
    assert!(matches!(err, DendriteError::GraphIntegrity(_)));
    // Nothing from the rejected pass reached the graph.
    assert!(h.grad().is_none());
    assert!(!y2.is_leaf());
    check_buffer_near(&x.grad().unwrap(), &[1], &[4.0], 1e-6);
}

#[test]
fn test_joint_loss_over_shared_subgraph() {
    // Both losses in one pass: d(2h + 3h)/dx = 5w
    let x = Tensor::new(vec![2.0], vec![1]).unwrap();
    let w = Tensor::new(vec![2.0], vec![1]).unwrap();
    let h = mul_op(&x, &w).unwrap();
    let y1 = mul_op(&h, &Tensor::scalar(2.0)).unwrap();
    let y2 = mul_op(&h, &Tensor::scalar(3.0)).unwrap();
    add_op(&y1, &y2).unwrap().backward(None).unwrap();
    check_buffer_near(&x.grad().unwrap(), &[1], &[10.0], 1e-6);
    check_buffer_near(&w.grad().unwrap(), &[1], &[10.0], 1e-6);
}

#[test]
fn test_parameter_leaf_accumulates_into_parameter() {
    let w = Parameter::new("w", create_test_buffer(vec![3.0, -1.0], &[2]));
    let leaf = w.as_tensor();
    let y = sum_op(&mul_op(&leaf, &leaf).unwrap(), 0, false).unwrap();
    y.backward(None).unwrap();
    check_buffer_near(&w.grad().unwrap(), &[2], &[6.0, -2.0], 1e-6);

    // A second graph over a fresh leaf adds to the same accumulator.
    let y = sum_op(&w.as_tensor(), 0, false).unwrap();
    y.backward(None).unwrap();
    check_buffer_near(&w.grad().unwrap(), &[2], &[7.0, -1.0], 1e-6);
}
