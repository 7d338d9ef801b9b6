use dendrite_core::nn::layers::Dense;
use dendrite_core::nn::Initializer;
use dendrite_core::ops::arithmetic::{add_op, mul_op, sub_op};
use dendrite_core::ops::linalg::dot_op;
use dendrite_core::ops::reduction::sum_op;
use dendrite_core::{Operation, Tensor};

mod common;
use common::{assert_close, buf};

#[test]
fn tensor_consumed_twice_receives_summed_gradient() {
    let x = Tensor::new(vec![1.0, -2.0, 0.5], vec![3]).unwrap();
    let y = add_op(
        &mul_op(&x, &Tensor::scalar(2.0)).unwrap(),
        &mul_op(&x, &Tensor::scalar(3.0)).unwrap(),
    )
    .unwrap();
    y.backward(Some(buf(vec![1.0, 1.0, 1.0], &[3]))).unwrap();
    assert_close(&x.grad().unwrap(), &buf(vec![5.0, 5.0, 5.0], &[3]), 1e-6);
}

#[test]
fn diamond_graph_sums_both_paths() {
    // y = sum((x·W) - (x·W) * x0), with x·W shared by both branches
    let x = Tensor::new(vec![1.0, 2.0], vec![1, 2]).unwrap();
    let w = Tensor::new(vec![1.0, 0.0, 0.0, 1.0], vec![2, 2]).unwrap();
    let h = dot_op(&x, &w).unwrap();
    let scale = Tensor::new(vec![3.0, 3.0], vec![1, 2]).unwrap();
    let y = sub_op(&h, &mul_op(&h, &scale).unwrap()).unwrap();
    let loss = sum_op(&sum_op(&y, 1, false).unwrap(), 0, false).unwrap();
    loss.backward(None).unwrap();
    // dL/dh = 1 - 3 = -2 for each column; W is identity
    assert_close(&x.grad().unwrap(), &buf(vec![-2.0, -2.0], &[1, 2]), 1e-6);
    assert_close(
        &w.grad().unwrap(),
        &buf(vec![-2.0, -2.0, -4.0, -4.0], &[2, 2]),
        1e-6,
    );
}

#[test]
fn layer_applied_twice_accumulates_into_one_parameter() {
    let dense = Dense::new(2)
        .unwrap()
        .with_bias(false)
        .with_weight_initializer(Initializer::Const(1.0));
    let x = Tensor::new(vec![1.0, 1.0], vec![1, 2]).unwrap();
    let h = dense.call(&[&x]).unwrap();
    let y = dense.call(&[&h]).unwrap();
    y.backward(Some(buf(vec![1.0, 0.0], &[1, 2]))).unwrap();

    // Second use: h = [2, 2], dW = hᵀ·dy. First use: dh = dy·Wᵀ = [1, 1], dW = xᵀ·dh.
    let expected = buf(vec![3.0, 1.0, 3.0, 1.0], &[2, 2]);
    assert_close(&dense.weight().grad().unwrap(), &expected, 1e-6);
    assert_close(&x.grad().unwrap(), &buf(vec![2.0, 2.0], &[1, 2]), 1e-6);
}
