use dendrite_core::nn::layers::recurrent::RecurrentConfig;
use dendrite_core::model::{Model, Sequential};
use dendrite_core::nn::layers::{Dense, Lstm, SimpleRnn};
use dendrite_core::ops::activation::Tanh;
use dendrite_core::ops::activation::tanh_op;
use dendrite_core::ops::arithmetic::add_op;
use dendrite_core::ops::linalg::dot_op;
use dendrite_core::ops::merge::stack_op;
use dendrite_core::ops::view::select_op;
use dendrite_core::buffer;
use dendrite_core::{Buffer, Operation, Parameter, Tensor};

mod common;
use common::{assert_close, ramp};

/// Unrolls `h_t = tanh(x_t·W + h_{t-1}·U + b)` with primitive operations.
fn manual_rnn(
    x: &Buffer,
    h0: Buffer,
    w: &Parameter,
    u: &Parameter,
    b: &Parameter,
    dy: &Buffer,
) -> (Buffer, Buffer) {
    let input = Tensor::from_buffer(x.clone());
    let (w, u, b) = (w.as_tensor(), u.as_tensor(), b.as_tensor());
    let mut h = Tensor::from_buffer(h0);
    let mut hs = Vec::new();
    for t in 0..x.shape()[1] {
        let x_t = select_op(&input, 1, t).unwrap();
        let a = add_op(
            &add_op(&dot_op(&x_t, &w).unwrap(), &dot_op(&h, &u).unwrap()).unwrap(),
            &b,
        )
        .unwrap();
        h = tanh_op(&a).unwrap();
        hs.push(h.clone());
    }
    let refs: Vec<&Tensor> = hs.iter().collect();
    let y = stack_op(&refs, 1).unwrap();
    let value = y.value();
    y.backward(Some(dy.clone())).unwrap();
    (value, input.grad().unwrap())
}

fn rnn_parameters(layer: &SimpleRnn) -> (Parameter, Parameter, Parameter) {
    let weights = layer.cell().weights();
    (
        weights.weight().clone(),
        weights.recurrent_weight().clone(),
        weights.bias().cloned().expect("bias enabled"),
    )
}

fn take_grads(params: &[&Parameter]) -> Vec<Buffer> {
    params
        .iter()
        .map(|p| {
            let g = p.grad().expect("parameter received no gradient");
            p.reset_gradient();
            g
        })
        .collect()
}

#[test]
fn single_step_matches_dense_with_tanh() {
    let mut layer =
        SimpleRnn::from_config(RecurrentConfig::new(3).with_return_sequences(false)).unwrap();
    let x = ramp(&[2, 1, 4], 0.5);
    let dy = ramp(&[2, 3], 1.1);
    let y = layer.forward(&[&x]).unwrap();
    let dx = layer.backward(&dy).unwrap().remove(0);
    let (w, u, b) = rnn_parameters(&layer);

    let x_step = buffer::reshape(&x, &[2, 4]).unwrap();
    let dense = Dense::new(3).unwrap();
    let mut reference = Sequential::default().with(dense.clone()).with(Tanh::default());
    Model::forward(&mut reference, &x_step, true).unwrap();
    dense.weight().set_value(w.value()).unwrap();
    dense.bias().unwrap().set_value(b.value()).unwrap();
    let y_ref = Model::forward(&mut reference, &x_step, true).unwrap();
    let dx_ref = Model::backward(&mut reference, &dy).unwrap();

    assert_close(&y, &y_ref, 1e-5);
    assert_close(&buffer::reshape(&dx, &[2, 4]).unwrap(), &dx_ref, 1e-5);
    assert_close(&w.grad().unwrap(), &dense.weight().grad().unwrap(), 1e-5);
    assert_close(&b.grad().unwrap(), &dense.bias().unwrap().grad().unwrap(), 1e-5);
    // The recurrent weight only sees the zero initial state.
    assert!(u.grad().unwrap().iter().all(|&g| g == 0.0));
}

#[test]
fn unrolled_layer_matches_primitive_graph() {
    let mut layer = SimpleRnn::new(3).unwrap();
    let x = ramp(&[2, 4, 2], 0.1);
    let dy = ramp(&[2, 4, 3], 1.3);
    let y = layer.forward(&[&x]).unwrap();
    let dx = layer.backward(&dy).unwrap().remove(0);
    let (w, u, b) = rnn_parameters(&layer);
    let layer_grads = take_grads(&[&w, &u, &b]);

    let (y_manual, dx_manual) = manual_rnn(&x, buffer::zeros(&[2, 3]), &w, &u, &b, &dy);
    let manual_grads = take_grads(&[&w, &u, &b]);

    assert_close(&y, &y_manual, 1e-5);
    assert_close(&dx, &dx_manual, 1e-5);
    for (a, e) in layer_grads.iter().zip(manual_grads.iter()) {
        assert_close(a, e, 1e-5);
    }
}

#[test]
fn stateful_layer_starts_second_batch_from_carried_state() {
    let mut layer = SimpleRnn::from_config(RecurrentConfig::new(3).with_stateful(true)).unwrap();
    let first = ramp(&[2, 3, 2], 0.0);
    layer.forward(&[&first]).unwrap();
    let carried = layer.state().expect("stateful forward stores state").remove(0);

    let second = ramp(&[2, 2, 2], 2.0);
    let dy = ramp(&[2, 2, 3], 0.7);
    let y = layer.forward(&[&second]).unwrap();
    let dx = layer.backward(&dy).unwrap().remove(0);
    let (w, u, b) = rnn_parameters(&layer);
    let layer_grads = take_grads(&[&w, &u, &b]);

    let (y_manual, dx_manual) = manual_rnn(&second, carried, &w, &u, &b, &dy);
    let manual_grads = take_grads(&[&w, &u, &b]);

    assert_close(&y, &y_manual, 1e-5);
    assert_close(&dx, &dx_manual, 1e-5);
    for (a, e) in layer_grads.iter().zip(manual_grads.iter()) {
        assert_close(a, e, 1e-5);
    }
}

#[test]
fn reset_state_restores_fresh_behaviour() {
    let mut stateful = Lstm::from_config(
        RecurrentConfig::new(2)
            .with_stateful(true)
            .with_return_sequences(false),
    )
    .unwrap();
    let x = ramp(&[1, 3, 2], 0.4);
    let fresh = stateful.forward(&[&x]).unwrap();
    assert_eq!(stateful.state().map(|s| s.len()), Some(2));
    let carried = stateful.forward(&[&x]).unwrap();
    assert!(fresh
        .iter()
        .zip(carried.iter())
        .any(|(a, b)| (a - b).abs() > 1e-6));

    stateful.reset_state();
    assert!(stateful.state().is_none());
    let again = stateful.forward(&[&x]).unwrap();
    assert_close(&again, &fresh, 1e-6);
}

#[test]
fn frozen_layer_still_propagates_to_its_input() {
    let mut layer = SimpleRnn::new(2).unwrap();
    layer.set_trainable(false);
    let x = ramp(&[1, 2, 3], 0.9);
    layer.forward(&[&x]).unwrap();
    let dx = layer.backward(&ramp(&[1, 2, 2], 0.2)).unwrap().remove(0);
    assert!(dx.iter().any(|v| v.abs() > 0.0));
    for p in layer.parameters() {
        assert!(!p.has_gradient(), "frozen parameter {} received a gradient", p.name());
    }
}
