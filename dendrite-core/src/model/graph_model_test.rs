use super::*;
use crate::autograd::grad_check::check_grad_with_params;
use crate::nn::init::Initializer;
use crate::nn::layers::Dense;
use crate::ops::arithmetic::add_op;
use crate::ops::Operation;
use crate::utils::testing::{check_buffer_near, create_test_buffer, pattern_buffer};

/// `y = dense(x) + x`
struct Residual {
    dense: Dense,
}

impl Network for Residual {
    fn call(&mut self, x: &Tensor, _training: bool) -> Result<Tensor, DendriteError> {
        let h = self.dense.call(&[x])?;
        add_op(&h, x)
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.dense.parameters()
    }
}

fn residual() -> GraphModel<Residual> {
    GraphModel::new(Residual {
        dense: Dense::new(2)
            .unwrap()
            .with_weight_initializer(Initializer::Const(1.0)),
    })
}

#[test]
fn test_skip_connection_sums_input_gradient() {
    let mut model = residual();
    let x = create_test_buffer(vec![1.0, 2.0], &[1, 2]);
    let y = model.forward(&x, true).unwrap();
    check_buffer_near(&y, &[1, 2], &[4.0, 5.0], 1e-6);
    let dx = model
        .backward(&create_test_buffer(vec![1.0, 1.0], &[1, 2]))
        .unwrap();
    // dense path contributes dy · Wᵀ = [2, 2], the skip path [1, 1]
    check_buffer_near(&dx, &[1, 2], &[3.0, 3.0], 1e-6);
    let params = model.parameters();
    check_buffer_near(&params[0].grad().unwrap(), &[2, 2], &[1.0, 1.0, 2.0, 2.0], 1e-6);
}

#[test]
fn test_backward_requires_forward() {
    let mut model = residual();
    let err = model.backward(&create_test_buffer(vec![1.0, 1.0], &[1, 2]));
    assert!(matches!(
        err.unwrap_err(),
        DendriteError::BackwardBeforeForward { .. }
    ));
    model
        .forward(&create_test_buffer(vec![1.0, 2.0], &[1, 2]), false)
        .unwrap();
    let ones = create_test_buffer(vec![1.0, 1.0], &[1, 2]);
    model.backward(&ones).unwrap();
    // The graph of a forward is consumed by its backward.
    assert!(model.backward(&ones).is_err());
}

#[test]
fn test_shared_layer_accumulates_over_both_uses() {
    let dense = Dense::new(2).unwrap();
    let mut probe = dense.clone();
    probe.forward(&[&pattern_buffer(&[1, 2], 0)]).unwrap();
    let func = |inputs: &[Tensor]| {
        let h = dense.call(&[&inputs[0]])?;
        dense.call(&[&h])
    };
    check_grad_with_params(
        func,
        &[pattern_buffer(&[3, 2], 1)],
        &dense.parameters(),
        &pattern_buffer(&[3, 2], 2),
        1e-2,
        1e-2,
    )
    .unwrap();
}
