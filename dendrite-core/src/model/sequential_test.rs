use super::*;
use crate::nn::init::Initializer;
use crate::nn::layers::{Dense, Dropout};
use crate::ops::activation::{ActivationKind, Relu};
use crate::tensor::Tensor;
use crate::utils::testing::{check_buffer_near, create_test_buffer};

fn dense_relu() -> Sequential {
    Sequential::default()
        .with(
            Dense::new(2)
                .unwrap()
                .with_weight_initializer(Initializer::Const(1.0))
                .with_bias_initializer(Initializer::Const(-2.0)),
        )
        .with(Relu::default())
}

#[test]
fn test_forward_and_backward_in_order() {
    let mut model = dense_relu();
    let x = create_test_buffer(vec![1.0, 0.5, 2.0, 3.0], &[2, 2]);
    let y = Model::forward(&mut model, &x, true).unwrap();
    // rows: 1.5 - 2 -> 0, 5 - 2 -> 3
    check_buffer_near(&y, &[2, 2], &[0.0, 0.0, 3.0, 3.0], 1e-6);
    let dx = Model::backward(&mut model, &create_test_buffer(vec![1.0; 4], &[2, 2])).unwrap();
    check_buffer_near(&dx, &[2, 2], &[0.0, 0.0, 2.0, 2.0], 1e-6);
    let params = Model::parameters(&model);
    assert_eq!(params.len(), 2);
    check_buffer_near(&params[0].grad().unwrap(), &[2, 2], &[2.0, 2.0, 3.0, 3.0], 1e-6);
    check_buffer_near(&params[1].grad().unwrap(), &[2], &[1.0, 1.0], 1e-6);
}

#[test]
fn test_parameters_are_stable_across_calls() {
    let model = dense_relu();
    let ids: Vec<_> = Model::parameters(&model).iter().map(|p| p.id()).collect();
    let again: Vec<_> = Model::parameters(&model).iter().map(|p| p.id()).collect();
    assert_eq!(ids, again);
}

#[test]
fn test_load_parameters() {
    let mut model = dense_relu();
    Model::forward(&mut model, &create_test_buffer(vec![1.0, 1.0], &[1, 2]), false).unwrap();
    let values = vec![
        create_test_buffer(vec![1.0, 0.0, 0.0, 1.0], &[2, 2]),
        create_test_buffer(vec![0.0, 0.0], &[2]),
    ];
    model.load_parameters(&values).unwrap();
    let y = Model::forward(&mut model, &create_test_buffer(vec![3.0, -1.0], &[1, 2]), false).unwrap();
    check_buffer_near(&y, &[1, 2], &[3.0, 0.0], 1e-6);

    let err = model.load_parameters(&values[..1]).unwrap_err();
    assert!(matches!(err, DendriteError::ArityMismatch { .. }));
    let wrong = vec![create_test_buffer(vec![1.0], &[1]), values[1].clone()];
    let err = model.load_parameters(&wrong).unwrap_err();
    assert!(matches!(err, DendriteError::ShapeMismatch { .. }));
}

#[test]
fn test_training_flag_reaches_layers() {
    let mut model = Sequential::default().with(Dropout::new(0.5).unwrap());
    let x = create_test_buffer(vec![2.0; 4], &[1, 4]);
    let y = Model::forward(&mut model, &x, false).unwrap();
    check_buffer_near(&y, &[1, 4], &[1.0; 4], 1e-6);
    let y = Model::forward(&mut model, &x, true).unwrap();
    assert!(y.iter().all(|&v| v == 0.0 || v == 2.0));
}

#[test]
fn test_nested_in_graph_matches_list_backward() {
    let model = dense_relu();
    let x = create_test_buffer(vec![1.0, 0.5, 2.0, 3.0], &[2, 2]);
    let input = Tensor::from_buffer(x.clone());
    let out = model.call(&[&input]).unwrap();
    out.backward(Some(create_test_buffer(vec![1.0; 4], &[2, 2])))
        .unwrap();
    check_buffer_near(&input.grad().unwrap(), &[2, 2], &[0.0, 0.0, 2.0, 2.0], 1e-6);
    let params = Model::parameters(&model);
    check_buffer_near(&params[0].grad().unwrap(), &[2, 2], &[2.0, 2.0, 3.0, 3.0], 1e-6);
}

#[test]
fn test_config_rebuilds_structure() {
    let model = dense_relu();
    let config = model.config();
    match &config {
        LayerConfig::Sequential(layers) => {
            assert_eq!(layers.len(), 2);
            assert_eq!(layers[1], LayerConfig::Activation(ActivationKind::Relu));
        }
        other => panic!("unexpected config {:?}", other),
    }
    assert_eq!(config.build().unwrap().config(), config);
}

#[test]
fn test_backward_rejects_gradient_of_wrong_shape() {
    let mut model = Sequential::default().with(Dense::new(1).unwrap());
    let x = create_test_buffer(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2]);
    Model::forward(&mut model, &x, true).unwrap();
    let err = Model::backward(&mut model, &create_test_buffer(vec![1.0, 1.0], &[2, 1]))
        .unwrap_err();
    assert_eq!(
        err,
        DendriteError::ShapeMismatch {
            expected: vec![3, 1],
            actual: vec![2, 1],
            operation: "Sequential backward".to_string(),
        }
    );
    // The cached forward is untouched and a well-shaped gradient still works.
    let dx = Model::backward(&mut model, &create_test_buffer(vec![1.0; 3], &[3, 1])).unwrap();
    assert_eq!(dx.shape(), &[3, 2]);
}

#[test]
fn test_backward_before_forward() {
    let mut model = dense_relu();
    let err = Model::backward(&mut model, &create_test_buffer(vec![1.0, 1.0], &[1, 2]))
        .unwrap_err();
    assert!(matches!(err, DendriteError::BackwardBeforeForward { .. }));
}
