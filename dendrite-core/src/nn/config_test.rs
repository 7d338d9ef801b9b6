use super::*;
use crate::nn::layers::recurrent::RecurrentConfig;

#[test]
fn test_build_roundtrips_config() {
    let configs = vec![
        LayerConfig::Add,
        LayerConfig::Pow { exponent: 3.0 },
        LayerConfig::Sum {
            axis: 1,
            keepdims: true,
        },
        LayerConfig::Activation(ActivationKind::LeakyRelu { alpha: 0.2 }),
        LayerConfig::Dense {
            units: 4,
            use_bias: false,
            weight_initializer: Initializer::He,
            bias_initializer: Initializer::Zeros,
            weight_regularizer: Some(RegularizerKind::l2()),
            bias_regularizer: None,
        },
        LayerConfig::Dropout {
            rate: 0.25,
            use_scale: false,
        },
        LayerConfig::SimpleRnn {
            config: RecurrentConfig::new(3),
            activation: ActivationKind::Relu,
        },
        LayerConfig::Lstm(RecurrentConfig::new(5).with_stateful(true)),
        LayerConfig::Gru(RecurrentConfig::new(2).with_return_sequences(false)),
        LayerConfig::SoftmaxCrossEntropy,
        LayerConfig::Sequential(vec![LayerConfig::Flatten, LayerConfig::Exp]),
    ];
    for config in configs {
        let op = config.build().unwrap();
        assert_eq!(op.config(), config);
    }
}

#[test]
fn test_build_rejects_invalid_hyperparameters() {
    let err = LayerConfig::Dropout {
        rate: 1.5,
        use_scale: true,
    }
    .build()
    .unwrap_err();
    assert!(matches!(err, DendriteError::ConfigurationError(_)));
    assert!(LayerConfig::Lstm(RecurrentConfig::new(0)).build().is_err());
}

#[test]
fn test_built_layers_get_fresh_parameters() {
    let config = LayerConfig::Dense {
        units: 2,
        use_bias: true,
        weight_initializer: Initializer::Const(1.0),
        bias_initializer: Initializer::Zeros,
        weight_regularizer: None,
        bias_regularizer: None,
    };
    let a = config.build().unwrap();
    let b = config.build().unwrap();
    assert_ne!(a.parameters()[0].id(), b.parameters()[0].id());
}
