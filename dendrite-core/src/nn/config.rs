//! Tagged layer descriptions.
//!
//! Every operation reports a [`LayerConfig`] and every config rebuilds an
//! equivalent operation with fresh parameters. Parameter values travel
//! separately, through [`Model::load_parameters`](crate::model::Model::load_parameters).

use crate::error::DendriteError;
use crate::model::sequential::Sequential;
use crate::nn::init::Initializer;
use crate::nn::layers::recurrent::{Gru, Lstm, RecurrentConfig, SimpleRnn};
use crate::nn::layers::{Dense, Dropout, Flatten};
use crate::nn::losses::{MeanSquaredError, SigmoidCrossEntropy, SoftmaxCrossEntropy};
use crate::nn::regularizers::RegularizerKind;
use crate::ops::activation::ActivationKind;
use crate::ops::arithmetic::{Add, Div, Mul, Neg, Pow, Sub};
use crate::ops::linalg::Dot;
use crate::ops::math_elem::{Exp, Ln, Sqrt};
use crate::ops::merge::{Concatenate, Stack};
use crate::ops::reduction::{Mean, Sum};
use crate::ops::view::{Reshape, Select, SliceAxis};
use crate::ops::Operation;

/// One variant per operation kind.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerConfig {
    Add,
    Sub,
    Mul,
    Div,
    Dot,
    Neg,
    Exp,
    Ln,
    Sqrt,
    Pow {
        exponent: f32,
    },
    Sum {
        axis: usize,
        keepdims: bool,
    },
    Mean {
        axis: usize,
        keepdims: bool,
    },
    Concatenate {
        axis: usize,
    },
    Stack {
        axis: usize,
    },
    SliceAxis {
        axis: usize,
        start: usize,
        end: usize,
    },
    Select {
        axis: usize,
        index: usize,
    },
    Reshape {
        shape: Vec<usize>,
    },
    Activation(ActivationKind),
    Dense {
        units: usize,
        use_bias: bool,
        weight_initializer: Initializer,
        bias_initializer: Initializer,
        weight_regularizer: Option<RegularizerKind>,
        bias_regularizer: Option<RegularizerKind>,
    },
    Dropout {
        rate: f32,
        use_scale: bool,
    },
    Flatten,
    SimpleRnn {
        config: RecurrentConfig,
        activation: ActivationKind,
    },
    Lstm(RecurrentConfig),
    Gru(RecurrentConfig),
    MeanSquaredError,
    SoftmaxCrossEntropy,
    SigmoidCrossEntropy,
    Sequential(Vec<LayerConfig>),
}

impl LayerConfig {
    /// Rebuilds the described operation.
    pub fn build(&self) -> Result<Box<dyn Operation>, DendriteError> {
        let op: Box<dyn Operation> = match self {
            LayerConfig::Add => Box::new(Add::default()),
            LayerConfig::Sub => Box::new(Sub::default()),
            LayerConfig::Mul => Box::new(Mul::default()),
            LayerConfig::Div => Box::new(Div::default()),
            LayerConfig::Dot => Box::new(Dot::default()),
            LayerConfig::Neg => Box::new(Neg::default()),
            LayerConfig::Exp => Box::new(Exp::default()),
            LayerConfig::Ln => Box::new(Ln::default()),
            LayerConfig::Sqrt => Box::new(Sqrt::default()),
            LayerConfig::Pow { exponent } => Box::new(Pow::new(*exponent)),
            LayerConfig::Sum { axis, keepdims } => Box::new(Sum::new(*axis, *keepdims)),
            LayerConfig::Mean { axis, keepdims } => Box::new(Mean::new(*axis, *keepdims)),
            LayerConfig::Concatenate { axis } => Box::new(Concatenate::new(*axis)),
            LayerConfig::Stack { axis } => Box::new(Stack::new(*axis)),
            LayerConfig::SliceAxis { axis, start, end } => {
                Box::new(SliceAxis::new(*axis, *start, *end))
            }
            LayerConfig::Select { axis, index } => Box::new(Select::new(*axis, *index)),
            LayerConfig::Reshape { shape } => Box::new(Reshape::new(shape.clone())),
            LayerConfig::Activation(kind) => kind.build(),
            LayerConfig::Dense {
                units,
                use_bias,
                weight_initializer,
                bias_initializer,
                weight_regularizer,
                bias_regularizer,
            } => {
                let mut dense = Dense::new(*units)?
                    .with_bias(*use_bias)
                    .with_weight_initializer(*weight_initializer)
                    .with_bias_initializer(*bias_initializer);
                if let Some(kind) = weight_regularizer {
                    dense = dense.with_weight_regularizer(*kind);
                }
                if let Some(kind) = bias_regularizer {
                    dense = dense.with_bias_regularizer(*kind);
                }
                Box::new(dense)
            }
            LayerConfig::Dropout { rate, use_scale } => {
                Box::new(Dropout::new(*rate)?.with_scale(*use_scale))
            }
            LayerConfig::Flatten => Box::new(Flatten::default()),
            LayerConfig::SimpleRnn { config, activation } => {
                Box::new(SimpleRnn::from_config(*config)?.with_activation(*activation))
            }
            LayerConfig::Lstm(config) => Box::new(Lstm::from_config(*config)?),
            LayerConfig::Gru(config) => Box::new(Gru::from_config(*config)?),
            LayerConfig::MeanSquaredError => Box::new(MeanSquaredError::default()),
            LayerConfig::SoftmaxCrossEntropy => Box::new(SoftmaxCrossEntropy::default()),
            LayerConfig::SigmoidCrossEntropy => Box::new(SigmoidCrossEntropy::default()),
            LayerConfig::Sequential(layers) => {
                let ops = layers
                    .iter()
                    .map(LayerConfig::build)
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(Sequential::new(ops))
            }
        };
        Ok(op)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
