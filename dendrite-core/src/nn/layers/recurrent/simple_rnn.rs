use super::{GateWeights, RecurrentCell, RecurrentConfig};
use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::nn::parameter::Parameter;
use crate::ops::activation::ActivationKind;
use crate::ops::linalg::dot::as_matrix;
use crate::ops::{cached, check_arity, Operation};

/// `h' = act(x · W + h · U + b)`
#[derive(Debug, Clone)]
pub struct SimpleRnnCell {
    config: RecurrentConfig,
    activation: ActivationKind,
    weights: GateWeights,
    act: Box<dyn Operation>,
    inputs: Option<(Buffer, Buffer)>,
}

impl SimpleRnnCell {
    pub fn set_activation(&mut self, activation: ActivationKind) {
        self.activation = activation;
        self.act = activation.build();
    }

    pub fn activation(&self) -> ActivationKind {
        self.activation
    }

    pub fn weights(&self) -> &GateWeights {
        &self.weights
    }
}

impl RecurrentCell for SimpleRnnCell {
    const STATES: usize = 1;

    fn from_config(config: RecurrentConfig) -> Self {
        SimpleRnnCell {
            config,
            activation: ActivationKind::Tanh,
            weights: GateWeights::new("simple_rnn", 1, config.use_bias),
            act: ActivationKind::Tanh.build(),
            inputs: None,
        }
    }

    fn recurrent_config(&self) -> &RecurrentConfig {
        &self.config
    }

    fn recurrent_config_mut(&mut self) -> &mut RecurrentConfig {
        &mut self.config
    }
}

impl Operation for SimpleRnnCell {
    fn name(&self) -> &str {
        "SimpleRnn"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 2)?;
        let (x, h) = (inputs[0], inputs[1]);
        self.weights.build(&self.config, as_matrix(x, "SimpleRnn")?.ncols())?;
        let a = self.weights.preactivation(x, h)?;
        let h2 = self.act.forward(&[&a])?;
        self.inputs = Some((x.clone(), h.clone()));
        Ok(h2)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let (x, h) = cached(&self.inputs, "SimpleRnn")?;
        let da = self
            .act
            .backward(grad_output)?
            .into_iter()
            .next()
            .ok_or_else(|| DendriteError::InternalError("activation returned no gradient".to_string()))?;
        let (dx, dh) = self.weights.backward(x, h, &da)?;
        Ok(vec![dx, dh])
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.weights.parameters()
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::SimpleRnn {
            config: self.config,
            activation: self.activation,
        }
    }
}
