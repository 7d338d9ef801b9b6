use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::model::Model;
use crate::nn::config::LayerConfig;
use crate::nn::parameter::Parameter;
use crate::nn::regularizers::Regularizer;
use crate::ops::{cached, check_arity, Operation};

/// Layers applied strictly in order.
///
/// Backward pipes each layer's input gradient into the previous layer, which
/// is only correct because every intermediate value has exactly one consumer.
/// `Sequential` is itself an [`Operation`], so it can be called inside a
/// define-by-run [`Network`](crate::model::Network).
#[derive(Debug, Clone, Default)]
pub struct Sequential {
    layers: Vec<Box<dyn Operation>>,
    /// Shape of the last forward's output; backward only accepts this shape.
    output_shape: Option<Vec<usize>>,
}

impl Sequential {
    pub fn new(layers: Vec<Box<dyn Operation>>) -> Self {
        Sequential {
            layers,
            output_shape: None,
        }
    }

    pub fn add(&mut self, layer: Box<dyn Operation>) {
        self.layers.push(layer);
    }

    /// Builder form of [`add`](Sequential::add).
    pub fn with(mut self, layer: impl Operation + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn layers(&self) -> &[Box<dyn Operation>] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Operation for Sequential {
    fn name(&self) -> &str {
        "Sequential"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let mut current = inputs[0].clone();
        for layer in self.layers.iter_mut() {
            current = layer.forward(&[&current])?;
        }
        self.output_shape = Some(current.shape().to_vec());
        Ok(current)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let expected = cached(&self.output_shape, "Sequential")?;
        if grad_output.shape() != expected.as_slice() {
            return Err(DendriteError::ShapeMismatch {
                expected: expected.clone(),
                actual: grad_output.shape().to_vec(),
                operation: "Sequential backward".to_string(),
            });
        }
        let mut grad = grad_output.clone();
        for layer in self.layers.iter_mut().rev() {
            let mut grads = layer.backward(&grad)?;
            if grads.len() != 1 {
                return Err(DendriteError::ArityMismatch {
                    operation: format!("{} backward in Sequential", layer.name()),
                    expected: 1,
                    actual: grads.len(),
                });
            }
            grad = grads.remove(0);
        }
        Ok(vec![grad])
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }

    fn regularizers(&self) -> Vec<Regularizer> {
        self.layers.iter().flat_map(|l| l.regularizers()).collect()
    }

    fn set_training(&mut self, training: bool) {
        for layer in self.layers.iter_mut() {
            layer.set_training(training);
        }
    }

    fn set_trainable(&mut self, trainable: bool) {
        for layer in self.layers.iter_mut() {
            layer.set_trainable(trainable);
        }
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Sequential(self.layers.iter().map(|l| l.config()).collect())
    }
}

impl Model for Sequential {
    fn forward(&mut self, x: &Buffer, training: bool) -> Result<Buffer, DendriteError> {
        Operation::set_training(self, training);
        Operation::forward(self, &[x])
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Buffer, DendriteError> {
        let mut grads = Operation::backward(self, grad_output)?;
        Ok(grads.remove(0))
    }

    fn parameters(&self) -> Vec<Parameter> {
        Operation::parameters(self)
    }

    fn regularizers(&self) -> Vec<Regularizer> {
        Operation::regularizers(self)
    }
}

#[cfg(test)]
#[path = "sequential_test.rs"]
mod tests;
