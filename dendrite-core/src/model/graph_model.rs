use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::model::Model;
use crate::nn::parameter::Parameter;
use crate::nn::regularizers::Regularizer;
use crate::tensor::Tensor;

/// A user-written computation over tensors.
///
/// `call` may invoke operations in any order and reuse any tensor, e.g. for
/// residual connections; the graph is recorded as it runs.
pub trait Network {
    fn call(&mut self, x: &Tensor, training: bool) -> Result<Tensor, DendriteError>;

    /// Every parameter the network reads, in a stable order.
    fn parameters(&self) -> Vec<Parameter>;

    fn regularizers(&self) -> Vec<Regularizer> {
        Vec::new()
    }
}

/// A define-by-run model.
///
/// Backward runs the general reverse-topological traversal from the output of
/// the last forward, so tensors consumed by several operations receive the
/// sum of their consumers' gradients.
#[derive(Debug)]
pub struct GraphModel<N: Network> {
    network: N,
    last: Option<(Tensor, Tensor)>,
}

impl<N: Network> GraphModel<N> {
    pub fn new(network: N) -> Self {
        GraphModel {
            network,
            last: None,
        }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }
}

impl<N: Network> Model for GraphModel<N> {
    fn forward(&mut self, x: &Buffer, training: bool) -> Result<Buffer, DendriteError> {
        let input = Tensor::from_buffer(x.clone());
        let output = self.network.call(&input, training)?;
        let y = output.value();
        self.last = Some((input, output));
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Buffer, DendriteError> {
        let (input, output) = self
            .last
            .take()
            .ok_or_else(|| DendriteError::BackwardBeforeForward {
                operation: "GraphModel".to_string(),
            })?;
        output.backward(Some(grad_output.clone()))?;
        Ok(input
            .grad()
            .unwrap_or_else(|| buffer::zeros(&input.shape())))
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.network.parameters()
    }

    fn regularizers(&self) -> Vec<Regularizer> {
        self.network.regularizers()
    }
}

#[cfg(test)]
#[path = "graph_model_test.rs"]
mod tests;
