//! Recurrent layers unrolled on the autodiff graph.
//!
//! A recurrent layer owns one cell operation. Each forward selects the
//! timesteps of a `[batch, time, features]` input and calls the cell once per
//! step; every call is a separate graph node holding a clone of the cell, and
//! all clones share the cell's parameters. Backward is a single traversal of
//! that local graph, so the weight gradients sum over the timesteps and the
//! state gradient threads from the last step back to the first.

pub mod gru;
pub mod lstm;
pub mod simple_rnn;

pub use gru::GruCell;
pub use lstm::LstmCell;
pub use simple_rnn::SimpleRnnCell;

use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::nn::init::Initializer;
use crate::nn::parameter::Parameter;
use crate::ops::activation::ActivationKind;
use crate::ops::linalg::dot::{matmul, matmul_nt, matmul_tn};
use crate::ops::merge::stack_op;
use crate::ops::view::select_op;
use crate::ops::{cached, check_rank, Operation};
use crate::tensor::Tensor;
use ndarray::Axis;
use std::sync::{Arc, RwLock};

pub type SimpleRnn = Recurrent<SimpleRnnCell>;
pub type Lstm = Recurrent<LstmCell>;
pub type Gru = Recurrent<GruCell>;

/// Options shared by every recurrent layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecurrentConfig {
    pub units: usize,
    /// Carry the final state into the next forward instead of starting at zero.
    pub stateful: bool,
    /// Output every timestep's hidden state (`[batch, time, units]`) rather
    /// than only the last one (`[batch, units]`).
    pub return_sequences: bool,
    pub use_bias: bool,
    pub weight_initializer: Initializer,
    pub recurrent_weight_initializer: Initializer,
    pub bias_initializer: Initializer,
}

impl RecurrentConfig {
    pub fn new(units: usize) -> Self {
        RecurrentConfig {
            units,
            stateful: false,
            return_sequences: true,
            use_bias: true,
            weight_initializer: Initializer::default_weight(),
            recurrent_weight_initializer: Initializer::default_weight(),
            bias_initializer: Initializer::Zeros,
        }
    }

    pub fn with_stateful(mut self, stateful: bool) -> Self {
        self.stateful = stateful;
        self
    }

    pub fn with_return_sequences(mut self, return_sequences: bool) -> Self {
        self.return_sequences = return_sequences;
        self
    }

    pub fn with_bias(mut self, use_bias: bool) -> Self {
        self.use_bias = use_bias;
        self
    }

    pub fn with_initializers(
        mut self,
        weight: Initializer,
        recurrent_weight: Initializer,
        bias: Initializer,
    ) -> Self {
        self.weight_initializer = weight;
        self.recurrent_weight_initializer = recurrent_weight;
        self.bias_initializer = bias;
        self
    }

    fn validate(&self) -> Result<(), DendriteError> {
        if self.units == 0 {
            return Err(DendriteError::ConfigurationError(
                "recurrent layers require at least one unit".to_string(),
            ));
        }
        Ok(())
    }
}

/// The three parameters of a gated cell: input weight `[features, k*units]`,
/// recurrent weight `[units, k*units]` and bias `[k*units]`, with `k` gate
/// blocks laid out side by side.
#[derive(Debug, Clone)]
pub struct GateWeights {
    gates: usize,
    weight: Parameter,
    recurrent_weight: Parameter,
    bias: Option<Parameter>,
}

impl GateWeights {
    fn new(prefix: &str, gates: usize, use_bias: bool) -> Self {
        GateWeights {
            gates,
            weight: Parameter::deferred(format!("{}.weight", prefix)),
            recurrent_weight: Parameter::deferred(format!("{}.recurrent_weight", prefix)),
            bias: use_bias.then(|| Parameter::deferred(format!("{}.bias", prefix))),
        }
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn recurrent_weight(&self) -> &Parameter {
        &self.recurrent_weight
    }

    pub fn bias(&self) -> Option<&Parameter> {
        self.bias.as_ref()
    }

    fn parameters(&self) -> Vec<Parameter> {
        let mut params = vec![self.weight.clone(), self.recurrent_weight.clone()];
        if let Some(bias) = &self.bias {
            params.push(bias.clone());
        }
        params
    }

    /// Materialises the parameters for `features` input columns.
    fn build(&self, config: &RecurrentConfig, features: usize) -> Result<(), DendriteError> {
        let width = self.gates * config.units;
        self.weight
            .initialize_with(&[features, width], &config.weight_initializer, features)?;
        self.recurrent_weight.initialize_with(
            &[config.units, width],
            &config.recurrent_weight_initializer,
            config.units,
        )?;
        if let Some(bias) = &self.bias {
            bias.initialize_with(&[width], &config.bias_initializer, features)?;
        }
        if self.weight.shape() != [features, width] {
            return Err(DendriteError::ShapeMismatch {
                expected: self.weight.shape(),
                actual: vec![features, width],
                operation: "recurrent cell".to_string(),
            });
        }
        Ok(())
    }

    /// `x · W + h · U + b` over all gate blocks.
    fn preactivation(&self, x: &Buffer, h: &Buffer) -> Result<Buffer, DendriteError> {
        let mut a = matmul(x, &self.weight.value(), "recurrent cell")?;
        a += &matmul(h, &self.recurrent_weight.value(), "recurrent cell")?;
        if let Some(bias) = &self.bias {
            a += &bias.value();
        }
        Ok(a)
    }

    /// Accumulates the parameter gradients for gate pre-activation gradient
    /// `da` and returns `(dx, dh)`.
    fn backward(&self, x: &Buffer, h: &Buffer, da: &Buffer) -> Result<(Buffer, Buffer), DendriteError> {
        self.weight
            .accumulate_gradient(&matmul_tn(x, da, "recurrent cell backward")?)?;
        self.recurrent_weight
            .accumulate_gradient(&matmul_tn(h, da, "recurrent cell backward")?)?;
        if let Some(bias) = &self.bias {
            bias.accumulate_gradient(&da.sum_axis(Axis(0)))?;
        }
        let dx = matmul_nt(da, &self.weight.value(), "recurrent cell backward")?;
        let dh = matmul_nt(da, &self.recurrent_weight.value(), "recurrent cell backward")?;
        Ok((dx, dh))
    }
}

/// Gate block `index` of width `units` along the feature axis.
pub(crate) fn gate(a: &Buffer, index: usize, units: usize) -> Buffer {
    a.slice_axis(Axis(1), (index * units..(index + 1) * units).into())
        .to_owned()
}

/// Joins gate blocks back into one `[batch, k*units]` buffer.
pub(crate) fn join_gates(blocks: &[&Buffer]) -> Result<Buffer, DendriteError> {
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    Ok(ndarray::concatenate(Axis(1), &views)?)
}

/// One step of a recurrent layer, run as a graph operation.
///
/// The cell's forward inputs are `[x_t, state...]`; its single output holds
/// the new state(s).
pub trait RecurrentCell: Operation + Clone + 'static {
    /// Number of state tensors threaded between steps.
    const STATES: usize;

    fn from_config(config: RecurrentConfig) -> Self;

    fn recurrent_config(&self) -> &RecurrentConfig;

    fn recurrent_config_mut(&mut self) -> &mut RecurrentConfig;

    /// Runs one timestep on the graph, returning the new states with the
    /// hidden state first.
    fn step(&self, x: &Tensor, states: &[Tensor]) -> Result<Vec<Tensor>, DendriteError> {
        let mut inputs = vec![x];
        inputs.extend(states.iter());
        Ok(vec![self.call(&inputs)?])
    }
}

/// Recurrent state carried between forward calls of a stateful layer.
///
/// Shared by every clone of the layer. The stored buffers are detached: they
/// become fresh leaves on the next forward, so no gradient crosses a batch
/// boundary.
#[derive(Debug, Clone, Default)]
pub struct StateSlot(Arc<RwLock<Option<Vec<Buffer>>>>);

impl StateSlot {
    fn load(&self) -> Option<Vec<Buffer>> {
        self.0.read().expect("RwLock poisoned").clone()
    }

    fn store(&self, states: Vec<Buffer>) {
        *self.0.write().expect("RwLock poisoned") = Some(states);
    }

    fn clear(&self) {
        *self.0.write().expect("RwLock poisoned") = None;
    }
}

/// The unrolled graph of the last forward call.
#[derive(Debug, Clone)]
struct Unrolled {
    input: Tensor,
    output: Tensor,
}

/// A recurrent layer over `[batch, time, features]` inputs.
#[derive(Debug, Clone)]
pub struct Recurrent<C: RecurrentCell> {
    cell: C,
    state: StateSlot,
    unrolled: Option<Unrolled>,
}

impl<C: RecurrentCell> Recurrent<C> {
    /// Layer with `units` hidden units and default options.
    pub fn new(units: usize) -> Result<Self, DendriteError> {
        Self::from_config(RecurrentConfig::new(units))
    }

    pub fn from_config(config: RecurrentConfig) -> Result<Self, DendriteError> {
        config.validate()?;
        Ok(Recurrent {
            cell: C::from_config(config),
            state: StateSlot::default(),
            unrolled: None,
        })
    }

    pub fn with_stateful(mut self, stateful: bool) -> Self {
        self.cell.recurrent_config_mut().stateful = stateful;
        self
    }

    pub fn with_return_sequences(mut self, return_sequences: bool) -> Self {
        self.cell.recurrent_config_mut().return_sequences = return_sequences;
        self
    }

    pub fn recurrent_config(&self) -> &RecurrentConfig {
        self.cell.recurrent_config()
    }

    pub fn cell(&self) -> &C {
        &self.cell
    }

    /// The carried state buffers (hidden first), if a stateful forward ran.
    pub fn state(&self) -> Option<Vec<Buffer>> {
        self.state.load()
    }

    /// Drops the carried state; the next forward starts from zeros.
    pub fn reset_state(&self) {
        log::debug!("{}: state reset", self.cell.name());
        self.state.clear();
    }

    fn initial_states(&self, batch: usize) -> Vec<Tensor> {
        let config = self.cell.recurrent_config();
        if config.stateful {
            if let Some(states) = self.state.load() {
                if states.len() == C::STATES
                    && states.iter().all(|s| s.shape() == [batch, config.units])
                {
                    return states.into_iter().map(Tensor::from_buffer).collect();
                }
            }
            log::debug!("{}: starting from zero state", self.cell.name());
        }
        (0..C::STATES)
            .map(|_| Tensor::zeros(&[batch, config.units]))
            .collect()
    }
}

impl Recurrent<SimpleRnnCell> {
    pub fn with_activation(mut self, activation: ActivationKind) -> Self {
        self.cell.set_activation(activation);
        self
    }
}

impl<C: RecurrentCell> Operation for Recurrent<C> {
    fn name(&self) -> &str {
        self.cell.name()
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        crate::ops::check_arity(self.name(), inputs, 1)?;
        let x = inputs[0];
        check_rank(self.name(), x, 3)?;
        let (batch, steps) = (x.shape()[0], x.shape()[1]);
        if steps == 0 {
            return Err(DendriteError::ShapeMismatch {
                expected: vec![batch, 1, x.shape()[2]],
                actual: x.shape().to_vec(),
                operation: self.name().to_string(),
            });
        }
        let input = Tensor::from_buffer(x.clone());
        let mut states = self.initial_states(batch);
        let mut hidden = Vec::with_capacity(steps);
        for t in 0..steps {
            let x_t = select_op(&input, 1, t)?;
            states = self.cell.step(&x_t, &states)?;
            log::trace!("{}: step {} -> {:?}", self.name(), t, states[0].shape());
            hidden.push(states[0].clone());
        }
        let config = *self.cell.recurrent_config();
        let output = if config.return_sequences {
            let refs: Vec<&Tensor> = hidden.iter().collect();
            stack_op(&refs, 1)?
        } else {
            states[0].clone()
        };
        if config.stateful {
            self.state.store(states.iter().map(Tensor::value).collect());
        }
        let y = output.value();
        self.unrolled = Some(Unrolled { input, output });
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let unrolled = cached(&self.unrolled, self.cell.name())?.clone();
        unrolled.output.backward(Some(grad_output.clone()))?;
        self.unrolled = None;
        let dx = unrolled
            .input
            .grad()
            .unwrap_or_else(|| buffer::zeros(&unrolled.input.shape()));
        Ok(vec![dx])
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.cell.parameters()
    }

    fn config(&self) -> LayerConfig {
        self.cell.config()
    }
}

#[cfg(test)]
#[path = "recurrent_test.rs"]
mod tests;
