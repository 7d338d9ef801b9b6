use super::{gate, join_gates, GateWeights, RecurrentCell, RecurrentConfig};
use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::nn::parameter::Parameter;
use crate::ops::activation::sigmoid;
use crate::ops::linalg::dot::as_matrix;
use crate::ops::view::slice_op;
use crate::ops::{cached, check_arity, Operation};
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
struct LstmCache {
    x: Buffer,
    h: Buffer,
    c: Buffer,
    forget: Buffer,
    candidate: Buffer,
    input: Buffer,
    output: Buffer,
    tanh_c: Buffer,
}

/// Long short-term memory step.
///
/// Forward inputs are `[x, h, c]`; the output is `[h', c']` joined along the
/// feature axis, split again by [`RecurrentCell::step`]. Gate blocks in the
/// weights are ordered forget, candidate, input, output.
#[derive(Debug, Clone)]
pub struct LstmCell {
    config: RecurrentConfig,
    weights: GateWeights,
    cache: Option<LstmCache>,
}

impl LstmCell {
    pub fn weights(&self) -> &GateWeights {
        &self.weights
    }
}

impl RecurrentCell for LstmCell {
    const STATES: usize = 2;

    fn from_config(config: RecurrentConfig) -> Self {
        LstmCell {
            config,
            weights: GateWeights::new("lstm", 4, config.use_bias),
            cache: None,
        }
    }

    fn recurrent_config(&self) -> &RecurrentConfig {
        &self.config
    }

    fn recurrent_config_mut(&mut self) -> &mut RecurrentConfig {
        &mut self.config
    }

    fn step(&self, x: &Tensor, states: &[Tensor]) -> Result<Vec<Tensor>, DendriteError> {
        let units = self.config.units;
        let joined = self.call(&[x, &states[0], &states[1]])?;
        let h = slice_op(&joined, 1, 0, units)?;
        let c = slice_op(&joined, 1, units, 2 * units)?;
        Ok(vec![h, c])
    }
}

impl Operation for LstmCell {
    fn name(&self) -> &str {
        "Lstm"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 3)?;
        let (x, h, c) = (inputs[0], inputs[1], inputs[2]);
        let units = self.config.units;
        self.weights.build(&self.config, as_matrix(x, "Lstm")?.ncols())?;
        let a = self.weights.preactivation(x, h)?;

        let forget = sigmoid(&gate(&a, 0, units));
        let candidate = gate(&a, 1, units).mapv(f32::tanh);
        let input = sigmoid(&gate(&a, 2, units));
        let output = sigmoid(&gate(&a, 3, units));

        let c2 = &forget * c + &candidate * &input;
        let tanh_c = c2.mapv(f32::tanh);
        let h2 = &output * &tanh_c;
        let y = join_gates(&[&h2, &c2])?;

        self.cache = Some(LstmCache {
            x: x.clone(),
            h: h.clone(),
            c: c.clone(),
            forget,
            candidate,
            input,
            output,
            tanh_c,
        });
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let cache = cached(&self.cache, "Lstm")?;
        let units = self.config.units;
        let dh2 = gate(grad_output, 0, units);
        let dc2 = gate(grad_output, 1, units);

        let dc = &dc2 + &(&dh2 * &cache.output * cache.tanh_c.mapv(|t| 1.0 - t * t));
        let d_output = &dh2 * &cache.tanh_c * cache.output.mapv(|s| s * (1.0 - s));
        let d_forget = &dc * &cache.c * cache.forget.mapv(|s| s * (1.0 - s));
        let d_candidate = &dc * &cache.input * cache.candidate.mapv(|t| 1.0 - t * t);
        let d_input = &dc * &cache.candidate * cache.input.mapv(|s| s * (1.0 - s));

        let da = join_gates(&[&d_forget, &d_candidate, &d_input, &d_output])?;
        let (dx, dh) = self.weights.backward(&cache.x, &cache.h, &da)?;
        let dc_prev = &dc * &cache.forget;
        Ok(vec![dx, dh, dc_prev])
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.weights.parameters()
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Lstm(self.config)
    }
}
