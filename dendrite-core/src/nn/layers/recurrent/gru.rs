use super::{gate, join_gates, GateWeights, RecurrentCell, RecurrentConfig};
use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::nn::parameter::Parameter;
use crate::ops::activation::sigmoid;
use crate::ops::linalg::dot::{as_matrix, matmul, matmul_nt, matmul_tn};
use crate::ops::{cached, check_arity, Operation};
use ndarray::{Axis, Slice};

#[derive(Debug, Clone)]
struct GruCache {
    x: Buffer,
    h: Buffer,
    update: Buffer,
    reset: Buffer,
    candidate: Buffer,
}

/// Gated recurrent unit step.
///
/// Gate blocks are ordered update, reset, candidate. The candidate reads the
/// reset-gated state: `h~ = tanh(x · W_h + (r * h) · U_h + b_h)` and
/// `h' = z * h + (1 - z) * h~`.
#[derive(Debug, Clone)]
pub struct GruCell {
    config: RecurrentConfig,
    weights: GateWeights,
    cache: Option<GruCache>,
}

impl GruCell {
    pub fn weights(&self) -> &GateWeights {
        &self.weights
    }
}

fn columns(a: &Buffer, start: usize, end: usize) -> Buffer {
    a.slice_axis(Axis(1), Slice::from(start..end)).to_owned()
}

impl RecurrentCell for GruCell {
    const STATES: usize = 1;

    fn from_config(config: RecurrentConfig) -> Self {
        GruCell {
            config,
            weights: GateWeights::new("gru", 3, config.use_bias),
            cache: None,
        }
    }

    fn recurrent_config(&self) -> &RecurrentConfig {
        &self.config
    }

    fn recurrent_config_mut(&mut self) -> &mut RecurrentConfig {
        &mut self.config
    }
}

impl Operation for GruCell {
    fn name(&self) -> &str {
        "Gru"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 2)?;
        let (x, h) = (inputs[0], inputs[1]);
        let units = self.config.units;
        self.weights.build(&self.config, as_matrix(x, "Gru")?.ncols())?;

        let mut xw = matmul(x, &self.weights.weight.value(), "Gru")?;
        if let Some(bias) = &self.weights.bias {
            xw += &bias.value();
        }
        let u = self.weights.recurrent_weight.value();
        let hu = matmul(h, &columns(&u, 0, 2 * units), "Gru")?;

        let update = sigmoid(&(gate(&xw, 0, units) + gate(&hu, 0, units)));
        let reset = sigmoid(&(gate(&xw, 1, units) + gate(&hu, 1, units)));
        let rh = &reset * h;
        let candidate = (gate(&xw, 2, units)
            + matmul(&rh, &columns(&u, 2 * units, 3 * units), "Gru")?)
        .mapv(f32::tanh);
        let h2 = &update * h + &update.mapv(|z| 1.0 - z) * &candidate;

        self.cache = Some(GruCache {
            x: x.clone(),
            h: h.clone(),
            update,
            reset,
            candidate,
        });
        Ok(h2)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let cache = cached(&self.cache, "Gru")?;
        let units = self.config.units;
        let u = self.weights.recurrent_weight.value();
        let u_zr = columns(&u, 0, 2 * units);
        let u_h = columns(&u, 2 * units, 3 * units);

        let d_candidate = grad_output * &cache.update.mapv(|z| 1.0 - z);
        let d_update = grad_output * &(&cache.h - &cache.candidate);
        let da_update = &d_update * &cache.update.mapv(|z| z * (1.0 - z));
        let da_candidate = &d_candidate * &cache.candidate.mapv(|t| 1.0 - t * t);
        let d_rh = matmul_nt(&da_candidate, &u_h, "Gru backward")?;
        let d_reset = &d_rh * &cache.h;
        let da_reset = &d_reset * &cache.reset.mapv(|r| r * (1.0 - r));

        let da_zr = join_gates(&[&da_update, &da_reset])?;
        let da = join_gates(&[&da_update, &da_reset, &da_candidate])?;
        let rh = &cache.reset * &cache.h;

        self.weights
            .weight
            .accumulate_gradient(&matmul_tn(&cache.x, &da, "Gru backward")?)?;
        let du = join_gates(&[
            &matmul_tn(&cache.h, &da_zr, "Gru backward")?,
            &matmul_tn(&rh, &da_candidate, "Gru backward")?,
        ])?;
        self.weights.recurrent_weight.accumulate_gradient(&du)?;
        if let Some(bias) = &self.weights.bias {
            bias.accumulate_gradient(&da.sum_axis(Axis(0)))?;
        }

        let dx = matmul_nt(&da, &self.weights.weight.value(), "Gru backward")?;
        let dh = grad_output * &cache.update
            + &d_rh * &cache.reset
            + matmul_nt(&da_zr, &u_zr, "Gru backward")?;
        Ok(vec![dx, dh])
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.weights.parameters()
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Gru(self.config)
    }
}
