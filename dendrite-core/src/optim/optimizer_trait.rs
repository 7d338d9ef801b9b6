use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::parameter::{ParamId, Parameter};
use crate::optim::OptimizerConfig;
use std::fmt::Debug;

/// Trait defining the common interface for all optimizers.
///
/// Optimizers keep their per-parameter auxiliary state keyed by
/// [`ParamId`], created lazily the first time a parameter is updated.
pub trait Optimizer: Debug + Send {
    fn name(&self) -> &str;

    /// Called once at the start of every [`update`](Optimizer::update), before
    /// any parameter is touched. Step counters advance here.
    fn begin_step(&mut self) {}

    /// Applies the update rule to one parameter's value in place.
    fn update_param(
        &mut self,
        id: ParamId,
        value: &mut Buffer,
        grad: &Buffer,
    ) -> Result<(), DendriteError>;

    /// Tagged description of this optimizer's hyperparameters.
    fn config(&self) -> OptimizerConfig;

    /// Updates every parameter that holds a gradient, then resets that
    /// gradient. Parameters without a gradient (untouched or frozen) are
    /// skipped silently.
    ///
    /// # Errors
    /// Propagates shape errors from the update rule; the failing parameter
    /// keeps its value and gradient.
    fn update(&mut self, params: &[Parameter]) -> Result<(), DendriteError> {
        self.begin_step();
        let mut updated = 0;
        for param in params {
            let id = param.id();
            if param.apply_update(|value, grad| self.update_param(id, value, grad))? {
                updated += 1;
            }
        }
        log::debug!(
            "{}: updated {} of {} parameters",
            self.name(),
            updated,
            params.len()
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "optimizer_trait_test.rs"]
mod tests;
