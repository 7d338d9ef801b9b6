use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use crate::model::Model;
use crate::nn::parameter::Parameter;
use crate::ops::Operation;
use crate::optim::Optimizer;
use ndarray::Axis;

/// Returns `loss` unchanged, or `NumericDivergence` when it is NaN or
/// infinite. Aborting on divergence is the caller's decision.
pub fn ensure_finite(loss: f32) -> Result<f32, DendriteError> {
    if loss.is_finite() {
        Ok(loss)
    } else {
        Err(DendriteError::NumericDivergence { value: loss })
    }
}

/// Drives one model with one optimizer and one loss operation.
#[derive(Debug)]
pub struct Trainer<M: Model> {
    model: M,
    optimizer: Box<dyn Optimizer>,
    loss: Box<dyn Operation>,
    last_loss: Option<f32>,
}

impl<M: Model> Trainer<M> {
    pub fn new(model: M, optimizer: Box<dyn Optimizer>, loss: Box<dyn Operation>) -> Self {
        Trainer {
            model,
            optimizer,
            loss,
            last_loss: None,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn optimizer(&self) -> &dyn Optimizer {
        self.optimizer.as_ref()
    }

    /// Loss reported by the most recent `train_on_batch`.
    pub fn last_loss(&self) -> Option<f32> {
        self.last_loss
    }

    fn data_loss(&mut self, prediction: &Buffer, target: &Buffer) -> Result<f32, DendriteError> {
        let loss = self.loss.forward(&[prediction, target])?;
        buffer::to_scalar(&loss)
    }

    /// One training step: forward in training mode, loss, backward,
    /// regularizer gradients, optimizer update.
    ///
    /// Returns the loss before the update, including regularization terms.
    /// A non-finite loss is logged and returned as is; see [`ensure_finite`].
    /// When any parameter gradient is non-finite the update is skipped and
    /// the gradients are reset.
    pub fn train_on_batch(&mut self, x: &Buffer, y: &Buffer) -> Result<f32, DendriteError> {
        let prediction = self.model.forward(x, true)?;
        let mut loss = self.data_loss(&prediction, y)?;
        let grads = self.loss.backward(&buffer::scalar(1.0))?;
        let dy = grads.into_iter().next().ok_or_else(|| {
            DendriteError::InternalError("loss returned no prediction gradient".to_string())
        })?;
        self.model.backward(&dy)?;
        for regularizer in self.model.regularizers() {
            loss += regularizer.loss();
            regularizer.accumulate_gradient()?;
        }
        let params = self.model.parameters();
        let grads_finite = params
            .iter()
            .filter_map(Parameter::grad)
            .all(|g| buffer::all_finite(g.iter()));
        if grads_finite {
            self.optimizer.update(&params)?;
        } else {
            // Values stay as they were; the gradients of this batch are dropped.
            log::warn!("non-finite gradients, skipping the optimizer update");
            for param in &params {
                param.reset_gradient();
            }
        }
        if !loss.is_finite() {
            log::warn!("train_on_batch produced a non-finite loss: {}", loss);
        }
        self.last_loss = Some(loss);
        Ok(loss)
    }

    pub fn predict(&mut self, x: &Buffer) -> Result<Buffer, DendriteError> {
        self.model.forward(x, false)
    }

    /// Data loss in inference mode, without regularization terms.
    pub fn evaluate(&mut self, x: &Buffer, y: &Buffer) -> Result<f32, DendriteError> {
        let prediction = self.model.forward(x, false)?;
        self.data_loss(&prediction, y)
    }

    /// Fraction of samples predicted correctly: argmax over the last axis, or
    /// a 0.5 threshold when there is a single output column.
    pub fn accuracy(&mut self, x: &Buffer, y: &Buffer) -> Result<f32, DendriteError> {
        let prediction = self.predict(x)?;
        if prediction.shape() != y.shape() {
            return Err(DendriteError::ShapeMismatch {
                expected: prediction.shape().to_vec(),
                actual: y.shape().to_vec(),
                operation: "accuracy".to_string(),
            });
        }
        if prediction.ndim() == 0 {
            return Err(DendriteError::DimensionMismatch {
                expected: 2,
                actual: 0,
                operation: "accuracy".to_string(),
            });
        }
        let last = Axis(prediction.ndim() - 1);
        let total = prediction.len() / prediction.len_of(last).max(1);
        if total == 0 {
            return Ok(0.0);
        }
        let correct = if prediction.len_of(last) == 1 {
            prediction
                .iter()
                .zip(y.iter())
                .filter(|&(&p, &t)| (p >= 0.5) == (t >= 0.5))
                .count()
        } else {
            prediction
                .lanes(last)
                .into_iter()
                .zip(y.lanes(last))
                .filter(|(p, t)| argmax(p.iter()) == argmax(t.iter()))
                .count()
        };
        Ok(correct as f32 / total as f32)
    }
}

fn argmax<'a>(values: impl Iterator<Item = &'a f32>) -> usize {
    values
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| {
            if v > bv {
                (i, v)
            } else {
                (bi, bv)
            }
        })
        .0
}

#[cfg(test)]
#[path = "trainer_test.rs"]
mod tests;
