use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{check_arity, Operation};
use ndarray::{ArrayD, IxDyn};
use rand::distributions::{Distribution, Uniform};

/// Randomly zeroes inputs while training.
///
/// At inference the input is scaled by `1 - rate` when `use_scale` is set,
/// matching the expected magnitude seen during training.
#[derive(Debug, Clone)]
pub struct Dropout {
    rate: f32,
    use_scale: bool,
    training: bool,
    mask: Option<Buffer>,
}

impl Dropout {
    /// # Errors
    /// `ConfigurationError` unless `0 <= rate < 1`.
    pub fn new(rate: f32) -> Result<Self, DendriteError> {
        if !(0.0..1.0).contains(&rate) {
            return Err(DendriteError::ConfigurationError(format!(
                "Dropout rate must be in [0, 1), got {}",
                rate
            )));
        }
        Ok(Dropout {
            rate,
            use_scale: true,
            training: false,
            mask: None,
        })
    }

    pub fn with_scale(mut self, use_scale: bool) -> Self {
        self.use_scale = use_scale;
        self
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    fn inference_scale(&self) -> f32 {
        if self.use_scale {
            1.0 - self.rate
        } else {
            1.0
        }
    }
}

impl Default for Dropout {
    fn default() -> Self {
        Dropout {
            rate: 0.5,
            use_scale: true,
            training: false,
            mask: None,
        }
    }
}

impl Operation for Dropout {
    fn name(&self) -> &str {
        "Dropout"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let x = inputs[0];
        if self.training {
            let dist = Uniform::new(0.0f32, 1.0);
            let mut rng = rand::thread_rng();
            let rate = self.rate;
            let mask = ArrayD::from_shape_fn(IxDyn(x.shape()), |_| {
                if dist.sample(&mut rng) >= rate {
                    1.0
                } else {
                    0.0
                }
            });
            let y = x * &mask;
            self.mask = Some(mask);
            Ok(y)
        } else {
            self.mask = None;
            Ok(x * self.inference_scale())
        }
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        match &self.mask {
            Some(mask) => Ok(vec![grad_output * mask]),
            None => Ok(vec![grad_output * self.inference_scale()]),
        }
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Dropout {
            rate: self.rate,
            use_scale: self.use_scale,
        }
    }
}
