use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::nn::init::Initializer;
use crate::nn::parameter::Parameter;
use crate::nn::regularizers::{Regularizer, RegularizerKind};
use crate::ops::linalg::dot::{as_matrix, matmul, matmul_nt, matmul_tn};
use crate::ops::{cached, check_arity, Operation};
use ndarray::Axis;

/// Fully connected layer: `y = x · W + b`.
///
/// `W` has shape `[in_features, units]` and `b` shape `[units]`. Both are
/// created on the first forward, when `in_features` is known from the input.
#[derive(Debug, Clone)]
pub struct Dense {
    units: usize,
    weight_initializer: Initializer,
    bias_initializer: Initializer,
    weight_regularizer: Option<RegularizerKind>,
    bias_regularizer: Option<RegularizerKind>,
    weight: Parameter,
    bias: Option<Parameter>,
    input: Option<Buffer>,
}

impl Dense {
    /// Creates a dense layer with `units` outputs.
    ///
    /// # Errors
    /// `ConfigurationError` when `units` is zero.
    pub fn new(units: usize) -> Result<Self, DendriteError> {
        if units == 0 {
            return Err(DendriteError::ConfigurationError(
                "Dense requires at least one unit".to_string(),
            ));
        }
        Ok(Dense {
            units,
            weight_initializer: Initializer::default_weight(),
            bias_initializer: Initializer::Zeros,
            weight_regularizer: None,
            bias_regularizer: None,
            weight: Parameter::deferred("dense.weight"),
            bias: Some(Parameter::deferred("dense.bias")),
            input: None,
        })
    }

    pub fn with_bias(mut self, use_bias: bool) -> Self {
        self.bias = if use_bias {
            self.bias.or_else(|| Some(Parameter::deferred("dense.bias")))
        } else {
            None
        };
        self
    }

    pub fn with_weight_initializer(mut self, initializer: Initializer) -> Self {
        self.weight_initializer = initializer;
        self
    }

    pub fn with_bias_initializer(mut self, initializer: Initializer) -> Self {
        self.bias_initializer = initializer;
        self
    }

    pub fn with_weight_regularizer(mut self, kind: RegularizerKind) -> Self {
        self.weight_regularizer = Some(kind);
        self
    }

    pub fn with_bias_regularizer(mut self, kind: RegularizerKind) -> Self {
        self.bias_regularizer = Some(kind);
        self
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Parameter> {
        self.bias.as_ref()
    }

    fn build(&self, in_features: usize) -> Result<(), DendriteError> {
        self.weight
            .initialize_with(&[in_features, self.units], &self.weight_initializer, in_features)?;
        if let Some(bias) = &self.bias {
            bias.initialize_with(&[self.units], &self.bias_initializer, in_features)?;
        }
        if self.weight.shape() != [in_features, self.units] {
            return Err(DendriteError::ShapeMismatch {
                expected: self.weight.shape(),
                actual: vec![in_features, self.units],
                operation: "Dense".to_string(),
            });
        }
        Ok(())
    }
}

impl Operation for Dense {
    fn name(&self) -> &str {
        "Dense"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 1)?;
        let x = inputs[0];
        let in_features = as_matrix(x, "Dense")?.ncols();
        self.build(in_features)?;
        let mut y = matmul(x, &self.weight.value(), "Dense")?;
        if let Some(bias) = &self.bias {
            y += &bias.value();
        }
        self.input = Some(x.clone());
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let x = cached(&self.input, "Dense")?;
        self.weight
            .accumulate_gradient(&matmul_tn(x, grad_output, "Dense backward")?)?;
        if let Some(bias) = &self.bias {
            bias.accumulate_gradient(&grad_output.sum_axis(Axis(0)))?;
        }
        Ok(vec![matmul_nt(grad_output, &self.weight.value(), "Dense backward")?])
    }

    fn parameters(&self) -> Vec<Parameter> {
        let mut params = vec![self.weight.clone()];
        if let Some(bias) = &self.bias {
            params.push(bias.clone());
        }
        params
    }

    fn regularizers(&self) -> Vec<Regularizer> {
        let mut regs = Vec::new();
        if let Some(kind) = self.weight_regularizer {
            regs.push(Regularizer::new(kind, self.weight.clone()));
        }
        if let (Some(kind), Some(bias)) = (self.bias_regularizer, &self.bias) {
            regs.push(Regularizer::new(kind, bias.clone()));
        }
        regs
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Dense {
            units: self.units,
            use_bias: self.bias.is_some(),
            weight_initializer: self.weight_initializer,
            bias_initializer: self.bias_initializer,
            weight_regularizer: self.weight_regularizer,
            bias_regularizer: self.bias_regularizer,
        }
    }
}

#[cfg(test)]
#[path = "dense_test.rs"]
mod tests;
