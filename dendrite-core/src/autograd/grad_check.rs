use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for {target} at element index {element_index}: Analytical grad {analytical_grad:?} != Numerical grad {numerical_grad:?}. Difference: {difference:?}")]
    GradientMismatch {
        target: String,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(DendriteError),
    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(DendriteError),
    #[error("{target} received no gradient after the backward pass.")]
    MissingAnalyticalGrad { target: String },
    #[error("Numerical gradient is NaN or infinite for {target}, element {element_index}. Details: Loss+: {loss_plus:?}, Loss-: {loss_minus:?}")]
    NumericalGradNaNOrInfinite {
        target: String,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Tensor error during intermediate calculation: {0}")]
    TensorError(DendriteError),
}

impl From<DendriteError> for GradCheckError {
    fn from(err: DendriteError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Checks analytical gradients against centered finite differences.
///
/// `func` is evaluated on leaf tensors built from `inputs`; the scalar loss
/// used for the numerical side is `sum(output * output_grad)`, so the analytic
/// side is a single backward seeded with `output_grad`.
pub fn check_grad<F>(
    func: F,
    inputs: &[Buffer],
    output_grad: &Buffer,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, DendriteError>,
{
    check_grad_with_params(func, inputs, &[], output_grad, epsilon, tolerance)
}

/// Like [`check_grad`], additionally checking the gradients accumulated into
/// `params` (perturbed in place through [`Parameter::set_value`]).
pub fn check_grad_with_params<F>(
    func: F,
    inputs: &[Buffer],
    params: &[Parameter],
    output_grad: &Buffer,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, DendriteError>,
{
    let evaluate = |values: &[Buffer]| -> Result<f64, GradCheckError> {
        let leaves: Vec<Tensor> = values.iter().cloned().map(Tensor::from_buffer).collect();
        let output = func(&leaves).map_err(GradCheckError::ForwardPassError)?;
        calculate_loss(&output.value(), output_grad)
    };

    // --- 1. Analytical gradients ---
    for param in params {
        param.reset_gradient();
    }
    let leaves: Vec<Tensor> = inputs.iter().cloned().map(Tensor::from_buffer).collect();
    let output = func(&leaves).map_err(GradCheckError::ForwardPassError)?;
    if output_grad.shape() != output.shape().as_slice() {
        return Err(GradCheckError::TensorError(DendriteError::ShapeMismatch {
            expected: output.shape(),
            actual: output_grad.shape().to_vec(),
            operation: "check_grad".to_string(),
        }));
    }
    output
        .backward(Some(output_grad.clone()))
        .map_err(GradCheckError::BackwardPassError)?;

    // --- 2. Inputs ---
    for (i, leaf) in leaves.iter().enumerate() {
        let target = format!("input {}", i);
        let analytical = leaf
            .grad()
            .ok_or_else(|| GradCheckError::MissingAnalyticalGrad { target: target.clone() })?;
        for elem_idx in 0..inputs[i].len() {
            let mut plus = inputs.to_vec();
            perturb(&mut plus[i], elem_idx, epsilon as f32);
            let loss_plus = evaluate(&plus)?;
            let mut minus = inputs.to_vec();
            perturb(&mut minus[i], elem_idx, -epsilon as f32);
            let loss_minus = evaluate(&minus)?;
            compare(&target, elem_idx, &analytical, loss_plus, loss_minus, epsilon, tolerance)?;
        }
    }

    // --- 3. Parameters ---
    for param in params {
        let target = format!("parameter '{}'", param.name());
        let analytical = param
            .grad()
            .ok_or_else(|| GradCheckError::MissingAnalyticalGrad { target: target.clone() })?;
        let original = param.value();
        for elem_idx in 0..original.len() {
            let mut plus = original.clone();
            perturb(&mut plus, elem_idx, epsilon as f32);
            param.set_value(plus)?;
            let loss_plus = evaluate(inputs)?;
            let mut minus = original.clone();
            perturb(&mut minus, elem_idx, -epsilon as f32);
            param.set_value(minus)?;
            let loss_minus = evaluate(inputs)?;
            param.set_value(original.clone())?;
            compare(&target, elem_idx, &analytical, loss_plus, loss_minus, epsilon, tolerance)?;
        }
        param.reset_gradient();
    }
    Ok(())
}

fn perturb(buffer: &mut Buffer, elem_idx: usize, delta: f32) {
    if let Some(v) = buffer.iter_mut().nth(elem_idx) {
        *v += delta;
    }
}

fn compare(
    target: &str,
    elem_idx: usize,
    analytical: &Buffer,
    loss_plus: f64,
    loss_minus: f64,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError> {
    let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
    if !numerical_grad.is_finite() {
        return Err(GradCheckError::NumericalGradNaNOrInfinite {
            target: target.to_string(),
            element_index: elem_idx,
            loss_plus,
            loss_minus,
        });
    }
    let analytical_grad = analytical.iter().nth(elem_idx).copied().unwrap_or(0.0) as f64;
    let difference = (analytical_grad - numerical_grad).abs();
    if !approx::relative_eq!(
        analytical_grad,
        numerical_grad,
        epsilon = tolerance,
        max_relative = tolerance
    ) {
        return Err(GradCheckError::GradientMismatch {
            target: target.to_string(),
            element_index: elem_idx,
            analytical_grad,
            numerical_grad,
            difference,
        });
    }
    Ok(())
}

/// Scalar loss used for gradient checking: output weighted by `output_grad`.
fn calculate_loss(output: &Buffer, output_grad: &Buffer) -> Result<f64, GradCheckError> {
    if output.shape() != output_grad.shape() {
        return Err(GradCheckError::TensorError(DendriteError::ShapeMismatch {
            expected: output.shape().to_vec(),
            actual: output_grad.shape().to_vec(),
            operation: "calculate_loss (grad_check)".to_string(),
        }));
    }
    Ok(output
        .iter()
        .zip(output_grad.iter())
        .map(|(&y, &g)| y as f64 * g as f64)
        .sum())
}
