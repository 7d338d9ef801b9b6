use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::nn::config::LayerConfig;
use crate::ops::{apply_op, cached, check_arity, check_rank, Operation};
use crate::tensor::Tensor;
use ndarray::{Array2, ArrayView2, Ix2};

/// Matrix product of two rank-2 inputs.
#[derive(Debug, Clone, Default)]
pub struct Dot {
    inputs: Option<(Array2<f32>, Array2<f32>)>,
}

/// Views a buffer as a matrix, reporting rank problems as `DimensionMismatch`.
pub(crate) fn as_matrix<'a>(x: &'a Buffer, operation: &str) -> Result<ArrayView2<'a, f32>, DendriteError> {
    check_rank(operation, x, 2)?;
    Ok(x.view().into_dimensionality::<Ix2>()?)
}

/// `a · b` on buffers, for layers that fuse matrix products into their own
/// forward and backward.
pub(crate) fn matmul(a: &Buffer, b: &Buffer, operation: &str) -> Result<Buffer, DendriteError> {
    let a2 = as_matrix(a, operation)?;
    let b2 = as_matrix(b, operation)?;
    if a2.ncols() != b2.nrows() {
        return Err(DendriteError::ShapeMismatch {
            expected: vec![a2.ncols(), b2.ncols()],
            actual: b.shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    Ok(a2.dot(&b2).into_dyn())
}

/// `aᵀ · b`
pub(crate) fn matmul_tn(a: &Buffer, b: &Buffer, operation: &str) -> Result<Buffer, DendriteError> {
    let a2 = as_matrix(a, operation)?;
    let b2 = as_matrix(b, operation)?;
    if a2.nrows() != b2.nrows() {
        return Err(DendriteError::ShapeMismatch {
            expected: vec![a2.nrows(), b2.ncols()],
            actual: b.shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    Ok(a2.t().dot(&b2).into_dyn())
}

/// `a · bᵀ`
pub(crate) fn matmul_nt(a: &Buffer, b: &Buffer, operation: &str) -> Result<Buffer, DendriteError> {
    let a2 = as_matrix(a, operation)?;
    let b2 = as_matrix(b, operation)?;
    if a2.ncols() != b2.ncols() {
        return Err(DendriteError::ShapeMismatch {
            expected: vec![b2.nrows(), a2.ncols()],
            actual: b.shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    Ok(a2.dot(&b2.t()).into_dyn())
}

impl Operation for Dot {
    fn name(&self) -> &str {
        "Dot"
    }

    fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer, DendriteError> {
        check_arity(self.name(), inputs, 2)?;
        let y = matmul(inputs[0], inputs[1], "Dot")?;
        let a = as_matrix(inputs[0], "Dot")?.to_owned();
        let b = as_matrix(inputs[1], "Dot")?.to_owned();
        self.inputs = Some((a, b));
        Ok(y)
    }

    fn backward(&mut self, grad_output: &Buffer) -> Result<Vec<Buffer>, DendriteError> {
        let (a, b) = cached(&self.inputs, "Dot")?;
        let dy = as_matrix(grad_output, "Dot backward")?;
        if dy.dim() != (a.nrows(), b.ncols()) {
            return Err(DendriteError::ShapeMismatch {
                expected: vec![a.nrows(), b.ncols()],
                actual: grad_output.shape().to_vec(),
                operation: "Dot backward".to_string(),
            });
        }
        // [dy · bᵀ, aᵀ · dy]
        let da = dy.dot(&b.t()).into_dyn();
        let db = a.t().dot(&dy).into_dyn();
        Ok(vec![da, db])
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::Dot
    }
}

pub fn dot_op(a: &Tensor, b: &Tensor) -> Result<Tensor, DendriteError> {
    apply_op(Box::new(Dot::default()), &[a, b])
}

#[cfg(test)]
#[path = "dot_test.rs"]
mod tests;
