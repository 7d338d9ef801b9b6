//! Parameter initialisers.

use crate::buffer::{self, Buffer};
use crate::error::DendriteError;
use ndarray::{ArrayD, IxDyn};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Normal;

/// How a parameter's initial value is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Initializer {
    Zeros,
    Const(f32),
    RandomNormal { mean: f32, std: f32 },
    RandomUniform { min: f32, max: f32 },
    /// Standard normal scaled by `1 / sqrt(fan_in)`.
    Xavier,
    /// Standard normal scaled by `sqrt(2 / fan_in)`.
    He,
}

impl Initializer {
    /// Default for weights: `RandomNormal { mean: 0.0, std: 0.05 }`.
    pub fn default_weight() -> Self {
        Initializer::RandomNormal { mean: 0.0, std: 0.05 }
    }

    pub fn default_uniform() -> Self {
        Initializer::RandomUniform { min: -0.05, max: 0.05 }
    }

    pub fn generate(&self, shape: &[usize], fan_in: usize) -> Result<Buffer, DendriteError> {
        self.generate_with(shape, fan_in, &mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        shape: &[usize],
        fan_in: usize,
        rng: &mut R,
    ) -> Result<Buffer, DendriteError> {
        let fan_in = fan_in.max(1) as f32;
        match *self {
            Initializer::Zeros => Ok(buffer::zeros(shape)),
            Initializer::Const(v) => Ok(ArrayD::from_elem(IxDyn(shape), v)),
            Initializer::RandomNormal { mean, std } => sample_normal(shape, mean, std, rng),
            Initializer::RandomUniform { min, max } => {
                if min >= max {
                    return Err(DendriteError::ConfigurationError(format!(
                        "RandomUniform requires min < max, got [{}, {})",
                        min, max
                    )));
                }
                let dist = Uniform::new(min, max);
                Ok(ArrayD::from_shape_fn(IxDyn(shape), |_| dist.sample(rng)))
            }
            Initializer::Xavier => sample_normal(shape, 0.0, 1.0 / fan_in.sqrt(), rng),
            Initializer::He => sample_normal(shape, 0.0, (2.0 / fan_in).sqrt(), rng),
        }
    }
}

fn sample_normal<R: Rng + ?Sized>(
    shape: &[usize],
    mean: f32,
    std: f32,
    rng: &mut R,
) -> Result<Buffer, DendriteError> {
    let dist = Normal::new(mean, std)
        .map_err(|e| DendriteError::ConfigurationError(format!("invalid normal distribution: {}", e)))?;
    Ok(ArrayD::from_shape_fn(IxDyn(shape), |_| dist.sample(rng)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_const_and_zeros() {
        let z = Initializer::Zeros.generate(&[2, 2], 2).unwrap();
        assert!(z.iter().all(|&v| v == 0.0));
        let c = Initializer::Const(0.5).generate(&[3], 1).unwrap();
        assert!(c.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_uniform_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let u = Initializer::default_uniform()
            .generate_with(&[50], 1, &mut rng)
            .unwrap();
        assert!(u.iter().all(|&v| (-0.05..0.05).contains(&v)));
    }

    #[test]
    fn test_seeded_normal_is_reproducible() {
        let a = Initializer::He
            .generate_with(&[4, 3], 4, &mut StdRng::seed_from_u64(1))
            .unwrap();
        let b = Initializer::He
            .generate_with(&[4, 3], 4, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.shape(), &[4, 3]);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(Initializer::RandomUniform { min: 1.0, max: 0.0 }
            .generate(&[1], 1)
            .is_err());
        assert!(Initializer::RandomNormal { mean: 0.0, std: -1.0 }
            .generate(&[1], 1)
            .is_err());
    }
}
