use rand::Rng;
use rand_distr::{Beta, Distribution, LogNormal, Triangular};
use tracing::debug;

use crate::distribution::{check_three_point, DistributionSpec};
use crate::error::{ReachError, Result};

/// Floor applied to lognormal sigma and to the PERT width.
pub const MIN_SIGMA: f64 = 1e-9;

/// A spec resolved into a ready-to-draw distribution.
///
/// Building the underlying `rand_distr` objects once per simulation keeps the
/// trial loop free of parameter validation.
#[derive(Clone, Debug)]
pub enum PreparedDistribution {
    Constant(f64),
    Triangular(Triangular<f64>),
    Pert { min: f64, span: f64, beta: Beta<f64> },
    Lognormal(LogNormal<f64>),
}

impl PreparedDistribution {
    pub fn new(spec: &DistributionSpec) -> Result<Self> {
        let prepared = Self::build(spec);
        if let Err(err) = &prepared {
            debug!(dist = spec.kind().as_str(), %err, "rejected distribution parameters");
        }
        prepared
    }

    fn build(spec: &DistributionSpec) -> Result<Self> {
        match *spec {
            DistributionSpec::Fixed { value } => Ok(Self::Constant(value)),

            DistributionSpec::Triangular { min, mode, max } => {
                check_three_point(min, mode, max)?;
                if spec.is_degenerate() {
                    return Ok(Self::Constant(min));
                }
                // rand_distr takes (min, max, mode)
                Triangular::new(min, max, mode)
                    .map(Self::Triangular)
                    .map_err(sampling_error)
            }

            DistributionSpec::Pert { min, mode, max } => {
                check_three_point(min, mode, max)?;
                if spec.is_degenerate() {
                    return Ok(Self::Constant(min));
                }
                let width = (max - min).max(MIN_SIGMA);
                let a = 1.0 + 4.0 * (mode - min) / width;
                let b = 1.0 + 4.0 * (max - mode) / width;
                let beta = Beta::new(a, b).map_err(sampling_error)?;
                Ok(Self::Pert { min, span: max - min, beta })
            }

            DistributionSpec::Lognormal { mu, sigma } => LogNormal::new(mu, sigma.max(MIN_SIGMA))
                .map(Self::Lognormal)
                .map_err(sampling_error),
        }
    }
}

impl Distribution<f64> for PreparedDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::Triangular(tri) => tri.sample(rng),
            Self::Pert { min, span, beta } => min + beta.sample(rng) * span,
            Self::Lognormal(ln) => ln.sample(rng),
        }
    }
}

/// Draw one value from `spec`.
pub fn sample<R: Rng + ?Sized>(spec: &DistributionSpec, rng: &mut R) -> Result<f64> {
    Ok(PreparedDistribution::new(spec)?.sample(rng))
}

/// Draw one value from `spec` and clamp it into `[0, 1]`.
pub fn sample_probability<R: Rng + ?Sized>(spec: &DistributionSpec, rng: &mut R) -> Result<f64> {
    sample(spec, rng).map(clamp_unit)
}

/// Clamp into `[0, 1]`; a NaN draw counts as no success.
pub fn clamp_unit(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

fn sampling_error(err: impl std::fmt::Display) -> ReachError {
    ReachError::Sampling {
        reason: err.to_string(),
    }
}
