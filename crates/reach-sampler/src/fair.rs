//! Supplementary FAIR loss estimator.
//!
//! Samples independent frequency and magnitude specs; it does not touch the
//! attack graph beyond optionally borrowing its success distribution as the
//! vulnerability input.

use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

use reach_core::sampling::clamp_unit;
use reach_core::stats::{mean, summarize};
use reach_core::{DistributionSpec, PreparedDistribution, Result, SimRng, Summary};

/// FAIR scenario inputs.
///
/// - `tef`: threat event frequency
/// - `vuln`: probability a threat event becomes a loss event, clamped to `[0, 1]`
/// - `plm`: primary loss magnitude
/// - `slef`: secondary loss event frequency
/// - `slm`: secondary loss magnitude
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairScenario {
    pub tef: DistributionSpec,
    pub vuln: DistributionSpec,
    pub plm: DistributionSpec,
    pub slef: DistributionSpec,
    pub slm: DistributionSpec,
}

impl Default for FairScenario {
    fn default() -> Self {
        let tri = |min, mode, max| DistributionSpec::Triangular { min, mode, max };
        Self {
            tef: tri(0.1, 0.3, 0.6),
            vuln: tri(0.05, 0.2, 0.5),
            plm: tri(10_000.0, 50_000.0, 150_000.0),
            slef: tri(0.05, 0.2, 0.4),
            slm: tri(5_000.0, 25_000.0, 100_000.0),
        }
    }
}

impl FairScenario {
    /// Use an attack-graph success distribution as the vulnerability input:
    /// `Triangular(p10, p50, p90)`.
    pub fn with_graph_vulnerability(mut self, success: &Summary) -> Result<Self> {
        self.vuln = DistributionSpec::triangular(success.p10, success.p50, success.p90)?;
        Ok(self)
    }
}

/// Annualized loss summary per trial: `ale = tef * vuln * (plm + slef * slm)`.
pub fn simulate_scenario(scenario: &FairScenario, trials: usize, seed: Option<u64>) -> Result<Summary> {
    let tef = PreparedDistribution::new(&scenario.tef)?;
    let vuln = PreparedDistribution::new(&scenario.vuln)?;
    let plm = PreparedDistribution::new(&scenario.plm)?;
    let slef = PreparedDistribution::new(&scenario.slef)?;
    let slm = PreparedDistribution::new(&scenario.slm)?;

    let mut rng = SimRng::from_optional(seed);
    let rng = rng.inner();

    let ale: Vec<f64> = (0..trials)
        .map(|_| {
            let lef = tef.sample(rng) * clamp_unit(vuln.sample(rng));
            let lm = plm.sample(rng) + slef.sample(rng) * slm.sample(rng);
            lef * lm
        })
        .collect();

    Ok(summarize(&ale))
}

/// Loss summary from paired contact-frequency / vulnerability samples.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LossSummary {
    pub ale: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub tef_mean: f64,
    pub vuln_mean: f64,
}

/// Combine externally produced frequency and vulnerability samples with a
/// sampled loss magnitude. Pairs beyond the shorter input are dropped.
///
/// Quantiles here are nearest-rank: `sorted[floor(p * (n - 1))]`.
pub fn loss_from_samples<R: Rng + ?Sized>(
    cf: &[f64],
    vuln: &[f64],
    loss_spec: &DistributionSpec,
    rng: &mut R,
) -> Result<LossSummary> {
    let n = cf.len().min(vuln.len());
    if n == 0 {
        return Ok(LossSummary::default());
    }

    let magnitude = PreparedDistribution::new(loss_spec)?;
    let cf = &cf[..n];
    let vuln: Vec<f64> = vuln[..n].iter().copied().map(clamp_unit).collect();

    let mut loss: Vec<f64> = cf
        .iter()
        .zip(&vuln)
        .map(|(c, v)| c * v * magnitude.sample(rng))
        .collect();
    loss.sort_by(|a, b| a.total_cmp(b));

    let q = |p: f64| loss[(p * (n - 1) as f64) as usize];
    Ok(LossSummary {
        ale: mean(&loss),
        p10: q(0.10),
        p50: q(0.50),
        p90: q(0.90),
        tef_mean: mean(cf),
        vuln_mean: mean(&vuln),
    })
}
