use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use reach_core::rng::entropy_seed;
use reach_core::{Graph, Result, SimRng};

use crate::propagate::{Propagator, TrialScratch};
use crate::result::{SampleSet, SimulationResult};

pub const DEFAULT_TRIALS: usize = 20_000;

/// Engine run parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of independent trials. Zero yields an all-zero result.
    pub trials: usize,
    /// Seed for reproducible runs; `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Trial blocks run in parallel, each with its own derived seed.
    /// Results are reproducible for a fixed `(seed, shards)` pair.
    pub shards: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            shards: 1,
        }
    }
}

impl EngineConfig {
    pub fn new(trials: usize) -> Self {
        Self {
            trials,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards.max(1);
        self
    }
}

/// Monte Carlo driver over attack-graph reach propagation.
///
/// Holds no state between calls; every [`MonteCarloEngine::run`] builds its
/// own propagation plan and random sources.
#[derive(Clone, Debug, Default)]
pub struct MonteCarloEngine {
    config: EngineConfig,
}

impl MonteCarloEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run all trials over `graph`.
    ///
    /// Fails without a partial result when the graph has a cycle or a node
    /// spec cannot be prepared.
    pub fn run(&self, graph: &Graph) -> Result<SimulationResult> {
        let prop = Propagator::new(graph)?;
        let EngineConfig { trials, seed, shards } = self.config;
        let shards = shards.clamp(1, trials.max(1));

        let samples = if shards <= 1 {
            let mut rng = SimRng::from_optional(seed);
            run_block(&prop, trials, &mut rng)
        } else {
            let base = seed.unwrap_or_else(entropy_seed);
            run_sharded(&prop, trials, shards, base)
        };

        let result = SimulationResult::from_samples(graph, prop.goals(), &samples);
        info!(
            trials,
            shards,
            mean = result.success_distribution.mean,
            p90 = result.success_distribution.p90,
            "simulation complete"
        );
        Ok(result)
    }
}

/// Convenience wrapper: sequential run with an optional seed.
pub fn run_trials(graph: &Graph, trials: usize, seed: Option<u64>) -> Result<SimulationResult> {
    let config = EngineConfig {
        trials,
        seed,
        shards: 1,
    };
    MonteCarloEngine::new(config).run(graph)
}

/// Sequential trial loop over one random source.
fn run_block(prop: &Propagator<'_>, trials: usize, rng: &mut SimRng) -> SampleSet {
    let mut samples = SampleSet::with_capacity(prop.num_nodes(), trials);
    let mut scratch = TrialScratch::new(prop.num_nodes());

    for _ in 0..trials {
        let any_goal = prop.run_trial(rng.inner(), &mut scratch);
        samples.push(any_goal, &scratch.reach);
    }
    samples
}

/// Split trials into contiguous blocks, run them in parallel and concatenate
/// in shard order.
fn run_sharded(prop: &Propagator<'_>, trials: usize, shards: usize, base_seed: u64) -> SampleSet {
    let sizes = shard_sizes(trials, shards);
    debug!(shards, ?sizes, base_seed, "running sharded trials");

    let blocks: Vec<SampleSet> = sizes
        .par_iter()
        .enumerate()
        .map(|(shard_id, &n)| {
            let mut rng = SimRng::from_shard(base_seed, shard_id as u64);
            run_block(prop, n, &mut rng)
        })
        .collect();

    let mut samples = SampleSet::with_capacity(prop.num_nodes(), trials);
    for block in blocks {
        samples.extend(block);
    }
    samples
}

/// Block sizes differ by at most one; earlier shards take the remainder.
/// There are never more blocks than trials.
pub fn shard_sizes(trials: usize, shards: usize) -> Vec<usize> {
    let shards = shards.clamp(1, trials.max(1));
    let base = trials / shards;
    let extra = trials % shards;
    (0..shards).map(|i| base + usize::from(i < extra)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reach_core::{DistributionSpec, Edge, Node};

    fn demo() -> Graph {
        Graph::new(
            vec![
                Node::foothold("a", DistributionSpec::pert(0.2, 0.5, 0.9).unwrap()),
                Node::intermediate("b", DistributionSpec::triangular(0.1, 0.4, 0.8).unwrap()),
                Node::goal("c", DistributionSpec::pert(0.3, 0.6, 0.7).unwrap()),
            ],
            vec![Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("a", "c")],
        )
        .unwrap()
    }

    #[test]
    fn test_shard_sizes() {
        assert_eq!(shard_sizes(10, 3), vec![4, 3, 3]);
        assert_eq!(shard_sizes(2, 4), vec![1, 1]);
        assert_eq!(shard_sizes(7, 0), vec![7]);
        assert_eq!(shard_sizes(0, usize::MAX), vec![0]);
    }

    #[test]
    fn test_zero_trials_is_all_zero() {
        let result = run_trials(&demo(), 0, Some(1)).unwrap();
        assert_eq!(result.trials, 0);
        assert_eq!(result.success_rate_any_goal, 0.0);
        assert!(result.node_distributions.values().all(|s| s.mean == 0.0 && s.p90 == 0.0));
    }

    #[test]
    fn test_sharded_run_is_reproducible() {
        let engine = MonteCarloEngine::new(EngineConfig::new(5_000).with_seed(99).with_shards(4));
        let a = engine.run(&demo()).unwrap();
        let b = engine.run(&demo()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trials, 5_000);
    }

    #[test]
    fn test_single_shard_matches_sequential() {
        let sequential = run_trials(&demo(), 2_000, Some(5)).unwrap();
        let one_shard = MonteCarloEngine::new(EngineConfig::new(2_000).with_seed(5).with_shards(1))
            .run(&demo())
            .unwrap();
        assert_eq!(sequential, one_shard);
    }

    #[test]
    fn test_excess_shards_capped_at_trials() {
        let huge = MonteCarloEngine::new(EngineConfig::new(10).with_seed(1).with_shards(usize::MAX / 8))
            .run(&demo())
            .unwrap();
        let per_trial = MonteCarloEngine::new(EngineConfig::new(10).with_seed(1).with_shards(10))
            .run(&demo())
            .unwrap();
        assert_eq!(huge.trials, 10);
        assert_eq!(huge, per_trial);
    }

    #[test]
    fn test_overflowing_width_fails_before_trials() {
        let g = Graph::new(
            vec![Node::goal("x", DistributionSpec::Triangular { min: -1e308, mode: 1e308, max: 1e308 })],
            vec![],
        )
        .unwrap();
        let err = run_trials(&g, 100, Some(1)).unwrap_err();
        assert!(matches!(err, reach_core::ReachError::NonFiniteParameter { .. }));
    }

    #[test]
    fn test_sharded_mean_agrees_with_sequential() {
        let sequential = run_trials(&demo(), 20_000, Some(3)).unwrap();
        let sharded = MonteCarloEngine::new(EngineConfig::new(20_000).with_seed(3).with_shards(8))
            .run(&demo())
            .unwrap();
        let diff = (sequential.success_rate_any_goal - sharded.success_rate_any_goal).abs();
        assert!(diff < 0.01, "sharded mean drifted by {diff}");
    }
}
