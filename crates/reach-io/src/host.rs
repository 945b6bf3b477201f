use serde::{Deserialize, Serialize};
use tracing::info;

use reach_core::{ReachError, Summary};
use reach_sampler::{
    simulate_scenario, EngineConfig, FairScenario, MonteCarloEngine, SimulationResult,
};

use crate::config::HostConfig;
use crate::document::GraphDocument;

/// Parameters of one simulation request, before guardrails are applied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRequest {
    pub trials: Option<i64>,
    /// Any integer; negative seeds are reinterpreted bit for bit.
    pub seed: Option<i64>,
    pub shards: Option<usize>,
}

impl SimulationRequest {
    pub fn engine_config(&self, config: &HostConfig) -> EngineConfig {
        let trials = config.clamp_trials(self.trials);
        EngineConfig {
            trials,
            seed: self.engine_seed(),
            shards: config.clamp_shards(self.shards, trials),
        }
    }

    pub fn engine_seed(&self) -> Option<u64> {
        self.seed.map(|s| s as u64)
    }
}

/// Validate a graph document and run the engine over it.
pub fn simulate_document(
    doc: &GraphDocument,
    request: &SimulationRequest,
    config: &HostConfig,
) -> Result<SimulationResult, ReachError> {
    let graph = doc.to_graph()?;
    let engine_config = request.engine_config(config);
    info!(
        title = %doc.title,
        nodes = graph.num_nodes(),
        trials = engine_config.trials,
        seed = ?engine_config.seed,
        "simulating attack graph"
    );
    MonteCarloEngine::new(engine_config).run(&graph)
}

/// Run a FAIR scenario; FAIR runs take the requested trial count unclamped.
pub fn simulate_fair(
    scenario: &FairScenario,
    request: &SimulationRequest,
    config: &HostConfig,
) -> Result<Summary, ReachError> {
    let trials = request
        .trials
        .map(|n| usize::try_from(n.max(0)).unwrap_or(usize::MAX))
        .unwrap_or(config.fair_default_trials);
    info!(trials, seed = ?request.seed, "simulating FAIR scenario");
    simulate_scenario(scenario, trials, request.engine_seed())
}
