use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use reach_core::stats::summarize;
use reach_core::{Graph, NodeIndex, Summary};

/// Per-trial sample arrays collected by the engine.
///
/// `reach[n]` holds node `n`'s reach probability for every trial; goal
/// arrays are the goal nodes' entries, so they are not stored twice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleSet {
    pub any_goal: Vec<f64>,
    pub reach: Vec<Vec<f64>>,
}

impl SampleSet {
    pub fn with_capacity(num_nodes: usize, trials: usize) -> Self {
        Self {
            any_goal: Vec::with_capacity(trials),
            reach: (0..num_nodes).map(|_| Vec::with_capacity(trials)).collect(),
        }
    }

    pub fn push(&mut self, any_goal: f64, reach: &[f64]) {
        self.any_goal.push(any_goal);
        for (samples, &r) in self.reach.iter_mut().zip(reach) {
            samples.push(r);
        }
    }

    /// Append another block of trials after this one.
    pub fn extend(&mut self, other: SampleSet) {
        self.any_goal.extend(other.any_goal);
        for (mine, theirs) in self.reach.iter_mut().zip(other.reach) {
            mine.extend(theirs);
        }
    }

    pub fn trials(&self) -> usize {
        self.any_goal.len()
    }
}

/// Outcome of one simulation call.
///
/// Maps are keyed by node id. `goal_success_rates` and
/// `node_activation_rates` repeat the distribution means in the flat form
/// older consumers read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub trials: usize,
    pub success_rate_any_goal: f64,
    pub success_distribution: Summary,
    pub goal_success_rates: BTreeMap<String, f64>,
    pub goal_distributions: BTreeMap<String, Summary>,
    pub node_activation_rates: BTreeMap<String, f64>,
    pub node_distributions: BTreeMap<String, Summary>,
}

impl SimulationResult {
    pub fn from_samples(graph: &Graph, goals: &[NodeIndex], samples: &SampleSet) -> Self {
        let success_distribution = summarize(&samples.any_goal);

        let node_summaries: Vec<Summary> = samples.reach.iter().map(|s| summarize(s)).collect();
        let id = |i: NodeIndex| graph.node(i).id.clone();

        let node_distributions: BTreeMap<String, Summary> = node_summaries
            .iter()
            .enumerate()
            .map(|(i, s)| (id(i), *s))
            .collect();
        let node_activation_rates = node_distributions
            .iter()
            .map(|(k, s)| (k.clone(), s.mean))
            .collect();

        let goal_distributions: BTreeMap<String, Summary> =
            goals.iter().map(|&g| (id(g), node_summaries[g])).collect();
        let goal_success_rates = goal_distributions
            .iter()
            .map(|(k, s)| (k.clone(), s.mean))
            .collect();

        Self {
            trials: samples.trials(),
            success_rate_any_goal: success_distribution.mean,
            success_distribution,
            goal_success_rates,
            goal_distributions,
            node_activation_rates,
            node_distributions,
        }
    }
}
