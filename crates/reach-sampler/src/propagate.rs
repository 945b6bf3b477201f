use rand::Rng;
use rand_distr::Distribution;
use tracing::{debug, warn};

use reach_core::sampling::clamp_unit;
use reach_core::topology;
use reach_core::{Graph, NodeIndex, NodeRole, PreparedDistribution, Result};

/// Per-call propagation plan: topology, roles and prepared node distributions.
///
/// Built once per simulation and shared read-only by every trial.
pub struct Propagator<'g> {
    graph: &'g Graph,
    order: Vec<NodeIndex>,
    is_foothold: Vec<bool>,
    footholds: Vec<NodeIndex>,
    goals: Vec<NodeIndex>,
    success: Vec<PreparedDistribution>,
}

impl<'g> Propagator<'g> {
    pub fn new(graph: &'g Graph) -> Result<Self> {
        let order = topology::order(graph)?;

        let mut footholds = graph.with_role(NodeRole::Foothold);
        if footholds.is_empty() {
            // No designated entry point: fall back to structural sources
            footholds = graph.sources();
            warn!(implicit = footholds.len(), "no foothold nodes, using zero in-degree nodes");
        }
        let mut is_foothold = vec![false; graph.num_nodes()];
        for &f in &footholds {
            is_foothold[f] = true;
        }

        let goals = graph.goals();
        if goals.is_empty() {
            warn!("attack graph has no goal nodes");
        }

        let success = graph
            .nodes()
            .iter()
            .map(|node| PreparedDistribution::new(&node.success))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            nodes = graph.num_nodes(),
            edges = graph.num_edges(),
            footholds = footholds.len(),
            goals = goals.len(),
            "propagation plan ready"
        );

        Ok(Self {
            graph,
            order,
            is_foothold,
            footholds,
            goals,
            success,
        })
    }

    pub fn graph(&self) -> &Graph {
        self.graph
    }

    pub fn order(&self) -> &[NodeIndex] {
        &self.order
    }

    pub fn footholds(&self) -> &[NodeIndex] {
        &self.footholds
    }

    pub fn goals(&self) -> &[NodeIndex] {
        &self.goals
    }

    pub fn num_nodes(&self) -> usize {
        self.success.len()
    }

    /// Draw every node's success probability, clamped into `[0, 1]`.
    pub fn sample_success<R: Rng + ?Sized>(&self, rng: &mut R, sampled: &mut [f64]) {
        for (slot, dist) in sampled.iter_mut().zip(&self.success) {
            *slot = clamp_unit(dist.sample(rng));
        }
    }

    /// Propagate reach probabilities for one set of sampled success values.
    ///
    /// Returns the probability that at least one goal is reached. Every value
    /// written to `reach` stays in `[0, 1]` when `sampled` does: products and
    /// complements of unit-interval values never leave the interval.
    pub fn propagate(&self, sampled: &[f64], reach: &mut [f64]) -> f64 {
        reach.fill(0.0);

        for &n in &self.order {
            if self.is_foothold[n] {
                // Footholds ignore inbound edges
                reach[n] = sampled[n];
                continue;
            }
            let parents = self.graph.parents(n);
            if parents.is_empty() {
                reach[n] = 0.0;
                continue;
            }
            let parent_any = any_of(parents.iter().map(|&p| reach[p]));
            reach[n] = parent_any * sampled[n];
        }

        if self.goals.is_empty() {
            0.0
        } else {
            any_of(self.goals.iter().map(|&g| reach[g]))
        }
    }

    /// Sample and propagate a single trial.
    pub fn run_trial<R: Rng + ?Sized>(&self, rng: &mut R, scratch: &mut TrialScratch) -> f64 {
        self.sample_success(rng, &mut scratch.sampled);
        self.propagate(&scratch.sampled, &mut scratch.reach)
    }
}

/// Reusable per-trial buffers.
pub struct TrialScratch {
    pub sampled: Vec<f64>,
    pub reach: Vec<f64>,
}

impl TrialScratch {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            sampled: vec![0.0; num_nodes],
            reach: vec![0.0; num_nodes],
        }
    }
}

/// `1 - Π(1 - p)`: probability that at least one independent event occurs.
pub fn any_of(probs: impl IntoIterator<Item = f64>) -> f64 {
    let none = probs.into_iter().fold(1.0, |acc, p| acc * (1.0 - p));
    1.0 - none
}
