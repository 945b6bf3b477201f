use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::distribution::DistributionSpec;
use crate::error::{ReachError, Result};

/// Index of a node inside a [`Graph`].
pub type NodeIndex = usize;

/// Role of a node in the attack graph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Attacker entry point; its reach ignores inbound edges.
    Foothold,
    #[default]
    #[serde(alias = "triangular")]
    Intermediate,
    /// Attacker objective.
    Goal,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Follows,
    Requires,
}

/// Attack step with its success-probability spec.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub role: NodeRole,
    /// Free-text category such as "Asset" or "Control"; informational only.
    pub kind: String,
    pub success: DistributionSpec,
}

impl Node {
    pub fn new(id: impl Into<String>, role: NodeRole, success: DistributionSpec) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            role,
            kind: String::new(),
            success,
        }
    }

    pub fn foothold(id: impl Into<String>, success: DistributionSpec) -> Self {
        Self::new(id, NodeRole::Foothold, success)
    }

    pub fn intermediate(id: impl Into<String>, success: DistributionSpec) -> Self {
        Self::new(id, NodeRole::Intermediate, success)
    }

    pub fn goal(id: impl Into<String>, success: DistributionSpec) -> Self {
        Self::new(id, NodeRole::Goal, success)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}

/// Directed edge between node ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Follows,
        }
    }

    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Attack graph with validated node ids and cached adjacency.
///
/// Construction rejects duplicate ids and edges whose endpoints are not
/// declared. Acyclicity is checked separately by [`crate::topology`].
#[derive(Clone, Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, NodeIndex>,
    children: Vec<Vec<NodeIndex>>,
    parents: Vec<Vec<NodeIndex>>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                debug!(id = %node.id, "duplicate node id");
                return Err(ReachError::DuplicateNode { id: node.id.clone() });
            }
        }

        let mut links = Vec::with_capacity(edges.len());
        for edge in &edges {
            let lookup = |id: &str| {
                index.get(id).copied().ok_or_else(|| {
                    debug!(from = %edge.source, to = %edge.target, missing = id, "dangling edge");
                    ReachError::DanglingEdge {
                        from: edge.source.clone(),
                        to: edge.target.clone(),
                        missing: id.to_string(),
                    }
                })
            };
            links.push((lookup(&edge.source)?, lookup(&edge.target)?));
        }

        let mut children = vec![Vec::new(); nodes.len()];
        let mut parents = vec![Vec::new(); nodes.len()];
        for (u, v) in links {
            children[u].push(v);
            parents[v].push(u);
        }

        Ok(Self {
            nodes,
            edges,
            index,
            children,
            parents,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, i: NodeIndex) -> &Node {
        &self.nodes[i]
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn children(&self, i: NodeIndex) -> &[NodeIndex] {
        &self.children[i]
    }

    pub fn parents(&self, i: NodeIndex) -> &[NodeIndex] {
        &self.parents[i]
    }

    pub fn in_degree(&self, i: NodeIndex) -> usize {
        self.parents[i].len()
    }

    pub fn with_role(&self, role: NodeRole) -> Vec<NodeIndex> {
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].role == role)
            .collect()
    }

    pub fn goals(&self) -> Vec<NodeIndex> {
        self.with_role(NodeRole::Goal)
    }

    /// Nodes with no inbound edges.
    pub fn sources(&self) -> Vec<NodeIndex> {
        (0..self.nodes.len())
            .filter(|&i| self.parents[i].is_empty())
            .collect()
    }
}
