use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use reach_core::{
    DistributionKind, DistributionSpec, Edge, EdgeKind, Graph, Node, NodeRole, ReachError,
};

/// Attack graph as exchanged in JSON files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub title: String,
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(alias = "node_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", alias = "node_type", default)]
    pub role: NodeRole,
    #[serde(default)]
    pub kind: String,
    /// Loosely-typed success spec; parsed leniently when the graph is built.
    #[serde(default)]
    pub p_succ: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
}

impl GraphDocument {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading graph {}", path.display()))?;
        let doc = serde_json::from_str(&text)
            .with_context(|| format!("parsing graph {}", path.display()))?;
        Ok(doc)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing graph {}", path.display()))?;
        Ok(())
    }

    /// Build a validated graph. Node specs without a `dist` tag are triangular.
    pub fn to_graph(&self) -> Result<Graph, ReachError> {
        if self.nodes.is_empty() {
            return Err(ReachError::EmptyGraph);
        }

        let nodes = self
            .nodes
            .iter()
            .map(|rec| {
                let spec = DistributionSpec::from_json(&rec.p_succ, DistributionKind::Triangular)?;
                let mut node = Node::new(rec.id.clone(), rec.role, spec).with_kind(rec.kind.clone());
                if let Some(label) = &rec.label {
                    node = node.with_label(label.clone());
                }
                Ok(node)
            })
            .collect::<Result<Vec<_>, ReachError>>()?;

        let edges = self
            .edges
            .iter()
            .map(|rec| Edge::new(rec.source.clone(), rec.target.clone()).with_kind(rec.kind))
            .collect();

        Graph::new(nodes, edges)
    }
}

/// The four-step "Phish→Endpoint→Server" chain used for demos.
pub fn demo_graph() -> GraphDocument {
    let node = |id: &str, label: &str, role, min: f64, mode: f64, max: f64| NodeRecord {
        id: id.to_string(),
        label: Some(label.to_string()),
        role,
        kind: "attack technique".to_string(),
        p_succ: serde_json::json!({"dist": "PERT", "min": min, "mode": mode, "max": max}),
    };
    let edge = |id: &str, source: &str, target: &str| EdgeRecord {
        id: Some(id.to_string()),
        source: source.to_string(),
        target: target.to_string(),
        kind: EdgeKind::Follows,
    };

    GraphDocument {
        title: "Phish→Endpoint→Server".to_string(),
        nodes: vec![
            node("n1", "Phishing", NodeRole::Foothold, 0.05, 0.15, 0.35),
            node("n2", "Initial Access", NodeRole::Intermediate, 0.4, 0.6, 0.8),
            node("n3", "Lateral Movement", NodeRole::Intermediate, 0.2, 0.4, 0.7),
            node("n4", "WAF Evasion + Exfil", NodeRole::Goal, 0.05, 0.2, 0.5),
        ],
        edges: vec![edge("e1", "n1", "n2"), edge("e2", "n2", "n3"), edge("e3", "n3", "n4")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let doc: GraphDocument = serde_json::from_str(
            r#"{
                "nodes": [
                    {"id": "n1", "type": "foothold", "p_succ": {"min": 0.1, "ml": 0.2, "max": 0.4}},
                    {"node_id": "n2", "node_type": "triangular", "kind": "Asset", "p_succ": {}},
                    {"id": "n3", "type": "goal", "p_succ": {"dist": "FIXED", "value": 1.0}}
                ],
                "edges": [
                    {"source": "n1", "target": "n2"},
                    {"source": "n2", "target": "n3", "type": "requires"}
                ]
            }"#,
        )
        .unwrap();

        let graph = doc.to_graph().unwrap();
        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.node(0).success, DistributionSpec::Triangular { min: 0.1, mode: 0.2, max: 0.4 });
        assert_eq!(graph.node(1).success, DistributionSpec::Fixed { value: 0.0 });
        assert_eq!(graph.node(1).role, NodeRole::Intermediate);
        assert_eq!(graph.node(1).label, "n2");
        assert_eq!(graph.edges()[1].kind, EdgeKind::Requires);
    }

    #[test]
    fn test_empty_graph_rejected() {
        let doc = GraphDocument::default();
        assert_eq!(doc.to_graph().unwrap_err(), ReachError::EmptyGraph);
    }

    #[test]
    fn test_unknown_distribution_rejected() {
        let doc: GraphDocument = serde_json::from_str(
            r#"{"nodes": [{"id": "a", "p_succ": {"dist": "BETA", "alpha": 2}}]}"#,
        )
        .unwrap();
        assert!(matches!(doc.to_graph(), Err(ReachError::UnsupportedDistribution { .. })));
    }

    #[test]
    fn test_demo_graph_builds() {
        let graph = demo_graph().to_graph().unwrap();
        assert_eq!(graph.num_nodes(), 4);
        assert_eq!(graph.goals(), vec![3]);
        assert_eq!(graph.node(0).label, "Phishing");
    }
}
