//! Kahn ordering of attack graphs.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::{ReachError, Result};
use crate::graph::{Edge, Graph, Node, NodeIndex};

/// Order nodes so that each appears after all of its ancestors.
///
/// Ready nodes are taken in FIFO order; callers must not rely on the
/// tie-break. Fails with `CycleDetected` when some node never reaches
/// in-degree zero.
pub fn order(graph: &Graph) -> Result<Vec<NodeIndex>> {
    let n = graph.num_nodes();
    let mut indeg: Vec<usize> = (0..n).map(|i| graph.in_degree(i)).collect();
    let mut queue: VecDeque<NodeIndex> = (0..n).filter(|&i| indeg[i] == 0).collect();
    let mut ordered = Vec::with_capacity(n);

    while let Some(u) = queue.pop_front() {
        ordered.push(u);
        for &v in graph.children(u) {
            indeg[v] -= 1;
            if indeg[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    if ordered.len() < n {
        debug!(ordered = ordered.len(), total = n, "attack graph has a cycle");
        return Err(ReachError::CycleDetected {
            ordered: ordered.len(),
            total: n,
        });
    }
    Ok(ordered)
}

/// Order raw nodes and edges by id, validating edge endpoints first.
pub fn order_ids(nodes: &[Node], edges: &[Edge]) -> Result<Vec<String>> {
    let graph = Graph::new(nodes.to_vec(), edges.to_vec())?;
    Ok(order(&graph)?
        .into_iter()
        .map(|i| graph.node(i).id.clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::DistributionSpec;

    fn node(id: &str) -> Node {
        Node::intermediate(id, DistributionSpec::fixed(0.5).unwrap())
    }

    #[test]
    fn test_chain_order() {
        let nodes = vec![node("d"), node("c"), node("b"), node("a")];
        let edges = vec![Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("c", "d")];
        assert_eq!(order_ids(&nodes, &edges).unwrap(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_diamond_respects_ancestors() {
        let nodes = vec![node("sink"), node("left"), node("right"), node("root")];
        let edges = vec![
            Edge::new("root", "left"),
            Edge::new("root", "right"),
            Edge::new("left", "sink"),
            Edge::new("right", "sink"),
        ];
        let ids = order_ids(&nodes, &edges).unwrap();
        let pos = |id: &str| ids.iter().position(|x| x == id).unwrap();
        assert_eq!(pos("root"), 0);
        assert_eq!(pos("sink"), 3);
    }

    #[test]
    fn test_cycle_detected() {
        let nodes = vec![node("a"), node("b"), node("c"), node("x")];
        let edges = vec![Edge::new("x", "a"), Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("c", "a")];
        let err = order_ids(&nodes, &edges).unwrap_err();
        assert_eq!(err, ReachError::CycleDetected { ordered: 1, total: 4 });
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let err = order_ids(&[node("a")], &[Edge::new("a", "a")]).unwrap_err();
        assert!(matches!(err, ReachError::CycleDetected { .. }));
    }

    #[test]
    fn test_dangling_edge_checked_before_ordering() {
        let err = order_ids(&[node("a")], &[Edge::new("a", "b")]).unwrap_err();
        assert!(matches!(err, ReachError::DanglingEdge { .. }));
    }
}
