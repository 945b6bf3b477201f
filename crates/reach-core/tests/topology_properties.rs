//! Property tests for topological ordering.

use proptest::prelude::*;

use reach_core::topology;
use reach_core::{DistributionSpec, Edge, Graph, Node, ReachError};

fn nodes(n: usize) -> Vec<Node> {
    (0..n)
        .map(|i| Node::intermediate(format!("n{i}"), DistributionSpec::fixed(0.5).unwrap()))
        .collect()
}

/// Forward edges only (lower index to higher index), so the graph is a DAG.
fn dag_edges(n: usize, pairs: &[(usize, usize)]) -> Vec<Edge> {
    pairs
        .iter()
        .filter(|(a, b)| a < b && *b < n)
        .map(|(a, b)| Edge::new(format!("n{a}"), format!("n{b}")))
        .collect()
}

fn pair_strategy(n: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..n, 0..n), 0..n * 3)
}

proptest! {
    #[test]
    fn dag_order_places_parents_first(pairs in pair_strategy(16)) {
        let edges = dag_edges(16, &pairs);
        let graph = Graph::new(nodes(16), edges.clone()).unwrap();
        let order = topology::order(&graph).unwrap();
        prop_assert_eq!(order.len(), 16);

        let mut pos = vec![0usize; 16];
        for (rank, &i) in order.iter().enumerate() {
            pos[i] = rank;
        }
        for edge in &edges {
            let u = graph.index_of(&edge.source).unwrap();
            let v = graph.index_of(&edge.target).unwrap();
            prop_assert!(pos[u] < pos[v], "{} must precede {}", edge.source, edge.target);
        }
    }

    #[test]
    fn back_edge_creates_cycle(pairs in pair_strategy(12), a in 0usize..11, len in 1usize..6) {
        // Chain a -> ... -> b plus the back edge b -> a always forms a cycle.
        let b = (a + len).min(11);
        let mut edges = dag_edges(12, &pairs);
        for i in a..b {
            edges.push(Edge::new(format!("n{i}"), format!("n{}", i + 1)));
        }
        edges.push(Edge::new(format!("n{b}"), format!("n{a}")));

        let graph = Graph::new(nodes(12), edges).unwrap();
        let is_cycle = matches!(topology::order(&graph), Err(ReachError::CycleDetected { .. }));
        prop_assert!(is_cycle);
    }
}
