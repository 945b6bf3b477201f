/// Errors raised while building or simulating an attack graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReachError {
    #[error("cycle detected in attack graph: ordered {ordered} of {total} nodes")]
    CycleDetected { ordered: usize, total: usize },

    #[error("unsupported distribution: {tag}")]
    UnsupportedDistribution { tag: String },

    #[error("invalid bounds: min {min}, mode {mode}, max {max}")]
    InvalidBounds { min: f64, mode: f64, max: f64 },

    #[error("non-finite parameter {name}: {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },

    #[error("edge {from} -> {to} references undeclared node {missing}")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("sampling failed: {reason}")]
    Sampling { reason: String },
}

pub type Result<T> = std::result::Result<T, ReachError>;
