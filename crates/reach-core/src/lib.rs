pub mod distribution;
pub mod error;
pub mod graph;
pub mod rng;
pub mod sampling;
pub mod stats;
pub mod topology;

// Core types
pub use error::{ReachError, Result};
pub use rng::SimRng;

// Distributions
pub use distribution::{DistributionKind, DistributionSpec};
pub use sampling::{sample, sample_probability, PreparedDistribution};

// Graph and aggregation
pub use graph::{Edge, EdgeKind, Graph, Node, NodeIndex, NodeRole};
pub use stats::{summarize, Summary};
