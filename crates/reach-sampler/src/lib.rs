pub mod engine;
pub mod fair;
pub mod propagate;
pub mod result;

pub use engine::{run_trials, EngineConfig, MonteCarloEngine, DEFAULT_TRIALS};
pub use fair::{loss_from_samples, simulate_scenario, FairScenario, LossSummary};
pub use propagate::{any_of, Propagator, TrialScratch};
pub use result::{SampleSet, SimulationResult};
