use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Request-layer guardrails applied before the engine runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Trials used when a request names none.
    pub default_trials: usize,
    pub min_trials: usize,
    pub max_trials: usize,
    /// Parallel trial blocks; 1 keeps the strict sequential loop.
    pub shards: usize,
    /// Upper bound on requested shards.
    pub max_shards: usize,
    /// Trials for FAIR scenario runs when none are requested.
    pub fair_default_trials: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            default_trials: 5_000,
            min_trials: 100,
            max_trials: 200_000,
            shards: 1,
            max_shards: 64,
            fair_default_trials: 20_000,
        }
    }
}

impl HostConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Default when absent, then clamp into `[min_trials, max_trials]`.
    pub fn clamp_trials(&self, requested: Option<i64>) -> usize {
        let requested = match requested {
            Some(n) => usize::try_from(n.max(0)).unwrap_or(usize::MAX),
            None => self.default_trials,
        };
        requested.clamp(self.min_trials, self.max_trials.max(self.min_trials))
    }

    /// Default when absent, then clamp into `[1, min(trials, max_shards)]`.
    pub fn clamp_shards(&self, requested: Option<usize>, trials: usize) -> usize {
        let limit = self.max_shards.min(trials).max(1);
        requested.unwrap_or(self.shards).clamp(1, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_trials() {
        let config = HostConfig::default();
        assert_eq!(config.clamp_trials(None), 5_000);
        assert_eq!(config.clamp_trials(Some(10)), 100);
        assert_eq!(config.clamp_trials(Some(-4)), 100);
        assert_eq!(config.clamp_trials(Some(1_000_000)), 200_000);
        assert_eq!(config.clamp_trials(Some(12_345)), 12_345);
    }

    #[test]
    fn test_clamp_shards() {
        let config = HostConfig::default();
        assert_eq!(config.clamp_shards(None, 5_000), 1);
        assert_eq!(config.clamp_shards(Some(0), 5_000), 1);
        assert_eq!(config.clamp_shards(Some(8), 5_000), 8);
        assert_eq!(config.clamp_shards(Some(usize::MAX), 5_000), 64);

        let config = HostConfig { max_shards: 1_000, ..HostConfig::default() };
        assert_eq!(config.clamp_shards(Some(500), 100), 100);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: HostConfig = toml::from_str("max_trials = 50000\nshards = 4\n").unwrap();
        assert_eq!(config.max_trials, 50_000);
        assert_eq!(config.shards, 4);
        assert_eq!(config.default_trials, 5_000);
    }
}
