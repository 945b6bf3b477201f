use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use reach_sampler::{EngineConfig, SimulationResult};

pub mod cli;
pub mod config;
pub mod document;
pub mod host;

pub use config::HostConfig;
pub use document::{demo_graph, GraphDocument};
pub use host::{simulate_document, simulate_fair, SimulationRequest};

/// Run manifest written next to every result for reproducibility.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub graph_title: String,
    pub seed: Option<u64>,
    pub trials: usize,
    pub shards: usize,
    pub n_nodes: usize,
    pub n_edges: usize,
    pub commit_hash: Option<String>,
    pub rust_version: String,
}

impl RunManifest {
    pub fn new(doc: &GraphDocument, config: &EngineConfig) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            graph_title: doc.title.clone(),
            seed: config.seed,
            trials: config.trials,
            shards: config.shards,
            n_nodes: doc.nodes.len(),
            n_edges: doc.edges.len(),
            commit_hash: get_git_commit(),
            rust_version: get_rust_version(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let manifest = serde_json::from_str(&json)?;
        Ok(manifest)
    }
}

/// Write a result as pretty JSON plus its manifest.
pub fn write_result_with_manifest(
    result: &SimulationResult,
    manifest: &RunManifest,
    result_path: &Path,
    manifest_path: &Path,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(result_path, json)
        .with_context(|| format!("writing result {}", result_path.display()))?;
    manifest.save_to_file(manifest_path)?;

    println!("Wrote {} trials to {}", result.trials, result_path.display());
    println!("Wrote manifest to {}", manifest_path.display());
    Ok(())
}

/// Load a previously written simulation result.
pub fn load_result(path: &Path) -> anyhow::Result<SimulationResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading result {}", path.display()))?;
    Ok(serde_json::from_str(&json)?)
}

/// Get git commit hash for reproducibility
fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
}

fn get_rust_version() -> String {
    std::process::Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
