use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use reach_core::Summary;
use reach_sampler::FairScenario;

use crate::{
    demo_graph, load_result, simulate_document, simulate_fair, write_result_with_manifest,
    GraphDocument, HostConfig, RunManifest, SimulationRequest,
};

#[derive(Parser)]
#[command(name = "reach")]
#[command(about = "reach - Monte Carlo attack graph reachability")]
#[command(long_about = "Estimates the probability an attacker reaches any goal of an attack graph \
                        from uncertain per-step success probabilities")]
pub struct Cli {
    /// Guardrail configuration (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate an attack graph and write the result as JSON
    Simulate {
        /// Graph document (JSON)
        #[arg(long)]
        graph: PathBuf,

        /// Number of trials, clamped by the configured guardrails
        #[arg(long, allow_negative_numbers = true)]
        trials: Option<i64>,

        /// Random seed for reproducible runs; negative values are accepted
        #[arg(long, allow_negative_numbers = true)]
        seed: Option<i64>,

        /// Parallel trial blocks
        #[arg(long)]
        shards: Option<usize>,

        /// Output result file; a manifest is written beside it
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run the FAIR loss estimator
    Fair {
        /// Scenario inputs (JSON); defaults are used when omitted
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Simulation result whose success distribution supplies the vulnerability
        #[arg(long)]
        graph_result: Option<PathBuf>,

        #[arg(long, allow_negative_numbers = true)]
        trials: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        seed: Option<i64>,
    },

    /// Write the demo attack graph
    Demo {
        #[arg(long)]
        out: PathBuf,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };

    match cli.command {
        Commands::Simulate { graph, trials, seed, shards, out } => {
            let request = SimulationRequest { trials, seed, shards };
            run_simulate_command(&graph, &request, &config, out.as_deref())
        }
        Commands::Fair { scenario, graph_result, trials, seed } => {
            let request = SimulationRequest { trials, seed, shards: None };
            run_fair_command(scenario.as_deref(), graph_result.as_deref(), &request, &config)
        }
        Commands::Demo { out } => {
            demo_graph().save(&out)?;
            println!("Wrote demo graph to {}", out.display());
            Ok(())
        }
    }
}

pub fn run_simulate_command(
    graph_path: &Path,
    request: &SimulationRequest,
    config: &HostConfig,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let doc = GraphDocument::load(graph_path)?;
    let engine_config = request.engine_config(config);

    println!("Attack Graph Simulation");
    println!("=======================");
    println!("Graph: {}", if doc.title.is_empty() { "(untitled)" } else { doc.title.as_str() });
    println!("Nodes: {}  Edges: {}", doc.nodes.len(), doc.edges.len());
    println!("Trials: {}", engine_config.trials);
    println!("Shards: {}", engine_config.shards);
    match engine_config.seed {
        Some(seed) => println!("Seed: {}", seed),
        None => println!("Seed: (entropy)"),
    }

    let result = simulate_document(&doc, request, config)
        .with_context(|| format!("simulating {}", graph_path.display()))?;

    println!();
    println!("Success (any goal):");
    print_summary(&result.success_distribution);
    for (goal, dist) in &result.goal_distributions {
        println!("Goal {}:", goal);
        print_summary(dist);
    }

    if let Some(out) = out {
        let manifest = RunManifest::new(&doc, &engine_config);
        let manifest_path = out.with_extension("manifest.json");
        write_result_with_manifest(&result, &manifest, out, &manifest_path)?;
    }

    Ok(())
}

pub fn run_fair_command(
    scenario_path: Option<&Path>,
    graph_result: Option<&Path>,
    request: &SimulationRequest,
    config: &HostConfig,
) -> anyhow::Result<()> {
    let mut scenario = match scenario_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            serde_json::from_str::<FairScenario>(&text)
                .with_context(|| format!("parsing scenario {}", path.display()))?
        }
        None => FairScenario::default(),
    };

    if let Some(path) = graph_result {
        let result = load_result(path)?;
        scenario = scenario
            .with_graph_vulnerability(&result.success_distribution)
            .context("graph success distribution is not a valid vulnerability range")?;
    }

    let summary = simulate_fair(&scenario, request, config)?;

    println!("FAIR Annualized Loss Exposure");
    println!("=============================");
    print_summary(&summary);
    Ok(())
}

fn print_summary(s: &Summary) {
    println!("  mean {:.6}  p10 {:.6}  p50 {:.6}  p90 {:.6}", s.mean, s.p10, s.p50, s.p90);
}
