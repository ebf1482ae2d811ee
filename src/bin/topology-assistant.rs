// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Assistant CLI
//!
//! Works on inventory dump files; nothing here talks to a live service.
//!
//! ```text
//! topology-assistant diff current.json other.json
//! topology-assistant reconcile current.json expected.json \
//!     --config engine.yaml --changes topology_changes.json --merged-state merged.json
//! ```
//!
//! Logging follows `RUST_LOG`, defaulting to `info`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use topology_assistant::{
    adapters::sls::{decode_state, encode_state},
    EngineConfig, HardwareComparison, InventoryState, TopologyEngine,
};

/// Reconcile cluster topology against the recorded inventory
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report identical, differing, added and removed hardware between two dumps
    Diff {
        /// Inventory dump treated as the current state
        a: PathBuf,
        /// Inventory dump treated as the expected state
        b: PathBuf,
    },

    /// Compute the change-set that adds the expected hardware to the current inventory
    Reconcile {
        /// Current inventory dump
        current: PathBuf,

        /// Expected inventory dump built from the topology description
        expected: PathBuf,

        /// Engine configuration (YAML); environment defaults when omitted
        #[arg(long, env = "TOPOLOGY_CONFIG")]
        config: Option<PathBuf>,

        /// Where to write the change-set
        #[arg(long, default_value = "topology_changes.json")]
        changes: PathBuf,

        /// Also write the current inventory with the change-set merged in
        #[arg(long)]
        merged_state: Option<PathBuf>,
    },
}

fn load_state(path: &Path) -> Result<InventoryState> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    decode_state(&raw).with_context(|| format!("Failed to decode {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Diff { a, b } => {
            let a_state = load_state(&a)?;
            let b_state = load_state(&b)?;

            let comparison = HardwareComparison::between(&a_state, &b_state);
            print!("{}", comparison);
        }

        Command::Reconcile {
            current,
            expected,
            config,
            changes,
            merged_state,
        } => {
            let config = match config {
                Some(path) => EngineConfig::from_yaml_file(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => EngineConfig::from_env().context("Invalid engine configuration")?,
            };

            let mut current_state = load_state(&current)?;
            let expected_state = load_state(&expected)?;

            let engine = TopologyEngine::new(config);
            let topology_changes = engine
                .determine_changes(&current_state, &expected_state)
                .context("Failed to determine topology changes")?;

            let changes_json = serde_json::to_string_pretty(&topology_changes)
                .context("Failed to serialize topology changes")?;
            write_file(&changes, &changes_json)?;
            info!(path = %changes.display(), "Wrote topology changes");

            if let Some(path) = merged_state {
                current_state.apply_changes(&topology_changes);
                let merged = encode_state(&current_state).context("Failed to encode merged state")?;
                write_file(&path, &merged)?;
                info!(path = %path.display(), "Wrote merged inventory");
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        error!(error = %format!("{:#}", err), "Topology assistant failed");
        return Err(err);
    }
    Ok(())
}
