//! verkle-vectors: run commitment test vectors and print trie roots.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pedersen::params::{DEFAULT_SEED, DEFAULT_WIDTH};
use pedersen::CommitterConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "verkle-vectors")]
#[command(about = "Pedersen and verkle trie test-vector runner")]
#[command(version)]
struct Cli {
    /// Seed the Pedersen basis is derived from
    #[arg(long, default_value = DEFAULT_SEED)]
    seed: String,

    /// Number of basis points
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a JSON file of Pedersen commitment vectors
    Pedersen {
        file: PathBuf,
        /// Print the report as JSON instead of one line per case
        #[arg(long)]
        json: bool,
    },

    /// Insert key/value pairs and print the root hash
    RootHash {
        /// 32-byte hex KEY=VALUE; repeatable. Defaults to a single-value scenario
        #[arg(long = "kv", value_parser = vectors::parse_kv)]
        pairs: Vec<(primitives::Key, primitives::Value)>,
    },

    /// Split hex bytecode into 32-byte code chunks
    Chunkify { code: String },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let committer = vectors::committer_for(CommitterConfig { seed: cli.seed, width: cli.width });

    match cli.command {
        Commands::Pedersen { file, json } => {
            let report = vectors::run_pedersen_file(&committer, &file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for line in vectors::render_report(&report) {
                    println!("{line}");
                }
            }
            if !report.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::RootHash { pairs } => {
            let pairs = if pairs.is_empty() { vectors::default_scenario() } else { pairs };
            println!("{}", vectors::root_hash(committer, &pairs)?);
        }
        Commands::Chunkify { code } => {
            for chunk in vectors::chunkify_hex(&code)? {
                println!("{chunk}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
