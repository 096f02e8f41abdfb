//! CLI frontend for the Grovewright grid-world simulator.

mod commands;
mod scenario;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gw",
    about = "Grovewright: a tick-driven grid world of trees, fairies and dudes",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a JSON scenario and run the simulation
    Run {
        /// Path to the scenario file
        scenario: PathBuf,

        /// Number of clock advances
        #[arg(short = 'n', long, default_value = "10")]
        steps: u64,

        /// Simulated seconds per advance
        #[arg(long, default_value = "1.0")]
        dt: f64,

        /// RNG seed (overrides the scenario's seed)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Show the full event log
        #[arg(short, long)]
        verbose: bool,

        /// Print the final world as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// List the entity kinds and their scheduling traits
    Kinds {
        /// Only show this scenario key (e.g. sapling, dude)
        key: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            scenario,
            steps,
            dt,
            seed,
            verbose,
            json,
        } => commands::run::run(
            &scenario,
            &commands::run::RunOptions {
                steps,
                dt,
                seed,
                verbose,
                json,
            },
        ),
        Commands::Kinds { key } => commands::kinds::run(key.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
