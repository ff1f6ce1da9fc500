mod altruism;
mod competition;
mod config;
mod engine;
mod error;
mod field;
mod fitness;
mod manager;
mod metrics;
mod model;
mod stats;

use crate::engine::Outcome;
use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    sim_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Create,

    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.sim_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Create => {
            for outcome in mgr.create_runs()? {
                match outcome {
                    Outcome::EpochCapReached { epochs, population } => {
                        log::info!("survived {epochs} epochs with {population} organisms")
                    }
                    Outcome::ZeroPopulation { epoch } => log::info!("went extinct in epoch {epoch}"),
                }
            }
        }
        Command::Clean => mgr.clean_sim()?,
    }

    Ok(())
}
