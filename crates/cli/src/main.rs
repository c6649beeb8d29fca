//! TLP packetizer simulator CLI.
//!
//! This binary drives the packetizer model from the command line. It provides:
//! 1. **Run:** Submit a JSON workload, run until the pipeline drains and print every
//!    physical word (optionally under backpressure and with a statistics report).
//! 2. **Config:** Print the effective configuration as JSON, as a starting point for a
//!    configuration file.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tlpsim_core::common::DataWidth;
use tlpsim_core::config::Config;
use tlpsim_core::sim::{Backpressure, CollectSink, Workload};
use tlpsim_core::{Result, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "tlpsim",
    author,
    version,
    about = "PCIe TLP packetizer simulator",
    long_about = "Run a JSON workload of requests and completions through the TLP packetizer and print the physical word stream.\n\nExamples:\n  tlpsim run --workload workload.json\n  tlpsim run --workload workload.json --data-width 256 --stall-every 3 --stats\n  tlpsim config --data-width 128 > packetizer.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a workload until the packetizer drains.
    Run {
        /// Workload file (JSON lists of requests and completions).
        #[arg(short, long)]
        workload: PathBuf,

        /// Configuration file (JSON); defaults apply to omitted fields.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Datapath width in bits (64, 128, 256 or 512); overrides the config file.
        #[arg(long)]
        data_width: Option<u32>,

        /// Deassert downstream ready on every Nth cycle.
        #[arg(long)]
        stall_every: Option<u64>,

        /// Print a statistics report after the run.
        #[arg(long)]
        stats: bool,
    },

    /// Print the effective configuration as JSON.
    Config {
        /// Configuration file to merge over the defaults.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Datapath width in bits; overrides the config file.
        #[arg(long)]
        data_width: Option<u32>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            workload,
            config,
            data_width,
            stall_every,
            stats,
        } => cmd_run(&workload, config.as_deref(), data_width, stall_every, stats),
        Commands::Config { config, data_width } => cmd_config(config.as_deref(), data_width),
    };

    if let Err(e) = result {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

/// Loads the configuration file (if any) and applies command-line overrides.
fn load_config(path: Option<&Path>, data_width: Option<u32>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(bits) = data_width {
        config.packetizer.data_width = DataWidth::try_from(bits)?;
    }
    Ok(config)
}

/// Runs a workload and prints one line per physical word.
fn cmd_run(
    workload_path: &Path,
    config_path: Option<&Path>,
    data_width: Option<u32>,
    stall_every: Option<u64>,
    stats: bool,
) -> Result<()> {
    let config = load_config(config_path, data_width)?;
    let workload = Workload::from_json_file(workload_path)?;
    info!(path = %workload_path.display(), transactions = workload.len(), "workload loaded");

    println!(
        "Configuration: {} datapath, {:?} endian, {}-bit addressing, {:?} arbitration",
        config.packetizer.data_width,
        config.packetizer.endianness,
        config.packetizer.address_width.bits(),
        config.packetizer.arbitration,
    );
    println!(
        "[*] Workload: {} requests, {} completions",
        workload.requests.len(),
        workload.completions.len()
    );
    println!();

    let mut sim = Simulator::new(&config);
    workload.submit(&mut sim)?;

    let backpressure = stall_every.map_or(Backpressure::None, Backpressure::EveryNth);
    let mut sink = CollectSink::with_backpressure(backpressure);
    let steps = sim.run_until_idle(&mut sink)?;

    for (index, word) in sink.words().iter().enumerate() {
        println!("{index:6}  {word}");
    }
    println!("\n[*] Drained in {steps} steps ({} stalled)", sink.stalls());

    if stats {
        sim.stats().print();
    }
    Ok(())
}

/// Prints the effective configuration.
fn cmd_config(config_path: Option<&Path>, data_width: Option<u32>) -> Result<()> {
    let config = load_config(config_path, data_width)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
