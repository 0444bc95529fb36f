//! STMA Harness CLI
//!
//! Generates marker load for the STMA agent and grades its detection report.

use clap::Parser;
use commands::Commands;
use stma_harness::common::logging;
use stma_harness::{cli, commands, marker};

#[derive(Parser)]
#[command(
    name = "stma-harness",
    about = "Load generator and result grader for the STMA agent"
)]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Marker { duration, tag } => {
            logging::init_marker();
            marker::run_marker(duration, &tag).await
        }
        command => {
            logging::init_cli();
            cli::dispatch(command).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
