//! CLI command definitions
//!
//! Defines the clap commands for the harness CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the marker load and write the manifest
    Load {
        /// YAML or JSON load descriptor (default: config file, then the reference load)
        #[arg(long, short)]
        descriptor: Option<PathBuf>,

        /// Launch item as DELAY:DURATION seconds; repeatable, tags and counts derived
        #[arg(long = "item", value_name = "DELAY:DURATION", conflicts_with = "descriptor")]
        items: Vec<String>,

        /// Manifest output path (default: load_manifest.json)
        #[arg(long, short)]
        manifest: Option<PathBuf>,

        /// Workload program to launch instead of the built-in marker
        #[arg(long)]
        workload: Option<PathBuf>,

        /// Argument placed before `<duration> <tag>`; repeatable
        #[arg(long = "workload-arg", allow_hyphen_values = true)]
        workload_args: Vec<String>,

        /// Name recorded as `exe` in the manifest
        #[arg(long)]
        exe_name: Option<String>,

        /// Give up on a process that has not exited after this many seconds
        #[arg(long)]
        collect_timeout: Option<u64>,

        /// Alternate configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade an agent report against a load manifest
    Compare {
        /// Manifest written by `load`
        manifest: PathBuf,

        /// Report produced by the agent under test
        report: PathBuf,

        /// Exit with status 1 when any check fails
        #[arg(long)]
        strict: bool,
    },

    /// Print the load descriptor that `load` would run
    Plan {
        /// YAML or JSON load descriptor
        #[arg(long, short)]
        descriptor: Option<PathBuf>,

        /// Launch item as DELAY:DURATION seconds; repeatable, tags and counts derived
        #[arg(long = "item", value_name = "DELAY:DURATION", conflicts_with = "descriptor")]
        items: Vec<String>,

        /// Alternate configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Marker workload: sleep, then print the tag (internal use)
    #[command(hide = true)]
    Marker {
        /// Seconds to sleep
        duration: u64,

        /// Tag printed on exit
        tag: String,
    },
}
