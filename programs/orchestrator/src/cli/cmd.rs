//! Defines the command line interface for the orchestrator.
use clap::{command, Parser};

#[derive(Clone, Debug, Parser)]
#[command(
    name = "evm_bridge_orchestrator",
    version,
    about = "Bridge orchestrator - signs attestations and broadcasts confirmations",
    long_about = "Runs alongside a bonded validator, watches the chain's attestation \
                  log, signs every attestation the validator is responsible for with \
                  its EVM key, and submits the confirmations back to the chain."
)]
pub struct OrchestratorCli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// The subcommands for the orchestrator.
#[derive(Clone, Debug, Parser)]
pub enum Commands {
    /// Run the orchestrator.
    Start(start::Args),

    /// Key management helpers.
    #[command(subcommand)]
    Key(key::KeyCommands),
}

/// The arguments for the start subcommand.
pub mod start {
    use super::Parser;

    #[derive(Clone, Debug, Parser)]
    pub struct Args {
        /// The configuration file for the orchestrator.
        #[clap(long)]
        pub config: String,
    }
}

pub mod key {
    use super::Parser;

    #[derive(Clone, Debug, Parser)]
    pub enum KeyCommands {
        /// Generate a fresh EVM key pair and print it.
        Generate,
        /// Print the EVM address for the key configured in the given file.
        Show(super::start::Args),
    }
}
