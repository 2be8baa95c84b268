//! Command-line interface.

pub mod completions;
pub mod export;
pub mod keygen;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::domain::Engine;

/// Hoard - Point-in-time exports of Vault KV secrets.
#[derive(Parser)]
#[command(
    name = "hoard",
    about = "Point-in-time exports of Vault KV secrets",
    version,
    after_help = "Export a path, or `/` for every KV mount."
)]
pub struct Cli {
    /// Enable debug logging (or set HOARD_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Export secrets under a path (`/` exports every KV mount)
    Export(ExportArgs),

    /// Generate an age identity for encrypted exports
    Keygen {
        /// Where to write the identity file
        #[arg(short, long, default_value = crate::core::constants::IDENTITY_FILE)]
        output: PathBuf,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments of `hoard export`.
#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Vault path to export, e.g. `secret/app` or `/` for all mounts
    pub path: String,

    /// Output format [json|yaml]
    #[arg(short, long)]
    pub format: Option<String>,

    /// Write to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Encrypt the export for --public-key
    #[arg(short, long)]
    pub encrypt: bool,

    /// age recipient (age1...) or a file containing one
    #[arg(short, long)]
    pub public_key: Option<String>,

    /// Engine type for single-path exports [kv1|kv2] (default: detected)
    #[arg(short = 'm', long)]
    pub engine_type: Option<Engine>,

    /// Vault server address
    #[arg(short, long, env = "VAULT_ADDR")]
    pub address: Option<String>,

    /// Vault token
    #[arg(short, long, env = "VAULT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Vault namespace
    #[arg(short, long, env = "VAULT_NAMESPACE")]
    pub namespace: Option<String>,

    /// Skip TLS certificate verification
    #[arg(short, long)]
    pub insecure: bool,

    /// Config file (default: ./.hoard.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute a command.
pub fn execute(command: Command) -> crate::error::Result<()> {
    match command {
        Command::Export(args) => export::execute(args),
        Command::Keygen { output, force } => keygen::execute(&output, force),
        Command::Completions { shell } => completions::execute(shell),
    }
}
