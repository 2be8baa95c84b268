//! Hoard - Point-in-time exports of Vault KV secrets.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hoard::cli::output;
use hoard::cli::{execute, Cli};
use hoard::core::constants::LOG_ENV;
use hoard::error::{CipherError, ConfigError, Error, ExportError, FormatError, StoreError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("hoard=debug")
        } else {
            EnvFilter::new("hoard=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command) {
        output::error(&e.to_string());
        if let Some(hint) = suggestion(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

fn suggestion(e: &Error) -> Option<&'static str> {
    match e {
        Error::Config(ConfigError::MissingAddress) => Some("set VAULT_ADDR or pass --address"),
        Error::Config(ConfigError::MissingToken) => Some("set VAULT_TOKEN or pass --token"),
        Error::Config(ConfigError::MissingPublicKey) => {
            Some("pass --public-key, or run: hoard keygen")
        }
        Error::Format(FormatError::Unsupported(_)) => Some("use --format json or --format yaml"),
        Error::Cipher(CipherError::InvalidPublicKey(_)) => {
            Some("expected an age recipient (age1...) or a file containing one")
        }
        Error::Store(StoreError::AccessDenied(_))
        | Error::Export(ExportError::Discovery(StoreError::AccessDenied(_))) => {
            Some("check the token's policy (list on sys/mounts and the export path)")
        }
        Error::Export(ExportError::Discovery(_)) => {
            Some("export a single mount instead, e.g. secret/")
        }
        _ => None,
    }
}
