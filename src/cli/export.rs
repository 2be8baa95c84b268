//! Export command.
//!
//! Connects to Vault, exports the requested path (or every KV mount),
//! optionally seals the document, and writes it to a file or stdout.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::cli::{output, ExportArgs};
use crate::core::cipher;
use crate::core::config::{Config, ConnectionFlags};
use crate::core::domain::ExportReport;
use crate::core::export;
use crate::core::store::{SecretStore, VaultClient};
use crate::error::{ConfigError, Result};

/// Run an export.
///
/// Nothing is written unless the whole pipeline succeeds, so a failed run
/// never leaves a truncated file behind.
pub fn execute(args: ExportArgs) -> Result<()> {
    let start = Instant::now();
    let config = Config::load(args.config.as_deref())?;

    let format = config.format(args.format);
    let engine = config.engine(args.engine_type);

    // Resolve the recipient before touching Vault.
    let recipient = if args.encrypt {
        let key = config
            .public_key(args.public_key)
            .ok_or(ConfigError::MissingPublicKey)?;
        Some(cipher::load_recipient(&key)?)
    } else {
        None
    };

    let settings = config.vault_settings(ConnectionFlags {
        address: args.address,
        token: args.token,
        namespace: args.namespace,
        insecure: args.insecure,
    })?;
    debug!(settings = ?settings, "vault settings");
    let store: Arc<dyn SecretStore> = Arc::new(VaultClient::new(settings)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let (document, report) = runtime.block_on(export::export_document(
        store,
        &args.path,
        &format,
        engine,
    ))?;

    let bytes = match &recipient {
        Some(recipient) => {
            info!("sealing export");
            cipher::seal(recipient, &document)?.render().into_bytes()
        }
        None => document,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes)?;
            summarize(&report, start);
            output::success(&format!(
                "wrote {}{}",
                output::path(&path.display().to_string()),
                if recipient.is_some() { " (encrypted)" } else { "" }
            ));
        }
        None => {
            output::raw(&bytes)?;
            summarize(&report, start);
        }
    }

    Ok(())
}

fn summarize(report: &ExportReport, start: Instant) {
    for failure in &report.failures {
        output::warn(&format!("skipped {}: {}", failure.mount, failure.reason));
    }
    output::kv("folders", report.folders.len());
    output::kv("secrets", report.secret_count());
    if report.is_partial() {
        output::kv("failed", report.failures.len());
    }
    output::kv("elapsed", format!("{:.2?}", start.elapsed()));
}
