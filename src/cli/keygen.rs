//! Keygen command.

use std::path::Path;

use crate::cli::output;
use crate::core::cipher;
use crate::error::{ConfigError, Result};

/// Write a new age identity and print its recipient.
///
/// The recipient goes to stdout so it can be piped into a `.pub` file.
pub fn execute(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "output",
            reason: format!("{} already exists, use --force to overwrite", path.display()),
        }
        .into());
    }

    let recipient = cipher::generate_identity(path)?;

    output::success(&format!(
        "identity written to {}",
        output::path(&path.display().to_string())
    ));
    output::hint("export with: hoard export / -e -p <recipient below>");
    println!("{}", recipient);
    Ok(())
}
