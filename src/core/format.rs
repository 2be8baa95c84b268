//! Document serialization.
//!
//! Turns exported folders into JSON or YAML bytes. Pure and
//! deterministic: folders are emitted in the order given, secrets in key
//! order.

use std::fmt;
use std::str::FromStr;

use crate::core::domain::Folder;
use crate::error::{FormatError, Result};

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    Json,
    #[default]
    Yaml,
}

impl Format {
    pub const ALL: [Format; 2] = [Format::Json, Format::Yaml];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(FormatError::Unsupported(s.to_string())),
        }
    }
}

/// Serialize folders in the requested format.
///
/// # Errors
///
/// Returns `FormatError::Serialize` if a payload cannot be encoded.
pub fn render(folders: &[Folder], format: Format) -> Result<Vec<u8>> {
    let mut bytes = match format {
        Format::Json => serde_json::to_vec_pretty(folders)
            .map_err(|e| FormatError::Serialize(e.to_string()))?,
        Format::Yaml => serde_yaml::to_string(folders)
            .map_err(|e| FormatError::Serialize(e.to_string()))?
            .into_bytes(),
    };
    if !bytes.ends_with(b"\n") {
        bytes.push(b'\n');
    }
    Ok(bytes)
}
