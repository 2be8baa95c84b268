//! Mounts and engine types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::constants::FOLDER_SUFFIX;
use crate::core::types::MountPath;
use crate::error::StoreError;

/// KV secrets engine version.
///
/// The two versions share a transport but lay out list and read paths
/// differently, so every mount carries its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Kv1,
    Kv2,
}

impl Engine {
    /// Map Vault mount metadata to an engine.
    ///
    /// `generic` mounts are kv1, `kv` mounts are kv1 only when their
    /// `version` option says so. Anything else is not a KV engine.
    pub fn from_mount_metadata(kind: &str, version: Option<&str>) -> Option<Self> {
        match kind {
            "generic" => Some(Self::Kv1),
            "kv" if version == Some("1") => Some(Self::Kv1),
            "kv" => Some(Self::Kv2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kv1 => "kv1",
            Self::Kv2 => "kv2",
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::Kv2
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kv1" => Ok(Self::Kv1),
            "kv2" => Ok(Self::Kv2),
            other => Err(StoreError::UnknownEngine(other.to_string())),
        }
    }
}

/// A top-level entry point into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    path: MountPath,
    engine: Engine,
}

impl Mount {
    /// Create a mount, normalizing the path to end with `/`.
    pub fn new(path: impl Into<String>, engine: Engine) -> Self {
        Self {
            path: normalize_mount(&path.into()),
            engine,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }
}

/// Strip leading slashes and make sure a mount ends with exactly one `/`.
pub fn normalize_mount(path: &str) -> MountPath {
    let trimmed = path.trim_matches(FOLDER_SUFFIX);
    format!("{}{}", trimmed, FOLDER_SUFFIX)
}

/// The longest mount in `mounts` that contains `path`.
///
/// Mounts may span several segments (`team/app/`), so the first segment
/// of a path is not necessarily its mount. `path` may also name the
/// mount itself without the trailing `/`.
pub fn find_mount<'a>(
    mounts: &'a BTreeMap<MountPath, Engine>,
    path: &str,
) -> Option<(&'a MountPath, Engine)> {
    let path = path.trim_start_matches(FOLDER_SUFFIX);
    mounts
        .iter()
        .filter(|(mount, _)| {
            path.starts_with(mount.as_str()) || path == mount.trim_end_matches(FOLDER_SUFFIX)
        })
        .max_by_key(|(mount, _)| mount.len())
        .map(|(mount, engine)| (mount, *engine))
}
