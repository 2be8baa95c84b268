//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use std::collections::BTreeMap;

/// A slash-delimited location in the secret store (e.g. `secret/app/db`).
pub type StorePath = String;

/// A mount prefix, always ending in `/` (e.g. `secret/`).
pub type MountPath = String;

/// The name of a leaf secret within its folder.
pub type SecretName = String;

/// The key/value payload stored at one leaf.
///
/// Values are kept as JSON so non-string payloads survive the export.
pub type SecretData = BTreeMap<String, serde_json::Value>;
