//! Error types.
//!
//! Each concern has its own error enum; `Error` wraps them so callers can
//! propagate everything with `?` and still match on the specific failure.

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the secret store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("permission denied: {0}")]
    AccessDenied(String),

    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    #[error("unknown engine type: {0} (expected kv1 or kv2)")]
    UnknownEngine(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("store client setup failed: {0}")]
    Client(String),
}

/// Failures of the export pipeline itself.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("mount discovery failed: {0}")]
    Discovery(#[source] StoreError),

    #[error("path not found: {0}")]
    NotFound(String),

    #[error("failed to export {path}: {source}")]
    Traversal {
        path: String,
        #[source]
        source: StoreError,
    },

    #[error("{path} nests deeper than {limit} levels")]
    DepthExceeded { path: String, limit: usize },

    #[error("result aggregation failed: {0}")]
    Aggregation(String),
}

/// Serialization failures.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("unsupported format '{0}': available formats are json and yaml")]
    Unsupported(String),

    #[error("failed to serialize export: {0}")]
    Serialize(String),
}

/// Encryption envelope failures.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}

/// Configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no vault address: pass --address or set VAULT_ADDR")]
    MissingAddress,

    #[error("no vault token: pass --token or set VAULT_TOKEN")]
    MissingToken,

    #[error("--encrypt requires --public-key")]
    MissingPublicKey,

    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
