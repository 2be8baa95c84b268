//! Hoard - Point-in-time exports of Vault KV secrets.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── export        # Export a path or every mount
//! │   ├── keygen        # Generate an age identity
//! │   ├── completions   # Shell completions
//! │   └── output        # Status output on stderr
//! └── core/             # Core library components
//!     ├── config        # .hoard.toml management
//!     ├── domain/       # Engine, Mount, Folder, ExportReport
//!     ├── store/        # Secret store backends
//!     │   ├── mod       # SecretStore trait and Session
//!     │   ├── vault     # Vault HTTP client
//!     │   └── memory    # In-memory store for tests
//!     ├── tree          # Recursive folder traversal
//!     ├── export        # Single-path and all-mounts pipelines
//!     ├── format        # JSON / YAML rendering
//!     └── cipher/       # Export encryption
//!         ├── mod       # KeyWrap trait
//!         ├── envelope  # XChaCha20-Poly1305 envelope
//!         └── age       # age key wrapping
//! ```
//!
//! # Features
//!
//! - KV v1 and v2 engines, detected from the mount table
//! - Concurrent export of every mount with per-mount failure isolation
//! - JSON or YAML documents with deterministic ordering
//! - Hybrid encryption: a one-off payload key wrapped for an age recipient

pub mod cli;
pub mod core;
pub mod error;
