//! Secret store access.
//!
//! The export pipeline only needs three capabilities from a store:
//! enumerate mounts, list the children of a path and read the payload at
//! a path. [`SecretStore`] captures that contract; [`Session`] binds a
//! shared store to the engine of one mount so that concurrent traversals
//! never share a mutable "current engine" setting.
//!
//! ## Implementations
//!
//! - [`VaultClient`]: the Vault HTTP API (KV v1 and v2)
//! - [`MemoryStore`]: an in-process tree, used by tests
//!
//! ## Adding a New Store
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file (e.g., `consul.rs`)
//! 3. Re-export from this module

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::domain::Engine;
use crate::core::types::{MountPath, SecretData};
use crate::error::Result;

mod memory;
mod vault;

pub use memory::MemoryStore;
pub use vault::{split_mount, VaultClient, VaultSettings};

/// Store client contract consumed by the export pipeline.
///
/// Paths are full store paths including the mount (`secret/app/db`).
/// Listings return child names; names ending in `/` are folders.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Enumerate KV mounts and their engine versions.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the mount table cannot be read.
    async fn list_mounts(&self) -> Result<BTreeMap<MountPath, Engine>>;

    /// List the children of `path`.
    ///
    /// Returns `Ok(None)` when nothing exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AccessDenied` on permission denial, or another
    /// `StoreError` on transport failure.
    async fn list(&self, engine: Engine, path: &str) -> Result<Option<Vec<String>>>;

    /// Read the key/value payload stored at `path`.
    ///
    /// Returns `Ok(None)` when no secret exists at `path`.
    ///
    /// # Errors
    ///
    /// Same as [`SecretStore::list`].
    async fn read(&self, engine: Engine, path: &str) -> Result<Option<SecretData>>;
}

/// A store handle configured for one engine.
///
/// Cheap to clone. Each traversal task builds its own session, so the
/// engine is a value captured at launch instead of shared state.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SecretStore>,
    engine: Engine,
}

impl Session {
    pub fn new(store: Arc<dyn SecretStore>, engine: Engine) -> Self {
        Self { store, engine }
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// The same store configured for another engine.
    pub fn with_engine(&self, engine: Engine) -> Self {
        Self {
            store: Arc::clone(&self.store),
            engine,
        }
    }

    pub async fn list(&self, path: &str) -> Result<Option<Vec<String>>> {
        self.store.list(self.engine, path).await
    }

    pub async fn read(&self, path: &str) -> Result<Option<SecretData>> {
        self.store.read(self.engine, path).await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
