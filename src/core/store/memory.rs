//! In-memory secret store.
//!
//! Holds a fixed tree of secrets and answers the [`SecretStore`] contract
//! the way Vault would, including engine checks per mount. Supports
//! failure injection and call counting so the export pipeline can be
//! exercised without a server.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use super::SecretStore;
use crate::core::constants::FOLDER_SUFFIX;
use crate::core::domain::{find_mount, normalize_mount, Engine};
use crate::core::types::{MountPath, SecretData};
use crate::error::{Result, StoreError};

/// An in-process [`SecretStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    mounts: BTreeMap<MountPath, Engine>,
    secrets: BTreeMap<String, SecretData>,
    denied: BTreeSet<String>,
    delays: BTreeMap<MountPath, Duration>,
    discovery_error: Option<String>,
    calls: AtomicUsize,
    log: Mutex<Vec<(Engine, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mount.
    pub fn mount(mut self, path: &str, engine: Engine) -> Self {
        self.mounts.insert(normalize_mount(path), engine);
        self
    }

    /// Store a leaf secret at a full path (`mount/dir/name`).
    pub fn secret(mut self, path: &str, pairs: &[(&str, &str)]) -> Self {
        let data = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        self.secrets.insert(path.to_string(), data);
        self
    }

    /// Store a leaf secret with an arbitrary payload.
    pub fn secret_data(mut self, path: &str, data: SecretData) -> Self {
        self.secrets.insert(path.to_string(), data);
        self
    }

    /// Deny every list and read at or below `prefix`.
    pub fn deny(mut self, prefix: &str) -> Self {
        self.denied.insert(prefix.to_string());
        self
    }

    /// Delay every call under `mount` by `delay`.
    pub fn delay(mut self, mount: &str, delay: Duration) -> Self {
        self.delays.insert(normalize_mount(mount), delay);
        self
    }

    /// Make mount discovery fail with `reason`.
    pub fn fail_discovery(mut self, reason: &str) -> Self {
        self.discovery_error = Some(reason.to_string());
        self
    }

    /// Number of contract calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every list/read call as `(engine, path)`, in arrival order.
    pub fn call_log(&self) -> Vec<(Engine, String)> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn mount_of(&self, path: &str) -> Option<(&MountPath, Engine)> {
        find_mount(&self.mounts, path)
    }

    /// Shared bookkeeping and checks for list and read.
    async fn enter(&self, engine: Engine, path: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.log.lock() {
            log.push((engine, path.to_string()));
        }

        let (mount, expected) = self
            .mount_of(path)
            .ok_or_else(|| StoreError::InvalidPath(format!("no mount for {}", path)))?;

        if let Some(delay) = self.delays.get(mount) {
            tokio::time::sleep(*delay).await;
        }

        if self.denied.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return Err(StoreError::AccessDenied(path.to_string()).into());
        }

        if engine != expected {
            return Err(StoreError::InvalidResponse {
                url: path.to_string(),
                reason: format!("{} mount accessed as {}", expected, engine),
            }
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn list_mounts(&self) -> Result<BTreeMap<MountPath, Engine>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.discovery_error {
            return Err(StoreError::Request {
                url: "sys/mounts".to_string(),
                reason: reason.clone(),
            }
            .into());
        }
        Ok(self.mounts.clone())
    }

    async fn list(&self, engine: Engine, path: &str) -> Result<Option<Vec<String>>> {
        self.enter(engine, path).await?;

        let prefix = normalize_mount(path);
        let children: BTreeSet<String> = self
            .secrets
            .keys()
            .filter_map(|key| key.strip_prefix(prefix.as_str()))
            .filter(|rest| !rest.is_empty())
            .map(|rest| match rest.split_once(FOLDER_SUFFIX) {
                Some((dir, _)) => format!("{}{}", dir, FOLDER_SUFFIX),
                None => rest.to_string(),
            })
            .collect();

        trace!(path, children = children.len(), "memory list");

        // Vault answers 404 for an empty listing, mount roots included.
        if children.is_empty() {
            return Ok(None);
        }
        Ok(Some(children.into_iter().collect()))
    }

    async fn read(&self, engine: Engine, path: &str) -> Result<Option<SecretData>> {
        self.enter(engine, path).await?;
        Ok(self.secrets.get(path).cloned())
    }
}
