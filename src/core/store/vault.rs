//! HashiCorp Vault store client.
//!
//! Speaks the Vault HTTP API for KV v1 and KV v2 mounts:
//!
//! | operation | kv1                         | kv2                                  |
//! |-----------|-----------------------------|--------------------------------------|
//! | list      | `GET /v1/{mount}{rest}?list=true` | `GET /v1/{mount}metadata/{rest}?list=true` |
//! | read      | `GET /v1/{mount}{rest}`     | `GET /v1/{mount}data/{rest}`         |
//!
//! Mounts come from `GET /v1/sys/mounts`. A 404 means "nothing here" and
//! is reported as `None`; a 403 is `StoreError::AccessDenied`.
//!
//! Mounts may span several segments (`team/app/`), so a path is split on
//! the longest mount in the table. The table is fetched once per client.
//! Without it, the first segment is taken as the mount.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::SecretStore;
use crate::core::constants::FOLDER_SUFFIX;
use crate::core::domain::{find_mount, normalize_mount, Engine};
use crate::core::types::{MountPath, SecretData};
use crate::error::{Result, StoreError};

const TOKEN_HEADER: &str = "X-Vault-Token";
const NAMESPACE_HEADER: &str = "X-Vault-Namespace";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`VaultClient`].
#[derive(Clone)]
pub struct VaultSettings {
    pub address: String,
    pub token: Zeroizing<String>,
    pub namespace: Option<String>,
    pub insecure: bool,
    pub timeout: Duration,
}

impl VaultSettings {
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: Zeroizing::new(token.into()),
            namespace: None,
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for VaultSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSettings")
            .field("address", &self.address)
            .field("token", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// [`SecretStore`] backed by a Vault server.
#[derive(Debug)]
pub struct VaultClient {
    http: Client,
    settings: VaultSettings,
    mounts: OnceCell<BTreeMap<MountPath, Engine>>,
}

impl VaultClient {
    /// Build a client from settings.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Client` if the HTTP client cannot be built.
    pub fn new(settings: VaultSettings) -> Result<Self> {
        let http = Client::builder()
            .danger_accept_invalid_certs(settings.insecure)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| StoreError::Client(e.to_string()))?;

        debug!(
            address = %settings.address,
            namespace = ?settings.namespace,
            insecure = settings.insecure,
            "vault client ready"
        );

        Ok(Self {
            http,
            settings,
            mounts: OnceCell::new(),
        })
    }

    fn url(&self, api_path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.settings.address.trim_end_matches('/'),
            api_path.trim_start_matches('/')
        )
    }

    /// GET an API path and return the JSON body, or `None` on 404.
    async fn get(&self, api_path: &str, list: bool) -> Result<Option<Value>> {
        let url = self.url(api_path);
        trace!(url = %url, list, "vault request");

        let mut request = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, self.settings.token.as_str());
        if let Some(namespace) = &self.settings.namespace {
            request = request.header(NAMESPACE_HEADER, namespace);
        }
        if list {
            request = request.query(&[("list", "true")]);
        }

        let response = request.send().await.map_err(|e| StoreError::Request {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::FORBIDDEN => {
                return Err(StoreError::AccessDenied(api_path.to_string()).into())
            }
            status if !status.is_success() => {
                return Err(StoreError::Status {
                    url,
                    status: status.as_u16(),
                }
                .into())
            }
            _ => {}
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::InvalidResponse {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Some(body))
    }

    async fn fetch_mounts(&self) -> Result<BTreeMap<MountPath, Engine>> {
        let body = self
            .get("sys/mounts", false)
            .await?
            .ok_or_else(|| invalid(&self.url("sys/mounts"), "mount table not found"))?;
        Ok(parse_mounts(&body))
    }

    async fn mount_table(&self) -> &BTreeMap<MountPath, Engine> {
        self.mounts
            .get_or_init(|| async {
                self.fetch_mounts().await.unwrap_or_else(|e| {
                    debug!(error = %e, "mount table unavailable, splitting on first segment");
                    BTreeMap::new()
                })
            })
            .await
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn list_mounts(&self) -> Result<BTreeMap<MountPath, Engine>> {
        let mounts = self.fetch_mounts().await?;
        debug!(mounts = mounts.len(), "discovered kv mounts");
        let _ = self.mounts.set(mounts.clone());
        Ok(mounts)
    }

    async fn list(&self, engine: Engine, path: &str) -> Result<Option<Vec<String>>> {
        let (mount, rest) = split_in(self.mount_table().await, path);
        let api_path = list_path(engine, &mount, &rest);
        match self.get(&api_path, true).await? {
            Some(body) => parse_keys(&body)
                .map(Some)
                .ok_or_else(|| invalid(&self.url(&api_path), "missing data.keys")),
            None => Ok(None),
        }
    }

    async fn read(&self, engine: Engine, path: &str) -> Result<Option<SecretData>> {
        let (mount, rest) = split_in(self.mount_table().await, path);
        let api_path = read_path(engine, &mount, &rest);
        match self.get(&api_path, false).await? {
            Some(body) => Ok(parse_payload(engine, &body)),
            None => Ok(None),
        }
    }
}

fn invalid(url: &str, reason: &str) -> crate::error::Error {
    StoreError::InvalidResponse {
        url: url.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Split a store path into its mount (first segment) and the remainder.
///
/// `secret/app/db` → (`secret/`, `app/db`); `secret` → (`secret/`, ``).
pub fn split_mount(path: &str) -> (MountPath, String) {
    let trimmed = path.trim_start_matches(FOLDER_SUFFIX);
    match trimmed.split_once(FOLDER_SUFFIX) {
        Some((mount, rest)) => (normalize_mount(mount), rest.to_string()),
        None => (normalize_mount(trimmed), String::new()),
    }
}

/// Split a store path on the longest mount in `mounts`, falling back to
/// [`split_mount`] when none matches.
fn split_in(mounts: &BTreeMap<MountPath, Engine>, path: &str) -> (MountPath, String) {
    let Some((mount, _)) = find_mount(mounts, path) else {
        return split_mount(path);
    };
    let rest = path
        .trim_start_matches(FOLDER_SUFFIX)
        .strip_prefix(mount.as_str())
        .unwrap_or_default();
    (mount.clone(), rest.to_string())
}

fn list_path(engine: Engine, mount: &str, rest: &str) -> String {
    match engine {
        Engine::Kv1 => format!("{}{}", mount, rest),
        Engine::Kv2 => format!("{}metadata/{}", mount, rest),
    }
}

fn read_path(engine: Engine, mount: &str, rest: &str) -> String {
    match engine {
        Engine::Kv1 => format!("{}{}", mount, rest),
        Engine::Kv2 => format!("{}data/{}", mount, rest),
    }
}

/// Extract KV mounts from a `sys/mounts` response.
///
/// Newer servers nest the table under `data`; older ones return it at
/// the top level next to request metadata.
fn parse_mounts(body: &Value) -> BTreeMap<MountPath, Engine> {
    let table = body.get("data").filter(|d| d.is_object()).unwrap_or(body);
    let Some(entries) = table.as_object() else {
        return BTreeMap::new();
    };

    entries
        .iter()
        .filter_map(|(path, meta)| {
            let kind = meta.get("type")?.as_str()?;
            let version = meta
                .get("options")
                .and_then(|o| o.get("version"))
                .and_then(Value::as_str);
            Engine::from_mount_metadata(kind, version).map(|engine| (path.clone(), engine))
        })
        .collect()
}

fn parse_keys(body: &Value) -> Option<Vec<String>> {
    let keys = body.get("data")?.get("keys")?.as_array()?;
    Some(
        keys.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

/// Extract the key/value payload; kv2 nests it one level deeper.
///
/// A kv2 secret whose latest version is deleted has `data.data: null`
/// and is treated as absent.
fn parse_payload(engine: Engine, body: &Value) -> Option<SecretData> {
    let data = body.get("data")?;
    let data = match engine {
        Engine::Kv1 => data,
        Engine::Kv2 => data.get("data")?,
    };
    let object = data.as_object()?;
    Some(object.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}
