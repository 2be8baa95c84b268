//! Fake Vault HTTP server.
//!
//! Serves the slice of the Vault API hoard uses (`sys/mounts`, kv1 and
//! kv2 list/read) from canned data, on a random local port, from its own
//! thread so both async library tests and binary tests can use it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::{json, Value};

use hoard::core::store::{VaultClient, VaultSettings};

use super::TEST_TOKEN;

#[derive(Debug, Default)]
struct Routes {
    mounts: BTreeMap<String, Value>,
    lists: BTreeMap<String, BTreeSet<String>>,
    reads: BTreeMap<String, Value>,
    denied: Vec<String>,
    namespace: Option<String>,
}

/// A running fake Vault.
#[derive(Debug, Clone)]
pub struct FakeVault {
    /// Base address, e.g. `http://127.0.0.1:41234`
    pub address: String,
    /// Token the server accepts
    pub token: String,
    /// Namespace the server requires, if any
    pub namespace: Option<String>,
}

impl FakeVault {
    pub fn builder() -> FakeVaultBuilder {
        FakeVaultBuilder::default()
    }

    /// Settings pointing at this server.
    pub fn settings(&self) -> VaultSettings {
        let mut settings = VaultSettings::new(self.address.clone(), self.token.clone());
        settings.namespace = self.namespace.clone();
        settings
    }

    /// A client connected to this server.
    pub fn client(&self) -> VaultClient {
        VaultClient::new(self.settings()).expect("failed to build vault client")
    }
}

/// Describes the data a [`FakeVault`] serves.
#[derive(Debug, Default)]
pub struct FakeVaultBuilder {
    routes: Routes,
}

impl FakeVaultBuilder {
    pub fn kv2_mount(mut self, mount: &str) -> Self {
        self.routes.mounts.insert(
            mount.to_string(),
            json!({"type": "kv", "options": {"version": "2"}}),
        );
        self
    }

    pub fn kv1_mount(mut self, mount: &str) -> Self {
        self.routes.mounts.insert(
            mount.to_string(),
            json!({"type": "kv", "options": {"version": "1"}}),
        );
        self
    }

    /// A mount of a non-KV type (`pki`, `transit`, `generic`, ...).
    pub fn mount_type(mut self, mount: &str, kind: &str) -> Self {
        self.routes
            .mounts
            .insert(mount.to_string(), json!({"type": kind, "options": null}));
        self
    }

    /// A kv2 secret at `rest` below `mount`.
    pub fn kv2_secret(mut self, mount: &str, rest: &str, data: Value) -> Self {
        self.index(&format!("{}metadata/", mount), rest);
        self.routes.reads.insert(
            format!("{}data/{}", mount, rest),
            json!({"data": {"data": data, "metadata": {"version": 1}}}),
        );
        self
    }

    /// A kv2 secret whose latest version is deleted (`data.data: null`).
    pub fn kv2_deleted(mut self, mount: &str, rest: &str) -> Self {
        self.index(&format!("{}metadata/", mount), rest);
        self.routes.reads.insert(
            format!("{}data/{}", mount, rest),
            json!({"data": {"data": null, "metadata": {"version": 2}}}),
        );
        self
    }

    /// A kv1 secret at `rest` below `mount`.
    pub fn kv1_secret(mut self, mount: &str, rest: &str, data: Value) -> Self {
        self.index(mount, rest);
        self.routes
            .reads
            .insert(format!("{}{}", mount, rest), json!({ "data": data }));
        self
    }

    /// Answer 403 for every API path starting with `prefix`.
    pub fn deny(mut self, prefix: &str) -> Self {
        self.routes.denied.push(prefix.to_string());
        self
    }

    /// Require `X-Vault-Namespace` to match; other requests see nothing.
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.routes.namespace = Some(namespace.to_string());
        self
    }

    /// Register every listing level leading to `rest`.
    fn index(&mut self, list_root: &str, rest: &str) {
        let segments: Vec<&str> = rest.split('/').collect();
        let mut prefix = list_root.to_string();
        for (i, segment) in segments.iter().enumerate() {
            let name = if i + 1 == segments.len() {
                segment.to_string()
            } else {
                format!("{}/", segment)
            };
            self.routes
                .lists
                .entry(prefix.clone())
                .or_default()
                .insert(name.clone());
            prefix.push_str(&name);
        }
    }

    /// Start serving on a random local port.
    pub fn start(self) -> FakeVault {
        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind fake vault");
        listener
            .set_nonblocking(true)
            .expect("failed to set nonblocking");
        let address = format!(
            "http://{}",
            listener.local_addr().expect("failed to read local addr")
        );
        let namespace = self.routes.namespace.clone();

        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::new(self.routes));

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build fake vault runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)
                    .expect("failed to adopt listener");
                let _ = axum::serve(listener, app).await;
            });
        });

        FakeVault {
            address,
            token: TEST_TOKEN.to_string(),
            namespace,
        }
    }
}

fn reply(status: StatusCode, body: Value) -> (StatusCode, Json<Value>) {
    (status, Json(body))
}

fn not_found() -> (StatusCode, Json<Value>) {
    reply(StatusCode::NOT_FOUND, json!({"errors": []}))
}

async fn handle(
    State(routes): State<Arc<Routes>>,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if header("x-vault-token") != Some(TEST_TOKEN) {
        return reply(
            StatusCode::FORBIDDEN,
            json!({"errors": ["permission denied"]}),
        );
    }
    if let Some(namespace) = &routes.namespace {
        if header("x-vault-namespace") != Some(namespace.as_str()) {
            return not_found();
        }
    }

    let Some(path) = uri.path().strip_prefix("/v1/") else {
        return not_found();
    };
    if routes.denied.iter().any(|p| path.starts_with(p.as_str())) {
        return reply(
            StatusCode::FORBIDDEN,
            json!({"errors": ["1 error occurred:\n\t* permission denied\n\n"]}),
        );
    }

    if path == "sys/mounts" {
        return reply(
            StatusCode::OK,
            json!({"request_id": "fake", "data": routes.mounts}),
        );
    }

    let list = uri
        .query()
        .is_some_and(|q| q.split('&').any(|pair| pair == "list=true"));
    if list {
        match routes.lists.get(path) {
            Some(keys) => reply(StatusCode::OK, json!({"data": {"keys": keys}})),
            None => not_found(),
        }
    } else {
        match routes.reads.get(path) {
            Some(body) => reply(StatusCode::OK, body.clone()),
            None => not_found(),
        }
    }
}
