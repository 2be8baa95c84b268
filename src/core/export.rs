//! Export pipeline.
//!
//! Two flows produce an [`ExportReport`]:
//!
//! - **single path**: one traversal, no concurrency ([`export_path`]). An
//!   empty mount root exports as an empty folder, and a path naming one
//!   secret exports as its parent folder holding just that secret.
//! - **all mounts**: discover mounts, traverse each on its own task, and
//!   collect the results through one aggregator task ([`export_all`])
//!
//! In the all-mounts flow the aggregator is the only writer of the
//! report. Worker tasks hand it exactly one outcome each over a channel.
//! The report becomes visible to the caller only once the aggregator task
//! itself has returned, i.e. after every delivered outcome was drained.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::core::constants::{FOLDER_SUFFIX, ROOT_PATH};
use crate::core::domain::{
    find_mount, normalize_mount, Engine, ExportReport, Folder, Mount, MountFailure,
};
use crate::core::format::{self, Format};
use crate::core::store::{SecretStore, Session};
use crate::core::tree;
use crate::error::{Error, ExportError, Result};

/// What one mount task delivers to the aggregator.
#[derive(Debug)]
enum MountOutcome {
    Exported(Folder),
    Failed(MountFailure),
}

/// Export every KV mount concurrently.
///
/// A mount whose traversal fails is left out of `folders` and recorded in
/// `failures`; it never affects the other mounts. A mount table with no
/// KV mounts yields an empty report.
///
/// # Errors
///
/// Returns `ExportError::Discovery` if the mount table cannot be read.
pub async fn export_all(store: Arc<dyn SecretStore>) -> Result<ExportReport> {
    let mounts = store.list_mounts().await.map_err(|e| match e {
        Error::Store(source) => ExportError::Discovery(source).into(),
        other => other,
    })?;
    if mounts.is_empty() {
        warn!("no kv mounts visible to this token, nothing to export");
        return Ok(ExportReport::default());
    }

    let launched = mounts.len();
    info!(mounts = launched, "exporting all mounts");

    let (tx, mut rx) = mpsc::channel::<MountOutcome>(launched);

    let aggregator = tokio::spawn(async move {
        let mut report = ExportReport::default();
        while let Some(outcome) = rx.recv().await {
            match outcome {
                MountOutcome::Exported(folder) => report.folders.push(folder),
                MountOutcome::Failed(failure) => report.failures.push(failure),
            }
        }
        report
    });

    let workers: Vec<_> = mounts
        .into_iter()
        .map(|(path, engine)| {
            let mount = Mount::new(path, engine);
            let session = Session::new(Arc::clone(&store), mount.engine());
            let tx = tx.clone();
            let name = mount.path().to_string();
            let handle = tokio::spawn(async move {
                let outcome = export_mount(&session, &mount).await;
                // The receiver outlives every sender, so this cannot fail.
                let _ = tx.send(outcome).await;
            });
            (name, handle)
        })
        .collect();

    for (mount, handle) in workers {
        if let Err(e) = handle.await {
            let failure = MountFailure {
                mount,
                reason: format!("export task aborted: {}", e),
            };
            let _ = tx.send(MountOutcome::Failed(failure)).await;
        }
    }
    drop(tx);

    let mut report = aggregator
        .await
        .map_err(|e| ExportError::Aggregation(e.to_string()))?;

    debug!(
        launched,
        received = report.outcomes(),
        exported = report.folders.len(),
        failed = report.failures.len(),
        "aggregation complete"
    );
    debug_assert_eq!(report.outcomes(), launched);

    for failure in &report.failures {
        warn!(mount = %failure.mount, error = %failure.reason, "mount skipped");
    }

    report.sort();
    Ok(report)
}

async fn export_mount(session: &Session, mount: &Mount) -> MountOutcome {
    debug!(mount = %mount.path(), engine = %mount.engine(), "mount export started");
    match tree::traverse_mount(session, mount.path()).await {
        Ok(folder) => {
            debug!(
                mount = %mount.path(),
                secrets = folder.secret_count(),
                "mount export finished"
            );
            MountOutcome::Exported(folder)
        }
        Err(e) => MountOutcome::Failed(MountFailure {
            mount: mount.path().to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Export the subtree at a single path.
///
/// When nothing can be listed at `path`, two cases still succeed: a mount
/// root of the same engine with no secrets yet (an empty folder), and a
/// path without a trailing `/` that names one secret.
///
/// # Errors
///
/// Propagates every traversal error, including `ExportError::NotFound`.
pub async fn export_path(
    store: Arc<dyn SecretStore>,
    path: &str,
    engine: Engine,
) -> Result<ExportReport> {
    info!(path, engine = %engine, "exporting path");
    let session = Session::new(Arc::clone(&store), engine);
    let missing = match tree::traverse(&session, path).await {
        Ok(folder) => return Ok(ExportReport::single(folder)),
        Err(Error::Export(ExportError::NotFound(missing))) => missing,
        Err(e) => return Err(e),
    };

    if is_mount_root(store.as_ref(), path, engine).await {
        debug!(mount = %missing, "mount has no entries");
        return Ok(ExportReport::single(Folder::empty(missing)));
    }
    if !path.ends_with(FOLDER_SUFFIX) {
        if let Some(folder) = tree::read_leaf(&session, path).await? {
            debug!(path, "path names a single secret");
            return Ok(ExportReport::single(folder));
        }
    }
    Err(ExportError::NotFound(missing).into())
}

async fn is_mount_root(store: &dyn SecretStore, path: &str, engine: Engine) -> bool {
    match store.list_mounts().await {
        Ok(mounts) => mounts.get(&normalize_mount(path)) == Some(&engine),
        Err(_) => false,
    }
}

/// Pick the engine for a single-path export.
///
/// An explicit engine always wins. Otherwise the path's mount is looked
/// up in the mount table; tokens that cannot read the table, or paths on
/// unknown mounts, fall back to kv2.
pub async fn resolve_engine(
    store: &dyn SecretStore,
    path: &str,
    explicit: Option<Engine>,
) -> Engine {
    if let Some(engine) = explicit {
        return engine;
    }

    match store.list_mounts().await {
        Ok(mounts) => match find_mount(&mounts, path) {
            Some((_, engine)) => engine,
            None => {
                debug!(path, "path is on no listed mount, assuming kv2");
                Engine::default()
            }
        },
        Err(e) => {
            debug!(error = %e, "mount discovery unavailable, assuming kv2");
            Engine::default()
        }
    }
}

/// Export `target`: `/` selects every mount, anything else one path.
pub async fn export(
    store: Arc<dyn SecretStore>,
    target: &str,
    engine: Option<Engine>,
) -> Result<ExportReport> {
    if is_root(target) {
        return export_all(store).await;
    }
    let engine = resolve_engine(store.as_ref(), target, engine).await;
    export_path(store, target, engine).await
}

fn is_root(target: &str) -> bool {
    target.is_empty() || target == ROOT_PATH
}

/// Full pipeline: validate the format, export, serialize.
///
/// The format is checked before the store is touched.
///
/// # Errors
///
/// Returns `FormatError::Unsupported` for an unknown format, then any
/// export or serialization error.
pub async fn export_document(
    store: Arc<dyn SecretStore>,
    target: &str,
    format: &str,
    engine: Option<Engine>,
) -> Result<(Vec<u8>, ExportReport)> {
    let format: Format = format.parse()?;
    let report = export(store, target, engine).await?;
    let document = format::render(&report.folders, format)?;
    Ok((document, report))
}
