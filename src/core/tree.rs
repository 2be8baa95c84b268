//! Folder tree builder.
//!
//! Reads one subtree of the store into a [`Folder`]: folders (names ending
//! in `/`) are recursed into, leaves are read and attached to the parent's
//! secrets under their name. Children are visited in name order so the
//! resulting tree is deterministic.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use tracing::{debug, trace};

use crate::core::constants::{FOLDER_SUFFIX, MAX_DEPTH};
use crate::core::domain::Folder;
use crate::core::store::Session;
use crate::error::{Error, ExportError, Result};

type BoxedBuild<'a> = Pin<Box<dyn Future<Output = Result<Folder>> + Send + 'a>>;

/// Read the subtree at `path`.
///
/// # Errors
///
/// Returns `ExportError::NotFound` if nothing exists at `path`,
/// `ExportError::Traversal` if a list or read fails (including permission
/// denial), and `ExportError::DepthExceeded` past [`MAX_DEPTH`] levels.
pub async fn traverse(session: &Session, path: &str) -> Result<Folder> {
    let path = folder_path(path);
    match list(session, &path).await? {
        Some(children) => build(session, path, children, 0).await,
        None => Err(ExportError::NotFound(path).into()),
    }
}

/// Read a whole mount.
///
/// Same as [`traverse`], except that a mount with nothing to list yields
/// an empty folder: the mount exists, it just has no secrets yet.
pub async fn traverse_mount(session: &Session, mount: &str) -> Result<Folder> {
    let path = folder_path(mount);
    match list(session, &path).await? {
        Some(children) => build(session, path, children, 0).await,
        None => {
            debug!(mount = %path, "mount has no entries");
            Ok(Folder::empty(path))
        }
    }
}

/// Read the single secret at `path` as a folder named after its parent.
///
/// Returns `None` when no secret lives at `path`.
pub async fn read_leaf(session: &Session, path: &str) -> Result<Option<Folder>> {
    let path = path.trim_start_matches(FOLDER_SUFFIX);
    let Some((parent, name)) = path.rsplit_once(FOLDER_SUFFIX) else {
        return Ok(None);
    };
    if name.is_empty() {
        return Ok(None);
    }

    let data = session.read(path).await.map_err(|e| traversal(path, e))?;
    Ok(data.map(|data| {
        let secrets = BTreeMap::from([(name.to_string(), data)]);
        Folder::new(format!("{}{}", parent, FOLDER_SUFFIX), secrets, Vec::new())
    }))
}

fn folder_path(path: &str) -> String {
    let trimmed = path.trim_start_matches(FOLDER_SUFFIX);
    if trimmed.ends_with(FOLDER_SUFFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, FOLDER_SUFFIX)
    }
}

async fn list(session: &Session, path: &str) -> Result<Option<Vec<String>>> {
    session.list(path).await.map_err(|e| traversal(path, e))
}

fn traversal(path: &str, error: Error) -> Error {
    match error {
        Error::Store(source) => ExportError::Traversal {
            path: path.to_string(),
            source,
        }
        .into(),
        other => other,
    }
}

/// Assemble the folder at `path` from its already listed children.
///
/// Boxed because async recursion needs an indirection.
fn build<'a>(
    session: &'a Session,
    path: String,
    mut names: Vec<String>,
    depth: usize,
) -> BoxedBuild<'a> {
    Box::pin(async move {
        if depth >= MAX_DEPTH {
            return Err(ExportError::DepthExceeded {
                path,
                limit: MAX_DEPTH,
            }
            .into());
        }

        names.sort();
        names.dedup();
        trace!(path = %path, children = names.len(), depth, "building folder");

        let mut secrets = BTreeMap::new();
        let mut children = Vec::new();

        for name in names {
            let child_path = format!("{}{}", path, name);
            if name.ends_with(FOLDER_SUFFIX) {
                // Vanished between the parent listing and now.
                let grandchildren = list(session, &child_path).await?.unwrap_or_default();
                children.push(build(session, child_path, grandchildren, depth + 1).await?);
            } else {
                match session.read(&child_path).await.map_err(|e| traversal(&child_path, e))? {
                    Some(data) => {
                        secrets.insert(name, data);
                    }
                    None => debug!(path = %child_path, "listed secret has no payload, skipping"),
                }
            }
        }

        Ok(Folder::new(path, secrets, children))
    })
}
