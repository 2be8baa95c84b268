//! Folder tree.
//!
//! One node of the exported hierarchy: the leaf secrets stored directly
//! beneath a path plus the nested folders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{SecretData, SecretName, StorePath};

/// A node of the secret-store hierarchy.
///
/// Built by the tree builder and never mutated afterwards. A folder with
/// no secrets and no children is a valid result meaning "nothing here".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    path: StorePath,
    secrets: BTreeMap<SecretName, SecretData>,
    children: Vec<Folder>,
}

impl Folder {
    /// Assemble a folder from fully built parts.
    pub fn new(
        path: impl Into<StorePath>,
        secrets: BTreeMap<SecretName, SecretData>,
        children: Vec<Folder>,
    ) -> Self {
        Self {
            path: path.into(),
            secrets,
            children,
        }
    }

    /// An empty folder at `path`.
    pub fn empty(path: impl Into<StorePath>) -> Self {
        Self::new(path, BTreeMap::new(), Vec::new())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn secrets(&self) -> &BTreeMap<SecretName, SecretData> {
        &self.secrets
    }

    pub fn children(&self) -> &[Folder] {
        &self.children
    }

    /// True when the folder holds no secrets and no subfolders.
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty() && self.children.is_empty()
    }

    /// Number of leaf secrets in this folder and all descendants.
    pub fn secret_count(&self) -> usize {
        self.secrets.len()
            + self
                .children
                .iter()
                .map(Folder::secret_count)
                .sum::<usize>()
    }

    /// Look up a descendant by its full path.
    pub fn find(&self, path: &str) -> Option<&Folder> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }
}
