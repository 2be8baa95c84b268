//! Export results.

use serde::Serialize;

use crate::core::domain::Folder;
use crate::core::types::MountPath;

/// A mount whose traversal failed and is therefore absent from the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountFailure {
    pub mount: MountPath,
    pub reason: String,
}

/// Everything one export run produced.
///
/// `folders` holds one tree per successfully exported top-level path,
/// `failures` names the mounts that were skipped and why.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub folders: Vec<Folder>,
    pub failures: Vec<MountFailure>,
}

impl ExportReport {
    /// Report for a single exported tree.
    pub fn single(folder: Folder) -> Self {
        Self {
            folders: vec![folder],
            failures: Vec::new(),
        }
    }

    /// Total outcomes recorded, successful or not.
    pub fn outcomes(&self) -> usize {
        self.folders.len() + self.failures.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Order folders and failures by path so output is reproducible.
    pub fn sort(&mut self) {
        self.folders.sort_by(|a, b| a.path().cmp(b.path()));
        self.failures.sort_by(|a, b| a.mount.cmp(&b.mount));
    }

    /// Total leaf secrets across every exported tree.
    pub fn secret_count(&self) -> usize {
        self.folders.iter().map(Folder::secret_count).sum()
    }
}
