//! Domain types.

mod folder;
mod mount;
mod report;

pub use folder::Folder;
pub use mount::{find_mount, normalize_mount, Engine, Mount};
pub use report::{ExportReport, MountFailure};
