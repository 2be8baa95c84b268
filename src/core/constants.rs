//! Constants used throughout hoard.
//!
//! Centralizes magic strings and configuration values.

/// Project-local configuration file name.
pub const CONFIG_FILE: &str = ".hoard.toml";

/// Directory under the platform config dir holding the user config.
pub const CONFIG_DIR: &str = "hoard";

/// User configuration file name inside [`CONFIG_DIR`].
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Environment variable controlling the log filter.
pub const LOG_ENV: &str = "HOARD_LOG";

/// Target path that selects the all-mounts export.
pub const ROOT_PATH: &str = "/";

/// Separator marking a listed child as a folder.
pub const FOLDER_SUFFIX: char = '/';

/// Maximum folder nesting followed by the tree builder.
pub const MAX_DEPTH: usize = 64;

/// Default file name for `hoard keygen`.
pub const IDENTITY_FILE: &str = "hoard-identity.txt";
