//! Core library components.
//!
//! This module contains the export pipeline: store access, tree building,
//! concurrent mount export, serialization and envelope encryption.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod export;
pub mod format;
pub mod store;
pub mod tree;
pub mod types;
