//! # Arbor Core
//!
//! Handle registry and lifecycle invalidation for the Arbor embedding layer.
//!
//! A host runtime that cannot hold native pointers addresses open
//! containers and their nodes through small integer handles. This crate
//! keeps those handles honest:
//!
//! - [`FileTable`] - fixed number of file slots
//! - [`NodeTable`] - growable node slots with a reverse index, reused
//!   lowest-first
//! - [`validate()`] - the (handle, node) check every node operation passes
//! - [`cascade`] - handle invalidation on file close and subtree delete
//! - [`StatusChannel`] - last-error slot with single-consumption reads
//! - [`Registry`] - the facade tying the tables to a storage [`Engine`]
//!
//! A handle is valid exactly as long as the object it was issued for has
//! not been destroyed, whichever path destroyed it.
//!
//! [`Engine`]: arbor_storage::Engine

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cascade;
mod config;
mod describe;
mod error;
mod file_table;
mod handle;
mod node_table;
mod registry;
mod status;
mod validate;

pub use config::{RegistryConfig, MAX_OPEN_FILES};
pub use describe::{format_size, NodeDescription, TypeLabel};
pub use error::{RegistryError, RegistryResult};
pub use file_table::{FileEntry, FileTable};
pub use handle::{FileHandle, Issued, NodeHandle, TableKind};
pub use node_table::{NodeSlot, NodeTable, MAX_NODE_HANDLES};
pub use registry::Registry;
pub use status::StatusChannel;
pub use validate::validate;

pub use arbor_storage::{FileRef, NodeRef, NodeSpec};
