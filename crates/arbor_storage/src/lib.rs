//! # Arbor Storage
//!
//! Storage engine interface and the document container engine for Arbor.
//!
//! A container is a single file holding a tree of named nodes: folders,
//! virtual folders linking other containers, labels, opaque streams and
//! typed arrays. The handle registry in `arbor_core` never touches nodes
//! directly; it goes through the [`Engine`] trait and only compares the
//! identity tokens ([`NodeRef`], [`FileRef`]) the engine hands out.
//!
//! ## Available Engines
//!
//! - [`DocumentEngine`] - In-memory node tree persisted as a checksummed
//!   JSON document, one file per container
//!
//! ## Example
//!
//! ```rust,no_run
//! use arbor_storage::{DocumentEngine, Engine, NodeSpec};
//! use std::path::Path;
//!
//! let mut engine = DocumentEngine::new();
//! let file = engine.create(Path::new("demo.arbor")).unwrap();
//! let root = engine.root(file).unwrap();
//! let spec = NodeSpec::parse("int32", &[100]).unwrap();
//! engine.add_node(root, "genotype", spec).unwrap();
//! engine.close(file).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod engine;
mod error;
mod ident;
mod image;
mod kind;

pub use document::DocumentEngine;
pub use engine::Engine;
pub use error::{StorageError, StorageResult};
pub use ident::{FileRef, NodeRef};
pub use image::FORMAT_VERSION;
pub use kind::{ArrayFlavor, Coder, ElementType, NodeInfo, NodeKind, NodeSpec, Payload, ValueCategory};

/// Attribute marking a node as invisible to default listings.
pub const ATTR_INVISIBLE: &str = "R.invisible";
/// Attribute marking an integer array as logical.
pub const ATTR_LOGICAL: &str = "R.logical";
/// Attribute holding the class name of an array.
pub const ATTR_CLASS: &str = "R.class";
/// Attribute holding the levels of a factor array.
pub const ATTR_LEVELS: &str = "R.levels";
