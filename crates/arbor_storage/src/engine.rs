//! Storage engine trait definition.

use crate::error::StorageResult;
use crate::ident::{FileRef, NodeRef};
use crate::kind::{NodeInfo, NodeKind, NodeSpec};
use serde_json::Value;
use std::path::Path;

/// The storage engine behind the handle registry.
///
/// The engine owns every container and node. Callers identify them by
/// opaque tokens; a token whose object was destroyed yields
/// [`crate::StorageError::UnknownNode`] or [`crate::StorageError::UnknownFile`].
///
/// # Invariants
///
/// - Every node belongs to exactly one open container
/// - Walking `parent` from any node ends at the container root
/// - `governing_file` is always exposed for a root node, but may be
///   withheld for nodes living inside a virtual folder
/// - Closing a container destroys all of its nodes
/// - Deleting a folder destroys its whole subtree
///
/// # Implementors
///
/// - [`crate::DocumentEngine`] - One checksummed JSON document per container
pub trait Engine {
    /// Creates a new, empty container at `path`, truncating any existing file.
    fn create(&mut self, path: &Path) -> StorageResult<FileRef>;

    /// Opens an existing container.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::Open`] with the engine diagnostics if the
    /// file cannot be read or fails validation.
    fn open(&mut self, path: &Path, read_only: bool) -> StorageResult<FileRef>;

    /// Writes pending changes and destroys the container and all its nodes.
    ///
    /// The container is destroyed even when the final write fails.
    fn close(&mut self, file: FileRef) -> StorageResult<()>;

    /// Writes pending changes to disk.
    fn sync(&mut self, file: FileRef) -> StorageResult<()>;

    /// Returns the size of the container file in bytes.
    fn file_size(&self, file: FileRef) -> StorageResult<u64>;

    /// Returns the number of unreclaimed fragments in the container.
    fn fragment_count(&self, file: FileRef) -> StorageResult<u64>;

    /// Rewrites the container without fragments.
    fn compact(&mut self, file: FileRef) -> StorageResult<()>;

    /// Returns the path the container was opened from.
    fn file_path(&self, file: FileRef) -> StorageResult<&Path>;

    /// Returns true if the container was opened read-only.
    fn is_read_only(&self, file: FileRef) -> StorageResult<bool>;

    /// Returns the root folder of a container.
    fn root(&self, file: FileRef) -> StorageResult<NodeRef>;

    /// Returns the folder holding `node`, or `None` for a root.
    fn parent(&self, node: NodeRef) -> StorageResult<Option<NodeRef>>;

    /// Returns the container of `node` when the engine exposes it directly.
    fn governing_file(&self, node: NodeRef) -> StorageResult<Option<FileRef>>;

    /// Returns the children of a folder, in insertion order.
    fn children(&self, node: NodeRef) -> StorageResult<Vec<NodeRef>>;

    /// Resolves a slash-separated path below `folder`.
    fn resolve_path(&self, folder: NodeRef, path: &str) -> StorageResult<Option<NodeRef>>;

    /// Returns true if `node` is a strict descendant of `ancestor`.
    fn contains(&self, ancestor: NodeRef, node: NodeRef) -> StorageResult<bool>;

    /// Deletes `node` and its subtree; a non-empty folder requires `force`.
    fn delete(&mut self, node: NodeRef, force: bool) -> StorageResult<()>;

    /// Adds a new child named `name` under `parent`.
    fn add_node(&mut self, parent: NodeRef, name: &str, spec: NodeSpec) -> StorageResult<NodeRef>;

    /// Returns the name of a node; the root's name is empty.
    fn name(&self, node: NodeRef) -> StorageResult<String>;

    /// Returns the slash-separated path of a node from its root.
    fn full_name(&self, node: NodeRef) -> StorageResult<String>;

    /// Renames a node.
    fn rename(&mut self, node: NodeRef, name: &str) -> StorageResult<()>;

    /// Returns the hidden flag of a node.
    fn is_hidden(&self, node: NodeRef) -> StorageResult<bool>;

    /// Sets the hidden flag of a node.
    fn set_hidden(&mut self, node: NodeRef, hidden: bool) -> StorageResult<()>;

    /// Returns an attribute value, if present.
    fn attribute(&self, node: NodeRef, name: &str) -> StorageResult<Option<Value>>;

    /// Sets an attribute value.
    fn set_attribute(&mut self, node: NodeRef, name: &str, value: Value) -> StorageResult<()>;

    /// Deletes an attribute; a missing attribute is an error.
    fn delete_attribute(&mut self, node: NodeRef, name: &str) -> StorageResult<()>;

    /// Returns the concrete kind of a node.
    fn kind(&self, node: NodeRef) -> StorageResult<NodeKind>;

    /// Returns the engine-side description of a node.
    fn info(&self, node: NodeRef) -> StorageResult<NodeInfo>;

    /// Returns true if the node carries the named attribute.
    fn has_attribute(&self, node: NodeRef, name: &str) -> StorageResult<bool> {
        Ok(self.attribute(node, name)?.is_some())
    }
}
