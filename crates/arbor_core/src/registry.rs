//! The handle registry facade.

use crate::cascade;
use crate::config::RegistryConfig;
use crate::describe::{self, NodeDescription};
use crate::error::{RegistryError, RegistryResult};
use crate::file_table::{FileEntry, FileTable};
use crate::handle::{FileHandle, Issued, NodeHandle};
use crate::node_table::{NodeSlot, NodeTable};
use crate::validate::validate;
use arbor_storage::{Engine, FileRef, NodeRef, NodeSpec};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Stable integer handles over the files and nodes of a storage engine.
///
/// Every node operation takes the handle together with the [`NodeRef`] the
/// caller last received for it, and fails unless the pair still matches.
/// Handles are invalidated whenever the registry destroys their object:
/// closing a file drops every handle into it, deleting a folder drops the
/// handles of its whole subtree.
///
/// The registry owns the engine. Objects must only be destroyed through
/// the registry, otherwise handles would outlive their objects.
///
/// # Example
///
/// ```rust,no_run
/// use arbor_core::{Registry, RegistryConfig};
/// use arbor_storage::DocumentEngine;
/// use std::path::Path;
///
/// let mut registry = Registry::new(DocumentEngine::new(), RegistryConfig::default());
/// let file = registry.open_file(Path::new("cohort.arbor"), true, false).unwrap();
/// let root = registry.root(file).unwrap();
/// for name in registry.list_names(root.handle, root.node, false).unwrap() {
///     println!("{name}");
/// }
/// registry.shutdown().unwrap();
/// ```
#[derive(Debug)]
pub struct Registry<E: Engine> {
    engine: E,
    config: RegistryConfig,
    files: FileTable,
    nodes: NodeTable,
    closed: bool,
}

impl<E: Engine> Registry<E> {
    /// Creates a registry over `engine` with empty tables.
    pub fn new(engine: E, config: RegistryConfig) -> Self {
        Self {
            files: FileTable::new(config.max_files),
            nodes: NodeTable::with_capacity(config.node_capacity),
            engine,
            config,
            closed: false,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns the storage engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the storage engine for engine-specific calls.
    ///
    /// Nothing may be closed or deleted through it.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Returns true once [`Registry::shutdown`] has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the number of registered node handles.
    pub fn live_handles(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of node slots, occupied or not.
    pub fn node_bounds(&self) -> usize {
        self.nodes.bounds()
    }

    /// Returns the number of open files.
    pub fn live_files(&self) -> usize {
        self.files.len()
    }

    /// Verifies the node table invariants.
    pub fn check_consistency(&self) -> RegistryResult<()> {
        self.nodes.check_consistency()
    }

    fn ensure_open(&self) -> RegistryResult<()> {
        if self.closed {
            return Err(RegistryError::Closed);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------

    /// Creates a new container and returns its file handle.
    ///
    /// Without `allow_duplicate`, a path already open in another slot is
    /// refused.
    pub fn create_file(&mut self, path: &Path, allow_duplicate: bool) -> RegistryResult<FileHandle> {
        let (handle, key) = self.admit(path, allow_duplicate)?;
        let file = self.engine.create(path)?;
        self.install(handle, file, key, false)
    }

    /// Opens an existing container and returns its file handle.
    pub fn open_file(
        &mut self,
        path: &Path,
        read_only: bool,
        allow_duplicate: bool,
    ) -> RegistryResult<FileHandle> {
        let (handle, key) = self.admit(path, allow_duplicate)?;
        let file = self.engine.open(path, read_only)?;
        self.install(handle, file, key, read_only)
    }

    /// Picks a slot before any container exists, so a full table or a
    /// duplicate path fails without touching the engine.
    fn admit(&self, path: &Path, allow_duplicate: bool) -> RegistryResult<(FileHandle, PathBuf)> {
        self.ensure_open()?;
        let handle = self.files.allocate()?;
        let key = canonical_path(path);
        if !allow_duplicate && self.files.find_path(&key).is_some() {
            return Err(RegistryError::AlreadyOpen {
                path: path.display().to_string(),
            });
        }
        Ok((handle, key))
    }

    fn install(
        &mut self,
        handle: FileHandle,
        file: FileRef,
        path: PathBuf,
        read_only: bool,
    ) -> RegistryResult<FileHandle> {
        let entry = FileEntry {
            file,
            path,
            read_only,
        };
        if let Err(err) = self.files.populate(handle, entry) {
            if let Err(close_err) = self.engine.close(file) {
                warn!(%file, error = %close_err, "failed to close unregistered container");
            }
            return Err(err);
        }
        info!(%handle, %file, read_only, "file registered");
        Ok(handle)
    }

    /// Closes a file, invalidating every node handle into it first.
    ///
    /// The slot is released even when the engine reports a failure while
    /// writing the container out.
    pub fn close_file(&mut self, handle: FileHandle) -> RegistryResult<()> {
        self.ensure_open()?;
        self.close_slot(handle)
    }

    fn close_slot(&mut self, handle: FileHandle) -> RegistryResult<()> {
        let file = self.files.resolve(handle)?.file;
        let invalidated = cascade::close_cascade(&mut self.nodes, file);
        let result = self.engine.close(file);
        self.files.release(handle);
        info!(%handle, %file, invalidated, "file closed");
        result.map_err(RegistryError::from)
    }

    /// Writes pending changes of a file to disk.
    pub fn sync_file(&mut self, handle: FileHandle) -> RegistryResult<()> {
        let file = self.writable_file(handle)?;
        self.engine.sync(file)?;
        Ok(())
    }

    /// Returns the size of a file in bytes.
    pub fn file_size(&self, handle: FileHandle) -> RegistryResult<u64> {
        self.ensure_open()?;
        Ok(self.engine.file_size(self.files.resolve(handle)?.file)?)
    }

    /// Returns the number of unreclaimed fragments in a file.
    pub fn fragment_count(&self, handle: FileHandle) -> RegistryResult<u64> {
        self.ensure_open()?;
        Ok(self.engine.fragment_count(self.files.resolve(handle)?.file)?)
    }

    /// Rewrites a file without fragments.
    pub fn compact_file(&mut self, handle: FileHandle) -> RegistryResult<()> {
        let file = self.writable_file(handle)?;
        self.engine.compact(file)?;
        Ok(())
    }

    /// Returns the path a file was opened from.
    pub fn file_path(&self, handle: FileHandle) -> RegistryResult<&Path> {
        self.ensure_open()?;
        Ok(self.engine.file_path(self.files.resolve(handle)?.file)?)
    }

    fn writable_file(&self, handle: FileHandle) -> RegistryResult<FileRef> {
        self.ensure_open()?;
        let entry = self.files.resolve(handle)?;
        if entry.read_only {
            return Err(RegistryError::ReadOnlyViolation);
        }
        Ok(entry.file)
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Returns the handle of a node, registering it if needed.
    fn issue(&mut self, node: NodeRef) -> RegistryResult<Issued> {
        let owner = match self.nodes.find(node).and_then(|handle| self.nodes.entry(handle)) {
            Some(slot) => slot.owner,
            None => self.owning_file(node)?,
        };
        let handle = self.nodes.register(node, owner)?;
        Ok(Issued { handle, node })
    }

    /// Walks parents up to the root and asks the engine for the root's file.
    fn owning_file(&self, node: NodeRef) -> RegistryResult<FileRef> {
        let mut top = node;
        while let Some(parent) = self.engine.parent(top)? {
            top = parent;
        }
        let file = self.engine.governing_file(top)?.ok_or_else(|| {
            RegistryError::internal(format!("root {top} of {node} exposes no file"))
        })?;
        if self.files.find_file(file).is_none() {
            return Err(RegistryError::internal(format!(
                "{node} belongs to {file}, which is not registered"
            )));
        }
        Ok(file)
    }

    /// Validates a handle against the node the caller presents.
    pub fn validate(
        &self,
        handle: NodeHandle,
        node: NodeRef,
        require_writable: bool,
    ) -> RegistryResult<NodeSlot> {
        self.ensure_open()?;
        validate(&self.nodes, &self.engine, handle, node, require_writable)
    }

    fn ensure_folder(&self, node: NodeRef) -> RegistryResult<()> {
        if self.engine.kind(node)?.is_folder() {
            return Ok(());
        }
        let path = self.engine.full_name(node)?;
        Err(RegistryError::NotAFolder {
            path: if path.is_empty() { "$ROOT$".into() } else { path },
        })
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Returns the handle of a file's root folder.
    pub fn root(&mut self, file: FileHandle) -> RegistryResult<Issued> {
        self.ensure_open()?;
        let file = self.files.resolve(file)?.file;
        let root = self.engine.root(file)?;
        self.issue(root)
    }

    /// Resolves a slash-separated path below a folder.
    ///
    /// With `silent`, a missing node yields `Ok(None)` instead of
    /// [`RegistryError::NotFound`].
    pub fn child_by_path(
        &mut self,
        handle: NodeHandle,
        node: NodeRef,
        path: &str,
        silent: bool,
    ) -> RegistryResult<Option<Issued>> {
        self.validate(handle, node, false)?;
        self.ensure_folder(node)?;
        match self.engine.resolve_path(node, path)? {
            Some(child) => self.issue(child).map(Some),
            None if silent => Ok(None),
            None => Err(RegistryError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    /// Returns the handle of a node's parent folder, or `None` at a root.
    pub fn parent_of(&mut self, handle: NodeHandle, node: NodeRef) -> RegistryResult<Option<Issued>> {
        self.validate(handle, node, false)?;
        match self.engine.parent(node)? {
            Some(parent) => self.issue(parent).map(Some),
            None => Ok(None),
        }
    }

    /// Issues a handle for every child of a folder.
    ///
    /// On failure, handles issued by this call are withdrawn again.
    pub fn children(
        &mut self,
        handle: NodeHandle,
        node: NodeRef,
        include_hidden: bool,
    ) -> RegistryResult<Vec<Issued>> {
        self.validate(handle, node, false)?;
        self.ensure_folder(node)?;

        let mut issued = Vec::new();
        let mut fresh = Vec::new();
        for child in self.engine.children(node)? {
            let result = self.visible(child, include_hidden).and_then(|visible| {
                if !visible {
                    return Ok(None);
                }
                let known = self.nodes.find(child).is_some();
                self.issue(child).map(|entry| Some((entry, known)))
            });
            match result {
                Ok(Some((entry, known))) => {
                    if !known {
                        fresh.push(child);
                    }
                    issued.push(entry);
                }
                Ok(None) => {}
                Err(err) => {
                    for child in fresh {
                        self.nodes.unregister_by_reference(child);
                    }
                    return Err(err);
                }
            }
        }
        Ok(issued)
    }

    fn visible(&self, node: NodeRef, include_hidden: bool) -> RegistryResult<bool> {
        Ok(include_hidden || !describe::is_hidden(&self.engine, node)?)
    }

    /// Returns the names of a folder's children.
    pub fn list_names(
        &self,
        handle: NodeHandle,
        node: NodeRef,
        include_hidden: bool,
    ) -> RegistryResult<Vec<String>> {
        self.validate(handle, node, false)?;
        self.ensure_folder(node)?;
        let mut names = Vec::new();
        for child in self.engine.children(node)? {
            if self.visible(child, include_hidden)? {
                names.push(self.engine.name(child)?);
            }
        }
        Ok(names)
    }

    // ------------------------------------------------------------------
    // Node operations
    // ------------------------------------------------------------------

    /// Returns a node's name, or its full path from the root.
    pub fn name(&self, handle: NodeHandle, node: NodeRef, full: bool) -> RegistryResult<String> {
        self.validate(handle, node, false)?;
        let name = if full {
            self.engine.full_name(node)?
        } else {
            self.engine.name(node)?
        };
        Ok(name)
    }

    /// Renames a node.
    pub fn rename(&mut self, handle: NodeHandle, node: NodeRef, name: &str) -> RegistryResult<()> {
        self.validate(handle, node, true)?;
        self.engine.rename(node, name)?;
        Ok(())
    }

    /// Deletes a node, invalidating its handle and those of its descendants.
    ///
    /// A non-empty folder requires `force`. The root cannot be deleted,
    /// whether or not its file is writable.
    pub fn delete_node(&mut self, handle: NodeHandle, node: NodeRef, force: bool) -> RegistryResult<()> {
        self.validate(handle, node, false)?;
        if self.engine.parent(node)?.is_none() {
            return Err(RegistryError::CannotDeleteRoot);
        }
        let slot = self.validate(handle, node, true)?;
        let marked = if self.engine.kind(node)?.is_folder() {
            cascade::mark_descendants(&self.nodes, &self.engine, node, slot.owner)?
        } else {
            Vec::new()
        };
        self.engine.delete(node, force)?;
        let invalidated = cascade::sweep(&mut self.nodes, node, &marked);
        debug!(%handle, %node, invalidated, "node deleted");
        Ok(())
    }

    /// Deletes a named attribute of a node.
    pub fn delete_attribute(&mut self, handle: NodeHandle, node: NodeRef, name: &str) -> RegistryResult<()> {
        self.validate(handle, node, true)?;
        self.engine.delete_attribute(node, name)?;
        Ok(())
    }

    /// Adds a child to a folder and returns its handle.
    pub fn add_node(
        &mut self,
        handle: NodeHandle,
        node: NodeRef,
        name: &str,
        spec: NodeSpec,
    ) -> RegistryResult<Issued> {
        self.validate(handle, node, true)?;
        self.ensure_folder(node)?;
        let child = self.engine.add_node(node, name, spec)?;
        self.issue(child)
    }

    /// Describes a node.
    pub fn describe(&self, handle: NodeHandle, node: NodeRef) -> RegistryResult<NodeDescription> {
        self.validate(handle, node, false)?;
        describe::describe(&self.engine, node)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Closes every open file and refuses further operations.
    ///
    /// All files are closed even when some fail; the first failure is
    /// returned. Calling it again is a no-op.
    pub fn shutdown(&mut self) -> RegistryResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let open: Vec<FileHandle> = self.files.iter().map(|(handle, _)| handle).collect();
        let mut first_error = None;
        for handle in open {
            if let Err(err) = self.close_slot(handle) {
                warn!(%handle, error = %err, "failed to close file during shutdown");
                first_error.get_or_insert(err);
            }
        }
        info!(remaining_handles = self.nodes.len(), "registry shut down");
        first_error.map_or(Ok(()), Err)
    }
}

impl<E: Engine> Drop for Registry<E> {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "registry shutdown failed during drop");
        }
    }
}

/// Resolves a path for duplicate detection; a file that does not exist yet
/// is resolved through its parent directory.
fn canonical_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            fs::canonicalize(parent)
                .map(|dir| dir.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_storage::{DocumentEngine, StorageError};
    use tempfile::TempDir;

    fn registry() -> Registry<DocumentEngine> {
        Registry::new(DocumentEngine::new(), RegistryConfig::default())
    }

    #[test]
    fn duplicate_path_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dup.arbor");
        let mut registry = registry();
        let file = registry.create_file(&path, false).unwrap();

        let err = registry.open_file(&path, true, false).unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyOpen { .. }));
        assert_eq!(registry.live_files(), 1);

        registry.close_file(file).unwrap();
        registry.open_file(&path, true, false).unwrap();
    }

    #[test]
    fn duplicate_path_can_be_allowed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dup.arbor");
        let mut registry = registry();
        let file = registry.create_file(&path, false).unwrap();
        registry.close_file(file).unwrap();

        let a = registry.open_file(&path, true, false).unwrap();
        let b = registry.open_file(&path, true, true).unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.live_files(), 2);
    }

    #[test]
    fn failed_open_leaves_no_slot() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        let err = registry
            .open_file(&dir.path().join("absent.arbor"), true, false)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Storage(StorageError::Open { .. })));
        assert_eq!(registry.live_files(), 0);
    }

    #[test]
    fn read_only_file_refuses_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ro.arbor");
        let mut registry = registry();
        let file = registry.create_file(&path, false).unwrap();
        let root = registry.root(file).unwrap();
        registry
            .add_node(root.handle, root.node, "x", NodeSpec::Label)
            .unwrap();
        registry.close_file(file).unwrap();

        let file = registry.open_file(&path, true, false).unwrap();
        let root = registry.root(file).unwrap();
        let child = registry
            .child_by_path(root.handle, root.node, "x", false)
            .unwrap()
            .unwrap();
        assert!(matches!(
            registry.rename(child.handle, child.node, "y"),
            Err(RegistryError::ReadOnlyViolation)
        ));
        assert!(matches!(
            registry.delete_node(child.handle, child.node, false),
            Err(RegistryError::ReadOnlyViolation)
        ));
        assert!(matches!(
            registry.sync_file(file),
            Err(RegistryError::ReadOnlyViolation)
        ));
        assert!(matches!(
            registry.compact_file(file),
            Err(RegistryError::ReadOnlyViolation)
        ));
        assert_eq!(registry.name(child.handle, child.node, false).unwrap(), "x");
    }

    #[test]
    fn path_lookup_modes() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        let file = registry.create_file(&dir.path().join("p.arbor"), false).unwrap();
        let root = registry.root(file).unwrap();
        let label = registry
            .add_node(root.handle, root.node, "tag", NodeSpec::Label)
            .unwrap();

        assert_eq!(
            registry
                .child_by_path(root.handle, root.node, "nope", true)
                .unwrap(),
            None
        );
        assert!(matches!(
            registry.child_by_path(root.handle, root.node, "nope", false),
            Err(RegistryError::NotFound { .. })
        ));
        assert!(matches!(
            registry.child_by_path(label.handle, label.node, "x", true),
            Err(RegistryError::NotAFolder { .. })
        ));
        assert_eq!(
            registry
                .child_by_path(root.handle, root.node, "tag", false)
                .unwrap(),
            Some(label)
        );
    }

    #[test]
    fn not_a_folder_reports_path() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        let file = registry.create_file(&dir.path().join("r.arbor"), false).unwrap();
        let root = registry.root(file).unwrap();
        registry
            .add_node(root.handle, root.node, "a", NodeSpec::Label)
            .unwrap();

        let leaf = registry
            .child_by_path(root.handle, root.node, "a", false)
            .unwrap()
            .unwrap();
        match registry.list_names(leaf.handle, leaf.node, true) {
            Err(RegistryError::NotAFolder { path }) => assert_eq!(path, "a"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn parent_of_root_is_none() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        let file = registry.create_file(&dir.path().join("q.arbor"), false).unwrap();
        let root = registry.root(file).unwrap();
        let folder = registry
            .add_node(root.handle, root.node, "f", NodeSpec::Folder)
            .unwrap();

        assert_eq!(registry.parent_of(root.handle, root.node).unwrap(), None);
        assert_eq!(
            registry.parent_of(folder.handle, folder.node).unwrap(),
            Some(root)
        );
    }

    #[test]
    fn children_skip_hidden_unless_asked() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        let file = registry.create_file(&dir.path().join("h.arbor"), false).unwrap();
        let root = registry.root(file).unwrap();
        registry
            .add_node(root.handle, root.node, "shown", NodeSpec::Label)
            .unwrap();
        let hidden = registry
            .add_node(root.handle, root.node, "secret", NodeSpec::Label)
            .unwrap();
        registry.engine_mut().set_hidden(hidden.node, true).unwrap();

        assert_eq!(
            registry.list_names(root.handle, root.node, false).unwrap(),
            vec!["shown"]
        );
        assert_eq!(
            registry.list_names(root.handle, root.node, true).unwrap(),
            vec!["shown", "secret"]
        );
        assert_eq!(registry.children(root.handle, root.node, false).unwrap().len(), 1);
        assert_eq!(registry.children(root.handle, root.node, true).unwrap().len(), 2);
        assert_eq!(registry.live_handles(), 3);
    }

    #[test]
    fn rename_and_full_name() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        let file = registry.create_file(&dir.path().join("n.arbor"), false).unwrap();
        let root = registry.root(file).unwrap();
        let folder = registry
            .add_node(root.handle, root.node, "f", NodeSpec::Folder)
            .unwrap();
        let leaf = registry
            .add_node(folder.handle, folder.node, "leaf", NodeSpec::Label)
            .unwrap();

        registry.rename(folder.handle, folder.node, "g").unwrap();
        assert_eq!(registry.name(leaf.handle, leaf.node, true).unwrap(), "g/leaf");
        assert_eq!(registry.name(leaf.handle, leaf.node, false).unwrap(), "leaf");
    }

    #[test]
    fn delete_attribute_requires_presence() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        let file = registry.create_file(&dir.path().join("a.arbor"), false).unwrap();
        let root = registry.root(file).unwrap();
        let array = registry
            .add_node(
                root.handle,
                root.node,
                "flags",
                NodeSpec::parse("logical", &[8]).unwrap(),
            )
            .unwrap();

        registry
            .delete_attribute(array.handle, array.node, arbor_storage::ATTR_LOGICAL)
            .unwrap();
        assert!(matches!(
            registry.delete_attribute(array.handle, array.node, arbor_storage::ATTR_LOGICAL),
            Err(RegistryError::Storage(StorageError::NoSuchAttribute(_)))
        ));
    }

    #[test]
    fn shutdown_closes_everything() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry();
        let a = registry.create_file(&dir.path().join("a.arbor"), false).unwrap();
        registry.create_file(&dir.path().join("b.arbor"), false).unwrap();
        let root = registry.root(a).unwrap();

        registry.shutdown().unwrap();
        assert_eq!(registry.live_files(), 0);
        assert_eq!(registry.live_handles(), 0);
        assert_eq!(registry.engine().open_count(), 0);
        assert!(registry.is_closed());
        assert!(matches!(
            registry.name(root.handle, root.node, false),
            Err(RegistryError::Closed)
        ));
        assert!(matches!(
            registry.create_file(&dir.path().join("c.arbor"), false),
            Err(RegistryError::Closed)
        ));
        registry.shutdown().unwrap();
    }

    #[test]
    fn canonical_path_resolves_missing_files() {
        let dir = TempDir::new().unwrap();
        let existing = canonical_path(dir.path());
        let missing = canonical_path(&dir.path().join("later.arbor"));
        assert_eq!(missing, existing.join("later.arbor"));
    }
}
