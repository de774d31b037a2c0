//! Document container engine.

use crate::engine::Engine;
use crate::error::{StorageError, StorageResult};
use crate::ident::{FileRef, NodeRef};
use crate::image::{BodyImage, ContainerImage, NodeImage, FORMAT_VERSION};
use crate::kind::{ArrayFlavor, ElementType, NodeInfo, NodeKind, NodeSpec, Payload};
use crate::{ATTR_CLASS, ATTR_LEVELS, ATTR_LOGICAL};
use fs2::FileExt;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Virtual folders may link containers that link further containers, up to this depth.
const MAX_LINK_DEPTH: usize = 8;

/// A storage engine keeping each open container as an in-memory node tree.
///
/// Every container is one JSON document on disk, stamped with a SHA-256
/// checksum. The tree is loaded on open and written back on sync, compact
/// and close.
///
/// # Locking
///
/// A writable container holds an exclusive advisory lock on its file, a
/// read-only container holds a shared one. Locks are released on close.
///
/// # Virtual Folders
///
/// A virtual folder links another container file. Its content is loaded
/// when the owning container is opened, is read-only, and is never written
/// back into the owning container. Nodes below a virtual folder do not
/// expose their governing file; walk `parent` up to the root instead.
///
/// # Example
///
/// ```rust,no_run
/// use arbor_storage::{DocumentEngine, Engine, NodeSpec};
/// use std::path::Path;
///
/// let mut engine = DocumentEngine::new();
/// let file = engine.open(Path::new("cohort.arbor"), true).unwrap();
/// let root = engine.root(file).unwrap();
/// for child in engine.children(root).unwrap() {
///     println!("{}", engine.name(child).unwrap());
/// }
/// ```
#[derive(Debug, Default)]
pub struct DocumentEngine {
    files: HashMap<FileRef, Container>,
    nodes: HashMap<NodeRef, Node>,
}

#[derive(Debug)]
struct Container {
    path: PathBuf,
    handle: File,
    read_only: bool,
    root: NodeRef,
    free_blocks: Vec<u64>,
    dirty: bool,
}

#[derive(Debug)]
struct Node {
    file: FileRef,
    parent: Option<NodeRef>,
    children: Vec<NodeRef>,
    name: String,
    hidden: bool,
    attributes: BTreeMap<String, Value>,
    body: Body,
    /// True for content loaded through a virtual folder.
    linked: bool,
}

#[derive(Debug)]
enum Body {
    Folder,
    VirtualFolder {
        link: String,
        loaded: bool,
        message: String,
    },
    Label,
    Stream(Payload),
    Array {
        element: ElementType,
        dims: Vec<u64>,
        payload: Payload,
    },
    Unknown,
}

impl Body {
    fn kind(&self) -> NodeKind {
        match self {
            Self::Folder => NodeKind::Folder,
            Self::VirtualFolder { .. } => NodeKind::VirtualFolder,
            Self::Label => NodeKind::Label,
            Self::Stream(_) => NodeKind::Stream,
            Self::Array { .. } => NodeKind::Array,
            Self::Unknown => NodeKind::Unknown,
        }
    }

    fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Stream(payload) | Self::Array { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

impl DocumentEngine {
    /// Creates an engine with no open containers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of open containers.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.files.len()
    }

    /// Records the stream totals reported by the I/O layer for an array or stream.
    pub fn set_stream_totals(
        &mut self,
        node: NodeRef,
        total_in: u64,
        total_out: u64,
    ) -> StorageResult<()> {
        self.check_writable(node)?;
        let name = self.node(node)?.name.clone();
        let entry = self.node_mut(node)?;
        let file = entry.file;
        match &mut entry.body {
            Body::Stream(payload) | Body::Array { payload, .. } => {
                payload.total_in = total_in;
                payload.total_out = total_out;
            }
            _ => return Err(StorageError::NoData(name)),
        }
        self.mark_dirty(file);
        Ok(())
    }

    fn container(&self, file: FileRef) -> StorageResult<&Container> {
        self.files.get(&file).ok_or(StorageError::UnknownFile(file))
    }

    fn container_mut(&mut self, file: FileRef) -> StorageResult<&mut Container> {
        self.files.get_mut(&file).ok_or(StorageError::UnknownFile(file))
    }

    fn node(&self, node: NodeRef) -> StorageResult<&Node> {
        self.nodes.get(&node).ok_or(StorageError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: NodeRef) -> StorageResult<&mut Node> {
        self.nodes.get_mut(&node).ok_or(StorageError::UnknownNode(node))
    }

    fn mark_dirty(&mut self, file: FileRef) {
        if let Some(container) = self.files.get_mut(&file) {
            container.dirty = true;
        }
    }

    /// Linked content and read-only containers refuse every mutation.
    fn check_writable(&self, node: NodeRef) -> StorageResult<()> {
        let entry = self.node(node)?;
        if entry.linked || self.container(entry.file)?.read_only {
            return Err(StorageError::ReadOnly);
        }
        Ok(())
    }

    fn base_dir(&self, file: FileRef) -> StorageResult<PathBuf> {
        let path = &self.container(file)?.path;
        Ok(path.parent().map(Path::to_path_buf).unwrap_or_default())
    }

    fn insert_node(
        &mut self,
        file: FileRef,
        parent: Option<NodeRef>,
        name: String,
        body: Body,
        linked: bool,
    ) -> NodeRef {
        let node = NodeRef::mint();
        self.nodes.insert(
            node,
            Node {
                file,
                parent,
                children: Vec::new(),
                name,
                hidden: false,
                attributes: BTreeMap::new(),
                body,
                linked,
            },
        );
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.push(node);
        }
        node
    }

    /// Materialises a decoded subtree under `parent`.
    fn build(
        &mut self,
        file: FileRef,
        parent: Option<NodeRef>,
        image: NodeImage,
        linked: bool,
        base: &Path,
        depth: usize,
    ) -> NodeRef {
        let NodeImage {
            name,
            hidden,
            attributes,
            body,
            children,
        } = image;
        let body = match body {
            BodyImage::Folder => Body::Folder,
            BodyImage::VirtualFolder { link } => Body::VirtualFolder {
                link,
                loaded: false,
                message: String::new(),
            },
            BodyImage::Label => Body::Label,
            BodyImage::Stream { payload } => Body::Stream(payload),
            BodyImage::Array {
                element,
                dims,
                payload,
            } => Body::Array {
                element,
                dims,
                payload,
            },
            BodyImage::Unknown => Body::Unknown,
        };
        let is_virtual = matches!(body, Body::VirtualFolder { .. });
        let node = self.insert_node(file, parent, name, body, linked);
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.hidden = hidden;
            entry.attributes = attributes;
        }
        for child in children {
            self.build(file, Some(node), child, linked, base, depth);
        }
        if is_virtual {
            self.load_link(node, base, depth);
        }
        node
    }

    /// Loads the content of a virtual folder, recording the outcome on the node.
    fn load_link(&mut self, node: NodeRef, base: &Path, depth: usize) {
        let Some(entry) = self.nodes.get(&node) else {
            return;
        };
        let Body::VirtualFolder { link, .. } = &entry.body else {
            return;
        };
        let file = entry.file;
        let target = base.join(link);

        let outcome = if depth >= MAX_LINK_DEPTH {
            Err(format!("link depth exceeds {MAX_LINK_DEPTH}"))
        } else {
            read_document(&target)
        };

        let (loaded, message) = match outcome {
            Ok(image) => {
                let linked_base = target.parent().map(Path::to_path_buf).unwrap_or_default();
                for child in image.root.children {
                    self.build(file, Some(node), child, true, &linked_base, depth + 1);
                }
                (true, String::new())
            }
            Err(message) => {
                debug!(link = %target.display(), %message, "virtual folder not loaded");
                (false, message)
            }
        };
        if let Some(Node {
            body: Body::VirtualFolder {
                loaded: slot_loaded,
                message: slot_message,
                ..
            },
            ..
        }) = self.nodes.get_mut(&node)
        {
            *slot_loaded = loaded;
            *slot_message = message;
        }
    }

    /// Removes a node and its subtree from the arena, returning the removed nodes.
    fn drop_subtree(&mut self, node: NodeRef) -> Vec<Node> {
        let mut removed = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.nodes.remove(&current) {
                stack.extend(entry.children.iter().copied());
                removed.push(entry);
            }
        }
        removed
    }

    fn snapshot(&self, node: NodeRef) -> StorageResult<NodeImage> {
        let entry = self.node(node)?;
        let body = match &entry.body {
            Body::Folder => BodyImage::Folder,
            Body::VirtualFolder { link, .. } => BodyImage::VirtualFolder { link: link.clone() },
            Body::Label => BodyImage::Label,
            Body::Stream(payload) => BodyImage::Stream {
                payload: payload.clone(),
            },
            Body::Array {
                element,
                dims,
                payload,
            } => BodyImage::Array {
                element: *element,
                dims: dims.clone(),
                payload: payload.clone(),
            },
            Body::Unknown => BodyImage::Unknown,
        };
        let mut children = Vec::new();
        for &child in &entry.children {
            if !self.node(child)?.linked {
                children.push(self.snapshot(child)?);
            }
        }
        Ok(NodeImage {
            name: entry.name.clone(),
            hidden: entry.hidden,
            attributes: entry.attributes.clone(),
            body,
            children,
        })
    }

    fn write(&mut self, file: FileRef) -> StorageResult<()> {
        let container = self.container(file)?;
        let root = self.snapshot(container.root)?;
        let image = ContainerImage::seal(root, container.free_blocks.clone())?;
        let bytes = serde_json::to_vec_pretty(&image)?;

        let container = self.container_mut(file)?;
        container.handle.set_len(0)?;
        container.handle.seek(SeekFrom::Start(0))?;
        container.handle.write_all(&bytes)?;
        container.handle.sync_all()?;
        container.dirty = false;
        debug!(path = %container.path.display(), bytes = bytes.len(), "container written");
        Ok(())
    }

    fn discard(&mut self, file: FileRef) -> Option<Container> {
        let container = self.files.remove(&file)?;
        self.drop_subtree(container.root);
        let _ = FileExt::unlock(&container.handle);
        Some(container)
    }

    fn sibling_named(&self, parent: NodeRef, name: &str, except: Option<NodeRef>) -> StorageResult<bool> {
        for &child in &self.node(parent)?.children {
            if Some(child) != except && self.node(child)?.name == name {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn folder_label(&self, node: NodeRef) -> StorageResult<String> {
        let name = self.full_name(node)?;
        Ok(if name.is_empty() {
            "$ROOT$".to_string()
        } else {
            name
        })
    }
}

fn validate_name(name: &str) -> StorageResult<()> {
    if name.is_empty() || name.contains('/') {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Checks an encoded document, appending diagnostics to `log`.
fn decode(bytes: &[u8], log: &mut Vec<String>) -> Result<ContainerImage, String> {
    let image: ContainerImage = serde_json::from_slice(bytes)
        .map_err(|err| format!("invalid container document: {err}"))?;
    log.push(format!("format version {}", image.format));
    if image.format > FORMAT_VERSION {
        return Err(format!("unsupported format version {}", image.format));
    }
    let actual = image.actual_checksum().map_err(|err| err.to_string())?;
    if actual != image.checksum {
        log.push(format!("expected checksum {}", image.checksum));
        log.push(format!("actual checksum {actual}"));
        return Err("checksum mismatch".to_string());
    }
    log.push(format!("{} free block(s)", image.free_blocks.len()));
    Ok(image)
}

fn read_document(path: &Path) -> Result<ContainerImage, String> {
    let bytes = fs::read(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let mut log = Vec::new();
    decode(&bytes, &mut log).map_err(|err| format!("{}: {err}", path.display()))
}

impl Engine for DocumentEngine {
    fn create(&mut self, path: &Path) -> StorageResult<FileRef> {
        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        if FileExt::try_lock_exclusive(&handle).is_err() {
            return Err(StorageError::Locked(path.to_path_buf()));
        }
        handle.set_len(0)?;

        let file = FileRef::mint();
        let root = self.insert_node(file, None, String::new(), Body::Folder, false);
        self.files.insert(
            file,
            Container {
                path: path.to_path_buf(),
                handle,
                read_only: false,
                root,
                free_blocks: Vec::new(),
                dirty: true,
            },
        );
        if let Err(err) = self.write(file) {
            self.discard(file);
            return Err(err);
        }
        info!(path = %path.display(), %file, "container created");
        Ok(file)
    }

    fn open(&mut self, path: &Path, read_only: bool) -> StorageResult<FileRef> {
        let mode = if read_only { "read-only" } else { "read-write" };
        let mut log = vec![format!("open '{}' ({mode})", path.display())];
        let failure = |message: String, log: Vec<String>| StorageError::Open {
            path: path.to_path_buf(),
            message,
            log,
        };

        let mut handle = match OpenOptions::new().read(true).write(!read_only).open(path) {
            Ok(handle) => handle,
            Err(err) => return Err(failure(err.to_string(), log)),
        };
        let locked = if read_only {
            FileExt::try_lock_shared(&handle)
        } else {
            FileExt::try_lock_exclusive(&handle)
        };
        if locked.is_err() {
            return Err(StorageError::Locked(path.to_path_buf()));
        }

        let mut bytes = Vec::new();
        if let Err(err) = handle.read_to_end(&mut bytes) {
            return Err(failure(err.to_string(), log));
        }
        log.push(format!("read {} bytes", bytes.len()));
        let image = match decode(&bytes, &mut log) {
            Ok(image) => image,
            Err(message) => return Err(failure(message, log)),
        };

        let file = FileRef::mint();
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let root = self.build(file, None, image.root, false, &base, 0);
        self.files.insert(
            file,
            Container {
                path: path.to_path_buf(),
                handle,
                read_only,
                root,
                free_blocks: image.free_blocks,
                dirty: false,
            },
        );
        info!(path = %path.display(), %file, read_only, "container opened");
        Ok(file)
    }

    fn close(&mut self, file: FileRef) -> StorageResult<()> {
        let container = self.container(file)?;
        let result = if container.dirty && !container.read_only {
            self.write(file)
        } else {
            Ok(())
        };
        if let Some(container) = self.discard(file) {
            info!(path = %container.path.display(), %file, "container closed");
        }
        result
    }

    fn sync(&mut self, file: FileRef) -> StorageResult<()> {
        if self.container(file)?.read_only {
            return Err(StorageError::ReadOnly);
        }
        self.write(file)
    }

    fn file_size(&self, file: FileRef) -> StorageResult<u64> {
        Ok(self.container(file)?.handle.metadata()?.len())
    }

    fn fragment_count(&self, file: FileRef) -> StorageResult<u64> {
        Ok(self.container(file)?.free_blocks.len() as u64)
    }

    fn compact(&mut self, file: FileRef) -> StorageResult<()> {
        let container = self.container_mut(file)?;
        if container.read_only {
            return Err(StorageError::ReadOnly);
        }
        let reclaimed: u64 = container.free_blocks.drain(..).sum();
        container.dirty = true;
        self.write(file)?;
        info!(%file, reclaimed, "container compacted");
        Ok(())
    }

    fn file_path(&self, file: FileRef) -> StorageResult<&Path> {
        Ok(&self.container(file)?.path)
    }

    fn is_read_only(&self, file: FileRef) -> StorageResult<bool> {
        Ok(self.container(file)?.read_only)
    }

    fn root(&self, file: FileRef) -> StorageResult<NodeRef> {
        Ok(self.container(file)?.root)
    }

    fn parent(&self, node: NodeRef) -> StorageResult<Option<NodeRef>> {
        Ok(self.node(node)?.parent)
    }

    fn governing_file(&self, node: NodeRef) -> StorageResult<Option<FileRef>> {
        let entry = self.node(node)?;
        Ok((!entry.linked).then_some(entry.file))
    }

    fn children(&self, node: NodeRef) -> StorageResult<Vec<NodeRef>> {
        let entry = self.node(node)?;
        if !entry.body.kind().is_folder() {
            return Err(StorageError::NotAFolder(self.folder_label(node)?));
        }
        Ok(entry.children.clone())
    }

    fn resolve_path(&self, folder: NodeRef, path: &str) -> StorageResult<Option<NodeRef>> {
        if !self.node(folder)?.body.kind().is_folder() {
            return Err(StorageError::NotAFolder(self.folder_label(folder)?));
        }
        let mut current = folder;
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            let entry = self.node(current)?;
            if !entry.body.kind().is_folder() {
                return Ok(None);
            }
            let next = entry
                .children
                .iter()
                .copied()
                .find(|child| self.nodes.get(child).is_some_and(|c| c.name == segment));
            match next {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn contains(&self, ancestor: NodeRef, node: NodeRef) -> StorageResult<bool> {
        self.node(ancestor)?;
        let mut current = self.node(node)?.parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return Ok(true);
            }
            current = self.node(parent)?.parent;
        }
        Ok(false)
    }

    fn delete(&mut self, node: NodeRef, force: bool) -> StorageResult<()> {
        self.check_writable(node)?;
        let entry = self.node(node)?;
        let parent = entry.parent.ok_or(StorageError::RootNotDeletable)?;
        if entry.body.kind().is_folder() && !entry.children.is_empty() && !force {
            return Err(StorageError::NotEmpty(entry.name.clone()));
        }
        let file = entry.file;

        let removed = self.drop_subtree(node);
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|&child| child != node);
        }
        let freed: Vec<u64> = removed
            .iter()
            .filter(|entry| !entry.linked)
            .filter_map(|entry| entry.body.payload())
            .map(Payload::stored_size)
            .filter(|&size| size > 0)
            .collect();
        let container = self.container_mut(file)?;
        container.free_blocks.extend(freed);
        container.dirty = true;
        debug!(%node, removed = removed.len(), "subtree deleted");
        Ok(())
    }

    fn add_node(&mut self, parent: NodeRef, name: &str, spec: NodeSpec) -> StorageResult<NodeRef> {
        self.check_writable(parent)?;
        validate_name(name)?;
        let entry = self.node(parent)?;
        match entry.body.kind() {
            NodeKind::Folder => {}
            NodeKind::VirtualFolder => return Err(StorageError::ReadOnly),
            _ => return Err(StorageError::NotAFolder(self.folder_label(parent)?)),
        }
        if self.sibling_named(parent, name, None)? {
            return Err(StorageError::DuplicateName(name.to_string()));
        }
        let file = entry.file;

        let mut attributes = BTreeMap::new();
        let body = match spec {
            NodeSpec::Folder => Body::Folder,
            NodeSpec::VirtualFolder { link } => Body::VirtualFolder {
                link,
                loaded: false,
                message: String::new(),
            },
            NodeSpec::Label => Body::Label,
            NodeSpec::Stream { coder } => Body::Stream(Payload {
                coder,
                ..Payload::default()
            }),
            NodeSpec::Array {
                element,
                dims,
                flavor,
                coder,
            } => {
                match flavor {
                    ArrayFlavor::Plain => {}
                    ArrayFlavor::Logical => {
                        attributes.insert(ATTR_LOGICAL.to_string(), Value::Bool(true));
                    }
                    ArrayFlavor::Factor => {
                        attributes.insert(ATTR_CLASS.to_string(), Value::from("factor"));
                        attributes.insert(ATTR_LEVELS.to_string(), Value::Array(Vec::new()));
                    }
                }
                Body::Array {
                    element,
                    dims,
                    payload: Payload {
                        coder,
                        ..Payload::default()
                    },
                }
            }
        };
        let is_virtual = matches!(body, Body::VirtualFolder { .. });
        let node = self.insert_node(file, Some(parent), name.to_string(), body, false);
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.attributes = attributes;
        }
        if is_virtual {
            let base = self.base_dir(file)?;
            self.load_link(node, &base, 0);
        }
        self.mark_dirty(file);
        Ok(node)
    }

    fn name(&self, node: NodeRef) -> StorageResult<String> {
        Ok(self.node(node)?.name.clone())
    }

    fn full_name(&self, node: NodeRef) -> StorageResult<String> {
        let mut names = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let entry = self.node(id)?;
            if entry.parent.is_some() {
                names.push(entry.name.as_str());
            }
            current = entry.parent;
        }
        names.reverse();
        Ok(names.join("/"))
    }

    fn rename(&mut self, node: NodeRef, name: &str) -> StorageResult<()> {
        self.check_writable(node)?;
        validate_name(name)?;
        if let Some(parent) = self.node(node)?.parent {
            if self.sibling_named(parent, name, Some(node))? {
                return Err(StorageError::DuplicateName(name.to_string()));
            }
        }
        let entry = self.node_mut(node)?;
        entry.name = name.to_string();
        let file = entry.file;
        self.mark_dirty(file);
        Ok(())
    }

    fn is_hidden(&self, node: NodeRef) -> StorageResult<bool> {
        Ok(self.node(node)?.hidden)
    }

    fn set_hidden(&mut self, node: NodeRef, hidden: bool) -> StorageResult<()> {
        self.check_writable(node)?;
        let entry = self.node_mut(node)?;
        entry.hidden = hidden;
        let file = entry.file;
        self.mark_dirty(file);
        Ok(())
    }

    fn attribute(&self, node: NodeRef, name: &str) -> StorageResult<Option<Value>> {
        Ok(self.node(node)?.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, node: NodeRef, name: &str, value: Value) -> StorageResult<()> {
        self.check_writable(node)?;
        let entry = self.node_mut(node)?;
        entry.attributes.insert(name.to_string(), value);
        let file = entry.file;
        self.mark_dirty(file);
        Ok(())
    }

    fn delete_attribute(&mut self, node: NodeRef, name: &str) -> StorageResult<()> {
        self.check_writable(node)?;
        let entry = self.node_mut(node)?;
        if entry.attributes.remove(name).is_none() {
            return Err(StorageError::NoSuchAttribute(name.to_string()));
        }
        let file = entry.file;
        self.mark_dirty(file);
        Ok(())
    }

    fn kind(&self, node: NodeRef) -> StorageResult<NodeKind> {
        Ok(self.node(node)?.body.kind())
    }

    fn info(&self, node: NodeRef) -> StorageResult<NodeInfo> {
        let entry = self.node(node)?;
        let mut info = NodeInfo {
            kind: entry.body.kind(),
            storage_name: String::new(),
            trait_name: String::new(),
            element: None,
            dims: Vec::new(),
            payload: entry.body.payload().cloned(),
            link: None,
            loaded: true,
            message: String::new(),
        };
        let (storage, trait_name) = match &entry.body {
            Body::Folder => ("dFolder".to_string(), "Folder".to_string()),
            Body::VirtualFolder {
                link,
                loaded,
                message,
            } => {
                info.link = Some(link.clone());
                info.loaded = *loaded;
                info.message = message.clone();
                ("dVFolder".to_string(), "VFolder".to_string())
            }
            Body::Label => ("dLabel".to_string(), "Label".to_string()),
            Body::Stream(_) => ("dStream".to_string(), "Stream".to_string()),
            Body::Array { element, dims, .. } => {
                info.element = Some(*element);
                info.dims = dims.clone();
                (element.stream_name(), element.trait_name())
            }
            Body::Unknown => {
                info.loaded = false;
                ("dUnknown".to_string(), "Unknown".to_string())
            }
        };
        info.storage_name = storage;
        info.trait_name = trait_name;
        Ok(info)
    }
}
