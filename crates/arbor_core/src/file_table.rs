//! Fixed-capacity table of open files.

use crate::error::{RegistryError, RegistryResult};
use crate::handle::{FileHandle, TableKind};
use arbor_storage::FileRef;
use std::path::{Path, PathBuf};

/// One open container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The engine's container token.
    pub file: FileRef,
    /// Canonical path, used to detect duplicate opens.
    pub path: PathBuf,
    /// Whether the container was opened read-only.
    pub read_only: bool,
}

/// A fixed number of file slots, each empty or holding one open container.
///
/// The table is sized once and never resized; running out of slots is an
/// error, not a reason to grow.
#[derive(Debug)]
pub struct FileTable {
    slots: Vec<Option<FileEntry>>,
}

impl FileTable {
    /// Creates a table with `capacity` empty slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
        }
    }

    /// Returns the fixed number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns true if no file is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Finds the lowest empty slot without claiming it.
    ///
    /// The caller populates the slot once the container is open.
    pub fn allocate(&self) -> RegistryResult<FileHandle> {
        self.slots
            .iter()
            .position(Option::is_none)
            .map(FileHandle::new)
            .ok_or(RegistryError::CapacityExceeded {
                table: TableKind::File,
                limit: self.slots.len(),
            })
    }

    /// Stores an open container in an empty slot.
    pub fn populate(&mut self, handle: FileHandle, entry: FileEntry) -> RegistryResult<()> {
        match self.slots.get_mut(handle.index()) {
            Some(slot @ None) => {
                *slot = Some(entry);
                Ok(())
            }
            Some(Some(_)) => Err(RegistryError::internal(format!(
                "file slot {handle} is already occupied"
            ))),
            None => Err(RegistryError::invalid_handle(TableKind::File, handle.index())),
        }
    }

    /// Empties a slot and returns what it held.
    ///
    /// Node handles into the file must already be invalidated and the
    /// container closed; nothing is torn down here.
    pub fn release(&mut self, handle: FileHandle) -> Option<FileEntry> {
        self.slots.get_mut(handle.index()).and_then(Option::take)
    }

    /// Returns the entry at `handle`.
    pub fn resolve(&self, handle: FileHandle) -> RegistryResult<&FileEntry> {
        self.slots
            .get(handle.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| RegistryError::invalid_handle(TableKind::File, handle.index()))
    }

    /// Returns the slot holding a container opened from `path`.
    #[must_use]
    pub fn find_path(&self, path: &Path) -> Option<FileHandle> {
        self.iter()
            .find(|(_, entry)| entry.path == path)
            .map(|(handle, _)| handle)
    }

    /// Returns the slot holding `file`.
    #[must_use]
    pub fn find_file(&self, file: FileRef) -> Option<FileHandle> {
        self.iter()
            .find(|(_, entry)| entry.file == file)
            .map(|(handle, _)| handle)
    }

    /// Iterates over occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (FileHandle, &FileEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|entry| (FileHandle::new(index), entry)))
    }
}
