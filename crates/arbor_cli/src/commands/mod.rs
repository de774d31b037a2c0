//! CLI command implementations.

pub mod describe;
pub mod ls;
pub mod tidy;

use arbor_core::{FileHandle, Issued, Registry, RegistryConfig};
use arbor_storage::DocumentEngine;
use std::path::Path;
use tracing::debug;

/// A registry holding a single open container.
pub struct Session {
    /// The registry.
    pub registry: Registry<DocumentEngine>,
    /// Handle of the open container.
    pub file: FileHandle,
}

impl Session {
    /// Opens a container.
    pub fn open(path: &Path, read_only: bool) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            return Err(format!("No container found at {}", path.display()).into());
        }
        let mut registry = Registry::new(DocumentEngine::new(), RegistryConfig::new().max_files(1));
        let file = registry.open_file(path, read_only, false)?;
        debug!(path = %path.display(), read_only, "container opened");
        Ok(Self { registry, file })
    }

    /// Resolves a node path; an empty path or `/` names the root.
    pub fn node(&mut self, path: &str) -> Result<Issued, Box<dyn std::error::Error>> {
        let root = self.registry.root(self.file)?;
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Ok(root);
        }
        let issued = self
            .registry
            .child_by_path(root.handle, root.node, path, false)?
            .ok_or_else(|| format!("no such node \"{path}\""))?;
        Ok(issued)
    }

    /// Closes the container.
    pub fn close(mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.registry.close_file(self.file)?;
        Ok(())
    }
}
