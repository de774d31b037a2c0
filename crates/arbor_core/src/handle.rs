//! Host-visible handles.

use arbor_storage::NodeRef;
use std::fmt;

/// Index of a slot in the node table.
///
/// A handle alone proves nothing; it is only meaningful together with the
/// [`NodeRef`] it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(usize);

impl NodeHandle {
    /// Creates a handle from a slot index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a slot in the file table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHandle(usize);

impl FileHandle {
    /// Creates a handle from a slot index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node handle together with the reference it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Issued {
    /// The node handle.
    pub handle: NodeHandle,
    /// The node the handle names.
    pub node: NodeRef,
}

/// Which handle table an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// The fixed-capacity file table.
    File,
    /// The growable node table.
    Node,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Node => "node",
        })
    }
}
