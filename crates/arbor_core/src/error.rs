//! Error types for the handle registry.

use crate::handle::TableKind;
use arbor_storage::StorageError;
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur in registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The file table or node table is full.
    #[error("the {table} table is full ({limit} entries)")]
    CapacityExceeded {
        /// The exhausted table.
        table: TableKind,
        /// Its fixed maximum.
        limit: usize,
    },

    /// The handle is outside the table bounds or names an empty file slot.
    #[error("invalid {table} handle ({handle})")]
    InvalidHandle {
        /// The table the handle was meant for.
        table: TableKind,
        /// The handle value as presented.
        handle: i64,
    },

    /// The slot no longer holds the object the caller presented.
    #[error("invalid node object at handle {handle} (it was closed or deleted)")]
    StaleHandle {
        /// The node handle.
        handle: usize,
    },

    /// A null object reference was presented.
    #[error("invalid node object (null)")]
    NullObject,

    /// The node is not a folder.
    #[error("'{path}' is not a folder")]
    NotAFolder {
        /// Full path of the node, `$ROOT$` for a root.
        path: String,
    },

    /// A path lookup found nothing.
    #[error("no such node \"{path}\"")]
    NotFound {
        /// The path that was looked up.
        path: String,
    },

    /// The root folder of a file cannot be deleted.
    #[error("can not delete the root")]
    CannotDeleteRoot,

    /// A write was attempted on a node whose file is open read-only.
    #[error("the file is opened read-only")]
    ReadOnlyViolation,

    /// The path is already open in another file slot.
    #[error("the file '{path}' has been created or opened")]
    AlreadyOpen {
        /// The duplicate path.
        path: String,
    },

    /// A registry invariant does not hold.
    #[error("internal inconsistency: {message}")]
    InternalInconsistency {
        /// Description of the broken invariant.
        message: String,
    },

    /// An argument was rejected before reaching the engine.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the bad argument.
        message: String,
    },

    /// The registry has been shut down.
    #[error("the registry has been shut down")]
    Closed,

    /// The storage engine reported a failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RegistryError {
    /// Creates an internal inconsistency error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalInconsistency {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid handle error for a host-side handle value.
    pub fn invalid_handle(table: TableKind, handle: impl TryInto<i64>) -> Self {
        Self::InvalidHandle {
            table,
            handle: handle.try_into().unwrap_or(i64::MAX),
        }
    }

    /// Returns true if re-resolving the handle is the right recovery.
    #[must_use]
    pub fn is_handle_error(&self) -> bool {
        matches!(self, Self::InvalidHandle { .. } | Self::StaleHandle { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn storage_errors_keep_their_message() {
        let err: RegistryError = StorageError::Open {
            path: PathBuf::from("x.arbor"),
            message: "checksum mismatch".into(),
            log: vec!["format version 1".into()],
        }
        .into();
        assert_eq!(err.to_string(), "checksum mismatch\nLog:\nformat version 1");
    }

    #[test]
    fn handle_errors_are_recoverable() {
        assert!(RegistryError::StaleHandle { handle: 3 }.is_handle_error());
        assert!(RegistryError::invalid_handle(TableKind::File, -1).is_handle_error());
        assert!(!RegistryError::CannotDeleteRoot.is_handle_error());
    }

    #[test]
    fn invalid_handle_message() {
        let err = RegistryError::invalid_handle(TableKind::Node, 12_usize);
        assert_eq!(err.to_string(), "invalid node handle (12)");
    }
}
