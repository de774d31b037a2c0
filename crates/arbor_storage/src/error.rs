//! Error types for storage operations.

use crate::ident::{FileRef, NodeRef};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container document could not be encoded or decoded.
    #[error("invalid container document: {0}")]
    Document(#[from] serde_json::Error),

    /// Opening a container failed; `log` holds the engine's diagnostics.
    #[error("{}", open_failure(.message, .log))]
    Open {
        /// The container path.
        path: PathBuf,
        /// Short description of the failure.
        message: String,
        /// Diagnostic lines collected while opening.
        log: Vec<String>,
    },

    /// Another handle holds a conflicting lock on the container.
    #[error("container is locked by another process: {}", .0.display())]
    Locked(PathBuf),

    /// A write was attempted on a container opened read-only.
    #[error("the container is read-only")]
    ReadOnly,

    /// The file token does not name an open container.
    #[error("unknown container {0}")]
    UnknownFile(FileRef),

    /// The node token does not name a live node.
    #[error("unknown node {0}")]
    UnknownNode(NodeRef),

    /// The node is not a folder.
    #[error("'{0}' is not a folder")]
    NotAFolder(String),

    /// A sibling already carries this name.
    #[error("a node named '{0}' already exists")]
    DuplicateName(String),

    /// Node names must be non-empty and must not contain '/'.
    #[error("invalid node name '{0}'")]
    InvalidName(String),

    /// A non-empty folder can only be deleted with `force`.
    #[error("folder '{0}' is not empty")]
    NotEmpty(String),

    /// The root folder cannot be deleted.
    #[error("the root folder cannot be deleted")]
    RootNotDeletable,

    /// No attribute with that name.
    #[error("no attribute named '{0}'")]
    NoSuchAttribute(String),

    /// The node carries no data stream.
    #[error("'{0}' has no data stream")]
    NoData(String),

    /// The storage alias is not recognised.
    #[error("unknown storage type '{0}'")]
    UnknownStorage(String),
}

fn open_failure(message: &str, log: &[String]) -> String {
    if log.is_empty() {
        return message.to_string();
    }
    let mut text = String::from(message);
    text.push_str("\nLog:");
    for line in log {
        text.push('\n');
        text.push_str(line);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_failure_appends_log() {
        let err = StorageError::Open {
            path: PathBuf::from("a.arbor"),
            message: "checksum mismatch".into(),
            log: vec!["opening a.arbor".into(), "format version 1".into()],
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch\nLog:\nopening a.arbor\nformat version 1"
        );
    }

    #[test]
    fn open_failure_without_log() {
        let err = StorageError::Open {
            path: PathBuf::from("a.arbor"),
            message: "no such file".into(),
            log: Vec::new(),
        };
        assert_eq!(err.to_string(), "no such file");
    }
}
