//! On-disk document layout of a container.
//!
//! ```text
//! {
//!   "format": 1,
//!   "checksum": "<sha256 of root + free blocks>",
//!   "free_blocks": [ ... ],
//!   "root": { "name": "", "body": { "type": "folder" }, "children": [ ... ] }
//! }
//! ```

use crate::error::StorageResult;
use crate::kind::{ElementType, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// A whole container as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ContainerImage {
    pub format: u32,
    pub checksum: String,
    /// Sizes of the stream blocks released by deletions since the last compaction.
    #[serde(default)]
    pub free_blocks: Vec<u64>,
    pub root: NodeImage,
}

/// One node and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct NodeImage {
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
    pub body: BodyImage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum BodyImage {
    Folder,
    VirtualFolder {
        link: String,
    },
    Label,
    Stream {
        #[serde(default)]
        payload: Payload,
    },
    Array {
        element: ElementType,
        dims: Vec<u64>,
        #[serde(default)]
        payload: Payload,
    },
    #[serde(other)]
    Unknown,
}

impl ContainerImage {
    /// Builds an image and stamps its checksum.
    pub fn seal(root: NodeImage, free_blocks: Vec<u64>) -> StorageResult<Self> {
        let checksum = digest(&root, &free_blocks)?;
        Ok(Self {
            format: FORMAT_VERSION,
            checksum,
            free_blocks,
            root,
        })
    }

    /// Recomputes the checksum of the decoded content.
    pub fn actual_checksum(&self) -> StorageResult<String> {
        digest(&self.root, &self.free_blocks)
    }
}

fn digest(root: &NodeImage, free_blocks: &[u64]) -> StorageResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(root)?);
    for block in free_blocks {
        hasher.update(block.to_le_bytes());
    }
    Ok(hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect())
}
