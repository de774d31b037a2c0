//! Invalidation cascades run around destructive engine calls.
//!
//! A file close must invalidate every handle into the file before the
//! engine destroys it. A subtree delete must find the registered
//! descendants before the engine destroys them, because a destroyed node
//! can no longer be asked for its ancestry.

use crate::error::RegistryResult;
use crate::node_table::NodeTable;
use arbor_storage::{Engine, FileRef, NodeRef};
use tracing::debug;

/// Unregisters every node owned by `file` and returns how many were dropped.
///
/// Scans the whole table; a file may have any number of live handles.
pub fn close_cascade(table: &mut NodeTable, file: FileRef) -> usize {
    let doomed: Vec<_> = table
        .iter()
        .filter(|(_, slot)| slot.owner == file)
        .map(|(handle, _)| handle)
        .collect();
    for &handle in &doomed {
        table.unregister(handle);
    }
    debug!(%file, invalidated = doomed.len(), "close cascade finished");
    doomed.len()
}

/// Collects the registered strict descendants of `node`.
///
/// Must run before the engine deletes `node`. Only slots owned by `owner`
/// can be descendants, so the others are not interrogated.
pub fn mark_descendants<E: Engine>(
    table: &NodeTable,
    engine: &E,
    node: NodeRef,
    owner: FileRef,
) -> RegistryResult<Vec<NodeRef>> {
    let mut marked = Vec::new();
    for (_, slot) in table.iter() {
        if slot.owner == owner && slot.node != node && engine.contains(node, slot.node)? {
            marked.push(slot.node);
        }
    }
    Ok(marked)
}

/// Unregisters the deleted node and its marked descendants.
pub fn sweep(table: &mut NodeTable, node: NodeRef, marked: &[NodeRef]) -> usize {
    let swept = std::iter::once(node)
        .chain(marked.iter().copied())
        .filter_map(|reference| table.unregister_by_reference(reference))
        .count();
    debug!(%node, invalidated = swept, "delete cascade finished");
    swept
}
