//! The check every boundary-crossing node operation passes first.

use crate::error::{RegistryError, RegistryResult};
use crate::handle::{NodeHandle, TableKind};
use crate::node_table::{NodeSlot, NodeTable};
use arbor_storage::{Engine, NodeRef};

/// Confirms that `handle` still names `node`.
///
/// Checks run in order:
///
/// 1. [`RegistryError::InvalidHandle`] if the handle is beyond the table
/// 2. [`RegistryError::StaleHandle`] if the slot is empty or holds another node
/// 3. [`RegistryError::ReadOnlyViolation`] if `require_writable` is set and
///    the owning file is open read-only
pub fn validate<E: Engine>(
    table: &NodeTable,
    engine: &E,
    handle: NodeHandle,
    node: NodeRef,
    require_writable: bool,
) -> RegistryResult<NodeSlot> {
    if handle.index() >= table.bounds() {
        return Err(RegistryError::invalid_handle(TableKind::Node, handle.index()));
    }
    let slot = match table.entry(handle) {
        Some(slot) if slot.node == node => *slot,
        _ => {
            return Err(RegistryError::StaleHandle {
                handle: handle.index(),
            })
        }
    };
    if require_writable && engine.is_read_only(slot.owner)? {
        return Err(RegistryError::ReadOnlyViolation);
    }
    Ok(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_storage::DocumentEngine;
    use tempfile::TempDir;

    #[test]
    fn checks_run_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.arbor");
        let mut engine = DocumentEngine::new();
        let file = engine.create(&path).unwrap();
        engine.close(file).unwrap();
        let file = engine.open(&path, true).unwrap();
        let root = engine.root(file).unwrap();

        let mut table = NodeTable::default();
        let handle = table.register(root, file).unwrap();

        assert!(matches!(
            validate(&table, &engine, NodeHandle::new(1), root, false),
            Err(RegistryError::InvalidHandle { handle: 1, .. })
        ));
        let other = NodeRef::from_raw(root.as_u64() + 1_000_000).unwrap();
        assert!(matches!(
            validate(&table, &engine, handle, other, false),
            Err(RegistryError::StaleHandle { handle: 0 })
        ));
        assert!(matches!(
            validate(&table, &engine, handle, root, true),
            Err(RegistryError::ReadOnlyViolation)
        ));
        assert_eq!(
            validate(&table, &engine, handle, root, false).unwrap().owner,
            file
        );

        table.unregister(handle);
        assert!(matches!(
            validate(&table, &engine, handle, root, false),
            Err(RegistryError::StaleHandle { .. })
        ));
    }
}
