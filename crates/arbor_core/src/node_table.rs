//! Growable table of node handles with its reverse index.

use crate::error::{RegistryError, RegistryResult};
use crate::handle::{NodeHandle, TableKind};
use arbor_storage::{FileRef, NodeRef};
use std::collections::HashMap;
use tracing::{debug, error};

/// Largest number of node slots; handles must fit a host `i32`.
pub const MAX_NODE_HANDLES: usize = i32::MAX as usize;

/// One occupied node slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSlot {
    /// The registered node.
    pub node: NodeRef,
    /// The file the node belonged to when it was registered.
    pub owner: FileRef,
}

/// Node slots plus a reverse index from node to slot.
///
/// # Invariants
///
/// - For every occupied slot `i`, `index[slot.node] == i`
/// - Every index entry points at an occupied slot holding that node
/// - The table never shrinks; empty slots are reused lowest-first
#[derive(Debug, Default)]
pub struct NodeTable {
    slots: Vec<Option<NodeSlot>>,
    index: HashMap<NodeRef, usize>,
}

impl NodeTable {
    /// Creates an empty table with room for `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of slots, occupied or not.
    ///
    /// Handles at or beyond this bound were never issued.
    #[must_use]
    pub fn bounds(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if no node is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Issues a handle for `node`, or returns the one it already has.
    ///
    /// A new node takes the lowest empty slot, or a new slot at the end.
    pub fn register(&mut self, node: NodeRef, owner: FileRef) -> RegistryResult<NodeHandle> {
        if let Some(&index) = self.index.get(&node) {
            return match self.slots.get(index) {
                Some(Some(slot)) if slot.node == node => Ok(NodeHandle::new(index)),
                _ => {
                    error!(%node, index, "reverse index points at a foreign slot");
                    Err(RegistryError::internal(format!(
                        "reverse index maps {node} to slot {index}, which holds another object"
                    )))
                }
            };
        }

        let slot = Some(NodeSlot { node, owner });
        let index = match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = slot;
                index
            }
            None => {
                if self.slots.len() >= MAX_NODE_HANDLES {
                    return Err(RegistryError::CapacityExceeded {
                        table: TableKind::Node,
                        limit: MAX_NODE_HANDLES,
                    });
                }
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        self.index.insert(node, index);
        debug!(%node, %owner, handle = index, "node registered");
        Ok(NodeHandle::new(index))
    }

    /// Empties a slot; a no-op if it is already empty.
    pub fn unregister(&mut self, handle: NodeHandle) -> Option<NodeSlot> {
        let slot = self.slots.get_mut(handle.index()).and_then(Option::take)?;
        self.index.remove(&slot.node);
        debug!(node = %slot.node, %handle, "node unregistered");
        Some(slot)
    }

    /// Empties whichever slot holds `node`.
    pub fn unregister_by_reference(&mut self, node: NodeRef) -> Option<NodeHandle> {
        let index = self.index.remove(&node)?;
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = None;
        }
        debug!(%node, handle = index, "node unregistered");
        Some(NodeHandle::new(index))
    }

    /// Returns the handle currently issued for `node`.
    #[must_use]
    pub fn find(&self, node: NodeRef) -> Option<NodeHandle> {
        self.index.get(&node).copied().map(NodeHandle::new)
    }

    /// Returns the occupied slot at `handle`.
    #[must_use]
    pub fn entry(&self, handle: NodeHandle) -> Option<&NodeSlot> {
        self.slots.get(handle.index()).and_then(Option::as_ref)
    }

    /// Iterates over occupied slots in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, NodeSlot)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|slot| (NodeHandle::new(index), slot)))
    }

    /// Verifies that slots and reverse index agree.
    pub fn check_consistency(&self) -> RegistryResult<()> {
        let mut occupied = 0;
        for (handle, slot) in self.iter() {
            occupied += 1;
            if self.index.get(&slot.node) != Some(&handle.index()) {
                return Err(RegistryError::internal(format!(
                    "slot {handle} holds {} but the reverse index disagrees",
                    slot.node
                )));
            }
        }
        if occupied != self.index.len() {
            return Err(RegistryError::internal(format!(
                "{occupied} occupied slots but {} reverse index entries",
                self.index.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn node(raw: u64) -> NodeRef {
        NodeRef::from_raw(raw).unwrap()
    }

    fn file(raw: u64) -> FileRef {
        FileRef::from_raw(raw).unwrap()
    }

    #[test]
    fn register_is_idempotent() {
        let mut table = NodeTable::default();
        let a = table.register(node(1), file(1)).unwrap();
        let b = table.register(node(2), file(1)).unwrap();
        assert_eq!(a, NodeHandle::new(0));
        assert_eq!(b, NodeHandle::new(1));
        assert_eq!(table.register(node(1), file(1)).unwrap(), a);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn empty_slots_are_reused_lowest_first() {
        let mut table = NodeTable::default();
        for raw in 1..=5 {
            table.register(node(raw), file(1)).unwrap();
        }
        table.unregister(NodeHandle::new(3));
        table.unregister(NodeHandle::new(1));

        assert_eq!(table.register(node(10), file(1)).unwrap(), NodeHandle::new(1));
        assert_eq!(table.register(node(11), file(1)).unwrap(), NodeHandle::new(3));
        assert_eq!(table.register(node(12), file(1)).unwrap(), NodeHandle::new(5));
        assert_eq!(table.bounds(), 6);
    }

    #[test]
    fn unregister_by_reference_clears_slot() {
        let mut table = NodeTable::default();
        table.register(node(1), file(1)).unwrap();
        let handle = table.register(node(2), file(1)).unwrap();

        assert_eq!(table.unregister_by_reference(node(2)), Some(handle));
        assert_eq!(table.entry(handle), None);
        assert_eq!(table.find(node(2)), None);
        assert_eq!(table.unregister_by_reference(node(2)), None);
        assert_eq!(table.bounds(), 2);
    }

    #[test]
    fn unregister_empty_slot_is_noop() {
        let mut table = NodeTable::default();
        assert_eq!(table.unregister(NodeHandle::new(0)), None);
        table.register(node(1), file(1)).unwrap();
        table.unregister(NodeHandle::new(0)).unwrap();
        assert_eq!(table.unregister(NodeHandle::new(0)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn corrupted_index_is_reported() {
        let mut table = NodeTable::default();
        table.register(node(1), file(1)).unwrap();
        table.slots[0] = Some(NodeSlot {
            node: node(2),
            owner: file(1),
        });

        assert!(matches!(
            table.register(node(1), file(1)),
            Err(RegistryError::InternalInconsistency { .. })
        ));
        assert!(table.check_consistency().is_err());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Register(u64),
        Unregister(usize),
        UnregisterRef(u64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u64..40).prop_map(Op::Register),
            (0usize..40).prop_map(Op::Unregister),
            (1u64..40).prop_map(Op::UnregisterRef),
        ]
    }

    proptest! {
        #[test]
        fn table_stays_consistent(ops in prop::collection::vec(op_strategy(), 1..200)) {
            let mut table = NodeTable::default();
            for op in ops {
                match op {
                    Op::Register(raw) => {
                        let before = table.find(node(raw));
                        let occupied = table.iter().map(|(h, _)| h.index()).collect::<Vec<_>>();
                        let handle = table.register(node(raw), file(1)).unwrap();
                        match before {
                            Some(existing) => prop_assert_eq!(existing, handle),
                            None => {
                                let expected = (0..).find(|i| !occupied.contains(i)).unwrap();
                                prop_assert_eq!(handle.index(), expected);
                            }
                        }
                    }
                    Op::Unregister(index) => {
                        table.unregister(NodeHandle::new(index));
                    }
                    Op::UnregisterRef(raw) => {
                        table.unregister_by_reference(node(raw));
                    }
                }
                prop_assert!(table.check_consistency().is_ok());
            }
        }
    }
}
