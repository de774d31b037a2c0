//! Decoding of boundary arguments.

use crate::error::FfiError;
use arbor_core::{FileHandle, NodeHandle, Registry, RegistryError, TableKind};
use arbor_storage::{DocumentEngine, NodeRef};
use std::ffi::{c_char, CStr};

/// Reads a null-terminated UTF-8 argument.
///
/// # Safety
///
/// `ptr` must be null or point to a null-terminated string that outlives `'a`.
pub(crate) unsafe fn str_arg<'a>(ptr: *const c_char, what: &'static str) -> Result<&'a str, FfiError> {
    if ptr.is_null() {
        return Err(FfiError::NullPointer(what));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| FfiError::InvalidUtf8(what))
}

/// Converts a host file handle.
pub(crate) fn file_arg(handle: i32) -> Result<FileHandle, FfiError> {
    usize::try_from(handle)
        .map(FileHandle::new)
        .map_err(|_| RegistryError::invalid_handle(TableKind::File, handle).into())
}

/// Converts a host node handle and its node token; a zero token is null.
///
/// A handle outside the node table is reported before a null token.
pub(crate) fn node_arg(
    registry: &Registry<DocumentEngine>,
    handle: i32,
    node: u64,
) -> Result<(NodeHandle, NodeRef), FfiError> {
    let index = usize::try_from(handle)
        .ok()
        .filter(|&index| index < registry.node_bounds())
        .ok_or_else(|| RegistryError::invalid_handle(TableKind::Node, handle))?;
    let node = NodeRef::from_raw(node).ok_or(RegistryError::NullObject)?;
    Ok((NodeHandle::new(index), node))
}

/// Converts a slot index to a host handle.
pub(crate) fn host_handle(index: usize, table: TableKind) -> Result<i32, FfiError> {
    i32::try_from(index).map_err(|_| {
        RegistryError::internal(format!("{table} handle {index} does not fit a host integer")).into()
    })
}

/// Rejects a null out pointer.
pub(crate) fn out_arg<T>(ptr: *mut T, what: &'static str) -> Result<(), FfiError> {
    if ptr.is_null() {
        return Err(FfiError::NullPointer(what));
    }
    Ok(())
}
