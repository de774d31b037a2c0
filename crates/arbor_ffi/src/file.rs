//! File FFI functions.

use crate::args::{file_arg, host_handle, str_arg};
use crate::error::ArborResult;
use crate::session::{to_code, with_registry};
use arbor_core::TableKind;
use std::ffi::c_char;
use std::path::Path;

/// Creates a new container file.
///
/// # Arguments
///
/// * `path` - Null-terminated path of the file
/// * `allow_duplicate` - Allow a path that is already open
///
/// # Returns
///
/// The file handle, or -1 on failure (see `arbor_last_error`).
///
/// # Safety
///
/// `path` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn arbor_file_create(path: *const c_char, allow_duplicate: bool) -> i32 {
    with_registry(|registry| {
        let path = str_arg(path, "path")?;
        let handle = registry.create_file(Path::new(path), allow_duplicate)?;
        host_handle(handle.index(), TableKind::File)
    })
    .unwrap_or(-1)
}

/// Opens an existing container file.
///
/// # Arguments
///
/// * `path` - Null-terminated path of the file
/// * `read_only` - Open without write access
/// * `allow_duplicate` - Allow a path that is already open
///
/// # Returns
///
/// The file handle, or -1 on failure. A failed open reports the engine
/// diagnostics after a `Log:` line.
///
/// # Safety
///
/// `path` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn arbor_file_open(
    path: *const c_char,
    read_only: bool,
    allow_duplicate: bool,
) -> i32 {
    with_registry(|registry| {
        let path = str_arg(path, "path")?;
        let handle = registry.open_file(Path::new(path), read_only, allow_duplicate)?;
        host_handle(handle.index(), TableKind::File)
    })
    .unwrap_or(-1)
}

/// Closes a file. Every node handle into the file becomes stale.
#[no_mangle]
pub extern "C" fn arbor_file_close(file: i32) -> ArborResult {
    to_code(with_registry(|registry| {
        registry.close_file(file_arg(file)?)?;
        Ok(())
    }))
}

/// Writes pending changes of a file to disk.
#[no_mangle]
pub extern "C" fn arbor_file_sync(file: i32) -> ArborResult {
    to_code(with_registry(|registry| {
        registry.sync_file(file_arg(file)?)?;
        Ok(())
    }))
}

/// Returns the file size in bytes, or -1 on failure.
#[no_mangle]
pub extern "C" fn arbor_file_size(file: i32) -> i64 {
    with_registry(|registry| {
        let size = registry.file_size(file_arg(file)?)?;
        Ok(i64::try_from(size).unwrap_or(i64::MAX))
    })
    .unwrap_or(-1)
}

/// Returns the number of unreclaimed fragments, or -1 on failure.
#[no_mangle]
pub extern "C" fn arbor_file_fragments(file: i32) -> i64 {
    with_registry(|registry| {
        let count = registry.fragment_count(file_arg(file)?)?;
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    })
    .unwrap_or(-1)
}

/// Rewrites a file without fragments.
#[no_mangle]
pub extern "C" fn arbor_file_compact(file: i32) -> ArborResult {
    to_code(with_registry(|registry| {
        registry.compact_file(file_arg(file)?)?;
        Ok(())
    }))
}
