//! Node FFI functions.
//!
//! Every node is addressed by a handle plus the node token it was issued
//! with. Functions that issue a handle write the token through `out_node`
//! and return the handle, or -1 with the token set to 0.

use crate::args::{file_arg, host_handle, node_arg, out_arg, str_arg};
use crate::buffer::{ArborString, ArborStringList};
use crate::error::{ArborResult, FfiError};
use crate::session::{to_code, with_registry};
use crate::types::ArborDescription;
use arbor_core::{Issued, NodeSpec, TableKind};
use std::ffi::c_char;

/// Hands an issued node to the host.
///
/// # Safety
///
/// `out_node` must be valid for writes.
unsafe fn hand_out(issued: Option<Issued>, out_node: *mut u64) -> Result<i32, FfiError> {
    match issued {
        Some(issued) => {
            let handle = host_handle(issued.handle.index(), TableKind::Node)?;
            *out_node = issued.node.as_u64();
            Ok(handle)
        }
        None => Ok(-1),
    }
}

/// Clears an out token before a call so failures leave it null.
unsafe fn clear_token(out_node: *mut u64) {
    if !out_node.is_null() {
        *out_node = 0;
    }
}

/// Returns the root folder of a file.
///
/// # Returns
///
/// The node handle, or -1 on failure.
///
/// # Safety
///
/// `out_node` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn arbor_node_root(file: i32, out_node: *mut u64) -> i32 {
    clear_token(out_node);
    with_registry(|registry| {
        out_arg(out_node, "out_node")?;
        let file = file_arg(file)?;
        let issued = registry.root(file)?;
        hand_out(Some(issued), out_node)
    })
    .unwrap_or(-1)
}

/// Resolves a slash-separated path below a folder.
///
/// With `silent`, a missing node returns -1 without recording an error.
///
/// # Safety
///
/// `path` must be a valid null-terminated UTF-8 string and `out_node` a
/// valid pointer.
#[no_mangle]
pub unsafe extern "C" fn arbor_node_index(
    handle: i32,
    node: u64,
    path: *const c_char,
    silent: bool,
    out_node: *mut u64,
) -> i32 {
    clear_token(out_node);
    with_registry(|registry| {
        out_arg(out_node, "out_node")?;
        let (handle, node) = node_arg(registry, handle, node)?;
        let path = str_arg(path, "path")?;
        let issued = registry.child_by_path(handle, node, path, silent)?;
        hand_out(issued, out_node)
    })
    .unwrap_or(-1)
}

/// Returns the parent folder of a node.
///
/// A root has no parent: -1 is returned without recording an error.
///
/// # Safety
///
/// `out_node` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn arbor_node_parent(handle: i32, node: u64, out_node: *mut u64) -> i32 {
    clear_token(out_node);
    with_registry(|registry| {
        out_arg(out_node, "out_node")?;
        let (handle, node) = node_arg(registry, handle, node)?;
        let issued = registry.parent_of(handle, node)?;
        hand_out(issued, out_node)
    })
    .unwrap_or(-1)
}

/// Lists the child names of a folder.
///
/// # Safety
///
/// `out_list` must be a valid pointer. Free the list with
/// `arbor_free_string_list`.
#[no_mangle]
pub unsafe extern "C" fn arbor_node_list_names(
    handle: i32,
    node: u64,
    include_hidden: bool,
    out_list: *mut ArborStringList,
) -> ArborResult {
    to_code(with_registry(|registry| {
        out_arg(out_list, "out_list")?;
        *out_list = ArborStringList::empty();
        let (handle, node) = node_arg(registry, handle, node)?;
        let names = registry.list_names(handle, node, include_hidden)?;
        *out_list = ArborStringList::from_strings(&names);
        Ok(())
    }))
}

/// Returns a node's name, or its full path when `full` is set.
///
/// # Safety
///
/// `out` must be a valid pointer. Free the string with `arbor_free_string`.
#[no_mangle]
pub unsafe extern "C" fn arbor_node_name(
    handle: i32,
    node: u64,
    full: bool,
    out: *mut ArborString,
) -> ArborResult {
    to_code(with_registry(|registry| {
        out_arg(out, "out")?;
        *out = ArborString::empty();
        let (handle, node) = node_arg(registry, handle, node)?;
        let name = registry.name(handle, node, full)?;
        *out = ArborString::new(&name);
        Ok(())
    }))
}

/// Renames a node.
///
/// # Safety
///
/// `name` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn arbor_node_rename(handle: i32, node: u64, name: *const c_char) -> ArborResult {
    to_code(with_registry(|registry| {
        let (handle, node) = node_arg(registry, handle, node)?;
        let name = str_arg(name, "name")?;
        registry.rename(handle, node, name)?;
        Ok(())
    }))
}

/// Deletes a node and invalidates every handle below it.
///
/// A non-empty folder requires `force`.
#[no_mangle]
pub extern "C" fn arbor_node_delete(handle: i32, node: u64, force: bool) -> ArborResult {
    to_code(with_registry(|registry| {
        let (handle, node) = node_arg(registry, handle, node)?;
        registry.delete_node(handle, node, force)?;
        Ok(())
    }))
}

/// Deletes a named attribute of a node.
///
/// # Safety
///
/// `name` must be a valid null-terminated UTF-8 string.
#[no_mangle]
pub unsafe extern "C" fn arbor_node_delete_attr(
    handle: i32,
    node: u64,
    name: *const c_char,
) -> ArborResult {
    to_code(with_registry(|registry| {
        let (handle, node) = node_arg(registry, handle, node)?;
        let name = str_arg(name, "name")?;
        registry.delete_attribute(handle, node, name)?;
        Ok(())
    }))
}

/// Describes a node.
///
/// # Safety
///
/// `out` must be a valid pointer. Free the description with
/// `arbor_free_description`.
#[no_mangle]
pub unsafe extern "C" fn arbor_node_describe(
    handle: i32,
    node: u64,
    out: *mut ArborDescription,
) -> ArborResult {
    to_code(with_registry(|registry| {
        out_arg(out, "out")?;
        let (handle, node) = node_arg(registry, handle, node)?;
        let description = registry.describe(handle, node)?;
        out.write(ArborDescription::from_description(&description));
        Ok(())
    }))
}

/// Adds a child to a folder.
///
/// # Arguments
///
/// * `storage` - Storage alias such as `folder`, `label`, `int32` or `stream`
/// * `compress` - Compression option such as `ZIP.max`, or null
/// * `dims` - Array dimensions, or null when `ndims` is 0
///
/// # Returns
///
/// The handle of the new node, or -1 on failure.
///
/// # Safety
///
/// String arguments must be valid null-terminated UTF-8, `dims` must point
/// to `ndims` values and `out_node` must be a valid pointer.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn arbor_node_add(
    handle: i32,
    node: u64,
    name: *const c_char,
    storage: *const c_char,
    compress: *const c_char,
    dims: *const u64,
    ndims: usize,
    out_node: *mut u64,
) -> i32 {
    clear_token(out_node);
    with_registry(|registry| {
        out_arg(out_node, "out_node")?;
        let (handle, node) = node_arg(registry, handle, node)?;
        let name = str_arg(name, "name")?;
        let storage = str_arg(storage, "storage")?;
        let dims = match (dims.is_null(), ndims) {
            (_, 0) => &[][..],
            (true, _) => return Err(FfiError::NullPointer("dims")),
            (false, n) => std::slice::from_raw_parts(dims, n),
        };
        let mut spec = NodeSpec::parse(storage, dims)?;
        if !compress.is_null() {
            spec = spec.compressed(str_arg(compress, "compress")?);
        }
        let issued = registry.add_node(handle, node, name, spec)?;
        hand_out(Some(issued), out_node)
    })
    .unwrap_or(-1)
}

/// Adds a virtual folder that links another container.
///
/// `link` is resolved relative to the directory of the owning file.
///
/// # Safety
///
/// String arguments must be valid null-terminated UTF-8 and `out_node` a
/// valid pointer.
#[no_mangle]
pub unsafe extern "C" fn arbor_node_add_vfolder(
    handle: i32,
    node: u64,
    name: *const c_char,
    link: *const c_char,
    out_node: *mut u64,
) -> i32 {
    clear_token(out_node);
    with_registry(|registry| {
        out_arg(out_node, "out_node")?;
        let (handle, node) = node_arg(registry, handle, node)?;
        let name = str_arg(name, "name")?;
        let link = str_arg(link, "link")?.to_string();
        let issued = registry.add_node(handle, node, name, NodeSpec::VirtualFolder { link })?;
        hand_out(Some(issued), out_node)
    })
    .unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{arbor_file_close, arbor_file_create, arbor_file_open};
    use crate::session::{arbor_init, arbor_shutdown};
    use crate::{arbor_free_description, arbor_free_string, arbor_free_string_list, arbor_last_error};
    use serial_test::serial;
    use std::ffi::{CStr, CString};
    use tempfile::TempDir;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    fn last_error() -> Option<String> {
        let ptr = arbor_last_error();
        if ptr.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string())
    }

    struct Node {
        handle: i32,
        token: u64,
    }

    fn add(parent: &Node, name: &str, storage: &str) -> Node {
        let name = c(name);
        let storage = c(storage);
        let mut token = 0;
        let handle = unsafe {
            arbor_node_add(
                parent.handle,
                parent.token,
                name.as_ptr(),
                storage.as_ptr(),
                std::ptr::null(),
                std::ptr::null(),
                0,
                &mut token,
            )
        };
        assert!(handle >= 0, "add failed: {:?}", last_error());
        Node { handle, token }
    }

    fn root(file: i32) -> Node {
        let mut token = 0;
        let handle = unsafe { arbor_node_root(file, &mut token) };
        assert!(handle >= 0);
        Node { handle, token }
    }

    fn names(node: &Node, include_hidden: bool) -> Vec<String> {
        let mut list = ArborStringList::empty();
        let code = unsafe { arbor_node_list_names(node.handle, node.token, include_hidden, &mut list) };
        assert_eq!(code, ArborResult::Ok);
        let names = unsafe { list.as_slice() }
            .iter()
            .map(|s| unsafe { s.as_str() }.unwrap().to_string())
            .collect();
        unsafe { arbor_free_string_list(list) };
        names
    }

    #[test]
    #[serial]
    fn close_makes_node_handles_stale() {
        arbor_shutdown();
        arbor_init(0);
        let dir = TempDir::new().unwrap();
        let path = c(dir.path().join("a.arbor").to_str().unwrap());

        let file = unsafe { arbor_file_create(path.as_ptr(), false) };
        assert!(file >= 0);
        let root = root(file);
        let folder = add(&root, "folder", "folder");
        let array = add(&folder, "array", "int32");
        assert_eq!((root.handle, folder.handle, array.handle), (0, 1, 2));

        assert_eq!(arbor_file_close(file), ArborResult::Ok);
        for node in [&root, &folder, &array] {
            let mut out = ArborString::empty();
            let code = unsafe { arbor_node_name(node.handle, node.token, false, &mut out) };
            assert_eq!(code, ArborResult::StaleHandle);
            assert!(out.is_null());
        }

        let message = last_error().unwrap();
        assert!(message.contains("invalid"), "{message}");
        assert_eq!(last_error(), None);
        arbor_shutdown();
    }

    #[test]
    #[serial]
    fn navigation_and_names() {
        arbor_shutdown();
        arbor_init(0);
        let dir = TempDir::new().unwrap();
        let path = c(dir.path().join("n.arbor").to_str().unwrap());

        let file = unsafe { arbor_file_create(path.as_ptr(), false) };
        let root = root(file);
        let folder = add(&root, "genotype", "folder");
        add(&folder, "data", "bit2");

        let lookup = c("genotype/data");
        let mut token = 0;
        let data = unsafe { arbor_node_index(root.handle, root.token, lookup.as_ptr(), false, &mut token) };
        assert!(data >= 0);
        let data = Node { handle: data, token };

        let mut out = ArborString::empty();
        assert_eq!(
            unsafe { arbor_node_name(data.handle, data.token, true, &mut out) },
            ArborResult::Ok
        );
        assert_eq!(unsafe { out.as_str() }, Some("genotype/data"));
        unsafe { arbor_free_string(out) };

        let mut parent = 0;
        let handle = unsafe { arbor_node_parent(data.handle, data.token, &mut parent) };
        assert_eq!(handle, folder.handle);
        assert_eq!(parent, folder.token);

        let mut none = 7;
        assert_eq!(unsafe { arbor_node_parent(root.handle, root.token, &mut none) }, -1);
        assert_eq!(none, 0);
        assert_eq!(last_error(), None);

        let missing = c("nope");
        let mut token = 7;
        assert_eq!(
            unsafe { arbor_node_index(root.handle, root.token, missing.as_ptr(), true, &mut token) },
            -1
        );
        assert_eq!(token, 0);
        assert_eq!(last_error(), None);
        assert_eq!(
            unsafe { arbor_node_index(root.handle, root.token, missing.as_ptr(), false, &mut token) },
            -1
        );
        assert!(last_error().unwrap().contains("nope"));

        assert_eq!(names(&root, true), vec!["genotype"]);
        arbor_shutdown();
    }

    #[test]
    #[serial]
    fn delete_cascades_over_subtree() {
        arbor_shutdown();
        arbor_init(0);
        let dir = TempDir::new().unwrap();
        let path = c(dir.path().join("d.arbor").to_str().unwrap());

        let file = unsafe { arbor_file_create(path.as_ptr(), false) };
        let root = root(file);
        let doomed = add(&root, "doomed", "folder");
        let leaf = add(&doomed, "leaf", "label");
        let sibling = add(&root, "sibling", "label");

        assert_eq!(arbor_node_delete(doomed.handle, doomed.token, false), ArborResult::Storage);
        assert_eq!(arbor_node_delete(doomed.handle, doomed.token, true), ArborResult::Ok);
        assert_eq!(arbor_node_delete(leaf.handle, leaf.token, true), ArborResult::StaleHandle);
        assert_eq!(
            arbor_node_delete(root.handle, root.token, true),
            ArborResult::CannotDeleteRoot
        );
        assert_eq!(names(&root, true), vec!["sibling"]);

        let mut description = std::mem::MaybeUninit::<ArborDescription>::uninit();
        let code = unsafe { arbor_node_describe(sibling.handle, sibling.token, description.as_mut_ptr()) };
        assert_eq!(code, ArborResult::Ok);
        let description = unsafe { description.assume_init() };
        assert_eq!(unsafe { description.type_label.as_str() }, Some("Label"));
        assert!(description.good);
        unsafe { arbor_free_description(description) };
        arbor_shutdown();
    }

    #[test]
    #[serial]
    fn read_only_file_refuses_writes() {
        arbor_shutdown();
        arbor_init(0);
        let dir = TempDir::new().unwrap();
        let path = c(dir.path().join("ro.arbor").to_str().unwrap());

        let file = unsafe { arbor_file_create(path.as_ptr(), false) };
        let root = root(file);
        add(&root, "x", "label");
        assert_eq!(arbor_file_close(file), ArborResult::Ok);

        let file = unsafe { arbor_file_open(path.as_ptr(), true, false) };
        assert!(file >= 0);
        let root = self::root(file);
        let renamed = c("y");
        let mut token = 0;
        let lookup = c("x");
        let x = unsafe { arbor_node_index(root.handle, root.token, lookup.as_ptr(), false, &mut token) };
        assert_eq!(
            unsafe { arbor_node_rename(x, token, renamed.as_ptr()) },
            ArborResult::ReadOnly
        );
        assert_eq!(names(&root, false), vec!["x"]);
        arbor_shutdown();
    }

    #[test]
    #[serial]
    fn bad_arguments() {
        arbor_shutdown();
        let mut token = 5;
        assert_eq!(unsafe { arbor_node_root(0, &mut token) }, -1);
        assert_eq!(token, 0);
        assert!(last_error().unwrap().contains("arbor_init"));

        arbor_init(0);
        assert_eq!(unsafe { arbor_node_root(0, std::ptr::null_mut()) }, -1);
        assert!(last_error().unwrap().contains("out_node"));
        assert_eq!(arbor_node_delete(0, 0, false), ArborResult::InvalidHandle);
        assert_eq!(arbor_node_delete(-1, 3, false), ArborResult::InvalidHandle);
        assert_eq!(arbor_node_delete(40, 3, false), ArborResult::InvalidHandle);

        let dir = TempDir::new().unwrap();
        let path = c(dir.path().join("b.arbor").to_str().unwrap());
        let file = unsafe { arbor_file_create(path.as_ptr(), false) };
        let root = root(file);
        assert_eq!(arbor_node_delete(40, 0, false), ArborResult::InvalidHandle);
        assert_eq!(arbor_node_delete(root.handle, 0, false), ArborResult::NullObject);
        arbor_shutdown();
    }
}
