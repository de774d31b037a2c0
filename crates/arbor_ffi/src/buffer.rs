//! String types for FFI.

use std::ffi::{c_char, CStr, CString};

/// A string for FFI.
///
/// Null-terminated UTF-8 string. Memory owned by Rust.
/// Call `arbor_free_string` to release.
#[repr(C)]
#[derive(Debug)]
pub struct ArborString {
    /// Pointer to null-terminated string.
    pub ptr: *mut c_char,
    /// Length (not including null terminator).
    pub len: usize,
}

impl ArborString {
    /// Creates a new FFI string; interior NUL bytes are dropped.
    pub fn new(s: &str) -> Self {
        let cstring = CString::new(s.replace('\0', "")).unwrap_or_default();
        let len = cstring.as_bytes().len();
        Self {
            ptr: cstring.into_raw(),
            len,
        }
    }

    /// Creates an empty string.
    pub fn empty() -> Self {
        Self {
            ptr: std::ptr::null_mut(),
            len: 0,
        }
    }

    /// Returns true if the string is null.
    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Converts to a Rust string slice.
    ///
    /// # Safety
    ///
    /// The pointer must be valid.
    pub unsafe fn as_str(&self) -> Option<&str> {
        if self.ptr.is_null() {
            return None;
        }
        CStr::from_ptr(self.ptr).to_str().ok()
    }

    /// Releases the string.
    ///
    /// # Safety
    ///
    /// The string must have been created by [`ArborString::new`] and not freed.
    pub(crate) unsafe fn release(self) {
        if !self.ptr.is_null() {
            drop(CString::from_raw(self.ptr));
        }
    }
}

/// Frees a string allocated by Arbor.
///
/// # Safety
///
/// The string must have been allocated by Arbor FFI functions.
#[no_mangle]
pub unsafe extern "C" fn arbor_free_string(string: ArborString) {
    string.release();
}

/// A list of strings for FFI.
///
/// Memory owned by Rust. Call `arbor_free_string_list` to release.
#[repr(C)]
#[derive(Debug)]
pub struct ArborStringList {
    /// Pointer to the first string.
    pub items: *mut ArborString,
    /// Number of strings.
    pub len: usize,
}

impl ArborStringList {
    /// Creates a list from Rust strings.
    pub fn from_strings<S: AsRef<str>>(strings: &[S]) -> Self {
        let items: Box<[ArborString]> = strings
            .iter()
            .map(|s| ArborString::new(s.as_ref()))
            .collect();
        let len = items.len();
        Self {
            items: Box::into_raw(items).cast(),
            len,
        }
    }

    /// Creates an empty list.
    pub fn empty() -> Self {
        Self {
            items: std::ptr::null_mut(),
            len: 0,
        }
    }

    /// Views the strings.
    ///
    /// # Safety
    ///
    /// The list must be valid.
    pub unsafe fn as_slice(&self) -> &[ArborString] {
        if self.items.is_null() {
            return &[];
        }
        std::slice::from_raw_parts(self.items, self.len)
    }
}

/// Frees a string list allocated by Arbor.
///
/// # Safety
///
/// The list must have been allocated by Arbor FFI functions.
#[no_mangle]
pub unsafe extern "C" fn arbor_free_string_list(list: ArborStringList) {
    if list.items.is_null() {
        return;
    }
    let items = Box::from_raw(std::ptr::slice_from_raw_parts_mut(list.items, list.len));
    for item in items.into_vec() {
        item.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trip() {
        let string = ArborString::new("hello");
        assert!(!string.is_null());
        assert_eq!(string.len, 5);

        // Safety: we just created it
        assert_eq!(unsafe { string.as_str() }, Some("hello"));
        unsafe { arbor_free_string(string) };
    }

    #[test]
    fn interior_nul_is_dropped() {
        let string = ArborString::new("a\0b");
        assert_eq!(unsafe { string.as_str() }, Some("ab"));
        unsafe { arbor_free_string(string) };
    }

    #[test]
    fn string_list() {
        let list = ArborStringList::from_strings(&["x", "y", "z"]);
        assert_eq!(list.len, 3);

        // Safety: we just created it
        let names: Vec<&str> = unsafe { list.as_slice() }
            .iter()
            .map(|s| unsafe { s.as_str() }.unwrap())
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        unsafe { arbor_free_string_list(list) };
    }

    #[test]
    fn empty_list() {
        let list = ArborStringList::from_strings::<&str>(&[]);
        assert_eq!(list.len, 0);
        unsafe { arbor_free_string_list(list) };
        unsafe { arbor_free_string_list(ArborStringList::empty()) };
    }
}
