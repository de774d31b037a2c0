//! Result codes and the last-error channel.

use crate::session::session;
use arbor_core::RegistryError;
use arbor_storage::StorageError;
use std::ffi::{c_char, CString};
use thiserror::Error;

/// Result code for FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArborResult {
    /// Operation succeeded.
    Ok = 0,
    /// Generic error.
    Error = 1,
    /// Invalid argument.
    InvalidArgument = 2,
    /// Path lookup found nothing.
    NotFound = 3,
    /// File or node table is full.
    CapacityExceeded = 4,
    /// Handle out of range or naming an empty file slot.
    InvalidHandle = 5,
    /// Handle no longer names the presented node.
    StaleHandle = 6,
    /// Null node reference.
    NullObject = 7,
    /// Node is not a folder.
    NotAFolder = 8,
    /// The root cannot be deleted.
    CannotDeleteRoot = 9,
    /// The file is open read-only.
    ReadOnly = 10,
    /// The path is already open.
    AlreadyOpen = 11,
    /// Registry invariant violated.
    Internal = 12,
    /// The library has been shut down.
    Closed = 13,
    /// The storage engine failed.
    Storage = 14,
    /// Null pointer argument.
    NullPointer = 15,
    /// `arbor_init` has not been called.
    NotInitialized = 16,
}

impl ArborResult {
    /// Returns true if the result indicates success.
    pub fn is_ok(self) -> bool {
        self == ArborResult::Ok
    }

    /// Returns true if the result indicates an error.
    pub fn is_err(self) -> bool {
        self != ArborResult::Ok
    }
}

impl From<&RegistryError> for ArborResult {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::CapacityExceeded { .. } => Self::CapacityExceeded,
            RegistryError::InvalidHandle { .. } => Self::InvalidHandle,
            RegistryError::StaleHandle { .. } => Self::StaleHandle,
            RegistryError::NullObject => Self::NullObject,
            RegistryError::NotAFolder { .. } => Self::NotAFolder,
            RegistryError::NotFound { .. } => Self::NotFound,
            RegistryError::CannotDeleteRoot => Self::CannotDeleteRoot,
            RegistryError::ReadOnlyViolation | RegistryError::Storage(StorageError::ReadOnly) => {
                Self::ReadOnly
            }
            RegistryError::AlreadyOpen { .. } => Self::AlreadyOpen,
            RegistryError::InternalInconsistency { .. } => Self::Internal,
            RegistryError::InvalidArgument { .. } => Self::InvalidArgument,
            RegistryError::Closed => Self::Closed,
            RegistryError::Storage(_) => Self::Storage,
        }
    }
}

/// Failures raised at the boundary, before or around registry calls.
#[derive(Debug, Error)]
pub(crate) enum FfiError {
    /// The registry refused the operation.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A required pointer was null.
    #[error("null pointer argument: {0}")]
    NullPointer(&'static str),

    /// A string argument was not UTF-8.
    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    /// `arbor_init` was not called.
    #[error("the library is not initialized; call arbor_init first")]
    NotInitialized,
}

impl From<StorageError> for FfiError {
    fn from(err: StorageError) -> Self {
        Self::Registry(err.into())
    }
}

impl FfiError {
    /// Returns the result code reported to the host.
    pub(crate) fn code(&self) -> ArborResult {
        match self {
            Self::Registry(err) => err.into(),
            Self::NullPointer(_) => ArborResult::NullPointer,
            Self::InvalidUtf8(_) => ArborResult::InvalidArgument,
            Self::NotInitialized => ArborResult::NotInitialized,
        }
    }
}

/// Returns the message of the last failed call, once.
///
/// Returns null when the last call succeeded or the message was already
/// retrieved.
///
/// # Safety
///
/// The returned pointer is valid until the next FFI call.
#[no_mangle]
pub extern "C" fn arbor_last_error() -> *const c_char {
    let mut session = session().lock();
    let message = session
        .status
        .take()
        .map(|message| CString::new(message.replace('\0', " ")).unwrap_or_default());
    session.returned_error = message;
    match &session.returned_error {
        Some(message) => message.as_ptr(),
        None => std::ptr::null(),
    }
}

/// Clears any pending error message.
#[no_mangle]
pub extern "C" fn arbor_clear_error() {
    let mut session = session().lock();
    session.status.reset();
    session.returned_error = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::record_failure;
    use serial_test::serial;
    use std::ffi::CStr;

    #[test]
    fn result_codes() {
        assert_eq!(ArborResult::Ok as i32, 0);
        assert_eq!(ArborResult::StaleHandle as i32, 6);
        assert!(ArborResult::Ok.is_ok());
        assert!(ArborResult::Error.is_err());
    }

    #[test]
    fn registry_errors_map_to_codes() {
        assert_eq!(
            ArborResult::from(&RegistryError::StaleHandle { handle: 1 }),
            ArborResult::StaleHandle
        );
        assert_eq!(
            ArborResult::from(&RegistryError::Storage(StorageError::ReadOnly)),
            ArborResult::ReadOnly
        );
        assert_eq!(
            FfiError::NullPointer("path").code(),
            ArborResult::NullPointer
        );
    }

    #[test]
    #[serial]
    fn last_error_is_consumed_once() {
        arbor_clear_error();
        assert!(arbor_last_error().is_null());

        let code = record_failure(&FfiError::NotInitialized);
        assert_eq!(code, ArborResult::NotInitialized);

        let ptr = arbor_last_error();
        assert!(!ptr.is_null());
        // Safety: the pointer stays valid until the next call
        let message = unsafe { CStr::from_ptr(ptr) };
        assert!(message.to_str().unwrap().contains("arbor_init"));

        assert!(arbor_last_error().is_null());
    }
}
