//! Process-wide registry session and its lifecycle.

use crate::error::{ArborResult, FfiError};
use arbor_core::{Registry, RegistryConfig, RegistryError, StatusChannel};
use arbor_storage::DocumentEngine;
use parking_lot::Mutex;
use std::ffi::{c_char, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;
use tracing::{info, warn};

/// State shared by every FFI call.
///
/// The mutex serializes calls from different host threads.
pub(crate) struct Session {
    pub(crate) registry: Option<Registry<DocumentEngine>>,
    pub(crate) status: StatusChannel,
    /// Backing storage for the pointer handed out by `arbor_last_error`.
    pub(crate) returned_error: Option<CString>,
}

static SESSION: OnceLock<Mutex<Session>> = OnceLock::new();

pub(crate) fn session() -> &'static Mutex<Session> {
    SESSION.get_or_init(|| {
        Mutex::new(Session {
            registry: None,
            status: StatusChannel::new(),
            returned_error: None,
        })
    })
}

/// Runs one boundary call against the registry.
///
/// Resets the status channel first. Failures, including panics, are
/// recorded there and turned into a result code.
pub(crate) fn with_registry<T>(
    op: impl FnOnce(&mut Registry<DocumentEngine>) -> Result<T, FfiError>,
) -> Result<T, ArborResult> {
    let mut guard = session().lock();
    let Session {
        registry,
        status,
        returned_error,
    } = &mut *guard;
    status.reset();
    *returned_error = None;

    let outcome = match registry.as_mut() {
        None => Err(FfiError::NotInitialized),
        Some(registry) => match catch_unwind(AssertUnwindSafe(|| op(registry))) {
            Ok(result) => result,
            Err(_) => Err(RegistryError::internal("panic inside a registry operation").into()),
        },
    };
    outcome.map_err(|err| {
        status.record(&err);
        err.code()
    })
}

/// Records a failure raised outside [`with_registry`].
#[cfg(test)]
pub(crate) fn record_failure(err: &FfiError) -> ArborResult {
    let mut guard = session().lock();
    guard.returned_error = None;
    guard.status.reset();
    guard.status.record(err);
    err.code()
}

/// Collapses a boundary call into a plain result code.
pub(crate) fn to_code(result: Result<(), ArborResult>) -> ArborResult {
    match result {
        Ok(()) => ArborResult::Ok,
        Err(code) => code,
    }
}

/// Creates the process-wide registry.
///
/// Calling it again while initialized is a no-op.
///
/// # Arguments
///
/// * `max_files` - Number of file slots, or 0 for the default of 256
#[no_mangle]
pub extern "C" fn arbor_init(max_files: u32) -> ArborResult {
    let mut guard = session().lock();
    guard.status.reset();
    guard.returned_error = None;
    if guard.registry.as_ref().is_some_and(|registry| !registry.is_closed()) {
        return ArborResult::Ok;
    }

    let mut config = RegistryConfig::default();
    if max_files > 0 {
        config = config.max_files(max_files as usize);
    }
    info!(max_files = config.max_files, "arbor session started");
    guard.registry = Some(Registry::new(DocumentEngine::new(), config));
    ArborResult::Ok
}

/// Closes every open file and drops the registry.
///
/// All handles become invalid. `arbor_init` may be called again afterwards.
#[no_mangle]
pub extern "C" fn arbor_shutdown() -> ArborResult {
    let mut guard = session().lock();
    guard.status.reset();
    guard.returned_error = None;
    let Some(mut registry) = guard.registry.take() else {
        return ArborResult::Ok;
    };
    match registry.shutdown() {
        Ok(()) => {
            info!("arbor session ended");
            ArborResult::Ok
        }
        Err(err) => {
            warn!(error = %err, "arbor session ended with errors");
            let code = ArborResult::from(&err);
            guard.status.record(&err);
            code
        }
    }
}

/// Returns the library version as a static null-terminated string.
#[no_mangle]
pub extern "C" fn arbor_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr().cast()
}
