//! # Arbor FFI
//!
//! Stable C ABI over the Arbor handle registry.
//!
//! This crate provides:
//! - C-compatible function exports over integer handles
//! - Memory ownership conventions for strings and descriptions
//! - Error code mapping and a single-read last-error message
//!
//! ## Usage
//!
//! ```c
//! arbor_init(0);
//! int32_t file = arbor_file_open("data.arbor", true, false);
//! uint64_t root_node;
//! int32_t root = arbor_node_root(file, &root_node);
//! if (root < 0) {
//!     const char *message = arbor_last_error();
//! }
//! arbor_file_close(file);
//! arbor_shutdown();
//! ```
//!
//! A node handle is only meaningful together with the node token written
//! alongside it. Closing a file or deleting a folder makes every handle
//! below it stale, even when the slot is later reused.

#![warn(missing_docs)]

mod args;
mod buffer;
mod error;
mod file;
mod node;
mod session;
mod types;

pub use buffer::{arbor_free_string, arbor_free_string_list, ArborString, ArborStringList};
pub use error::{arbor_clear_error, arbor_last_error, ArborResult};
pub use file::{
    arbor_file_close, arbor_file_compact, arbor_file_create, arbor_file_fragments,
    arbor_file_open, arbor_file_size, arbor_file_sync,
};
pub use node::{
    arbor_node_add, arbor_node_add_vfolder, arbor_node_delete, arbor_node_delete_attr,
    arbor_node_describe, arbor_node_index, arbor_node_list_names, arbor_node_name,
    arbor_node_parent, arbor_node_rename, arbor_node_root,
};
pub use session::{arbor_init, arbor_shutdown, arbor_version};
pub use types::{arbor_free_description, ArborDescription};
