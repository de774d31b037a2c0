//! FFI-safe node description.

use crate::buffer::ArborString;
use arbor_core::NodeDescription;

/// Description of a node.
///
/// Memory owned by Rust. Call `arbor_free_description` to release.
#[repr(C)]
#[derive(Debug)]
pub struct ArborDescription {
    /// Node name.
    pub name: ArborString,
    /// Path from the root.
    pub full_name: ArborString,
    /// Storage class name.
    pub storage: ArborString,
    /// Trait name, or the link file of a virtual folder.
    pub trait_name: ArborString,
    /// Type label (`Folder`, `Integer`, ...).
    pub type_label: ArborString,
    /// Compression coder name.
    pub encoder: ArborString,
    /// Compression coder parameters.
    pub coder_param: ArborString,
    /// Virtual folder load message.
    pub message: ArborString,
    /// Dimension lengths.
    pub dims: *mut u64,
    /// Number of dimensions.
    pub ndims: usize,
    /// Compression ratio; NaN without compressed data.
    pub ratio: f64,
    /// Size in bytes, or -1.
    pub size: i64,
    /// True for typed arrays.
    pub is_array: bool,
    /// False for a broken virtual folder or unknown node.
    pub good: bool,
    /// Hidden flag.
    pub hidden: bool,
}

impl ArborDescription {
    /// Converts a core description.
    pub fn from_description(description: &NodeDescription) -> Self {
        let dims: Box<[u64]> = description.dims.clone().into_boxed_slice();
        let ndims = dims.len();
        Self {
            name: ArborString::new(&description.name),
            full_name: ArborString::new(&description.full_name),
            storage: ArborString::new(&description.storage),
            trait_name: ArborString::new(&description.trait_name),
            type_label: ArborString::new(description.type_label.as_str()),
            encoder: ArborString::new(&description.encoder),
            coder_param: ArborString::new(&description.coder_param),
            message: ArborString::new(&description.message),
            dims: Box::into_raw(dims).cast(),
            ndims,
            ratio: description.ratio,
            size: description.size,
            is_array: description.is_array,
            good: description.good,
            hidden: description.hidden,
        }
    }

    /// Views the dimensions.
    ///
    /// # Safety
    ///
    /// The description must be valid.
    pub unsafe fn dims(&self) -> &[u64] {
        if self.dims.is_null() {
            return &[];
        }
        std::slice::from_raw_parts(self.dims, self.ndims)
    }
}

/// Frees a description allocated by Arbor.
///
/// # Safety
///
/// The description must have been filled by `arbor_node_describe`.
#[no_mangle]
pub unsafe extern "C" fn arbor_free_description(description: ArborDescription) {
    for string in [
        description.name,
        description.full_name,
        description.storage,
        description.trait_name,
        description.type_label,
        description.encoder,
        description.coder_param,
        description.message,
    ] {
        string.release();
    }
    if !description.dims.is_null() {
        drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
            description.dims,
            description.ndims,
        )));
    }
}
