//! Node kinds, element types and node descriptions.

use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};

/// Concrete kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A plain folder.
    Folder,
    /// A folder whose content comes from another container file.
    VirtualFolder,
    /// A node without data.
    Label,
    /// An opaque byte stream.
    Stream,
    /// A typed n-dimensional array.
    Array,
    /// A node the engine cannot interpret.
    Unknown,
}

impl NodeKind {
    /// Returns true if the node can hold children.
    #[must_use]
    pub fn is_folder(self) -> bool {
        matches!(self, Self::Folder | Self::VirtualFolder)
    }
}

/// Category of the values stored in an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCategory {
    /// Signed or unsigned integers, including bit-packed ones.
    Integer,
    /// Floating point and packed real numbers.
    Float,
    /// Character strings.
    String,
}

/// Element type of a typed array.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int24,
    UInt24,
    Int32,
    UInt32,
    Int64,
    UInt64,
    /// Unsigned bit-packed integer of the given width.
    Bit(u8),
    /// Signed bit-packed integer of the given width.
    SBit(u8),
    VlInt,
    VlUInt,
    Float32,
    Float64,
    PackedReal8,
    PackedReal16,
    PackedReal24,
    PackedReal32,
    /// Variable-length UTF-8 string.
    VStr8,
    VStr16,
    VStr32,
    /// Null-terminated UTF-8 string.
    CStr8,
    CStr16,
    CStr32,
    /// Fixed-length UTF-8 string.
    FStr8,
    FStr16,
    FStr32,
}

impl ElementType {
    /// Returns the value category of the element type.
    #[must_use]
    pub fn category(self) -> ValueCategory {
        use ElementType::*;
        match self {
            Float32 | Float64 | PackedReal8 | PackedReal16 | PackedReal24 | PackedReal32 => {
                ValueCategory::Float
            }
            VStr8 | VStr16 | VStr32 | CStr8 | CStr16 | CStr32 | FStr8 | FStr16 | FStr32 => {
                ValueCategory::String
            }
            _ => ValueCategory::Integer,
        }
    }

    /// Name of the data stream class, such as `dInt32`.
    #[must_use]
    pub fn stream_name(self) -> String {
        format!("d{}", self.trait_name())
    }

    /// Short description of the element type, such as `Int32`.
    #[must_use]
    pub fn trait_name(self) -> String {
        use ElementType::*;
        let name = match self {
            Int8 => "Int8",
            UInt8 => "UInt8",
            Int16 => "Int16",
            UInt16 => "UInt16",
            Int24 => "Int24",
            UInt24 => "UInt24",
            Int32 => "Int32",
            UInt32 => "UInt32",
            Int64 => "Int64",
            UInt64 => "UInt64",
            Bit(width) => return format!("Bit{width}"),
            SBit(width) => return format!("SBit{width}"),
            VlInt => "VL_Int",
            VlUInt => "VL_UInt",
            Float32 => "Float32",
            Float64 => "Float64",
            PackedReal8 => "PackedReal8",
            PackedReal16 => "PackedReal16",
            PackedReal24 => "PackedReal24",
            PackedReal32 => "PackedReal32",
            VStr8 => "VStr8",
            VStr16 => "VStr16",
            VStr32 => "VStr32",
            CStr8 => "CStr8",
            CStr16 => "CStr16",
            CStr32 => "CStr32",
            FStr8 => "FStr8",
            FStr16 => "FStr16",
            FStr32 => "FStr32",
        };
        name.to_string()
    }

    /// Resolves a storage alias such as `int32`, `bit2` or `character`.
    #[must_use]
    pub fn from_alias(alias: &str) -> Option<Self> {
        use ElementType::*;
        let ty = match alias {
            "int8" | "sbit8" | "char" | "raw" => Int8,
            "uint8" | "bit8" => UInt8,
            "int16" | "sbit16" => Int16,
            "uint16" | "bit16" => UInt16,
            "int24" | "sbit24" => Int24,
            "uint24" | "bit24" => UInt24,
            "int32" | "sbit32" | "int" | "integer" | "logical" | "factor" => Int32,
            "uint32" | "bit32" => UInt32,
            "int64" | "sbit64" => Int64,
            "uint64" | "bit64" => UInt64,
            "vl_int" => VlInt,
            "vl_uint" => VlUInt,
            "float32" | "float" => Float32,
            "float64" | "numeric" | "double" => Float64,
            "packedreal8" => PackedReal8,
            "packedreal16" => PackedReal16,
            "packedreal24" => PackedReal24,
            "packedreal32" => PackedReal32,
            "string" | "character" => VStr8,
            "string16" => VStr16,
            "string32" => VStr32,
            "cstring" => CStr8,
            "cstring16" => CStr16,
            "cstring32" => CStr32,
            "fstring" => FStr8,
            "fstring16" => FStr16,
            "fstring32" => FStr32,
            other => return Self::bit_alias(other),
        };
        Some(ty)
    }

    fn bit_alias(alias: &str) -> Option<Self> {
        let (signed, width) = match alias.strip_prefix("sbit") {
            Some(width) => (true, width),
            None => (false, alias.strip_prefix("bit")?),
        };
        let width: u8 = width.parse().ok()?;
        match (signed, width) {
            (false, 1..=15) => Some(Self::Bit(width)),
            (true, 2..=15) => Some(Self::SBit(width)),
            _ => None,
        }
    }
}

/// Extra semantics layered on an integer array through attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayFlavor {
    /// No extra semantics.
    #[default]
    Plain,
    /// Integers read back as booleans.
    Logical,
    /// Integers read back as factor levels.
    Factor,
}

/// Compression coder attached to a data stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coder {
    /// Coder name, such as `ZIP` or `LZ4`.
    pub name: String,
    /// Coder parameters, such as `max`.
    pub param: String,
}

impl Coder {
    /// Parses a compression option such as `ZIP.max`; an empty option means none.
    #[must_use]
    pub fn parse(option: &str) -> Option<Self> {
        if option.is_empty() {
            return None;
        }
        let (name, param) = option.split_once('.').unwrap_or((option, ""));
        Some(Self {
            name: name.to_string(),
            param: param.to_string(),
        })
    }
}

/// Size bookkeeping of a data stream, maintained by the I/O layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Compression coder, if the stream is compressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coder: Option<Coder>,
    /// Uncompressed bytes written into the stream.
    #[serde(default)]
    pub total_in: u64,
    /// Bytes stored after compression.
    #[serde(default)]
    pub total_out: u64,
}

impl Payload {
    /// Bytes the stream occupies inside the container.
    #[must_use]
    pub fn stored_size(&self) -> u64 {
        if self.coder.is_some() {
            self.total_out
        } else {
            self.total_in
        }
    }
}

/// What to create when adding a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpec {
    /// A plain folder.
    Folder,
    /// A virtual folder linking another container, relative to the owner.
    VirtualFolder {
        /// Path of the linked container.
        link: String,
    },
    /// A node without data.
    Label,
    /// An opaque byte stream.
    Stream {
        /// Compression coder, if any.
        coder: Option<Coder>,
    },
    /// A typed array.
    Array {
        /// Element type.
        element: ElementType,
        /// Dimension lengths.
        dims: Vec<u64>,
        /// Attribute-level semantics.
        flavor: ArrayFlavor,
        /// Compression coder, if any.
        coder: Option<Coder>,
    },
}

impl NodeSpec {
    /// Builds a node spec from a storage alias and dimensions.
    ///
    /// Array aliases default to one empty dimension when `dims` is empty.
    pub fn parse(storage: &str, dims: &[u64]) -> StorageResult<Self> {
        let spec = match storage {
            "folder" | "list" => Self::Folder,
            "label" => Self::Label,
            "stream" => Self::Stream { coder: None },
            alias => {
                let element = ElementType::from_alias(alias)
                    .ok_or_else(|| StorageError::UnknownStorage(alias.to_string()))?;
                let flavor = match alias {
                    "logical" => ArrayFlavor::Logical,
                    "factor" => ArrayFlavor::Factor,
                    _ => ArrayFlavor::Plain,
                };
                Self::Array {
                    element,
                    dims: if dims.is_empty() { vec![0] } else { dims.to_vec() },
                    flavor,
                    coder: None,
                }
            }
        };
        Ok(spec)
    }

    /// Attaches a compression option such as `ZIP.max` to a stream or array.
    #[must_use]
    pub fn compressed(mut self, option: &str) -> Self {
        match &mut self {
            Self::Stream { coder } | Self::Array { coder, .. } => *coder = Coder::parse(option),
            _ => {}
        }
        self
    }
}

/// Engine-side facts about a node, used to build host descriptions.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    /// Concrete kind.
    pub kind: NodeKind,
    /// Name of the data stream class (e.g. `dInt32`, `dFolder`).
    pub storage_name: String,
    /// Short description of the data (e.g. `Int32`, `Folder`).
    pub trait_name: String,
    /// Element type, for arrays.
    pub element: Option<ElementType>,
    /// Dimension lengths, for arrays.
    pub dims: Vec<u64>,
    /// Stream bookkeeping, for arrays and streams.
    pub payload: Option<Payload>,
    /// Linked container, for virtual folders.
    pub link: Option<String>,
    /// False for an unloadable virtual folder or an unknown node.
    pub loaded: bool,
    /// Load diagnostics of a virtual folder.
    pub message: String,
}
