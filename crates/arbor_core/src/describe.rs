//! Structured node descriptions for the host.

use crate::error::RegistryResult;
use arbor_storage::{Engine, NodeKind, NodeRef, ValueCategory, ATTR_CLASS, ATTR_INVISIBLE, ATTR_LEVELS, ATTR_LOGICAL};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Coarse type of a node as the host sees it.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeLabel {
    Label,
    Folder,
    VFolder,
    Raw,
    Integer,
    Factor,
    Logical,
    Real,
    String,
    Unknown,
}

impl TypeLabel {
    /// Returns the label text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Label => "Label",
            Self::Folder => "Folder",
            Self::VFolder => "VFolder",
            Self::Raw => "Raw",
            Self::Integer => "Integer",
            Self::Factor => "Factor",
            Self::Logical => "Logical",
            Self::Real => "Real",
            Self::String => "String",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the host can learn about a node in one call.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDescription {
    /// Node name; empty for a root.
    pub name: String,
    /// Slash-separated path from the root.
    pub full_name: String,
    /// Storage class, such as `dInt32` or `dFolder`.
    pub storage: String,
    /// Trait name; the link file for a virtual folder.
    pub trait_name: String,
    /// Coarse type label.
    pub type_label: TypeLabel,
    /// True for typed arrays.
    pub is_array: bool,
    /// Dimension lengths, fastest-varying first.
    pub dims: Vec<u64>,
    /// Compression coder name, empty when uncompressed.
    pub encoder: String,
    /// Compression coder parameters.
    pub coder_param: String,
    /// Stored bytes over raw bytes; NaN without compressed data.
    pub ratio: f64,
    /// Bytes occupied in the container, or -1 when not applicable.
    pub size: i64,
    /// False for a virtual folder that failed to load or an unknown node.
    pub good: bool,
    /// Hidden flag or `R.invisible` attribute.
    pub hidden: bool,
    /// Load message of a virtual folder.
    pub message: String,
}

/// Returns true if the node is hidden from default listings.
pub fn is_hidden<E: Engine>(engine: &E, node: NodeRef) -> RegistryResult<bool> {
    Ok(engine.is_hidden(node)? || engine.has_attribute(node, ATTR_INVISIBLE)?)
}

/// Builds the description of a live node.
pub fn describe<E: Engine>(engine: &E, node: NodeRef) -> RegistryResult<NodeDescription> {
    let info = engine.info(node)?;

    let type_label = match info.kind {
        NodeKind::Label => TypeLabel::Label,
        NodeKind::Folder => TypeLabel::Folder,
        NodeKind::VirtualFolder => TypeLabel::VFolder,
        NodeKind::Stream => TypeLabel::Raw,
        NodeKind::Unknown => TypeLabel::Unknown,
        NodeKind::Array => match info.element.map(|element| element.category()) {
            Some(ValueCategory::Integer) => integer_label(engine, node)?,
            Some(ValueCategory::Float) => TypeLabel::Real,
            Some(ValueCategory::String) => TypeLabel::String,
            None => TypeLabel::Unknown,
        },
    };

    let trait_name = info.link.clone().unwrap_or_else(|| info.trait_name.clone());

    let mut description = NodeDescription {
        name: engine.name(node)?,
        full_name: engine.full_name(node)?,
        storage: info.storage_name,
        trait_name,
        type_label,
        is_array: info.kind == NodeKind::Array,
        dims: Vec::new(),
        encoder: String::new(),
        coder_param: String::new(),
        ratio: f64::NAN,
        size: -1,
        good: info.loaded,
        hidden: is_hidden(engine, node)?,
        message: info.message,
    };

    if let Some(payload) = &info.payload {
        if let Some(coder) = &payload.coder {
            description.encoder = coder.name.clone();
            description.coder_param = coder.param.clone();
            if payload.total_in > 0 {
                description.ratio = payload.total_out as f64 / payload.total_in as f64;
            }
        }
        match info.kind {
            NodeKind::Array => {
                description.dims = info.dims.iter().rev().copied().collect();
                description.size = clamp_size(payload.stored_size());
            }
            _ => {
                description.dims = vec![payload.total_in];
                description.size = clamp_size(payload.total_in);
            }
        }
    }

    Ok(description)
}

fn integer_label<E: Engine>(engine: &E, node: NodeRef) -> RegistryResult<TypeLabel> {
    let is_factor = engine.attribute(node, ATTR_CLASS)? == Some(Value::from("factor"))
        && engine.has_attribute(node, ATTR_LEVELS)?;
    if is_factor {
        Ok(TypeLabel::Factor)
    } else if engine.has_attribute(node, ATTR_LOGICAL)? {
        Ok(TypeLabel::Logical)
    } else {
        Ok(TypeLabel::Integer)
    }
}

fn clamp_size(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}

/// Formats a byte count with a binary unit, such as `1.5K` or `512B`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    const TB: f64 = GB * 1024.0;

    let b = bytes as f64;
    if b >= TB {
        format!("{:.1}T", b / TB)
    } else if b >= GB {
        format!("{:.1}G", b / GB)
    } else if b >= MB {
        format!("{:.1}M", b / MB)
    } else if b >= KB {
        format!("{:.1}K", b / KB)
    } else {
        format!("{bytes}B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_storage::{DocumentEngine, NodeSpec};
    use tempfile::TempDir;

    fn spec(storage: &str, dims: &[u64]) -> NodeSpec {
        NodeSpec::parse(storage, dims).unwrap()
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1536), "1.5K");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0M");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0G");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024 * 1024), "2.0T");
    }

    #[test]
    fn labels_follow_kind_and_attributes() {
        let dir = TempDir::new().unwrap();
        let mut engine = DocumentEngine::new();
        let file = engine.create(&dir.path().join("d.arbor")).unwrap();
        let root = engine.root(file).unwrap();

        let cases = [
            ("folder", TypeLabel::Folder),
            ("label", TypeLabel::Label),
            ("stream", TypeLabel::Raw),
            ("int32", TypeLabel::Integer),
            ("bit2", TypeLabel::Integer),
            ("logical", TypeLabel::Logical),
            ("factor", TypeLabel::Factor),
            ("float64", TypeLabel::Real),
            ("string", TypeLabel::String),
        ];
        for (index, (storage, label)) in cases.into_iter().enumerate() {
            let node = engine
                .add_node(root, &format!("n{index}"), spec(storage, &[]))
                .unwrap();
            let description = describe(&engine, node).unwrap();
            assert_eq!(description.type_label, label, "storage {storage}");
            assert!(description.good);
        }

        let root_description = describe(&engine, root).unwrap();
        assert_eq!(root_description.name, "");
        assert_eq!(root_description.full_name, "");
        assert_eq!(root_description.storage, "dFolder");
        assert_eq!(root_description.size, -1);
        assert!(root_description.ratio.is_nan());
    }

    #[test]
    fn array_sizes_and_ratio() {
        let dir = TempDir::new().unwrap();
        let mut engine = DocumentEngine::new();
        let file = engine.create(&dir.path().join("r.arbor")).unwrap();
        let root = engine.root(file).unwrap();

        let plain = engine.add_node(root, "plain", spec("int32", &[10, 4])).unwrap();
        engine.set_stream_totals(plain, 160, 160).unwrap();
        let packed = engine
            .add_node(root, "packed", spec("float64", &[100]).compressed("ZIP.max"))
            .unwrap();
        engine.set_stream_totals(packed, 800, 200).unwrap();

        let description = describe(&engine, plain).unwrap();
        assert!(description.is_array);
        assert_eq!(description.dims, vec![4, 10]);
        assert_eq!(description.size, 160);
        assert_eq!(description.storage, "dInt32");
        assert_eq!(description.trait_name, "Int32");
        assert!(description.ratio.is_nan());
        assert_eq!(description.encoder, "");

        let description = describe(&engine, packed).unwrap();
        assert_eq!(description.encoder, "ZIP");
        assert_eq!(description.coder_param, "max");
        assert!((description.ratio - 0.25).abs() < f64::EPSILON);
        assert_eq!(description.size, 200);
        assert_eq!(description.full_name, "packed");
    }

    #[test]
    fn stream_reports_raw_size() {
        let dir = TempDir::new().unwrap();
        let mut engine = DocumentEngine::new();
        let file = engine.create(&dir.path().join("s.arbor")).unwrap();
        let root = engine.root(file).unwrap();
        let stream = engine.add_node(root, "blob", spec("stream", &[])).unwrap();
        engine.set_stream_totals(stream, 42, 42).unwrap();

        let description = describe(&engine, stream).unwrap();
        assert!(!description.is_array);
        assert_eq!(description.dims, vec![42]);
        assert_eq!(description.size, 42);
    }

    #[test]
    fn hidden_and_invisible_nodes() {
        let dir = TempDir::new().unwrap();
        let mut engine = DocumentEngine::new();
        let file = engine.create(&dir.path().join("h.arbor")).unwrap();
        let root = engine.root(file).unwrap();
        let a = engine.add_node(root, "a", spec("label", &[])).unwrap();
        let b = engine.add_node(root, "b", spec("label", &[])).unwrap();
        let c = engine.add_node(root, "c", spec("label", &[])).unwrap();
        engine.set_hidden(a, true).unwrap();
        engine.set_attribute(b, ATTR_INVISIBLE, Value::Null).unwrap();

        assert!(is_hidden(&engine, a).unwrap());
        assert!(is_hidden(&engine, b).unwrap());
        assert!(!is_hidden(&engine, c).unwrap());
        assert!(describe(&engine, b).unwrap().hidden);
    }

    #[test]
    fn broken_virtual_folder_is_not_good() {
        let dir = TempDir::new().unwrap();
        let mut engine = DocumentEngine::new();
        let file = engine.create(&dir.path().join("v.arbor")).unwrap();
        let root = engine.root(file).unwrap();
        let link = engine
            .add_node(
                root,
                "ext",
                NodeSpec::VirtualFolder {
                    link: "missing.arbor".into(),
                },
            )
            .unwrap();

        let description = describe(&engine, link).unwrap();
        assert_eq!(description.type_label, TypeLabel::VFolder);
        assert_eq!(description.trait_name, "missing.arbor");
        assert!(!description.good);
        assert!(!description.message.is_empty());
    }

    #[test]
    fn description_serializes_to_json() {
        let dir = TempDir::new().unwrap();
        let mut engine = DocumentEngine::new();
        let file = engine.create(&dir.path().join("j.arbor")).unwrap();
        let root = engine.root(file).unwrap();

        let json = serde_json::to_value(describe(&engine, root).unwrap()).unwrap();
        assert_eq!(json["type_label"], "Folder");
        assert_eq!(json["ratio"], Value::Null);
    }
}
