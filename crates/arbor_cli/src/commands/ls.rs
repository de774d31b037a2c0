//! Ls command implementation.

use super::Session;
use arbor_core::format_size;
use std::path::Path;

/// Runs the ls command.
pub fn run(path: &Path, node: Option<&str>, all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(path, true)?;
    let folder = session.node(node.unwrap_or(""))?;

    let children = session.registry.children(folder.handle, folder.node, all)?;
    for child in children {
        let description = session.registry.describe(child.handle, child.node)?;
        let size = u64::try_from(description.size).map_or_else(|_| "-".to_string(), format_size);
        let marker = if description.hidden { "*" } else { " " };
        println!(
            "{marker}{:<8} {:>8}  {}",
            description.type_label.as_str(),
            size,
            description.name
        );
    }

    session.close()
}
