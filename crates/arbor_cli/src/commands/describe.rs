//! Describe command implementation.

use super::Session;
use arbor_core::{format_size, NodeDescription};
use std::path::Path;

/// Runs the describe command.
pub fn run(path: &Path, node: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(path, true)?;
    let issued = session.node(node)?;
    let description = session.registry.describe(issued.handle, issued.node)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&description)?),
        "text" => print_text(&description),
        other => return Err(format!("Unknown format: {other}").into()),
    }

    session.close()
}

fn print_text(description: &NodeDescription) {
    let full_name = if description.full_name.is_empty() {
        "/"
    } else {
        description.full_name.as_str()
    };
    println!("Node: {full_name}");
    println!("  Type:     {}", description.type_label);
    println!("  Storage:  {}", description.storage);
    if !description.trait_name.is_empty() {
        println!("  Trait:    {}", description.trait_name);
    }
    if description.is_array || !description.dims.is_empty() {
        let dims: Vec<String> = description.dims.iter().map(u64::to_string).collect();
        println!("  Dims:     {}", dims.join(" x "));
    }
    if let Ok(size) = u64::try_from(description.size) {
        println!("  Size:     {}", format_size(size));
    }
    if !description.encoder.is_empty() {
        println!("  Encoder:  {} {}", description.encoder, description.coder_param);
        if !description.ratio.is_nan() {
            println!("  Ratio:    {:.1}%", description.ratio * 100.0);
        }
    }
    if description.hidden {
        println!("  Hidden:   yes");
    }
    if !description.good {
        println!("  Good:     no");
    }
    if !description.message.is_empty() {
        println!("  Message:  {}", description.message);
    }
}
