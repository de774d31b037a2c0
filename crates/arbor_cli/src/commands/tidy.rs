//! Tidy command implementation.

use super::Session;
use arbor_core::format_size;
use std::path::Path;

/// Size and fragment counts around a compaction.
#[derive(Debug)]
pub struct TidyStats {
    /// Bytes before compaction.
    pub bytes_before: u64,
    /// Bytes after compaction.
    pub bytes_after: u64,
    /// Fragments before compaction.
    pub fragments_before: u64,
    /// Fragments after compaction.
    pub fragments_after: u64,
}

/// Runs the tidy command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Tidying up {}", path.display());

    let stats = tidy(path)?;

    println!(
        "  Size before: {} ({} fragments)",
        format_size(stats.bytes_before),
        stats.fragments_before
    );
    println!(
        "  Size after:  {} ({} fragments)",
        format_size(stats.bytes_after),
        stats.fragments_after
    );
    if stats.fragments_before == 0 {
        println!("No fragments found - container is already compact");
    }

    Ok(())
}

/// Compacts a container and reports its size and fragments.
pub fn tidy(path: &Path) -> Result<TidyStats, Box<dyn std::error::Error>> {
    let mut session = Session::open(path, false)?;
    let file = session.file;

    let bytes_before = session.registry.file_size(file)?;
    let fragments_before = session.registry.fragment_count(file)?;
    session.registry.compact_file(file)?;
    let bytes_after = session.registry.file_size(file)?;
    let fragments_after = session.registry.fragment_count(file)?;

    session.close()?;
    Ok(TidyStats {
        bytes_before,
        bytes_after,
        fragments_before,
        fragments_after,
    })
}
