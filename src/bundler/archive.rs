//! Per-kit zip archives for website downloads.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::utils::{ensure_dir, is_hidden};

/// Non-hidden files of `kit_root` as `(absolute path, entry name)`, with
/// entry names rooted one level above the kit so the kit id is the first
/// segment. Hidden directories are skipped entirely. Sorted by entry name.
pub fn kit_entries(kit_root: &Path) -> Result<Vec<(PathBuf, String)>> {
    let base = kit_root.parent().unwrap_or(kit_root);
    let mut entries = Vec::new();
    let walker = WalkDir::new(kit_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(base).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push((entry.path().to_path_buf(), name));
    }
    entries.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(entries)
}

/// Write `<dest_dir>/<kit id>.zip` (deflate). Returns the archive path and entry count.
pub fn write_kit_zip(kit_root: &Path, dest_dir: &Path) -> Result<(PathBuf, usize)> {
    let id = crate::core::asset::file_name(kit_root);
    let zip_path = dest_dir.join(format!("{id}.zip"));
    let entries = kit_entries(kit_root)?;

    ensure_dir(dest_dir)?;
    let mut writer = ZipWriter::new(File::create(&zip_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (path, name) in &entries {
        writer.start_file(name.as_str(), options)?;
        io::copy(&mut File::open(path)?, &mut writer)?;
    }
    writer.finish()?;

    debug!(kit = %id, entries = entries.len(), path = %zip_path.display(), "wrote kit zip");
    Ok((zip_path, entries.len()))
}
