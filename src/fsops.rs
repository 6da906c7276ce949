//! Merge-copy for staging profile and resource trees.
//!
//! Staging never destroys local state: a file already present in the
//! destination survives unless the source copy is strictly newer. This is
//! what lets repeated `setup download` runs refresh the staged profile
//! without clobbering unmodified local edits.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Recursively copy `source` into `dest`, preferring newer files.
///
/// Creates `dest` (and intermediate directories) as needed. A regular file
/// is copied when the destination copy is missing or older than the source.
/// Symlinks are recreated as links, not followed. Destination-only files are
/// left alone.
pub fn merge_copy(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.with_context(|| format!("walking '{}'", source.display()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .expect("walkdir yields paths under its root");
        let target = dest.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("creating '{}'", target.display()))?;
        } else if file_type.is_symlink() {
            if !target.is_symlink() && !target.exists() {
                let link = fs::read_link(entry.path())
                    .with_context(|| format!("reading link '{}'", entry.path().display()))?;
                std::os::unix::fs::symlink(&link, &target)
                    .with_context(|| format!("linking '{}'", target.display()))?;
            }
        } else if should_copy(entry.path(), &target)? {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating '{}'", parent.display()))?;
            }
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "copying '{}' to '{}'",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }
    Ok(())
}

fn should_copy(source: &Path, target: &Path) -> Result<bool> {
    let Ok(target_meta) = target.symlink_metadata() else {
        return Ok(true);
    };
    let source_meta = source
        .metadata()
        .with_context(|| format!("reading metadata of '{}'", source.display()))?;
    match (source_meta.modified(), target_meta.modified()) {
        (Ok(source_time), Ok(target_time)) => Ok(source_time > target_time),
        // No mtime support; keep the existing file.
        _ => Ok(false),
    }
}
