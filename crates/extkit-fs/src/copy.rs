//! Recursive directory copies

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::{Error, Result};

/// Copy the tree rooted at `src` into `dest`, creating `dest` if needed.
///
/// Symbolic links are followed and their targets copied, so a dangling link
/// fails the copy.
pub fn copy_dir_all(src: &Path, dest: &Path) -> Result<u64> {
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

    let mut copied = 0u64;
    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
            Error::io(path, e.into())
        })?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::copy(entry.path(), &target).map_err(|e| Error::io(entry.path(), e))?;
        copied += 1;
    }

    Ok(copied)
}
