//! Command entry-point resolution
//!
//! Maps a command declared in a manifest onto the source file that
//! implements it. Lookup order:
//!
//! 1. the command's explicit `path` (or `entry`) field
//! 2. conventional locations: `src/<name>.<ext>`, `src/<name>/index.<ext>`,
//!    `src/commands/<name>.<ext>`
//! 3. a depth-first scan for any source file whose base name matches the
//!    command name case-insensitively, under `src/` first and then the whole
//!    extension root

use std::path::{Path, PathBuf};

use extkit_manifest::CommandManifest;
use walkdir::{DirEntry, WalkDir};

/// Source extensions, in preference order.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["tsx", "ts", "jsx", "js"];

const SOURCE_DIR: &str = "src";

/// Locate the entry file for `command` inside the extension at `ext_path`.
///
/// Returns `None` when nothing matches; callers skip the command.
pub fn resolve_entry_file(ext_path: &Path, command: &CommandManifest) -> Option<PathBuf> {
    if let Some(explicit) = command.path.as_deref().and_then(|p| explicit_entry(ext_path, p)) {
        return Some(explicit);
    }
    if let Some(conventional) = conventional_entry(ext_path, &command.name) {
        return Some(conventional);
    }
    let found = scan_for_entry(ext_path, &command.name);
    if found.is_none() {
        tracing::debug!(
            "No entry file for command '{}' under {}",
            command.name,
            ext_path.display()
        );
    }
    found
}

fn explicit_entry(ext_path: &Path, declared: &str) -> Option<PathBuf> {
    let declared = declared.trim().trim_start_matches("./");
    if declared.is_empty() {
        return None;
    }
    let base = ext_path.join(declared);
    if base.is_file() {
        return Some(base);
    }
    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| with_appended_extension(&base, ext))
        .find(|candidate| candidate.is_file())
}

fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

fn conventional_entry(ext_path: &Path, name: &str) -> Option<PathBuf> {
    let src = ext_path.join(SOURCE_DIR);
    let layouts: [Box<dyn Fn(&str) -> PathBuf>; 3] = [
        Box::new(|ext| src.join(format!("{name}.{ext}"))),
        Box::new(|ext| src.join(name).join(format!("index.{ext}"))),
        Box::new(|ext| src.join("commands").join(format!("{name}.{ext}"))),
    ];

    layouts.iter().find_map(|layout| {
        SOURCE_EXTENSIONS
            .iter()
            .map(|ext| layout(ext))
            .find(|candidate| candidate.is_file())
    })
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|n| n == "node_modules" || n.starts_with('.'))
}

fn scan_for_entry(ext_path: &Path, name: &str) -> Option<PathBuf> {
    let wanted = name.to_lowercase();
    let src = ext_path.join(SOURCE_DIR);
    if src.is_dir() {
        if let Some(found) = scan_dir(&src, &wanted) {
            return Some(found);
        }
    }
    scan_dir(ext_path, &wanted)
}

fn scan_dir(root: &Path, wanted: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
        .find(|path| {
            let ext_ok = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e.to_lowercase().as_str()));
            let stem_ok = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s.to_lowercase() == *wanted);
            ext_ok && stem_ok
        })
}
