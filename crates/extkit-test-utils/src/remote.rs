//! [`RemoteFixture`]: a temporary directory laid out like the remote
//! extension repository (`extensions/<name>/...`).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// A PNG-looking payload comfortably above the minimum icon size.
pub const FAKE_ICON: &[u8] = &[0x89; 256];

/// Manifest for `name` with one `view` command per entry of `commands`.
pub fn minimal_manifest(name: &str, commands: &[&str]) -> Value {
    let commands: Vec<Value> = commands
        .iter()
        .map(|c| {
            json!({
                "name": c,
                "title": format!("{} {}", name, c),
                "mode": "view",
            })
        })
        .collect();
    json!({
        "name": name,
        "title": name,
        "description": format!("The {} extension", name),
        "icon": "icon.png",
        "author": "tester",
        "commands": commands,
    })
}

/// Builder for a fake remote repository tree.
///
/// # Example
///
/// ```rust,no_run
/// use extkit_test_utils::{RemoteFixture, minimal_manifest};
///
/// let remote = RemoteFixture::new();
/// remote.add_extension(&minimal_manifest("weather", &["forecast"]));
/// remote.add_source("weather", "src/forecast.tsx", "export default () => null;");
/// ```
pub struct RemoteFixture {
    temp_dir: TempDir,
}

impl Default for RemoteFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteFixture {
    /// Create an empty remote with an `extensions/` directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("extensions")).unwrap();
        Self { temp_dir }
    }

    /// Root of the fake repository.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root as a string usable as a remote URL.
    pub fn url(&self) -> String {
        self.root().to_string_lossy().into_owned()
    }

    /// Directory of extension `name`.
    pub fn extension_dir(&self, name: &str) -> PathBuf {
        self.root().join("extensions").join(name)
    }

    /// Write `manifest` as `extensions/<manifest.name>/package.json` along with
    /// a default icon in `assets/`.
    pub fn add_extension(&self, manifest: &Value) -> PathBuf {
        let name = manifest["name"]
            .as_str()
            .unwrap_or_else(|| panic!("add_extension: manifest has no name"));
        let dir = self.extension_dir(name);
        fs::create_dir_all(dir.join("assets")).unwrap();
        fs::write(
            dir.join("package.json"),
            serde_json::to_string_pretty(manifest).unwrap(),
        )
        .unwrap();
        fs::write(dir.join("assets").join("icon.png"), FAKE_ICON).unwrap();
        dir
    }

    /// Write a raw (possibly malformed) manifest for `name`.
    pub fn add_raw_manifest(&self, name: &str, content: &str) -> PathBuf {
        let dir = self.extension_dir(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), content).unwrap();
        dir
    }

    /// Write a file relative to the extension directory.
    pub fn add_source(&self, name: &str, relative: &str, content: &str) -> PathBuf {
        let path = self.extension_dir(name).join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Commit the current tree so it can be cloned.
    pub fn commit(&self) -> git2::Repository {
        crate::git::commit_all(self.root())
    }
}
