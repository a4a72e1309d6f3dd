//! Locating helper binaries on PATH

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Verify a binary is on PATH. Returns the resolved path or [`Error::CommandNotFound`].
pub fn check_binary_on_path(tool: &str) -> Result<PathBuf> {
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let extensions: Vec<String> = if cfg!(windows) {
        std::env::var("PATHEXT")
            .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
            .split(';')
            .map(|s| s.to_ascii_lowercase())
            .collect()
    } else {
        vec![String::new()]
    };

    for dir in std::env::split_paths(&path_var) {
        for ext in &extensions {
            let candidate = if ext.is_empty() {
                dir.join(tool)
            } else {
                dir.join(format!("{}{}", tool, ext))
            };
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(Error::CommandNotFound {
        command: tool.to_string(),
        hint: install_hint(tool).map(str::to_string),
    })
}

fn install_hint(tool: &str) -> Option<&'static str> {
    match tool {
        "git" => Some("\n  Install: https://git-scm.com/downloads"),
        "npm" => Some("\n  Install: https://nodejs.org"),
        "esbuild" => Some("\n  Install: npm install -g esbuild"),
        _ => None,
    }
}
