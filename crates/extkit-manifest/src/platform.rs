//! Operating-system identifiers as they appear in manifests

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A desktop platform an extension may declare support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "macOS")]
    MacOs,
    #[serde(rename = "Windows")]
    Windows,
    #[serde(rename = "Linux")]
    Linux,
}

impl Platform {
    /// The platform this process is running on.
    ///
    /// Unknown Unix-likes are treated as Linux.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    /// All known platforms.
    pub fn all() -> [Platform; 3] {
        [Platform::MacOs, Platform::Windows, Platform::Linux]
    }

    /// Parse a manifest platform string, accepting common aliases.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "macos" | "mac" | "darwin" | "osx" => Some(Platform::MacOs),
            "windows" | "win32" | "win" => Some(Platform::Windows),
            "linux" => Some(Platform::Linux),
            _ => None,
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Platform::parse(s).ok_or_else(|| format!("unknown platform '{s}'"))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacOs => write!(f, "macOS"),
            Platform::Windows => write!(f, "Windows"),
            Platform::Linux => write!(f, "Linux"),
        }
    }
}
