//! Extension manifest parsing for `package.json` files.
//!
//! # Example
//!
//! ```json
//! {
//!   "name": "weather",
//!   "title": "Weather",
//!   "description": "Forecasts in the launcher",
//!   "icon": "icon.png",
//!   "author": "jane",
//!   "platforms": ["macOS", "Windows"],
//!   "commands": [
//!     { "name": "forecast", "title": "Forecast", "mode": "view" }
//!   ],
//!   "preferences": [
//!     { "name": "units", "type": "dropdown", "default": "metric",
//!       "data": [{ "title": "Metric", "value": "metric" }] }
//!   ],
//!   "dependencies": { "@raycast/api": "^1.70.0", "date-fns": "^3.0.0" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::preferences::{ArgumentSchema, PreferenceSchema, PreferenceScope, RawPreference};

/// An author or contributor, declared either as a bare name or an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Person {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl Person {
    pub fn name(&self) -> &str {
        match self {
            Person::Name(name) => name,
            Person::Detailed { name, .. } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    author: Option<Person>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    contributors: Vec<Person>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    platforms: Option<Vec<String>>,
    #[serde(default)]
    commands: Vec<RawCommand>,
    #[serde(default)]
    preferences: Vec<RawPreference>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    externals: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCommand {
    name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    platforms: Option<Vec<String>>,
    #[serde(default, alias = "entry")]
    path: Option<String>,
    #[serde(default)]
    preferences: Vec<RawPreference>,
    #[serde(default)]
    arguments: Vec<ArgumentSchema>,
}

/// One command an extension contributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandManifest {
    pub name: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: String,
    pub mode: Option<String>,
    pub icon: Option<String>,
    pub keywords: Vec<String>,
    pub platforms: Option<Vec<String>>,
    /// Explicit entry file, relative to the extension root.
    pub path: Option<String>,
    pub preferences: Vec<PreferenceSchema>,
    pub arguments: Vec<ArgumentSchema>,
}

impl CommandManifest {
    /// Display title, falling back to the raw command name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Command mode, falling back to `"view"`.
    pub fn mode_or_default(&self) -> &str {
        self.mode.as_deref().unwrap_or("view")
    }
}

/// Complete extension manifest with preference defaults resolved for one
/// platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionManifest {
    pub name: String,
    pub title: Option<String>,
    pub description: String,
    pub icon: Option<String>,
    pub author: Option<Person>,
    pub owner: Option<String>,
    pub contributors: Vec<Person>,
    pub categories: Vec<String>,
    pub platforms: Option<Vec<String>>,
    pub commands: Vec<CommandManifest>,
    pub preferences: Vec<PreferenceSchema>,
    pub dependencies: BTreeMap<String, String>,
    /// Additional module names the bundler must leave external.
    pub externals: Vec<String>,
}

impl ExtensionManifest {
    /// Parse a manifest from JSON, resolving defaults for `platform`.
    pub fn from_json(content: &str, platform: Platform) -> Result<Self> {
        let raw: RawManifest = serde_json::from_str(content)?;
        let manifest = Self::resolve(raw, platform);
        manifest.validate()?;
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    pub fn from_path(path: &Path, platform: Platform) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ManifestNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, platform)
    }

    /// Read the manifest inside an extension directory.
    pub fn from_dir(dir: &Path, platform: Platform) -> Result<Self> {
        Self::from_path(&dir.join(crate::MANIFEST_FILENAME), platform)
    }

    fn resolve(raw: RawManifest, platform: Platform) -> Self {
        let commands = raw
            .commands
            .into_iter()
            .map(|c| CommandManifest {
                name: c.name,
                title: c.title,
                subtitle: c.subtitle,
                description: c.description.unwrap_or_default(),
                mode: c.mode,
                icon: c.icon,
                keywords: c.keywords,
                platforms: c.platforms,
                path: c.path,
                preferences: c
                    .preferences
                    .into_iter()
                    .map(|p| p.resolve(PreferenceScope::Command, platform))
                    .collect(),
                arguments: c.arguments,
            })
            .collect();

        ExtensionManifest {
            name: raw.name.trim().to_string(),
            title: raw.title,
            description: raw.description.unwrap_or_default(),
            icon: raw.icon,
            author: raw.author,
            owner: raw.owner,
            contributors: raw.contributors,
            categories: raw.categories,
            platforms: raw.platforms,
            commands,
            preferences: raw
                .preferences
                .into_iter()
                .map(|p| p.resolve(PreferenceScope::Extension, platform))
                .collect(),
            dependencies: raw.dependencies,
            externals: raw.externals,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidName {
                name: self.name.clone(),
                reason: "extension name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Display title, falling back to the package name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// The owner shown to users: explicit `owner`, else the author's name.
    pub fn owner_name(&self) -> Option<&str> {
        self.owner
            .as_deref()
            .or_else(|| self.author.as_ref().map(Person::name))
    }

    /// Look up a command by name.
    pub fn command(&self, name: &str) -> Option<&CommandManifest> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Icon file name, defaulting to `icon.png`.
    pub fn icon_or_default(&self) -> &str {
        self.icon
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .unwrap_or("icon.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const WEATHER: &str = r#"{
        "name": "weather",
        "title": "Weather",
        "description": "Forecasts",
        "author": {"name": "jane", "email": "jane@example.com"},
        "contributors": ["bob", {"name": "carol"}],
        "categories": ["Productivity"],
        "commands": [
            {"name": "forecast", "title": "Forecast", "mode": "view",
             "preferences": [{"name": "days", "type": "textfield", "default": "3"}],
             "arguments": [{"name": "city", "type": "text", "required": true, "placeholder": "City"}]},
            {"name": "refresh", "entry": "src/jobs/refresh.ts"}
        ],
        "preferences": [
            {"name": "units", "type": "dropdown", "default": "metric", "required": true,
             "data": [{"title": "Metric", "value": "metric"}, {"title": "Imperial", "value": "imperial"}]}
        ],
        "dependencies": {"@raycast/api": "^1.70.0", "date-fns": "^3.0.0"}
    }"#;

    #[test]
    fn parses_full_manifest() {
        let manifest = ExtensionManifest::from_json(WEATHER, Platform::Linux).unwrap();
        assert_eq!(manifest.name, "weather");
        assert_eq!(manifest.display_title(), "Weather");
        assert_eq!(manifest.owner_name(), Some("jane"));
        assert_eq!(
            manifest.contributors.iter().map(Person::name).collect::<Vec<_>>(),
            vec!["bob", "carol"]
        );
        assert_eq!(manifest.commands.len(), 2);
        assert_eq!(manifest.preferences[0].options.len(), 2);
        assert_eq!(manifest.preferences[0].scope, PreferenceScope::Extension);
        assert_eq!(manifest.dependencies.len(), 2);
    }

    #[test]
    fn command_fields_and_fallbacks() {
        let manifest = ExtensionManifest::from_json(WEATHER, Platform::Linux).unwrap();
        let forecast = manifest.command("forecast").unwrap();
        assert_eq!(forecast.preferences[0].scope, PreferenceScope::Command);
        assert_eq!(forecast.preferences[0].default, Some(json!("3")));
        assert_eq!(forecast.arguments[0].placeholder.as_deref(), Some("City"));

        let refresh = manifest.command("refresh").unwrap();
        assert_eq!(refresh.display_title(), "refresh");
        assert_eq!(refresh.mode_or_default(), "view");
        assert_eq!(refresh.path.as_deref(), Some("src/jobs/refresh.ts"));
        assert_eq!(refresh.description, "");
    }

    #[test]
    fn owner_prefers_explicit_field() {
        let manifest = ExtensionManifest::from_json(
            r#"{"name": "x", "owner": "acme", "author": "jane"}"#,
            Platform::Linux,
        )
        .unwrap();
        assert_eq!(manifest.owner_name(), Some("acme"));
    }

    #[test]
    fn rejects_empty_name() {
        let err = ExtensionManifest::from_json(r#"{"name": "  "}"#, Platform::Linux).unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = ExtensionManifest::from_json("{not json", Platform::Linux).unwrap_err();
        assert!(matches!(err, Error::ManifestParse(_)));
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!(ExtensionManifest::from_json(r#"{"name": 42}"#, Platform::Linux).is_err());
        assert!(
            ExtensionManifest::from_json(r#"{"name": "x", "commands": "nope"}"#, Platform::Linux)
                .is_err()
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = ExtensionManifest::from_dir(temp.path(), Platform::Linux).unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound(_)));
    }

    #[test]
    fn icon_defaults_to_icon_png() {
        let manifest = ExtensionManifest::from_json(r#"{"name": "x"}"#, Platform::Linux).unwrap();
        assert_eq!(manifest.icon_or_default(), "icon.png");
    }
}
