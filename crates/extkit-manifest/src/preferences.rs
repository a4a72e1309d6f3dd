//! Preference and argument schema
//!
//! Preferences are declared either on the extension or on a single command.
//! Their `default` may be a plain value or a per-platform map such as
//! `{"macOS": "~/Desktop", "Windows": "C:\\Users"}`; the map is resolved to
//! the running platform once, when the manifest is parsed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::platform::Platform;

/// Where a preference was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceScope {
    Extension,
    Command,
}

/// A declared default before platform resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceDefault {
    /// Same value on every platform.
    Value(Value),
    /// Value chosen by platform; missing platforms have no default.
    PerPlatform(BTreeMap<Platform, Value>),
}

impl PreferenceDefault {
    /// Classify a raw manifest value.
    ///
    /// An object is platform-keyed only when it is non-empty and every key
    /// names a known platform.
    pub fn from_json(value: Value) -> Self {
        if let Value::Object(map) = &value {
            let keyed: Option<BTreeMap<Platform, Value>> = map
                .iter()
                .map(|(k, v)| Platform::parse(k).map(|p| (p, v.clone())))
                .collect();
            if let Some(keyed) = keyed.filter(|m| !m.is_empty()) {
                return PreferenceDefault::PerPlatform(keyed);
            }
        }
        PreferenceDefault::Value(value)
    }

    /// The default that applies on `platform`.
    pub fn resolve(&self, platform: Platform) -> Option<Value> {
        match self {
            PreferenceDefault::Value(Value::Null) => None,
            PreferenceDefault::Value(v) => Some(v.clone()),
            PreferenceDefault::PerPlatform(map) => map.get(&platform).cloned(),
        }
    }
}

/// One selectable option of a dropdown preference or argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceOption {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value: Value,
}

/// A preference as declared in the manifest, default still unresolved.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPreference {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub data: Vec<PreferenceOption>,
    #[serde(default)]
    pub label: Option<String>,
}

impl RawPreference {
    pub(crate) fn resolve(self, scope: PreferenceScope, platform: Platform) -> PreferenceSchema {
        let default = self
            .default
            .map(PreferenceDefault::from_json)
            .and_then(|d| d.resolve(platform));
        PreferenceSchema {
            scope,
            title: self.title.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            description: self.description.unwrap_or_default(),
            placeholder: self.placeholder,
            required: self.required,
            kind: self.kind.unwrap_or_else(|| "textfield".to_string()),
            default,
            options: self.data,
            label: self.label,
        }
    }
}

/// A typed, user-configurable setting with its default resolved for the
/// running platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSchema {
    pub scope: PreferenceScope,
    pub name: String,
    pub title: String,
    pub description: String,
    pub placeholder: Option<String>,
    pub required: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub default: Option<Value>,
    pub options: Vec<PreferenceOption>,
    pub label: Option<String>,
}

/// A positional argument a command accepts when launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentSchema {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default = "default_argument_type")]
    pub kind: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename(deserialize = "data"), default)]
    pub options: Vec<PreferenceOption>,
}

fn default_argument_type() -> String {
    "text".to_string()
}

/// Merge default values, later scopes overriding earlier ones on key collision.
pub fn merge_defaults<'a>(
    scopes: impl IntoIterator<Item = &'a [PreferenceSchema]>,
) -> BTreeMap<String, Value> {
    let mut merged = BTreeMap::new();
    for prefs in scopes {
        for pref in prefs {
            if let Some(default) = &pref.default {
                merged.insert(pref.name.clone(), default.clone());
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(default: Value) -> RawPreference {
        serde_json::from_value(json!({
            "name": "downloadDir",
            "type": "directory",
            "default": default,
        }))
        .unwrap()
    }

    #[test]
    fn plain_default_is_kept() {
        let pref = raw(json!("~/Downloads")).resolve(PreferenceScope::Extension, Platform::Linux);
        assert_eq!(pref.default, Some(json!("~/Downloads")));
        assert_eq!(pref.title, "downloadDir");
        assert_eq!(pref.kind, "directory");
    }

    #[test]
    fn platform_keyed_default_resolves_per_platform() {
        let value = json!({"macOS": "~/Desktop", "Windows": "C:\\Desktop"});
        assert_eq!(
            raw(value.clone())
                .resolve(PreferenceScope::Command, Platform::MacOs)
                .default,
            Some(json!("~/Desktop"))
        );
        assert_eq!(
            raw(value.clone())
                .resolve(PreferenceScope::Command, Platform::Windows)
                .default,
            Some(json!("C:\\Desktop"))
        );
        assert_eq!(
            raw(value)
                .resolve(PreferenceScope::Command, Platform::Linux)
                .default,
            None
        );
    }

    #[test]
    fn object_with_foreign_keys_is_plain_value() {
        let value = json!({"macOS": 1, "theme": "dark"});
        assert_eq!(
            PreferenceDefault::from_json(value.clone()),
            PreferenceDefault::Value(value)
        );
        assert_eq!(
            PreferenceDefault::from_json(json!({})),
            PreferenceDefault::Value(json!({}))
        );
    }

    #[test]
    fn null_default_is_absent() {
        assert_eq!(PreferenceDefault::Value(Value::Null).resolve(Platform::Linux), None);
    }

    #[test]
    fn later_scope_wins_on_merge() {
        let ext = vec![
            raw(json!("ext")).resolve(PreferenceScope::Extension, Platform::Linux),
        ];
        let mut cmd_pref = raw(json!("cmd")).resolve(PreferenceScope::Command, Platform::Linux);
        cmd_pref.name = "downloadDir".to_string();
        let cmd = vec![cmd_pref];

        let merged = merge_defaults([ext.as_slice(), cmd.as_slice()]);
        assert_eq!(merged.get("downloadDir"), Some(&json!("cmd")));
    }

    #[test]
    fn argument_defaults() {
        let arg: ArgumentSchema = serde_json::from_value(json!({"name": "city"})).unwrap();
        assert_eq!(arg.kind, "text");
        assert!(!arg.required);
        assert!(arg.options.is_empty());
    }
}
