//! Platform compatibility filter

use crate::manifest::{CommandManifest, ExtensionManifest};
use crate::platform::Platform;

/// Whether a `platforms` declaration admits `platform`.
///
/// An absent or empty declaration means every platform. Unknown platform
/// names never match.
pub fn platforms_admit(platforms: Option<&[String]>, platform: Platform) -> bool {
    match platforms {
        None => true,
        Some([]) => true,
        Some(list) => list
            .iter()
            .any(|p| Platform::parse(p) == Some(platform)),
    }
}

/// Whether the extension, and optionally one of its commands, is usable on
/// `platform`.
///
/// A command is compatible only if both it and its manifest are.
pub fn is_compatible(
    manifest: &ExtensionManifest,
    command: Option<&CommandManifest>,
    platform: Platform,
) -> bool {
    platforms_admit(manifest.platforms.as_deref(), platform)
        && command.is_none_or(|c| platforms_admit(c.platforms.as_deref(), platform))
}

/// Shorthand for [`is_compatible`] with a command.
pub fn is_command_compatible(
    manifest: &ExtensionManifest,
    command: &CommandManifest,
    platform: Platform,
) -> bool {
    is_compatible(manifest, Some(command), platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(json: &str) -> ExtensionManifest {
        ExtensionManifest::from_json(json, Platform::Linux).unwrap()
    }

    #[test]
    fn absent_platforms_means_all() {
        let m = manifest(r#"{"name": "x", "commands": [{"name": "a"}]}"#);
        for platform in Platform::all() {
            assert!(is_compatible(&m, None, platform));
            assert!(is_command_compatible(&m, &m.commands[0], platform));
        }
    }

    #[test]
    fn manifest_restriction_applies_to_commands() {
        let m = manifest(r#"{"name": "x", "platforms": ["macOS"], "commands": [{"name": "a"}]}"#);
        assert!(is_compatible(&m, None, Platform::MacOs));
        assert!(!is_compatible(&m, None, Platform::Linux));
        assert!(!is_command_compatible(&m, &m.commands[0], Platform::Linux));
    }

    #[test]
    fn command_restriction_is_independent() {
        let m = manifest(
            r#"{"name": "x", "commands": [{"name": "a", "platforms": ["Windows"]}, {"name": "b"}]}"#,
        );
        assert!(is_compatible(&m, None, Platform::Linux));
        assert!(!is_command_compatible(&m, &m.commands[0], Platform::Linux));
        assert!(is_command_compatible(&m, &m.commands[0], Platform::Windows));
        assert!(is_command_compatible(&m, &m.commands[1], Platform::Linux));
    }

    #[test]
    fn unknown_names_never_match() {
        assert!(!platforms_admit(Some(&["Amiga".to_string()]), Platform::Linux));
    }
}
