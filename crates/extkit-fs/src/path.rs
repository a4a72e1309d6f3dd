//! Identifier validation for names that become directory components

/// Validate that `value` is safe to use as a single path component.
///
/// Rejects empty values, path separators, parent-directory references and
/// hidden names. `label` is used in the returned message.
pub fn validate_path_identifier(value: &str, label: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{label} must not be empty"));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(format!("{label} '{value}' must not contain path separators"));
    }
    if value == "." || value == ".." || value.starts_with('.') {
        return Err(format!("{label} '{value}' must not start with '.'"));
    }
    if value.chars().any(|c| c.is_control() || c == ':') {
        return Err(format!("{label} '{value}' contains invalid characters"));
    }
    Ok(())
}

/// Normalize an extension name for lookups and install paths.
///
/// Trims whitespace and lowercases. Returns `None` when the result is not a
/// valid single path component.
pub fn normalize_extension_name(name: &str) -> Option<String> {
    let normalized = name.trim().to_lowercase();
    validate_path_identifier(&normalized, "Extension name").ok()?;
    Some(normalized)
}
