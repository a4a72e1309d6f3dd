//! On-disk catalog snapshot
//!
//! The file is always replaced whole. Loading is lenient: unknown versions
//! and unreadable files yield `None`, malformed entries are dropped.

use std::path::Path;

use chrono::{DateTime, Utc};
use extkit_fs::io::{read_text, write_text};
use serde_json::Value;

use super::model::{CatalogEntry, CatalogSnapshot, SNAPSHOT_VERSION};
use crate::error::Result;

/// Load and coerce the snapshot at `path`.
pub fn load_snapshot(path: &Path) -> Option<CatalogSnapshot> {
    let content = read_text(path).ok()?;
    let value: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Ignoring unreadable catalog cache {}: {}", path.display(), e);
            return None;
        }
    };
    coerce_snapshot(&value)
}

/// Coerce an arbitrary JSON value into a snapshot.
pub fn coerce_snapshot(value: &Value) -> Option<CatalogSnapshot> {
    let version = value.get("version").and_then(Value::as_u64)?;
    if version != u64::from(SNAPSHOT_VERSION) {
        tracing::debug!("Discarding catalog cache with version {}", version);
        return None;
    }
    let fetched_at = value
        .get("fetchedAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())?
        .with_timezone(&Utc);

    let entries = value
        .get("entries")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|raw| serde_json::from_value::<CatalogEntry>(raw.clone()).ok())
        .filter(|entry| !entry.name.trim().is_empty())
        .collect();

    Some(CatalogSnapshot {
        entries,
        fetched_at,
        version: SNAPSHOT_VERSION,
    })
}

/// Replace the snapshot at `path`.
pub fn save_snapshot(path: &Path, snapshot: &CatalogSnapshot) -> Result<()> {
    let content = serde_json::to_string_pretty(snapshot)?;
    write_text(path, &content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_preserves_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog-cache.json");
        let snapshot = CatalogSnapshot::new(vec![CatalogEntry {
            name: "weather".into(),
            title: "Weather".into(),
            ..Default::default()
        }]);

        save_snapshot(&path, &snapshot).unwrap();
        let loaded = load_snapshot(&path).unwrap();

        assert_eq!(loaded.entries, snapshot.entries);
        assert_eq!(loaded.version, SNAPSHOT_VERSION);
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let value = json!({
            "version": 1,
            "fetchedAt": "2026-01-01T00:00:00Z",
            "entries": [
                { "name": "weather", "title": "Weather" },
                { "name": "" },
                { "title": "nameless" },
                "not an object",
                { "name": "notes", "commands": "wrong shape" }
            ]
        });

        let snapshot = coerce_snapshot(&value).unwrap();
        let names: Vec<_> = snapshot.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["weather"]);
    }

    #[test]
    fn other_versions_are_discarded() {
        let value = json!({ "version": 2, "fetchedAt": "2026-01-01T00:00:00Z", "entries": [] });
        assert!(coerce_snapshot(&value).is_none());
    }

    #[test]
    fn missing_timestamp_is_discarded() {
        let value = json!({ "version": 1, "entries": [] });
        assert!(coerce_snapshot(&value).is_none());
    }

    #[test]
    fn garbage_file_loads_as_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog-cache.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_snapshot(&path).is_none());
    }
}
