//! Lazy screenshot discovery
//!
//! Screenshots live in `extensions/<name>/metadata/` of the remote repository.
//! They are listed through a directory-listing endpoint that answers with a
//! JSON array of `{ name, path, type, download_url }` objects.

use serde_json::Value;

use super::model::asset_url;

/// File extensions accepted as screenshots.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// Listing URL for the metadata directory of `name`.
pub fn listing_url(listing_base: &str, name: &str) -> String {
    format!(
        "{}/extensions/{}/metadata",
        listing_base.trim_end_matches('/'),
        name
    )
}

fn is_image(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Extract sorted image URLs from a listing response.
///
/// `download_url` is preferred; otherwise the entry's `path` is resolved
/// against `asset_base`.
pub fn parse_listing(listing: &Value, asset_base: &str) -> Vec<String> {
    let Some(items) = listing.as_array() else {
        return Vec::new();
    };

    let mut images: Vec<(&str, String)> = items
        .iter()
        .filter(|item| {
            item.get("type")
                .and_then(Value::as_str)
                .is_none_or(|t| t == "file")
        })
        .filter_map(|item| {
            let name = item.get("name").and_then(Value::as_str)?;
            if !is_image(name) {
                return None;
            }
            let url = match item.get("download_url").and_then(Value::as_str) {
                Some(url) if !url.is_empty() => url.to_string(),
                _ => {
                    let path = item.get("path").and_then(Value::as_str)?;
                    asset_url(asset_base, path, path)
                }
            };
            Some((name, url))
        })
        .collect();

    images.sort_by(|a, b| a.0.cmp(b.0));
    images.into_iter().map(|(_, url)| url).collect()
}
