//! Extension icons as data URLs

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Files smaller than this are treated as corrupt or placeholder icons.
pub const MIN_ICON_BYTES: u64 = 100;

fn mime_for(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Read `icon` from `<ext_path>/assets/` or `<ext_path>/` and encode it as a
/// data URL.
pub fn icon_data_url(ext_path: &Path, icon: &str) -> Option<String> {
    let icon = icon.trim();
    if icon.is_empty() || icon.contains("://") {
        return None;
    }
    let mime = mime_for(icon)?;

    [ext_path.join("assets").join(icon), ext_path.join(icon)]
        .iter()
        .filter(|path| {
            fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() >= MIN_ICON_BYTES)
        })
        .find_map(|path| fs::read(path).ok())
        .map(|bytes| format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn assets_icon_is_encoded() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("assets")).unwrap();
        fs::write(temp.path().join("assets/icon.png"), [7u8; 120]).unwrap();

        let url = icon_data_url(temp.path(), "icon.png").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let decoded = STANDARD
            .decode(url.trim_start_matches("data:image/png;base64,"))
            .unwrap();
        assert_eq!(decoded.len(), 120);
    }

    #[test]
    fn root_icon_is_used_when_assets_lack_it() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("logo.svg"), vec![b' '; 200]).unwrap();
        assert!(
            icon_data_url(temp.path(), "logo.svg")
                .unwrap()
                .starts_with("data:image/svg+xml;base64,")
        );
    }

    #[test]
    fn tiny_files_are_rejected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("assets")).unwrap();
        fs::write(temp.path().join("assets/icon.png"), [0u8; 12]).unwrap();
        assert!(icon_data_url(temp.path(), "icon.png").is_none());
    }

    #[test]
    fn tiny_assets_icon_falls_back_to_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("assets")).unwrap();
        fs::write(temp.path().join("assets/icon.png"), [0u8; 12]).unwrap();
        fs::write(temp.path().join("icon.png"), [1u8; 150]).unwrap();
        assert!(icon_data_url(temp.path(), "icon.png").is_some());
    }

    #[test]
    fn unknown_types_and_urls_are_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("icon.bmp"), [1u8; 150]).unwrap();
        assert!(icon_data_url(temp.path(), "icon.bmp").is_none());
        assert!(icon_data_url(temp.path(), "https://cdn/icon.png").is_none());
    }
}
