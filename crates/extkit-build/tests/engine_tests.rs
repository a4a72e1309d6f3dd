//! Build engine behaviour with a fake bundler.

mod common;

use std::fs;
use std::sync::Arc;

use common::{BROKEN_MARKER, FakeBundler, Workspace};
use extkit_build::Error;
use extkit_manifest::Platform;
use extkit_test_utils::minimal_manifest;
use pretty_assertions::assert_eq;
use serde_json::json;

const SOURCE: &str = "export default function Command() { return null; }";

fn three_command_workspace() -> Workspace {
    let ws = Workspace::new(&minimal_manifest("weather", &["forecast", "radar", "alerts"]));
    ws.source("src/forecast.tsx", SOURCE)
        .source("src/radar/index.ts", SOURCE)
        .source("src/commands/alerts.jsx", SOURCE);
    ws
}

#[tokio::test]
async fn builds_every_resolvable_command() {
    let ws = three_command_workspace();
    let bundler = Arc::new(FakeBundler::default());
    let engine = ws.engine(bundler.clone());

    let built = engine.build_all_commands("weather", &ws.ext_path).await.unwrap();

    assert_eq!(built, 3);
    assert_eq!(bundler.calls(), 3);
    for command in ["forecast", "radar", "alerts"] {
        let artifact = engine.artifact_path("weather", command);
        assert!(fs::read_to_string(&artifact).unwrap().contains(SOURCE));
    }
}

#[tokio::test]
async fn missing_entry_reduces_count_only() {
    let ws = Workspace::new(&minimal_manifest("weather", &["forecast", "radar", "ghost"]));
    ws.source("src/forecast.tsx", SOURCE).source("src/radar.tsx", SOURCE);
    let engine = ws.engine(Arc::new(FakeBundler::default()));

    let built = engine.build_all_commands("weather", &ws.ext_path).await.unwrap();

    assert_eq!(built, 2);
    assert!(engine.artifact_path("weather", "forecast").is_file());
    assert!(engine.artifact_path("weather", "radar").is_file());
    assert!(!engine.artifact_path("weather", "ghost").exists());
}

#[tokio::test]
async fn bundler_failure_is_isolated_per_command() {
    let ws = three_command_workspace();
    ws.source("src/forecast.tsx", &format!("{BROKEN_MARKER}\n{SOURCE}"));
    let engine = ws.engine(Arc::new(FakeBundler::default()));

    let built = engine.build_all_commands("weather", &ws.ext_path).await.unwrap();

    assert_eq!(built, 2);
    assert!(!engine.artifact_path("weather", "forecast").exists());
    assert!(engine.artifact_path("weather", "radar").is_file());
}

#[tokio::test]
async fn build_all_wipes_stale_artifacts() {
    let ws = three_command_workspace();
    let engine = ws.engine(Arc::new(FakeBundler::default()));
    let stale = engine.artifact_path("weather", "removed-command");
    common::write(&stale, "old");

    engine.build_all_commands("weather", &ws.ext_path).await.unwrap();

    assert!(!stale.exists());
}

#[tokio::test]
async fn empty_output_is_not_counted() {
    let ws = Workspace::new(&minimal_manifest("weather", &["forecast"]));
    ws.source("src/forecast.tsx", SOURCE);

    struct Blank;
    #[async_trait::async_trait]
    impl extkit_build::Bundler for Blank {
        fn name(&self) -> &'static str {
            "blank"
        }
        async fn bundle(
            &self,
            _request: &extkit_build::BundleRequest<'_>,
        ) -> extkit_build::Result<Vec<u8>> {
            Ok(b"  \n".to_vec())
        }
    }
    let engine = extkit_build::BuildEngine::new(&ws.cache_root, Default::default())
        .with_bundler(Arc::new(Blank));

    assert_eq!(engine.build_all_commands("weather", &ws.ext_path).await.unwrap(), 0);
    assert!(!engine.artifact_path("weather", "forecast").exists());
}

#[tokio::test]
async fn single_build_leaves_siblings_untouched() {
    let ws = three_command_workspace();
    let engine = ws.engine(Arc::new(FakeBundler::default()));
    engine.build_all_commands("weather", &ws.ext_path).await.unwrap();

    let radar_before = engine.artifact_checksum("weather", "radar").unwrap();
    let alerts_before = engine.artifact_checksum("weather", "alerts").unwrap();
    fs::remove_file(engine.artifact_path("weather", "forecast")).unwrap();

    assert!(engine.build_single_command("weather", &ws.ext_path, "forecast").await);

    assert!(engine.artifact_path("weather", "forecast").is_file());
    assert_eq!(engine.artifact_checksum("weather", "radar").unwrap(), radar_before);
    assert_eq!(engine.artifact_checksum("weather", "alerts").unwrap(), alerts_before);
}

#[tokio::test]
async fn single_build_reports_unknown_command() {
    let ws = three_command_workspace();
    let engine = ws.engine(Arc::new(FakeBundler::default()));

    let err = engine
        .try_build_single_command("weather", &ws.ext_path, "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownCommand { .. }));
    assert!(!engine.build_single_command("weather", &ws.ext_path, "nope").await);
}

#[tokio::test]
async fn incompatible_commands_are_skipped() {
    let manifest = json!({
        "name": "weather",
        "commands": [
            { "name": "forecast" },
            { "name": "menubar", "platforms": ["macOS"] }
        ]
    });
    let ws = Workspace::new(&manifest);
    ws.source("src/forecast.tsx", SOURCE).source("src/menubar.tsx", SOURCE);
    let bundler = Arc::new(FakeBundler::default());
    let engine = ws.engine(bundler.clone()).with_platform(Platform::Windows);

    assert_eq!(engine.build_all_commands("weather", &ws.ext_path).await.unwrap(), 1);
    assert_eq!(bundler.calls(), 1);

    let err = engine
        .try_build_single_command("weather", &ws.ext_path, "menubar")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Incompatible { .. }));
}

#[tokio::test]
async fn missing_manifest_is_an_error() {
    let ws = three_command_workspace();
    fs::remove_file(ws.ext_path.join("package.json")).unwrap();
    let engine = ws.engine(Arc::new(FakeBundler::default()));

    let err = engine.build_all_commands("weather", &ws.ext_path).await.unwrap_err();
    assert!(matches!(err, Error::Manifest(_)));
}
