//! Asset Loading Integration Tests
//!
//! Tests for:
//! - Bundled loads through the virtual URL resolver
//! - Blob handle release on success and failure
//! - Data URI buffers, GLB containers and the fallback reader
//! - Background loading through the asset runtime

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{BIN, ENTRY, FixtureBuilder, PNG, find_node, load_fixture, session};
use myth_viewer::assets::{AssetLoader, AssetMap, AssetReaderVariant, MemoryAssetReader, ObjectUrlRegistry};
use myth_viewer::{LoadRequest, ViewerError};

// ============================================================================
// Bundled loads
// ============================================================================

#[test]
fn bundled_load_installs_content() {
    let mut session = session();
    load_fixture(&mut session, &FixtureBuilder::new().build());

    let root = session.content().expect("content installed");
    let scene = session.scene();
    assert_eq!(scene.get_node(root).unwrap().name, "FixtureScene");
    assert!(find_node(scene, root, "Triangle").is_some());
    assert!(find_node(scene, root, "Body").is_some());
    assert_eq!(session.animation().clips().len(), 2);
}

#[test]
fn bundled_load_releases_every_blob_handle() {
    let mut session = session();
    load_fixture(&mut session, &FixtureBuilder::new().build());
    assert_eq!(session.registry().live_count(), 0);
}

#[tokio::test]
async fn scope_keeps_handles_until_dropped() {
    let registry = ObjectUrlRegistry::new();
    let loader = AssetLoader::new(registry.clone(), AssetReaderVariant::memory(MemoryAssetReader::new()));
    let fixture = FixtureBuilder::new().build();

    let asset = loader
        .load(LoadRequest::new(ENTRY).with_bundle("", fixture.asset_map()))
        .await
        .unwrap();

    // entry, buffer and image
    assert_eq!(asset.scope.handles().len(), 3);
    assert_eq!(registry.live_count(), 3);

    drop(asset);
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn root_path_prefixes_bundle_keys() {
    let fixture = FixtureBuilder::new().build();
    let map: AssetMap = fixture
        .asset_map()
        .into_iter()
        .map(|(key, blob)| (format!("drop/{key}"), blob))
        .collect();

    let mut session = session();
    session
        .load_blocking(LoadRequest::new(ENTRY).with_bundle("drop/", map))
        .unwrap();
    assert!(session.content().is_some());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn missing_buffer_fails_and_releases_handles() {
    let fixture = FixtureBuilder::new().build();
    let mut map = fixture.asset_map();
    map.remove(BIN);

    let mut session = session();
    let err = session
        .load_blocking(LoadRequest::new(ENTRY).with_bundle("", map))
        .unwrap_err();

    assert!(matches!(err, ViewerError::AssetNotFound(_)), "got {err}");
    assert!(err.is_load_failure());
    assert!(session.content().is_none());
    assert_eq!(session.registry().live_count(), 0);
}

#[test]
fn malformed_entry_surfaces_deserializer_error() {
    let mut session = session();
    load_fixture(&mut session, &FixtureBuilder::new().build());
    let previous = session.content();

    let mut map = AssetMap::default();
    map.insert(ENTRY.to_string(), Arc::from(&b"{ not json"[..]));
    let err = session
        .load_blocking(LoadRequest::new(ENTRY).with_bundle("", map))
        .unwrap_err();

    assert!(matches!(err, ViewerError::Gltf(_)), "got {err}");
    // Nothing replaced the installed content
    assert_eq!(session.content(), previous);
    assert_eq!(session.registry().live_count(), 0);
}

#[test]
fn missing_image_is_not_fatal() {
    let fixture = FixtureBuilder::new().build();
    let mut map = fixture.asset_map();
    map.remove(PNG);

    let mut session = session();
    session
        .load_blocking(LoadRequest::new(ENTRY).with_bundle("", map))
        .unwrap();
    assert!(session.content().is_some());
    // The texture exists, just without pixels
    assert!(session.scene().textures.values().all(|t| t.image.is_none()));
}

// ============================================================================
// Other sources
// ============================================================================

#[test]
fn embedded_buffer_needs_no_bin_file() {
    let fixture = FixtureBuilder::new().embedded().build();
    let mut map = fixture.asset_map();
    map.remove(BIN);

    let mut session = session();
    session
        .load_blocking(LoadRequest::new(ENTRY).with_bundle("", map))
        .unwrap();
    assert!(session.content().is_some());
}

#[test]
fn glb_container_loads() {
    let fixture = FixtureBuilder::new().build();
    let mut map = AssetMap::default();
    map.insert("scene.glb".to_string(), Arc::from(fixture.glb_bytes()));
    map.insert(PNG.to_string(), Arc::from(fixture.png.clone()));

    let mut session = session();
    session
        .load_blocking(LoadRequest::new("scene.glb").with_bundle("", map))
        .unwrap();

    let root = session.content().unwrap();
    assert!(find_node(session.scene(), root, "Spine").is_some());
    assert_eq!(session.animation().clips().len(), 2);
}

#[test]
fn unbundled_files_come_from_the_reader() {
    let fixture = FixtureBuilder::new().build();
    let reader = MemoryAssetReader::new()
        .with_file("models/scene.gltf", fixture.gltf_bytes())
        .with_file("models/scene.bin", fixture.bin.clone())
        .with_file("models/tex.png", fixture.png.clone());

    let mut session = myth_viewer::ViewerSession::with_reader(
        myth_viewer::ViewerConfig::default(),
        AssetReaderVariant::memory(reader),
    );
    session.load_blocking(LoadRequest::new("models/scene.gltf")).unwrap();

    assert!(session.content().is_some());
    assert!(session.scene().textures.values().any(|t| t.image.is_some()));
}

#[test]
fn scene_graph_dump_names_node_types() {
    let mut session = session();
    load_fixture(&mut session, &FixtureBuilder::new().build());
    let dump = session.scene().describe_subtree(session.content().unwrap());

    assert!(dump.contains("<Group> FixtureScene"));
    assert!(dump.contains("<SkinnedMesh> Body"));
    assert!(dump.contains("<Bone> Hip"));
    assert!(dump.contains("<PerspectiveCamera> cube_cam"));
}

// ============================================================================
// Background loading
// ============================================================================

#[test]
fn background_load_installs_on_poll() {
    let fixture = FixtureBuilder::new().build();
    let mut session = session();
    session
        .request_load(LoadRequest::new(ENTRY).with_bundle("", fixture.asset_map()))
        .unwrap();
    assert!(session.is_loading());

    let second = session.request_load(LoadRequest::new(ENTRY));
    assert!(matches!(second, Err(ViewerError::LoadInFlight)));

    let deadline = Instant::now() + Duration::from_secs(10);
    let outcome = loop {
        if let Some(outcome) = session.poll_load() {
            break outcome;
        }
        assert!(Instant::now() < deadline, "background load timed out");
        std::thread::sleep(Duration::from_millis(5));
    };

    outcome.unwrap();
    assert!(!session.is_loading());
    assert!(session.content().is_some());
    assert_eq!(session.registry().live_count(), 0);
}
