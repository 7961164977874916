//! Content Framing Tests
//!
//! Tests for:
//! - Recentring of the content root on its bounding box centre
//! - Default camera placement, clip planes and orbit limits
//! - Idempotence and empty content

mod common;

use std::sync::Arc;

use common::{FixtureBuilder, approx, load_fixture, session};
use glam::{Vec3, Vec4};
use myth_viewer::resources::{Geometry, Material, Mesh};
use myth_viewer::scene::{Camera, Node, NodeHandle, Scene};
use myth_viewer::utils::OrbitControls;
use myth_viewer::viewer::{ContentNormalizer, Framing};

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

/// Root at (1, 1, 1) holding a mesh spanning (0, 0, 0)..(6, 8, 0): world
/// bounds centre (4, 5, 1), diagonal 10.
fn diagonal_ten_scene() -> (Scene, NodeHandle) {
    let mut scene = Scene::new();
    let mut root = Node::new("content");
    root.transform.position = Vec3::ONE;
    let root = scene.add_node(root);

    let material = scene.add_material(Material::new_standard(Vec4::ONE));
    let geometry = Geometry::new(vec![Vec3::ZERO, Vec3::new(6.0, 0.0, 0.0), Vec3::new(6.0, 8.0, 0.0)]);
    scene.add_mesh("plate", Mesh::new(Arc::new(geometry), material), Some(root));
    (scene, root)
}

// ============================================================================
// Recentring
// ============================================================================

#[test]
fn root_is_moved_by_minus_centre() {
    let (mut scene, root) = diagonal_ten_scene();
    let framing = ContentNormalizer::normalize(&mut scene, root).unwrap();

    let position = scene.get_node(root).unwrap().transform.position;
    assert!(approx_vec(position, Vec3::new(-3.0, -4.0, 0.0)), "got {position:?}");
    assert!(approx_vec(framing.center, Vec3::ZERO));
    assert!(approx(framing.size, 10.0));
}

#[test]
fn normalizing_twice_changes_nothing() {
    let (mut scene, root) = diagonal_ten_scene();
    let first = ContentNormalizer::normalize(&mut scene, root).unwrap();
    let after_first = scene.get_node(root).unwrap().transform.position;

    let second = ContentNormalizer::normalize(&mut scene, root).unwrap();
    let after_second = scene.get_node(root).unwrap().transform.position;

    assert!(approx_vec(after_first, after_second));
    assert!(approx(first.size, second.size));
    assert!(approx_vec(second.center, Vec3::ZERO));
}

#[test]
fn content_without_geometry_is_not_framed() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("empty"));
    scene.add_to_parent(Node::new("child"), root);
    assert!(ContentNormalizer::normalize(&mut scene, root).is_none());
}

// ============================================================================
// Camera placement
// ============================================================================

#[test]
fn framing_formula_for_size_ten() {
    let framing = Framing::new(Vec3::ZERO, 10.0);
    assert!(approx_vec(framing.camera_position, Vec3::new(5.0, 2.0, 5.0)));
    assert!(approx(framing.near, 0.1));
    assert!(approx(framing.far, 1000.0));
    assert!(approx(framing.max_distance, 100.0));
}

#[test]
fn apply_places_camera_and_saves_orbit() {
    let (mut scene, root) = diagonal_ten_scene();
    let camera = scene.add_camera("default", Camera::new_perspective(60.0, 1.5, 0.01, 1000.0), None);
    let mut controls = OrbitControls::new(Vec3::ZERO, 1.0);

    let framing = ContentNormalizer::normalize(&mut scene, root).unwrap();
    ContentNormalizer::apply(&framing, &mut scene, camera, &mut controls);

    let (transform, cam) = scene.query_camera_bundle(camera).unwrap();
    assert!(approx_vec(transform.position, Vec3::new(5.0, 2.0, 5.0)));
    assert!(approx(cam.near, 0.1));
    assert!(approx(cam.far, 1000.0));
    assert!(approx(controls.max_distance, 100.0));
    assert!(approx_vec(controls.eye(), Vec3::new(5.0, 2.0, 5.0)));

    // Wander off, then reset back to the framing
    controls.look_from(Vec3::new(0.0, 50.0, 1.0), Vec3::ONE);
    controls.reset();
    assert!(approx_vec(controls.eye(), Vec3::new(5.0, 2.0, 5.0)));
    assert!(approx_vec(controls.center, Vec3::ZERO));
}

#[test]
fn installed_content_is_centred() {
    let mut session = session();
    load_fixture(&mut session, &FixtureBuilder::new().build());

    // Content spans (0, 0, 0)..(14, 3, 0) before recentring
    let root = session.content().unwrap();
    let bounds = session.scene().world_bounds(root).unwrap();
    assert!(approx_vec(bounds.center(), Vec3::ZERO));

    let size = 205.0_f32.sqrt();
    let camera = session.default_camera();
    let position = session.scene().get_node(camera).unwrap().transform.position;
    assert!(approx_vec(position, Vec3::new(size / 2.0, size / 5.0, size / 2.0)));
}
