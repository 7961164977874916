//! Animation Lifecycle Tests
//!
//! Tests for:
//! - Mixer creation only for content with clips, one mixer at a time
//! - First clip autoplay and the per-clip toggles
//! - Playback speed and play-all
//! - Frame-driven evaluation through the render loop
//! - KeyframeTrack step/linear/cubic sampling
//! - KeyframeCursor local scan and binary search fallback
//! - Morph weight tracks on single meshes and primitive groups

mod common;

use std::sync::Arc;
use std::time::Duration;

use glam::{Vec3, Vec4};

use common::{FixtureBuilder, approx, find_node, load_fixture, loaded_session, session};
use myth_viewer::animation::{
    AnimationClip, AnimationMixer, InterpolationMode, KeyframeCursor, KeyframeTrack, MorphWeightData, TargetPath,
    Track, TrackData, TrackMeta, TrackTarget,
};
use myth_viewer::resources::{Geometry, Material, Mesh};
use myth_viewer::scene::{Node, Scene};
use myth_viewer::viewer::{ControlChange, ControlKey, ControlValue, NullBackend, RenderLoop};

// ============================================================================
// Mixer lifecycle
// ============================================================================

#[test]
fn mixer_is_bound_to_current_content() {
    let session = loaded_session();
    let mixer = session.animation().mixer().expect("clips give a mixer");
    assert_eq!(Some(mixer.root()), session.content());
}

#[test]
fn no_clips_no_mixer() {
    let mut session = session();
    load_fixture(&mut session, &FixtureBuilder::new().without_clips().build());
    assert!(session.animation().mixer().is_none());
    assert!(session.state().action_states.is_empty());
    assert!(!session.panel().folder_visible(myth_viewer::viewer::Folder::Animation));
}

#[test]
fn reload_replaces_the_mixer() {
    let mut session = loaded_session();
    let first_root = session.content().unwrap();

    load_fixture(&mut session, &FixtureBuilder::new().build());
    let mixer = session.animation().mixer().unwrap();
    assert_ne!(mixer.root(), first_root);
    assert_eq!(Some(mixer.root()), session.content());

    // Only the autoplayed clip has an action on the fresh mixer
    assert_eq!(mixer.actions().count(), 1);
}

#[test]
fn loading_clipless_content_drops_old_mixer() {
    let mut session = loaded_session();
    load_fixture(&mut session, &FixtureBuilder::new().without_clips().build());
    assert!(session.animation().mixer().is_none());
    assert!(session.animation().clips().is_empty());
}

// ============================================================================
// Clip toggles
// ============================================================================

#[test]
fn first_clip_autoplays() {
    let session = loaded_session();
    let states = &session.state().action_states;
    assert_eq!(states.get("Walk"), Some(&true));
    assert_eq!(states.get("Idle"), Some(&false));

    let mixer = session.animation().mixer().unwrap();
    assert!(mixer.is_running("Walk"));
    assert!(!mixer.is_running("Idle"));
}

#[test]
fn clip_toggle_plays_and_stops() {
    let mut session = loaded_session();
    session
        .apply(ControlChange::new(ControlKey::Clip("Idle".into()), ControlValue::Bool(true)))
        .unwrap();
    assert!(session.animation().mixer().unwrap().is_running("Idle"));
    assert_eq!(session.state().action_states.get("Idle"), Some(&true));

    session
        .apply(ControlChange::new(ControlKey::Clip("Walk".into()), ControlValue::Bool(false)))
        .unwrap();
    assert!(!session.animation().mixer().unwrap().is_running("Walk"));
    assert_eq!(session.state().action_states.get("Walk"), Some(&false));
}

#[test]
fn unknown_clip_is_rejected() {
    let mut session = loaded_session();
    assert!(!session.set_clip_enabled("Run", true));
    assert!(
        session
            .apply(ControlChange::new(ControlKey::Clip("Run".into()), ControlValue::Bool(true)))
            .is_err()
    );
}

#[test]
fn play_all_marks_every_clip() {
    let mut session = loaded_session();
    session
        .apply(ControlChange::new(ControlKey::PlayAll, ControlValue::Trigger))
        .unwrap();

    let mixer = session.animation().mixer().unwrap();
    assert!(mixer.is_running("Walk"));
    assert!(mixer.is_running("Idle"));
    assert!(session.state().action_states.values().all(|&on| on));
}

#[test]
fn playback_speed_scales_the_mixer() {
    let mut session = loaded_session();
    session
        .apply(ControlChange::new(ControlKey::PlaybackSpeed, ControlValue::Number(0.5)))
        .unwrap();
    assert!(approx(session.animation().mixer().unwrap().time_scale, 0.5));
    assert!(approx(session.state().playback_speed, 0.5));
}

// ============================================================================
// Frame-driven evaluation
// ============================================================================

#[test]
fn render_loop_advances_walk() {
    let mut session = loaded_session();
    let mut render_loop = RenderLoop::new();
    let mut backend = NullBackend::default();

    // The first frame only sets the clock
    for ms in [1000, 1250, 1500] {
        render_loop.frame(Duration::from_millis(ms), &mut session, &mut backend);
    }

    let root = session.content().unwrap();
    let hip = find_node(session.scene(), root, "Hip").unwrap();
    let y = session.scene().get_node(hip).unwrap().transform.position.y;
    assert!(approx(y, 0.5), "hip at {y}");
    assert_eq!(backend.frames, 3);
}

#[test]
fn half_speed_halves_progress() {
    let mut session = loaded_session();
    session
        .apply(ControlChange::new(ControlKey::PlaybackSpeed, ControlValue::Number(0.5)))
        .unwrap();

    let mut render_loop = RenderLoop::new();
    let mut backend = NullBackend::default();
    render_loop.frame(Duration::ZERO, &mut session, &mut backend);
    render_loop.frame(Duration::from_millis(500), &mut session, &mut backend);

    let root = session.content().unwrap();
    let hip = find_node(session.scene(), root, "Hip").unwrap();
    let y = session.scene().get_node(hip).unwrap().transform.position.y;
    assert!(approx(y, 0.25), "hip at {y}");
}

#[test]
fn zero_delta_first_frame_keeps_bind_pose() {
    let mut session = loaded_session();
    let mut render_loop = RenderLoop::new();
    let mut backend = NullBackend::default();
    render_loop.frame(Duration::from_secs(42), &mut session, &mut backend);

    let root = session.content().unwrap();
    let hip = find_node(session.scene(), root, "Hip").unwrap();
    assert!(approx(session.scene().get_node(hip).unwrap().transform.position.y, 0.0));
}

// ============================================================================
// KeyframeTrack: sampling
// ============================================================================

fn x_track(times: Vec<f32>, xs: &[f32], interpolation: InterpolationMode) -> KeyframeTrack<Vec3> {
    KeyframeTrack::new(times, xs.iter().map(|&x| Vec3::new(x, 0.0, 0.0)).collect(), interpolation)
}

#[test]
fn step_holds_previous_key() {
    let track = x_track(vec![0.0, 1.0, 2.0], &[0.0, 10.0, 20.0], InterpolationMode::Step);
    let mut cursor = KeyframeCursor::default();

    assert!(approx(track.sample_with_cursor(0.5, &mut cursor).x, 0.0));
    assert!(approx(track.sample_with_cursor(0.999, &mut cursor).x, 0.0));
    assert!(approx(track.sample_with_cursor(1.0, &mut cursor).x, 10.0));
    assert!(approx(track.sample_with_cursor(1.5, &mut cursor).x, 10.0));
    assert!(approx(track.sample_with_cursor(2.5, &mut cursor).x, 20.0));
}

#[test]
fn linear_clamps_outside_keys() {
    let track = x_track(vec![1.0, 2.0], &[10.0, 20.0], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();

    assert!(approx(track.sample_with_cursor(0.5, &mut cursor).x, 10.0));
    assert!(approx(track.sample_with_cursor(1.5, &mut cursor).x, 15.0));
    assert!(approx(track.sample_with_cursor(5.0, &mut cursor).x, 20.0));
}

#[test]
fn cubic_spline_with_flat_tangents_eases() {
    // Per key: in-tangent, value, out-tangent
    let track = x_track(
        vec![0.0, 1.0],
        &[0.0, 0.0, 0.0, 0.0, 10.0, 0.0],
        InterpolationMode::CubicSpline,
    );
    let mut cursor = KeyframeCursor::default();

    assert!(approx(track.sample_with_cursor(0.0, &mut cursor).x, 0.0));
    assert!(approx(track.sample_with_cursor(0.25, &mut cursor).x, 1.5625));
    assert!(approx(track.sample_with_cursor(0.5, &mut cursor).x, 5.0));
    assert!(approx(track.sample_with_cursor(1.0, &mut cursor).x, 10.0));
}

#[test]
fn cubic_spline_uses_out_tangent() {
    let track = x_track(
        vec![0.0, 1.0],
        &[0.0, 0.0, 4.0, 0.0, 10.0, 0.0],
        InterpolationMode::CubicSpline,
    );
    let mut cursor = KeyframeCursor::default();

    // 5.0 from the values plus 4.0 * h10(0.5) = 0.5 from the tangent
    let x = track.sample_with_cursor(0.5, &mut cursor).x;
    assert!(approx(x, 5.5), "got {x}");
}

#[test]
fn single_key_track_is_constant() {
    let track = x_track(vec![0.5], &[7.0], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.0, &mut cursor).x, 7.0));
    assert!(approx(track.sample_with_cursor(3.0, &mut cursor).x, 7.0));
}

// ============================================================================
// KeyframeCursor: search
// ============================================================================

fn ramp_track() -> KeyframeTrack<Vec3> {
    let times: Vec<f32> = (0..=10).map(|i| i as f32).collect();
    let xs: Vec<f32> = times.iter().map(|t| t * 10.0).collect();
    x_track(times, &xs, InterpolationMode::Linear)
}

#[test]
fn cursor_follows_forward_playback() {
    let track = ramp_track();
    let mut cursor = KeyframeCursor::default();

    for step in 0..20 {
        let time = step as f32 * 0.5;
        let x = track.sample_with_cursor(time, &mut cursor).x;
        assert!(approx(x, time * 10.0), "at {time}: {x}");
    }
    assert_eq!(cursor.last_index, 9);
}

#[test]
fn cursor_jumps_forward_beyond_scan_window() {
    let track = ramp_track();
    let mut cursor = KeyframeCursor::default();

    let x = track.sample_with_cursor(9.5, &mut cursor).x;
    assert!(approx(x, 95.0), "got {x}");
    assert_eq!(cursor.last_index, 9);
}

#[test]
fn cursor_steps_backward() {
    let track = ramp_track();
    let mut cursor = KeyframeCursor { last_index: 9 };

    let x = track.sample_with_cursor(8.5, &mut cursor).x;
    assert!(approx(x, 85.0), "got {x}");
    assert_eq!(cursor.last_index, 8);
}

#[test]
fn cursor_wraps_back_to_start() {
    let track = ramp_track();
    let mut cursor = KeyframeCursor { last_index: 8 };

    // Loop wrap: too far back for the local scan
    let x = track.sample_with_cursor(0.5, &mut cursor).x;
    assert!(approx(x, 5.0), "got {x}");
    assert_eq!(cursor.last_index, 0);
}

#[test]
fn stale_cursor_past_the_end_is_clamped() {
    let track = ramp_track();
    let mut cursor = KeyframeCursor { last_index: 50 };

    let x = track.sample_with_cursor(3.25, &mut cursor).x;
    assert!(approx(x, 32.5), "got {x}");
    assert_eq!(cursor.last_index, 3);
}

// ============================================================================
// Morph weights
// ============================================================================

#[test]
fn morph_clip_drives_mesh_weights() {
    let mut session = session();
    load_fixture(&mut session, &FixtureBuilder::new().with_morph_clip().build());
    session
        .apply(ControlChange::new(ControlKey::Clip("Blink".into()), ControlValue::Bool(true)))
        .unwrap();

    let mut render_loop = RenderLoop::new();
    let mut backend = NullBackend::default();
    render_loop.frame(Duration::ZERO, &mut session, &mut backend);
    render_loop.frame(Duration::from_millis(500), &mut session, &mut backend);

    let root = session.content().unwrap();
    let triangle = find_node(session.scene(), root, "Triangle").unwrap();
    let weight = session.scene().mesh_of(triangle).unwrap().morph_target_influences[0];
    assert!(approx(weight, 0.5), "weight {weight}");
}

#[test]
fn morph_track_on_group_reaches_every_primitive() {
    let mut scene = Scene::new();
    let material = scene.add_material(Material::new_basic(Vec4::ONE));
    let geometry = Arc::new(Geometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]).with_morph_targets(2));

    let root = scene.add_node(Node::new("Content"));
    let face = scene.add_to_parent(Node::new("Face"), root);
    let upper = scene.add_mesh("Face", Mesh::new(Arc::clone(&geometry), material), Some(face));
    let lower = scene.add_mesh("Face", Mesh::new(Arc::clone(&geometry), material), Some(face));

    let clip = Arc::new(AnimationClip::new(
        "Smile".to_string(),
        vec![Track {
            meta: TrackMeta {
                node: TrackTarget::Name("Face".to_string()),
                target: TargetPath::Weights,
            },
            data: TrackData::MorphWeights(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![MorphWeightData::from_slice(&[0.0, 0.0]), MorphWeightData::from_slice(&[1.0, 0.5])],
                InterpolationMode::Linear,
            )),
        }],
    ));

    let mut mixer = AnimationMixer::new(root);
    mixer.clip_action(&clip, &scene).play();
    mixer.update(0.5, &mut scene);

    for primitive in [upper, lower] {
        let influences = &scene.mesh_of(primitive).unwrap().morph_target_influences;
        assert!(approx(influences[0], 0.5), "{influences:?}");
        assert!(approx(influences[1], 0.25), "{influences:?}");
    }
}
