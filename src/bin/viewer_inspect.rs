//! Headless viewer run
//!
//! ```text
//! viewer_inspect <model.gltf|model.glb> [frames] [--config viewer.json]
//! ```
//!
//! Loads the model into a viewer session, prints what the panel would offer
//! and renders a number of frames against a backend that draws nothing.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use myth_viewer::assets::{AssetReaderVariant, LoadRequest};
use myth_viewer::viewer::{NullBackend, RenderLoop};
use myth_viewer::{ViewerConfig, ViewerSession};

const FRAME_TIME: Duration = Duration::from_micros(16_667);

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut model = None;
    let mut frames = 120_u32;
    let mut config_path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = Some(args.next().context("--config needs a path")?),
            _ if model.is_none() => model = Some(arg),
            _ => frames = arg.parse().with_context(|| format!("invalid frame count `{arg}`"))?,
        }
    }
    let Some(model) = model else {
        bail!("usage: viewer_inspect <model.gltf|model.glb> [frames] [--config viewer.json]");
    };

    let config = match config_path {
        Some(path) => ViewerConfig::from_path(&path).with_context(|| format!("reading {path}"))?,
        None => ViewerConfig::default(),
    };

    let path = Path::new(&model);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("model path has no file name")?;

    let mut session = ViewerSession::with_reader(config, AssetReaderVariant::file(path));
    session
        .load_blocking(LoadRequest::new(file_name))
        .with_context(|| format!("loading {model}"))?;

    let Some(root) = session.content() else {
        bail!("{model} produced no content");
    };

    println!("=== {model} ===");
    println!("Cameras: {}", session.camera_names().join(", "));
    let clips: Vec<&str> = session.animation().clip_names().collect();
    println!("Clips:   {}", if clips.is_empty() { "(none)".to_string() } else { clips.join(", ") });
    println!("Content lights: {}", !session.state().add_lights);
    print!("{}", session.scene().describe_subtree(root));

    let mut render_loop = RenderLoop::new();
    let mut backend = NullBackend::default();
    for i in 0..frames {
        render_loop.frame(FRAME_TIME * i, &mut session, &mut backend);
    }

    println!(
        "Rendered {} frame(s), {:.1} ms simulated",
        backend.frames,
        render_loop.timer().elapsed.as_secs_f32() * 1000.0
    );
    Ok(())
}
