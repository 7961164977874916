use std::sync::{Arc, OnceLock};

use tokio::runtime::Runtime;

use crate::animation::AnimationClip;
use crate::assets::blob::{AssetMap, BlobScope, ObjectUrlRegistry};
use crate::assets::io::{AssetReaderVariant, ResourceFetcher};
use crate::assets::loaders::GltfLoader;
use crate::assets::resolver::VirtualUrlResolver;
use crate::errors::{Result, ViewerError};
use crate::scene::{NodeHandle, Scene};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Runtime that background loads are spawned on.
pub fn get_asset_runtime() -> Result<&'static Runtime> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("asset-loader")
        .build()?;
    // A concurrent caller may have won the race; its runtime is kept
    let _ = RUNTIME.set(runtime);
    RUNTIME
        .get()
        .ok_or_else(|| ViewerError::TaskAborted("asset runtime unavailable".to_string()))
}

/// Arguments of one load.
#[derive(Debug, Clone, Default)]
pub struct LoadRequest {
    /// URL of the entry `.gltf` / `.glb`
    pub url: String,
    /// Prefix the bundled files are keyed under
    pub root_path: String,
    /// Bundled files, keyed by relative path
    pub asset_map: AssetMap,
}

impl LoadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bundle(mut self, root_path: impl Into<String>, asset_map: AssetMap) -> Self {
        self.root_path = root_path.into();
        self.asset_map = asset_map;
        self
    }
}

/// A loaded asset, built into a detached scene.
///
/// The blob handles used while loading stay alive in `scope` until the
/// asset is installed (or dropped).
pub struct LoadedAsset {
    pub scene: Scene,
    pub root: NodeHandle,
    pub clips: Vec<Arc<AnimationClip>>,
    pub scope: BlobScope,
    pub source: String,
}

impl std::fmt::Debug for LoadedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedAsset")
            .field("source", &self.source)
            .field("nodes", &self.scene.nodes.len())
            .field("clips", &self.clips.len())
            .field("blob_handles", &self.scope.handles().len())
            .finish_non_exhaustive()
    }
}

/// Turns a [`LoadRequest`] into a [`LoadedAsset`].
#[derive(Clone, Debug, Default)]
pub struct AssetLoader {
    registry: ObjectUrlRegistry,
    reader: AssetReaderVariant,
}

impl AssetLoader {
    #[must_use]
    pub fn new(registry: ObjectUrlRegistry, reader: AssetReaderVariant) -> Self {
        Self { registry, reader }
    }

    #[must_use]
    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.registry
    }

    /// Fetches and deserializes the asset.
    ///
    /// On failure the error is returned as produced and every blob handle
    /// allocated so far has been revoked.
    pub async fn load(&self, request: LoadRequest) -> Result<LoadedAsset> {
        let LoadRequest {
            url,
            root_path,
            asset_map,
        } = request;

        log::info!("Loading {url}");
        let mut resolver = VirtualUrlResolver::new(&url, &root_path, asset_map, self.registry.clone());
        let fetcher = ResourceFetcher::new(self.registry.clone(), self.reader.clone());

        let result = GltfLoader::load(&url, &mut resolver, &fetcher).await;
        let scope = resolver.into_scope();

        match result {
            Ok(content) => Ok(LoadedAsset {
                scene: content.scene,
                root: content.root,
                clips: content.clips.into_iter().map(Arc::new).collect(),
                scope,
                source: url,
            }),
            Err(err) => {
                log::error!("Failed to load {url}: {err}");
                drop(scope);
                Err(err)
            }
        }
    }
}
