//! In-memory blobs and their temporary `blob:` handles
//!
//! A drag-and-drop or bundled load hands the viewer a map of relative paths to
//! byte buffers. While the asset is being deserialized, every file the asset
//! references is exposed through a short-lived `blob:<uuid>` URL that the
//! fetcher can read back. The handles are owned by a [`BlobScope`], which
//! releases each of them exactly once when it goes out of scope.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use uuid::Uuid;

/// Shared, immutable file contents.
pub type Blob = Arc<[u8]>;

/// Relative path (as the host bundled it) to file contents.
pub type AssetMap = FxHashMap<String, Blob>;

pub const BLOB_SCHEME: &str = "blob:";

/// Process-wide table of live `blob:` handles.
///
/// Cloning shares the same table.
#[derive(Clone, Default)]
pub struct ObjectUrlRegistry {
    entries: Arc<RwLock<FxHashMap<String, Blob>>>,
}

impl ObjectUrlRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh handle for `blob`.
    pub fn create(&self, blob: Blob) -> String {
        let url = format!("{BLOB_SCHEME}{}", Uuid::new_v4());
        self.entries.write().insert(url.clone(), blob);
        url
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<Blob> {
        self.entries.read().get(url).cloned()
    }

    /// Returns `true` if the handle was live.
    pub fn revoke(&self, url: &str) -> bool {
        self.entries.write().remove(url).is_some()
    }

    /// Number of handles not yet revoked.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries.read().len()
    }
}

impl std::fmt::Debug for ObjectUrlRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectUrlRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Owns the handles created during one load.
///
/// Dropping the scope revokes them; a handle is never revoked twice.
#[derive(Debug)]
pub struct BlobScope {
    registry: ObjectUrlRegistry,
    handles: Vec<String>,
}

impl BlobScope {
    #[must_use]
    pub fn new(registry: ObjectUrlRegistry) -> Self {
        Self {
            registry,
            handles: Vec::new(),
        }
    }

    pub fn track(&mut self, url: String) {
        self.handles.push(url);
    }

    #[must_use]
    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.registry
    }

    #[must_use]
    pub fn handles(&self) -> &[String] {
        &self.handles
    }

    /// Revokes all handles now instead of waiting for the drop.
    pub fn release(&mut self) {
        for url in self.handles.drain(..) {
            if !self.registry.revoke(&url) {
                log::warn!("Blob handle {url} was already revoked");
            }
        }
    }
}

impl Drop for BlobScope {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            log::debug!("Releasing {} blob handle(s)", self.handles.len());
        }
        self.release();
    }
}
