//! Virtual URL resolution
//!
//! Maps the relative URLs found inside an asset onto the in-memory files the
//! host bundled with it. Anything not bundled passes through unchanged so the
//! same asset can also be served from disk or a server.

use crate::assets::blob::{AssetMap, BlobScope, ObjectUrlRegistry};

/// Directory part of `url`, including the trailing `/`.
///
/// URLs without a directory resolve relative to `./`.
#[must_use]
pub fn extract_url_base(url: &str) -> &str {
    match url.rfind('/') {
        Some(index) => &url[..=index],
        None => "./",
    }
}

/// Joins a resource URI found in an asset onto the asset's base URL.
///
/// Absolute URLs, `data:` and `blob:` URIs are returned unchanged.
#[must_use]
pub fn resolve_relative(base_url: &str, uri: &str) -> String {
    let lower = uri.get(..8).unwrap_or(uri).to_ascii_lowercase();
    let is_absolute = uri.starts_with("//")
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:")
        || lower.starts_with("blob:");
    if uri.is_empty() || is_absolute {
        return uri.to_string();
    }
    format!("{base_url}{uri}")
}

/// Rewrites resource URLs for a single load.
///
/// Every handle the resolver allocates is recorded; [`into_scope`](Self::into_scope)
/// hands them over to a [`BlobScope`] that revokes them.
pub struct VirtualUrlResolver {
    base_url: String,
    root_path: String,
    asset_map: AssetMap,
    scope: BlobScope,
}

impl VirtualUrlResolver {
    /// `url` is the entry asset's own URL; its directory becomes the base
    /// that resource URLs are made relative to.
    #[must_use]
    pub fn new(url: &str, root_path: &str, asset_map: AssetMap, registry: ObjectUrlRegistry) -> Self {
        Self {
            base_url: extract_url_base(url).to_string(),
            root_path: root_path.to_string(),
            asset_map,
            scope: BlobScope::new(registry),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Key an URL is looked up under in the asset map.
    #[must_use]
    pub fn normalize(&self, url: &str) -> String {
        let relative = url.replacen(self.base_url.as_str(), "", 1);
        let relative = relative
            .strip_prefix("./")
            .or_else(|| relative.strip_prefix('/'))
            .unwrap_or(&relative);
        format!("{}{relative}", self.root_path)
    }

    /// Returns a fresh `blob:` handle when the normalized URL is bundled,
    /// otherwise `path + url`. Never fails.
    pub fn resolve(&mut self, url: &str, path: Option<&str>) -> String {
        let key = self.normalize(url);
        if let Some(blob) = self.asset_map.get(&key) {
            let handle = self.scope.registry().create(blob.clone());
            log::trace!("Resolved {url} -> {handle}");
            self.scope.track(handle.clone());
            return handle;
        }
        format!("{}{url}", path.unwrap_or(""))
    }

    /// Number of handles allocated so far.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.scope.handles().len()
    }

    #[must_use]
    pub fn into_scope(self) -> BlobScope {
        self.scope
    }
}
