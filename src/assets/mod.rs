//! Asset loading
//!
//! - [`blob`]: bundled files and their temporary `blob:` handles
//! - [`resolver`]: maps resource URLs onto bundled files
//! - [`io`]: byte readers for everything that is not bundled
//! - [`loaders`]: glTF deserialization into a detached scene
//! - [`loader`]: the async entry point tying them together

pub mod blob;
pub mod environment;
pub mod io;
pub mod loader;
pub mod loaders;
pub mod resolver;

pub use blob::{AssetMap, Blob, BlobScope, ObjectUrlRegistry};
pub use environment::{EnvironmentEntry, default_catalog, find_environment};
pub use io::{AssetReader, AssetReaderVariant, FileAssetReader, MemoryAssetReader, ResourceFetcher};
pub use loader::{AssetLoader, LoadRequest, LoadedAsset, get_asset_runtime};
pub use loaders::{GltfContent, GltfLoader};
pub use resolver::{VirtualUrlResolver, extract_url_base, resolve_relative};
