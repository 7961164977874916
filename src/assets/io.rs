use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use rustc_hash::FxHashMap;

use crate::assets::blob::{BLOB_SCHEME, Blob, ObjectUrlRegistry};
use crate::errors::{Result, ViewerError};

/// Asset reader trait
///
/// Fetches raw bytes for URLs that are neither bundled blobs nor data URIs.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Local file reader
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        tokio::fs::read(&path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ViewerError::AssetNotFound(path.display().to_string())
            } else {
                ViewerError::Io(err)
            }
        })
    }
}

/// Serves a fixed set of files from memory. Handy for hosts that fetch
/// everything up front, and for tests.
#[derive(Default)]
pub struct MemoryAssetReader {
    files: FxHashMap<String, Vec<u8>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(uri.into(), bytes);
    }

    #[must_use]
    pub fn with_file(mut self, uri: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(uri, bytes);
        self
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.files
            .get(uri)
            .cloned()
            .ok_or_else(|| ViewerError::AssetNotFound(uri.to_string()))
    }
}

/// Asset reader variants
/// Static dispatch over the supported readers
#[derive(Clone)]
pub enum AssetReaderVariant {
    File(Arc<FileAssetReader>),
    Memory(Arc<MemoryAssetReader>),
}

impl AssetReaderVariant {
    /// Reader rooted at a directory (or at the directory of a file).
    pub fn file(root: impl AsRef<Path>) -> Self {
        Self::File(Arc::new(FileAssetReader::new(root)))
    }

    #[must_use]
    pub fn memory(reader: MemoryAssetReader) -> Self {
        Self::Memory(Arc::new(reader))
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            Self::File(r) => r.read_bytes(uri).await,
            Self::Memory(r) => r.read_bytes(uri).await,
        }
    }

    /// File name part of a path or URL.
    #[must_use]
    pub fn source_filename(source: &str) -> &str {
        source.rsplit('/').next().unwrap_or(source)
    }
}

impl Default for AssetReaderVariant {
    fn default() -> Self {
        Self::file(".")
    }
}

impl std::fmt::Debug for AssetReaderVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(r) => write!(f, "File({})", r.root_path().display()),
            Self::Memory(r) => write!(f, "Memory({} files)", r.files.len()),
        }
    }
}

// ============================================================================
// Fetching resolved URLs
// ============================================================================

/// Reads whatever a resolved URL points at: a live `blob:` handle, an inline
/// `data:` URI, or a path handed to the reader.
#[derive(Clone, Debug)]
pub struct ResourceFetcher {
    registry: ObjectUrlRegistry,
    reader: AssetReaderVariant,
}

impl ResourceFetcher {
    #[must_use]
    pub fn new(registry: ObjectUrlRegistry, reader: AssetReaderVariant) -> Self {
        Self { registry, reader }
    }

    pub async fn fetch(&self, url: &str) -> Result<Blob> {
        if url.starts_with(BLOB_SCHEME) {
            return self
                .registry
                .get(url)
                .ok_or_else(|| ViewerError::AssetNotFound(url.to_string()));
        }
        if url.starts_with("data:") {
            return decode_data_uri(url).map(|(_, bytes)| Blob::from(bytes));
        }
        let bytes = self.reader.read_bytes(url).await?;
        Ok(Blob::from(bytes))
    }
}

/// Splits a `data:[<mime>][;base64],<payload>` URI into its MIME type and
/// decoded bytes.
pub fn decode_data_uri(uri: &str) -> Result<(Option<String>, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ViewerError::DataUri(format!("not a data URI: {}", truncate(uri))))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ViewerError::DataUri(format!("missing payload separator: {}", truncate(uri))))?;

    let (mime, is_base64) = match meta.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (meta, false),
    };
    let mime = (!mime.is_empty()).then(|| mime.to_string());

    let bytes = if is_base64 {
        base64::engine::general_purpose::STANDARD.decode(payload)?
    } else {
        payload.as_bytes().to_vec()
    };
    Ok((mime, bytes))
}

fn truncate(uri: &str) -> &str {
    let end = uri.char_indices().nth(48).map_or(uri.len(), |(i, _)| i);
    &uri[..end]
}
