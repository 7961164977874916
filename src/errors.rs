//! Error Types
//!
//! This module defines the error types used throughout the viewer.
//!
//! # Overview
//!
//! The main error type [`ViewerError`] covers the failure modes of a session:
//! - Asset loading and decoding errors (surfaced to the caller unmodified)
//! - I/O errors from the fallback reader
//! - Session misuse, such as overlapping loads or mistyped panel values
//!
//! Conditions the viewer recovers from silently (an unknown camera name, an
//! asset without animation clips) are not errors and never show up here.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, ViewerError>`.
//!
//! ```rust,ignore
//! use myth_viewer::errors::{ViewerError, Result};
//!
//! async fn open(session: &mut ViewerSession) -> Result<()> {
//!     session.load("models/scene.gltf", "", AssetMap::default()).await
//! }
//! ```

use thiserror::Error;

/// The main error type for the viewer.
#[derive(Error, Debug)]
pub enum ViewerError {
    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The deserializer rejected the asset.
    #[error("Load failed: {0}")]
    Load(String),

    /// glTF parsing error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// A resource referenced by the asset could not be located.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Asset index out of bounds.
    #[error("Asset index out of bounds: {context} (index: {index})")]
    AssetIndexOutOfBounds {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
    },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUri(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// A load was requested while another one is still running.
    #[error("A load is already in flight for this session")]
    LoadInFlight,

    /// The background load task went away without reporting a result.
    #[error("Load task aborted: {0}")]
    TaskAborted(String),

    /// A panel change carried a value of the wrong kind for its control.
    #[error("Invalid value for control `{control}`: {reason}")]
    InvalidControl {
        /// The control key that was changed
        control: String,
        /// What was wrong with the value
        reason: String,
    },
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for ViewerError {
    fn from(err: image::ImageError) -> Self {
        ViewerError::ImageDecode(err.to_string())
    }
}

impl From<gltf::Error> for ViewerError {
    fn from(err: gltf::Error) -> Self {
        ViewerError::Gltf(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ViewerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ViewerError::TaskAborted(err.to_string())
    }
}

impl ViewerError {
    /// Returns `true` for errors produced while fetching or decoding an asset.
    #[must_use]
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            ViewerError::Load(_)
                | ViewerError::Gltf(_)
                | ViewerError::AssetNotFound(_)
                | ViewerError::AssetIndexOutOfBounds { .. }
                | ViewerError::Io(_)
                | ViewerError::ImageDecode(_)
                | ViewerError::DataUri(_)
                | ViewerError::Json(_)
                | ViewerError::Base64(_)
        )
    }
}

/// Alias for `Result<T, ViewerError>`.
pub type Result<T> = std::result::Result<T, ViewerError>;
