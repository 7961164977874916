use uuid::Uuid;

use crate::errors::Result;

/// Decoded RGBA8 pixel data.
#[derive(Debug, Clone)]
pub struct Image {
    pub uuid: Uuid,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Image {
    #[must_use]
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            width,
            height,
            data,
        }
    }

    /// Decodes a PNG / JPEG / WebP payload into RGBA8.
    ///
    /// `mime_type` is only a hint; the format is guessed from the bytes when
    /// the hint is missing or unknown.
    pub fn decode(bytes: &[u8], mime_type: Option<&str>) -> Result<Self> {
        let format = mime_type.and_then(image::ImageFormat::from_mime_type);
        let decoded = match format {
            Some(format) => image::load_from_memory_with_format(bytes, format)?,
            None => image::load_from_memory(bytes)?,
        };
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self::new(width, height, rgba.into_raw()))
    }

    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}
