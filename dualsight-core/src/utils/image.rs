//! Utility functions for decoding images.

use crate::core::errors::{ClassifyError, ClassifyResult};
use image::DynamicImage;
use std::path::Path;

/// Decodes image bytes in any container format supported by the `image`
/// crate, without resizing.
///
/// # Errors
///
/// Returns `ClassifyError::Decode` when the bytes are not a valid image.
pub fn decode_image(bytes: &[u8]) -> ClassifyResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(ClassifyError::Decode)
}

/// Reads an image file's raw bytes.
pub fn read_image_bytes(path: impl AsRef<Path>) -> ClassifyResult<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Loads and decodes an image file without resizing.
pub fn load_image(path: impl AsRef<Path>) -> ClassifyResult<DynamicImage> {
    let bytes = read_image_bytes(path)?;
    decode_image(&bytes)
}

/// Number of color channels exposed by a decoded image.
pub fn channel_count(img: &DynamicImage) -> u8 {
    img.color().channel_count()
}
