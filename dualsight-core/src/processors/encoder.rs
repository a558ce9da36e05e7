//! Image to tensor encoding.
//!
//! Images are decoded, converted to 8-bit RGBA, resized to the model input
//! size and written out as a planar `[1, 3, H, W]` float32 tensor scaled to
//! `[0, 1]`. The alpha channel is dropped.
//!
//! Resizing uses bilinear interpolation (`FilterType::Triangle`) unless
//! configured otherwise. An image that already has the target size is not
//! resampled, so its pixels pass through unchanged.

use crate::core::config::ClassifierConfig;
use crate::core::constants::{DEFAULT_INPUT_SHAPE, MAX_INPUT_SIDE, PIXEL_SCALE};
use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::domain::{ImageTensor, TENSOR_CHANNELS};
use crate::utils::image::{channel_count, decode_image, read_image_bytes};
use image::{DynamicImage, RgbaImage, imageops::FilterType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Interpolation filter used when resizing to the model input size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Bilinear,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Encodes images into model input tensors of a fixed size.
#[derive(Debug, Clone)]
pub struct TensorEncoder {
    /// Target (height, width).
    input_shape: (u32, u32),
    filter: ResizeFilter,
}

impl Default for TensorEncoder {
    fn default() -> Self {
        Self {
            input_shape: DEFAULT_INPUT_SHAPE,
            filter: ResizeFilter::default(),
        }
    }
}

impl TensorEncoder {
    /// Creates an encoder producing `[1, 3, height, width]` tensors.
    pub fn new(height: u32, width: u32) -> ClassifyResult<Self> {
        if height == 0 || width == 0 {
            return Err(ClassifyError::invalid_input(format!(
                "target size must be non-zero, got {height}x{width}"
            )));
        }
        if height > MAX_INPUT_SIDE || width > MAX_INPUT_SIDE {
            return Err(ClassifyError::invalid_input(format!(
                "target size {height}x{width} exceeds {MAX_INPUT_SIDE} per side"
            )));
        }
        Ok(Self {
            input_shape: (height, width),
            filter: ResizeFilter::default(),
        })
    }

    /// Creates an encoder from the classifier configuration.
    pub fn from_config(config: &ClassifierConfig) -> ClassifyResult<Self> {
        let (height, width) = config.input_shape;
        Ok(Self::new(height, width)?.with_filter(config.resize_filter))
    }

    /// Sets the resize filter.
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Target (height, width).
    pub fn input_shape(&self) -> (u32, u32) {
        self.input_shape
    }

    /// Decodes and encodes raw image bytes.
    pub fn encode(&self, bytes: &[u8]) -> ClassifyResult<ImageTensor> {
        let img = decode_image(bytes)?;
        self.encode_image(&img)
    }

    /// Reads an image file and encodes it.
    pub fn encode_file(&self, path: impl AsRef<Path>) -> ClassifyResult<ImageTensor> {
        let bytes = read_image_bytes(path)?;
        self.encode(&bytes)
    }

    /// Encodes an already decoded image.
    pub fn encode_image(&self, img: &DynamicImage) -> ClassifyResult<ImageTensor> {
        let channels = channel_count(img);
        if (channels as usize) < TENSOR_CHANNELS {
            return Err(ClassifyError::UnsupportedFormat { channels });
        }

        let (height, width) = self.input_shape;
        let rgba = img.to_rgba8();
        let resized = if rgba.dimensions() == (width, height) {
            rgba
        } else {
            image::imageops::resize(&rgba, width, height, self.filter.into())
        };

        planar_tensor(&resized)
    }
}

/// Splits RGBA pixels into R, G and B planes scaled to `[0, 1]`.
fn planar_tensor(img: &RgbaImage) -> ClassifyResult<ImageTensor> {
    let (width, height) = img.dimensions();
    let plane = (width as usize) * (height as usize);

    let mut data = vec![0.0f32; TENSOR_CHANNELS * plane];
    for (i, pixel) in img.pixels().enumerate() {
        let [r, g, b, _] = pixel.0;
        data[i] = f32::from(r) / PIXEL_SCALE;
        data[plane + i] = f32::from(g) / PIXEL_SCALE;
        data[2 * plane + i] = f32::from(b) / PIXEL_SCALE;
    }

    ImageTensor::from_planar(height as usize, width as usize, data)
}

/// Encodes image bytes into a `[1, 3, target_h, target_w]` tensor with the
/// default bilinear filter.
pub fn encode(bytes: &[u8], target_h: u32, target_w: u32) -> ClassifyResult<ImageTensor> {
    TensorEncoder::new(target_h, target_w)?.encode(bytes)
}
