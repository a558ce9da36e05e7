//! Utility functions for the classification pipeline.
//!
//! This module provides image decoding helpers and class table loading.

pub mod dict;
pub mod image;

pub use dict::{ClassLabel, ClassTable};
pub use image::{channel_count, decode_image, load_image, read_image_bytes};
