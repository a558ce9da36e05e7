//! Constants used throughout the pipeline.

/// The default input shape (height, width) for classification models.
pub const DEFAULT_INPUT_SHAPE: (u32, u32) = (224, 224);

/// The default number of ranked entries returned per backend.
pub const DEFAULT_TOPK: usize = 5;

/// Divisor mapping 8-bit channel values into `[0, 1]`.
pub const PIXEL_SCALE: f32 = 255.0;

/// Upper bound on either spatial dimension accepted by the encoder.
pub const MAX_INPUT_SIDE: u32 = 4096;
