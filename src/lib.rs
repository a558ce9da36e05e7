//! # Dualsight
//!
//! Image classification on two ONNX Runtime backends at once.
//!
//! Every image is encoded once and dispatched concurrently to a portable
//! (CPU) backend and an accelerated (GPU) backend. Each backend's output is
//! ranked independently with softmax and top-k, and the results are merged
//! into a single report whose headline comes from the first backend that
//! produced a prediction.
//!
//! ## Features
//!
//! - Planar `[1, 3, H, W]` float32 tensor encoding with configurable resizing
//! - Per-backend ONNX Runtime sessions with independent failure handling
//! - Concurrent dispatch with a fixed result order
//! - Stable top-k ranking against an optional class table
//! - JSON configuration and structured logging via `tracing`
//!
//! ## Modules
//!
//! * [`core`] - Configuration, error handling, sessions and orchestration
//! * [`domain`] - Backend identifiers, tensors and report types
//! * [`pipeline`] - The [`ImageClassifier`](pipeline::ImageClassifier) facade
//! * [`processors`] - Encoding, classification and aggregation
//! * [`utils`] - Image decoding and class table loading
//!
//! ## Cargo features
//!
//! `cuda`, `directml`, `coreml` and `webgpu` enable the matching ONNX Runtime
//! execution providers. Requesting a provider whose feature is disabled makes
//! that backend fail to load.

pub use dualsight_core::{core, domain, processors, utils};

pub mod pipeline;

/// Prelude module for convenient imports.
///
/// ```rust
/// use dualsight::prelude::*;
/// ```
pub mod prelude {
    pub use crate::pipeline::{ImageClassifier, ImageClassifierBuilder};
    pub use dualsight_core::prelude::*;
}
