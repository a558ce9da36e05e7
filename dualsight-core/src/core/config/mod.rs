//! Configuration management for the classification pipeline.
//!
//! This module provides configuration types, validation traits, and the
//! ONNX Runtime session options used by each backend.

pub mod classifier;
pub mod errors;
pub mod onnx;

pub use classifier::{BackendSessionConfig, ClassifierConfig};
pub use errors::{ConfigError, ConfigValidator};
pub use onnx::*;
