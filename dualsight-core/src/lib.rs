//! # Dualsight Core
//!
//! Core types and components for running one image classifier on two
//! inference backends at once.
//!
//! This crate provides:
//! - Error handling types
//! - Configuration for encoding, ranking and per-backend sessions
//! - The tensor encoder
//! - The backend session registry and inference orchestrator
//! - Softmax, top-k classification and result aggregation
//!
//! ## Modules
//!
//! * [`core`] - Configuration, error handling, sessions and orchestration
//! * [`domain`] - Backend identifiers, tensors and report types
//! * [`processors`] - Encoding, classification and aggregation
//! * [`utils`] - Image decoding and class table loading

pub mod core;
pub mod domain;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    // Error Handling
    pub use crate::core::{ClassifyError, ClassifyResult};

    // Configuration
    pub use crate::core::config::{
        BackendSessionConfig, ClassifierConfig, ConfigValidator, OrtExecutionProvider,
        OrtSessionConfig,
    };

    // Inference
    pub use crate::core::inference::{
        BackendOutput, InferenceSession, ModelSource, Orchestrator, OrtSessionFactory,
        RawOutput, SessionFactory, SessionRegistry,
    };

    // Domain types
    pub use crate::domain::{
        AggregatedReport, BackendId, BackendResult, ClassificationEntry, Headline, ImageTensor,
    };

    // Processing stages
    pub use crate::processors::{Classifier, ResizeFilter, TensorEncoder, aggregate, encode};
    pub use crate::utils::ClassTable;
}
