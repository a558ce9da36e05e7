//! The core module of the classification pipeline.
//!
//! This module contains the fundamental components of the pipeline, including:
//! - Configuration management
//! - Constants used throughout the pipeline
//! - Error handling
//! - Backend sessions, the session registry and the inference orchestrator
//!
//! It also provides re-exports of commonly used types and functions for convenience.

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;

pub use config::{BackendSessionConfig, ClassifierConfig, ConfigError, ConfigValidator};
pub use constants::*;
pub use errors::{ClassifyError, ClassifyResult, SimpleError};
pub use inference::{
    BackendOutput, InferenceSession, ModelSource, Orchestrator, OrtSessionFactory, RawOutput,
    SessionFactory, SessionRegistry,
};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
