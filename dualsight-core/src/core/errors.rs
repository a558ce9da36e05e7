//! Error types for the classification pipeline.
//!
//! Only malformed input to the tensor encoder is meant to reach callers as a
//! hard failure. Backend-scoped errors (`SessionCreation`, `InferenceExecution`)
//! are constructed so they can be logged with full context and then recovered
//! by the registry or orchestrator.

use crate::domain::BackendId;
use thiserror::Error;

/// Boxed error source used for chaining backend and runtime failures.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Convenient result alias for classification operations.
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Enum representing the errors that can occur while encoding an image,
/// loading a model or running inference.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The image bytes are not a valid image container.
    #[error("image decode")]
    Decode(#[source] image::ImageError),

    /// The decoded image exposes fewer than three color channels.
    #[error("unsupported image format: expected at least 3 color channels, got {channels}")]
    UnsupportedFormat {
        /// Number of channels exposed by the decoded image.
        channels: u8,
    },

    /// A backend could not construct a session for the model.
    #[error("session creation failed for {backend} backend: {context}")]
    SessionCreation {
        /// Backend whose session failed to load.
        backend: BackendId,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: BoxedSource,
    },

    /// A backend's forward pass failed.
    #[error("inference failed on {backend} backend: {context}")]
    InferenceExecution {
        /// Backend whose forward pass failed.
        backend: BackendId,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: BoxedSource,
    },

    /// No backend produced a usable classification.
    #[error("no inference backend produced a classification")]
    NoBackendsAvailable,

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// A minimal error carrying only a message, used when there is no richer
/// source error to chain.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a new simple error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl ClassifyError {
    /// Creates a session creation error for `backend`.
    pub fn session_creation(
        backend: BackendId,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SessionCreation {
            backend,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an inference execution error for `backend`.
    pub fn inference_execution(
        backend: BackendId,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InferenceExecution {
            backend,
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns the backend this error is scoped to, if any.
    pub fn backend(&self) -> Option<BackendId> {
        match self {
            Self::SessionCreation { backend, .. } | Self::InferenceExecution { backend, .. } => {
                Some(*backend)
            }
            _ => None,
        }
    }
}
