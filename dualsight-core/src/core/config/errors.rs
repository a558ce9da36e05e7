//! Configuration error types and validation traits.

use crate::core::errors::ClassifyError;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// An image dimension is zero or above the supported maximum.
    #[error("invalid image dimensions {width}x{height}: {message}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        message: String,
    },

    /// The number of ranked entries to return must be positive.
    #[error("topk must be greater than 0")]
    InvalidTopk,

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl From<ConfigError> for ClassifyError {
    fn from(err: ConfigError) -> Self {
        ClassifyError::config_error(err.to_string())
    }
}

/// A trait for validating configuration parameters.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Validates image dimensions against an upper bound.
    fn validate_image_dimensions(
        &self,
        width: u32,
        height: u32,
        max_side: u32,
    ) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width,
                height,
                message: "dimensions must be greater than 0".to_string(),
            });
        }
        if width > max_side || height > max_side {
            return Err(ConfigError::InvalidDimensions {
                width,
                height,
                message: format!("each side must be at most {max_side}"),
            });
        }
        Ok(())
    }
}
