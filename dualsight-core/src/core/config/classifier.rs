//! Top-level configuration for encoding, backend sessions and ranking.

use super::errors::{ConfigError, ConfigValidator};
use super::onnx::OrtSessionConfig;
use crate::core::constants::{DEFAULT_INPUT_SHAPE, DEFAULT_TOPK, MAX_INPUT_SIDE};
use crate::core::errors::{ClassifyError, ClassifyResult};
use crate::domain::BackendId;
use crate::processors::ResizeFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Session settings for one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSessionConfig {
    /// When `false` the backend is never loaded and always reports absent.
    pub enabled: bool,
    /// ONNX Runtime session options.
    pub ort_session: OrtSessionConfig,
}

impl BackendSessionConfig {
    /// Default settings for `backend`.
    pub fn for_backend(backend: BackendId) -> Self {
        let ort_session = match backend {
            BackendId::Portable => OrtSessionConfig::portable(),
            BackendId::Accelerated => OrtSessionConfig::accelerated(),
        };
        Self {
            enabled: true,
            ort_session,
        }
    }

    /// A configuration that keeps the backend unloaded.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ort_session: OrtSessionConfig::default(),
        }
    }
}

impl Default for BackendSessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ort_session: OrtSessionConfig::default(),
        }
    }
}

/// Configuration for an image classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Model input shape as (height, width).
    pub input_shape: (u32, u32),
    /// Number of ranked entries kept per backend.
    pub topk: usize,
    /// Interpolation used when resizing to `input_shape`.
    pub resize_filter: ResizeFilter,
    /// Optional class table file, one class per line.
    pub class_table: Option<PathBuf>,
    /// Return `NoBackendsAvailable` instead of an empty report when no
    /// backend produced a classification.
    pub require_headline: bool,
    /// Session settings for the portable backend. A section present in a
    /// config file replaces the preset, so unset ONNX options fall back to
    /// ONNX Runtime defaults rather than the preset's.
    pub portable: BackendSessionConfig,
    /// Session settings for the accelerated backend.
    pub accelerated: BackendSessionConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            input_shape: DEFAULT_INPUT_SHAPE,
            topk: DEFAULT_TOPK,
            resize_filter: ResizeFilter::default(),
            class_table: None,
            require_headline: false,
            portable: BackendSessionConfig::for_backend(BackendId::Portable),
            accelerated: BackendSessionConfig::for_backend(BackendId::Accelerated),
        }
    }
}

impl ClassifierConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a JSON configuration file. Missing fields take
    /// their default values.
    pub fn from_file(path: impl AsRef<Path>) -> ClassifyResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            ClassifyError::config_error(format!(
                "failed to parse classifier config '{}': {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the model input shape as (height, width).
    pub fn input_shape(mut self, shape: (u32, u32)) -> Self {
        self.input_shape = shape;
        self
    }

    /// Sets the number of ranked entries.
    pub fn topk(mut self, topk: usize) -> Self {
        self.topk = topk;
        self
    }

    /// Sets the resize filter.
    pub fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.resize_filter = filter;
        self
    }

    /// Sets the class table path.
    pub fn class_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.class_table = Some(path.into());
        self
    }

    /// Makes "no usable backend" an error.
    pub fn require_headline(mut self, required: bool) -> Self {
        self.require_headline = required;
        self
    }

    /// Replaces the session settings for `backend`.
    pub fn backend_session(mut self, backend: BackendId, config: BackendSessionConfig) -> Self {
        match backend {
            BackendId::Portable => self.portable = config,
            BackendId::Accelerated => self.accelerated = config,
        }
        self
    }

    /// Session settings for `backend`.
    pub fn session_config(&self, backend: BackendId) -> &BackendSessionConfig {
        match backend {
            BackendId::Portable => &self.portable,
            BackendId::Accelerated => &self.accelerated,
        }
    }
}

impl ConfigValidator for ClassifierConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let (height, width) = self.input_shape;
        self.validate_image_dimensions(width, height, MAX_INPUT_SIDE)?;
        if self.topk == 0 {
            return Err(ConfigError::InvalidTopk);
        }
        for backend in BackendId::ALL {
            let cfg = self.session_config(backend);
            if cfg.ort_session.intra_threads == Some(0) || cfg.ort_session.inter_threads == Some(0)
            {
                return Err(ConfigError::InvalidConfig {
                    message: format!("{backend} backend thread counts must be greater than 0"),
                });
            }
        }
        Ok(())
    }
}
