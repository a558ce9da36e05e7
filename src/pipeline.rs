//! The end-to-end classification pipeline.
//!
//! [`ImageClassifier`] owns the encoder, the classifier and a session
//! registry shared with its orchestrator. A typical flow:
//!
//! ```rust,no_run
//! use dualsight::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = ImageClassifierBuilder::new()
//!     .topk(5)
//!     .class_table("models/imagenet_classes.txt")
//!     .build()?;
//! classifier.load_model(std::path::Path::new("models/resnet50.onnx")).await;
//!
//! let report = classifier.analyze_file("cat.jpg").await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

use dualsight_core::core::config::{BackendSessionConfig, ClassifierConfig, ConfigValidator};
use dualsight_core::core::inference::{
    ModelSource, Orchestrator, OrtSessionFactory, SessionFactory, SessionRegistry,
};
use dualsight_core::core::{ClassifyError, ClassifyResult};
use dualsight_core::domain::{AggregatedReport, BackendId, BackendResult, ImageTensor};
use dualsight_core::processors::{Classifier, ResizeFilter, TensorEncoder, aggregate};
use dualsight_core::utils::{ClassTable, read_image_bytes};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builder for [`ImageClassifier`].
#[derive(Default)]
pub struct ImageClassifierBuilder {
    config: ClassifierConfig,
    class_table: Option<ClassTable>,
    factory: Option<Arc<dyn SessionFactory>>,
}

impl ImageClassifierBuilder {
    /// Creates a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    pub fn with_config(config: ClassifierConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Sets the model input shape as (height, width).
    pub fn input_shape(mut self, shape: (u32, u32)) -> Self {
        self.config = self.config.input_shape(shape);
        self
    }

    /// Sets how many ranked entries each backend reports.
    pub fn topk(mut self, topk: usize) -> Self {
        self.config = self.config.topk(topk);
        self
    }

    /// Sets the resize interpolation.
    pub fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.config = self.config.resize_filter(filter);
        self
    }

    /// Reads class labels from a file when building.
    pub fn class_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = self.config.class_table(path);
        self
    }

    /// Uses an already loaded class table instead of a file.
    pub fn class_labels(mut self, table: ClassTable) -> Self {
        self.class_table = Some(table);
        self
    }

    /// Fails `analyze` with `NoBackendsAvailable` instead of returning an
    /// empty report.
    pub fn require_headline(mut self, required: bool) -> Self {
        self.config = self.config.require_headline(required);
        self
    }

    /// Overrides the session settings of one backend.
    pub fn backend_session(mut self, backend: BackendId, config: BackendSessionConfig) -> Self {
        self.config = self.config.backend_session(backend, config);
        self
    }

    /// Replaces the ONNX Runtime session factory.
    pub fn session_factory(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Validates the configuration and assembles the classifier. No model
    /// is loaded yet; every backend starts absent.
    pub fn build(self) -> ClassifyResult<ImageClassifier> {
        self.config.validate()?;

        let class_table = match (self.class_table, &self.config.class_table) {
            (Some(table), _) => table,
            (None, Some(path)) => ClassTable::from_file(path)?,
            (None, None) => {
                debug!("no class table configured, labels fall back to class indices");
                ClassTable::default()
            }
        };

        let factory: Arc<dyn SessionFactory> = match self.factory {
            Some(factory) => factory,
            None => Arc::new(OrtSessionFactory::new(&self.config)),
        };
        let registry = Arc::new(SessionRegistry::new(factory));

        Ok(ImageClassifier {
            encoder: TensorEncoder::from_config(&self.config)?,
            classifier: Classifier::new(class_table, self.config.topk),
            orchestrator: Orchestrator::new(registry),
            config: self.config,
        })
    }
}

/// Classifies images on every available backend and merges the results.
#[derive(Debug)]
pub struct ImageClassifier {
    config: ClassifierConfig,
    encoder: TensorEncoder,
    classifier: Classifier,
    orchestrator: Orchestrator,
}

impl ImageClassifier {
    /// Builds a classifier from `config` with ONNX Runtime sessions.
    pub fn new(config: ClassifierConfig) -> ClassifyResult<Self> {
        ImageClassifierBuilder::with_config(config).build()
    }

    pub fn builder() -> ImageClassifierBuilder {
        ImageClassifierBuilder::new()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Registry shared with the orchestrator.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.orchestrator.registry()
    }

    /// Loads `model` on every backend, replacing previous sessions.
    /// Backends that fail to load stay absent. Returns the loaded backends.
    pub async fn load_model(&self, model: impl Into<ModelSource>) -> Vec<BackendId> {
        let ready = self.registry().load_model(model).await;
        info!(backends = ?ready, "model loaded");
        ready
    }

    /// Encodes image bytes into a model input tensor.
    pub fn encode(&self, image_bytes: &[u8]) -> ClassifyResult<ImageTensor> {
        self.encoder.encode(image_bytes)
    }

    /// Runs `tensor` on every backend and ranks each output. One result
    /// per backend, in fixed order; unusable backends have no entries.
    pub async fn infer(&self, tensor: ImageTensor) -> Vec<BackendResult> {
        let outputs = self.orchestrator.run(tensor).await;
        self.classifier.classify_all(&outputs)
    }

    /// Classifies encoded image bytes.
    ///
    /// # Errors
    ///
    /// Returns `Decode` or `UnsupportedFormat` for unusable image bytes, and
    /// `NoBackendsAvailable` when no backend classified the image and
    /// `require_headline` is set. Backend failures are otherwise reported as
    /// missing per-backend results.
    pub async fn analyze(&self, image_bytes: &[u8]) -> ClassifyResult<AggregatedReport> {
        let tensor = self.encode(image_bytes)?;
        let report = aggregate(self.infer(tensor).await);

        if report.headline.is_none() {
            if self.config.require_headline {
                return Err(ClassifyError::NoBackendsAvailable);
            }
            warn!("no backend produced a classification");
        }
        Ok(report)
    }

    /// Reads and classifies an image file.
    pub async fn analyze_file(&self, path: impl AsRef<Path>) -> ClassifyResult<AggregatedReport> {
        let bytes = read_image_bytes(path)?;
        self.analyze(&bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_build_rejects_zero_topk() {
        let result = ImageClassifierBuilder::new().topk(0).build();
        assert!(matches!(result, Err(ClassifyError::Config { .. })));
    }

    #[test]
    fn test_build_with_missing_class_table() {
        let result = ImageClassifierBuilder::new()
            .class_table("/nonexistent/classes.txt")
            .build();
        assert!(matches!(result, Err(ClassifyError::InvalidInput { .. })));
    }

    #[test]
    fn test_build_reads_class_table() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "n01440764 tench").unwrap();
        let classifier = ImageClassifierBuilder::new()
            .class_table(file.path())
            .input_shape((32, 32))
            .build()
            .unwrap();
        assert_eq!(classifier.config().input_shape, (32, 32));
    }

    #[tokio::test]
    async fn test_fresh_classifier_has_no_backends() {
        let classifier = ImageClassifier::new(ClassifierConfig::default()).unwrap();
        assert!(classifier.registry().available_backends().await.is_empty());
    }
}
