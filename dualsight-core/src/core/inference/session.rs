//! The capability interface every backend session implements, and the
//! factory seam the registry uses to build sessions.

use crate::core::errors::ClassifyResult;
use crate::domain::{BackendId, ImageTensor};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A loaded model bound to one backend.
///
/// A session runs a single-input, single-output forward pass: the tensor is
/// bound to [`declared_input_name`](Self::declared_input_name) and the flat
/// values of [`declared_output_name`](Self::declared_output_name) are
/// returned.
pub trait InferenceSession: Send + Sync + fmt::Debug {
    /// Backend this session runs on.
    fn backend(&self) -> BackendId;

    /// Name of the model input the tensor is bound to.
    fn declared_input_name(&self) -> &str;

    /// Name of the model output that is read back.
    fn declared_output_name(&self) -> &str;

    /// Runs the forward pass. Blocks the calling thread.
    fn forward(&self, tensor: &ImageTensor) -> ClassifyResult<Vec<f32>>;
}

/// Builds sessions for the registry.
pub trait SessionFactory: Send + Sync {
    /// Whether the registry should attempt to build a session for `backend`.
    fn is_enabled(&self, _backend: BackendId) -> bool {
        true
    }

    /// Constructs a session for `backend` from `model`.
    fn create(
        &self,
        backend: BackendId,
        model: &ModelSource,
    ) -> ClassifyResult<Box<dyn InferenceSession>>;
}

/// Model bytes or a reference to them. The contents are opaque: only the
/// backend interprets them.
#[derive(Clone)]
pub enum ModelSource {
    /// Model bytes already in memory (e.g. fetched from remote storage).
    Bytes(Arc<[u8]>),
    /// A model file on disk.
    Path(PathBuf),
}

impl ModelSource {
    /// Wraps in-memory model bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(Arc::from(bytes.into()))
    }

    /// References a model file.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
            Self::Path(path) => path.display().to_string(),
        }
    }
}

impl fmt::Debug for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
        }
    }
}

impl From<Vec<u8>> for ModelSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<PathBuf> for ModelSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ModelSource {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_source_debug_hides_bytes() {
        let source = ModelSource::from_bytes(vec![0u8; 16]);
        assert_eq!(format!("{source:?}"), "Bytes(16)");
        assert_eq!(source.describe(), "<16 bytes in memory>");

        let source = ModelSource::from(Path::new("models/resnet.onnx"));
        assert_eq!(source.describe(), "models/resnet.onnx");
    }
}
