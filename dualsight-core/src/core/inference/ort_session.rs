//! ONNX Runtime backed sessions.

use super::session::{InferenceSession, ModelSource, SessionFactory};
use crate::core::config::{
    BackendSessionConfig, ClassifierConfig, OrtExecutionProvider, OrtGraphOptimizationLevel,
    OrtSessionConfig,
};
use crate::core::errors::{ClassifyError, ClassifyResult, SimpleError};
use crate::domain::{BackendId, ImageTensor};
use ort::execution_providers::ExecutionProviderDispatch;
use ort::logging::LogLevel;
use ort::session::{
    Session,
    builder::{GraphOptimizationLevel, SessionBuilder},
};
use ort::value::{TensorRef, ValueType};
use std::sync::Mutex;
use tracing::debug;

/// An ONNX Runtime session bound to one backend.
pub struct OrtSession {
    session: Mutex<Session>,
    backend: BackendId,
    input_name: String,
    output_name: String,
    /// Declared shape of the primary input; dynamic dims are negative.
    input_shape: Option<Vec<i64>>,
}

impl std::fmt::Debug for OrtSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtSession")
            .field("backend", &self.backend)
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_shape", &self.input_shape)
            .finish()
    }
}

impl OrtSession {
    /// Builds a session for `backend` from `model` with the given options.
    pub fn load(
        backend: BackendId,
        model: &ModelSource,
        cfg: &OrtSessionConfig,
    ) -> ClassifyResult<Self> {
        let builder = Session::builder().map_err(|e| {
            ClassifyError::session_creation(backend, "failed to create session builder", e)
        })?;
        let builder = apply_ort_config(builder, cfg).map_err(|e| {
            ClassifyError::session_creation(backend, "failed to apply session configuration", e)
        })?;
        let session = match model {
            ModelSource::Bytes(bytes) => builder.commit_from_memory(&bytes[..]),
            ModelSource::Path(path) => builder.commit_from_file(path),
        }
        .map_err(|e| {
            ClassifyError::session_creation(
                backend,
                format!("failed to create ONNX session from {}", model.describe()),
                e,
            )
        })?;

        let input = session.inputs.first().ok_or_else(|| {
            ClassifyError::session_creation(
                backend,
                "model declares no inputs",
                SimpleError::new("expected a single image input"),
            )
        })?;
        let input_name = input.name.clone();
        let input_shape = match &input.input_type {
            ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
            _ => None,
        };
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                ClassifyError::session_creation(
                    backend,
                    "model declares no outputs",
                    SimpleError::new("expected a single score output"),
                )
            })?;

        debug!(
            backend = %backend,
            input = %input_name,
            output = %output_name,
            shape = ?input_shape,
            "created ONNX session"
        );

        Ok(Self {
            session: Mutex::new(session),
            backend,
            input_name,
            output_name,
            input_shape,
        })
    }
}

impl InferenceSession for OrtSession {
    fn backend(&self) -> BackendId {
        self.backend
    }

    fn declared_input_name(&self) -> &str {
        &self.input_name
    }

    fn declared_output_name(&self) -> &str {
        &self.output_name
    }

    fn forward(&self, tensor: &ImageTensor) -> ClassifyResult<Vec<f32>> {
        if let Some(declared) = &self.input_shape {
            check_input_shape(declared, tensor).map_err(|message| {
                ClassifyError::inference_execution(
                    self.backend,
                    "input tensor does not match the model",
                    SimpleError::new(message),
                )
            })?;
        }

        let input = TensorRef::from_array_view(tensor.view()).map_err(|e| {
            ClassifyError::inference_execution(
                self.backend,
                format!("failed to bind input tensor with shape {:?}", tensor.shape()),
                e,
            )
        })?;

        let mut session = self.session.lock().map_err(|_| {
            ClassifyError::inference_execution(
                self.backend,
                "failed to acquire session lock",
                SimpleError::new("session lock poisoned"),
            )
        })?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| {
                ClassifyError::inference_execution(
                    self.backend,
                    format!(
                        "forward pass failed with input '{}' -> output '{}'",
                        self.input_name, self.output_name
                    ),
                    e,
                )
            })?;

        let (_, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ClassifyError::inference_execution(
                    self.backend,
                    format!("failed to extract output '{}' as f32", self.output_name),
                    e,
                )
            })?;
        Ok(data.to_vec())
    }
}

/// Compares a declared NCHW input shape with the tensor, ignoring dynamic
/// (non-positive) dims.
fn check_input_shape(declared: &[i64], tensor: &ImageTensor) -> Result<(), String> {
    if declared.len() != 4 {
        return Err(format!(
            "model input has rank {}, expected 4 (NCHW)",
            declared.len()
        ));
    }
    let actual = tensor.shape();
    for (axis, (&want, &got)) in declared.iter().zip(actual.iter()).enumerate() {
        if want > 0 && want as usize != got {
            return Err(format!(
                "dimension {axis} mismatch: model expects {declared:?}, tensor has {actual:?}"
            ));
        }
    }
    Ok(())
}

fn log_level(severity: Option<i32>) -> LogLevel {
    match severity {
        Some(0) => LogLevel::Verbose,
        Some(1) => LogLevel::Info,
        Some(2) => LogLevel::Warning,
        Some(4) => LogLevel::Fatal,
        _ => LogLevel::Error,
    }
}

fn apply_ort_config(
    mut builder: SessionBuilder,
    cfg: &OrtSessionConfig,
) -> Result<SessionBuilder, ort::Error> {
    builder = builder.with_log_level(log_level(cfg.log_severity_level))?;
    if let Some(intra) = cfg.intra_threads {
        builder = builder.with_intra_threads(intra)?;
    }
    if let Some(inter) = cfg.inter_threads {
        builder = builder.with_inter_threads(inter)?;
    }
    if let Some(par) = cfg.parallel_execution {
        builder = builder.with_parallel_execution(par)?;
    }
    if let Some(level) = cfg.optimization_level {
        use OrtGraphOptimizationLevel as OG;
        let mapped = match level {
            OG::DisableAll => GraphOptimizationLevel::Disable,
            OG::Level1 => GraphOptimizationLevel::Level1,
            OG::Level2 => GraphOptimizationLevel::Level2,
            OG::Level3 | OG::All => GraphOptimizationLevel::Level3,
        };
        builder = builder.with_optimization_level(mapped)?;
    }
    let providers = build_execution_providers(
        &cfg.providers_or_cpu(),
        cfg.error_on_provider_failure.unwrap_or(false),
    )?;
    builder = builder.with_execution_providers(providers)?;
    Ok(builder)
}

/// Builds execution providers from configuration.
fn build_execution_providers(
    eps: &[OrtExecutionProvider],
    error_on_failure: bool,
) -> Result<Vec<ExecutionProviderDispatch>, ort::Error> {
    use OrtExecutionProvider as EP;
    let mut providers = Vec::with_capacity(eps.len());

    for ep in eps {
        let dispatch = match ep {
            EP::CPU => ort::execution_providers::CPUExecutionProvider::default().build(),
            #[cfg(feature = "cuda")]
            EP::CUDA { device_id } => {
                let mut cuda = ort::execution_providers::CUDAExecutionProvider::default();
                if let Some(id) = device_id {
                    cuda = cuda.with_device_id(*id);
                }
                cuda.build()
            }
            #[cfg(feature = "directml")]
            EP::DirectML { device_id } => {
                let mut dml = ort::execution_providers::DirectMLExecutionProvider::default();
                if let Some(id) = device_id {
                    dml = dml.with_device_id(*id);
                }
                dml.build()
            }
            #[cfg(feature = "coreml")]
            EP::CoreML { subgraphs } => {
                let mut coreml = ort::execution_providers::CoreMLExecutionProvider::default();
                if let Some(sub) = subgraphs {
                    coreml = coreml.with_subgraphs(*sub);
                }
                coreml.build()
            }
            #[cfg(feature = "webgpu")]
            EP::WebGPU => ort::execution_providers::WebGPUExecutionProvider::default().build(),
            #[cfg(not(feature = "cuda"))]
            EP::CUDA { .. } => {
                return Err(ort::Error::new(
                    "CUDA execution provider requested but cuda feature is not enabled",
                ));
            }
            #[cfg(not(feature = "directml"))]
            EP::DirectML { .. } => {
                return Err(ort::Error::new(
                    "DirectML execution provider requested but directml feature is not enabled",
                ));
            }
            #[cfg(not(feature = "coreml"))]
            EP::CoreML { .. } => {
                return Err(ort::Error::new(
                    "CoreML execution provider requested but coreml feature is not enabled",
                ));
            }
            #[cfg(not(feature = "webgpu"))]
            EP::WebGPU => {
                return Err(ort::Error::new(
                    "WebGPU execution provider requested but webgpu feature is not enabled",
                ));
            }
        };
        let dispatch = if error_on_failure && !ep.is_cpu() {
            dispatch.error_on_failure()
        } else {
            dispatch
        };
        providers.push(dispatch);
    }

    Ok(providers)
}

/// Builds [`OrtSession`]s using per-backend configuration.
#[derive(Debug, Clone)]
pub struct OrtSessionFactory {
    portable: BackendSessionConfig,
    accelerated: BackendSessionConfig,
}

impl Default for OrtSessionFactory {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl OrtSessionFactory {
    /// Takes the backend session settings from the classifier configuration.
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            portable: config.portable.clone(),
            accelerated: config.accelerated.clone(),
        }
    }

    fn config(&self, backend: BackendId) -> &BackendSessionConfig {
        match backend {
            BackendId::Portable => &self.portable,
            BackendId::Accelerated => &self.accelerated,
        }
    }
}

impl SessionFactory for OrtSessionFactory {
    fn is_enabled(&self, backend: BackendId) -> bool {
        self.config(backend).enabled
    }

    fn create(
        &self,
        backend: BackendId,
        model: &ModelSource,
    ) -> ClassifyResult<Box<dyn InferenceSession>> {
        let session = OrtSession::load(backend, model, &self.config(backend).ort_session)?;
        Ok(Box::new(session))
    }
}
