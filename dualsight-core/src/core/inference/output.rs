//! Raw, unclassified backend outputs.

use crate::domain::BackendId;
use serde::Serialize;

/// How a backend's dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStatus {
    /// The forward pass ran and produced values.
    Completed,
    /// No session was loaded for the backend.
    Absent,
    /// The forward pass or its worker task failed.
    Failed,
}

/// Flat output vector of one forward pass and its wall time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawOutput {
    pub values: Vec<f32>,
    pub elapsed_seconds: f64,
    pub status: OutputStatus,
}

impl RawOutput {
    /// Output of a successful forward pass.
    pub fn completed(values: Vec<f32>, elapsed_seconds: f64) -> Self {
        Self {
            values,
            elapsed_seconds,
            status: OutputStatus::Completed,
        }
    }

    /// Empty sentinel for a backend with no session.
    pub fn absent() -> Self {
        Self {
            values: Vec::new(),
            elapsed_seconds: 0.0,
            status: OutputStatus::Absent,
        }
    }

    /// Empty sentinel for a backend whose forward pass failed.
    pub fn failed() -> Self {
        Self {
            values: Vec::new(),
            elapsed_seconds: 0.0,
            status: OutputStatus::Failed,
        }
    }

    /// Whether the output holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A raw output tagged with the backend that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendOutput {
    pub backend: BackendId,
    pub output: RawOutput,
}

impl BackendOutput {
    pub fn new(backend: BackendId, output: RawOutput) -> Self {
        Self { backend, output }
    }
}
