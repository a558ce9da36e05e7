//! In-memory sessions and factories for exercising the registry and
//! orchestrator without a real model.

use super::session::{InferenceSession, ModelSource, SessionFactory};
use crate::core::errors::{ClassifyError, ClassifyResult, SimpleError};
use crate::domain::{BackendId, ImageTensor};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MockForward {
    Ok,
    Fail,
    Panic,
}

/// Returns the model bytes as logits, so each load is observable.
#[derive(Debug, Clone)]
pub(crate) struct MockSession {
    pub backend: BackendId,
    pub logits: Vec<f32>,
    pub delay: Duration,
    pub forward: MockForward,
}

impl InferenceSession for MockSession {
    fn backend(&self) -> BackendId {
        self.backend
    }

    fn declared_input_name(&self) -> &str {
        "data"
    }

    fn declared_output_name(&self) -> &str {
        "logits"
    }

    fn forward(&self, _tensor: &ImageTensor) -> ClassifyResult<Vec<f32>> {
        std::thread::sleep(self.delay);
        match self.forward {
            MockForward::Ok => Ok(self.logits.clone()),
            MockForward::Fail => Err(ClassifyError::inference_execution(
                self.backend,
                "mock forward pass",
                SimpleError::new("device lost"),
            )),
            MockForward::Panic => panic!("mock session panicked"),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockFactory {
    unavailable: BTreeSet<BackendId>,
    disabled: BTreeSet<BackendId>,
    forward: BTreeMap<BackendId, MockForward>,
    delays: BTreeMap<BackendId, Duration>,
    /// Number of successful creations before a backend becomes unavailable.
    fails_after: BTreeMap<BackendId, usize>,
    attempts: Mutex<BTreeMap<BackendId, usize>>,
    creations: AtomicUsize,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable(mut self, backend: BackendId) -> Self {
        self.unavailable.insert(backend);
        self
    }

    pub fn disabled(mut self, backend: BackendId) -> Self {
        self.disabled.insert(backend);
        self
    }

    pub fn forward(mut self, backend: BackendId, forward: MockForward) -> Self {
        self.forward.insert(backend, forward);
        self
    }

    pub fn delayed(mut self, backend: BackendId, delay: Duration) -> Self {
        self.delays.insert(backend, delay);
        self
    }

    pub fn fails_after(mut self, backend: BackendId, successes: usize) -> Self {
        self.fails_after.insert(backend, successes);
        self
    }

    pub fn creation_count(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }
}

impl SessionFactory for MockFactory {
    fn is_enabled(&self, backend: BackendId) -> bool {
        !self.disabled.contains(&backend)
    }

    fn create(
        &self,
        backend: BackendId,
        model: &ModelSource,
    ) -> ClassifyResult<Box<dyn InferenceSession>> {
        self.creations.fetch_add(1, Ordering::SeqCst);
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(backend).or_insert(0);
            *count += 1;
            *count
        };
        let exhausted = self
            .fails_after
            .get(&backend)
            .is_some_and(|&successes| attempt > successes);
        if exhausted || self.unavailable.contains(&backend) {
            return Err(ClassifyError::session_creation(
                backend,
                "mock provider",
                SimpleError::new("no compatible device"),
            ));
        }
        let logits = match model {
            ModelSource::Bytes(bytes) => bytes.iter().map(|&b| f32::from(b)).collect(),
            ModelSource::Path(_) => Vec::new(),
        };
        Ok(Box::new(MockSession {
            backend,
            logits,
            delay: self.delays.get(&backend).copied().unwrap_or_default(),
            forward: self
                .forward
                .get(&backend)
                .copied()
                .unwrap_or(MockForward::Ok),
        }))
    }
}

/// A 2x2 all-zero tensor.
pub(crate) fn blank_tensor() -> ImageTensor {
    ImageTensor::from_planar(2, 2, vec![0.0; 12]).unwrap()
}
