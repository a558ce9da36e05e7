//! Backend sessions and their concurrent execution.
//!
//! * [`session`] - the capability traits every backend session implements
//! * [`ort_session`] - ONNX Runtime sessions and their factory
//! * [`registry`] - per-backend session storage
//! * [`orchestrator`] - concurrent dispatch of a tensor to all backends
//! * [`output`] - raw outputs tagged by backend

pub mod orchestrator;
pub mod ort_session;
pub mod output;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{Orchestrator, dispatch_order};
pub use ort_session::{OrtSession, OrtSessionFactory};
pub use output::{BackendOutput, OutputStatus, RawOutput};
pub use registry::{SessionMap, SessionRegistry, SharedSession};
pub use session::{InferenceSession, ModelSource, SessionFactory};
