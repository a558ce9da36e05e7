//! Concurrent dispatch of one tensor to every backend.

use super::output::{BackendOutput, OutputStatus, RawOutput};
use super::registry::SessionRegistry;
use crate::domain::{BackendId, ImageTensor};
use futures::future::join_all;
use std::error::Error as _;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Runs a tensor through every registered backend at once.
///
/// The output always has one entry per known backend, in fixed backend
/// order. Backends without a session, and backends whose forward pass
/// fails, contribute an empty output with zero elapsed time.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<SessionRegistry>,
}

impl Orchestrator {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Dispatches `tensor` to all backends and waits for every one of them.
    ///
    /// Holds the registry's read lock until all dispatches are done, so a
    /// concurrent model load waits for this run.
    pub async fn run(&self, tensor: ImageTensor) -> Vec<BackendOutput> {
        let tensor = Arc::new(tensor);
        let sessions = self.registry.read().await;

        let dispatches = sessions.iter().map(|(&backend, session)| {
            let session = session.clone();
            let tensor = Arc::clone(&tensor);
            async move {
                let Some(session) = session else {
                    debug!(backend = %backend, "no session loaded, skipping");
                    return BackendOutput::new(backend, RawOutput::absent());
                };

                let joined = tokio::task::spawn_blocking(move || {
                    let start = Instant::now();
                    let values = session.forward(&tensor)?;
                    Ok::<_, crate::core::errors::ClassifyError>((
                        values,
                        start.elapsed().as_secs_f64(),
                    ))
                })
                .await;

                let output = match joined {
                    Ok(Ok((values, elapsed))) => {
                        debug!(
                            backend = %backend,
                            elapsed_secs = elapsed,
                            outputs = values.len(),
                            "forward pass complete"
                        );
                        RawOutput::completed(values, elapsed)
                    }
                    Ok(Err(err)) => {
                        warn!(
                            backend = %backend,
                            error = %err,
                            cause = ?err.source().map(ToString::to_string),
                            "forward pass failed, returning empty output"
                        );
                        RawOutput::failed()
                    }
                    Err(join_err) => {
                        warn!(
                            backend = %backend,
                            error = %join_err,
                            "forward pass task aborted, returning empty output"
                        );
                        RawOutput::failed()
                    }
                };
                BackendOutput::new(backend, output)
            }
        });

        let outputs = join_all(dispatches).await;
        drop(sessions);

        if all_present_failed(&outputs) {
            error!("every loaded backend failed to run inference");
        }
        outputs
    }
}

/// True when at least one backend had a session and none of them completed.
fn all_present_failed(outputs: &[BackendOutput]) -> bool {
    let mut present = outputs
        .iter()
        .filter(|o| o.output.status != OutputStatus::Absent)
        .peekable();
    present.peek().is_some() && present.all(|o| o.output.status == OutputStatus::Failed)
}

/// Backends in the order [`Orchestrator::run`] reports them.
pub fn dispatch_order() -> &'static [BackendId] {
    &BackendId::ALL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inference::testing::{MockFactory, MockForward, blank_tensor};
    use std::time::Duration;

    async fn orchestrator(factory: MockFactory, model: Vec<u8>) -> Orchestrator {
        let registry = Arc::new(SessionRegistry::new(Arc::new(factory)));
        registry.load_model(model).await;
        Orchestrator::new(registry)
    }

    fn backends(outputs: &[BackendOutput]) -> Vec<BackendId> {
        outputs.iter().map(|o| o.backend).collect()
    }

    #[tokio::test]
    async fn test_both_absent_yields_two_empty_outputs() {
        let registry = Arc::new(SessionRegistry::new(Arc::new(MockFactory::new())));
        let outputs = Orchestrator::new(registry).run(blank_tensor()).await;

        assert_eq!(backends(&outputs), dispatch_order());
        for output in &outputs {
            assert!(output.output.is_empty());
            assert_eq!(output.output.elapsed_seconds, 0.0);
            assert_eq!(output.output.status, OutputStatus::Absent);
        }
    }

    #[tokio::test]
    async fn test_both_present() {
        let orch = orchestrator(MockFactory::new(), vec![3, 1, 2]).await;
        let outputs = orch.run(blank_tensor()).await;

        assert_eq!(backends(&outputs), dispatch_order());
        for output in &outputs {
            assert_eq!(output.output.status, OutputStatus::Completed);
            assert_eq!(output.output.values, vec![3.0, 1.0, 2.0]);
            assert!(output.output.elapsed_seconds >= 0.0);
        }
    }

    #[tokio::test]
    async fn test_order_is_fixed_regardless_of_completion() {
        let factory =
            MockFactory::new().delayed(BackendId::Portable, Duration::from_millis(150));
        let orch = orchestrator(factory, vec![1]).await;
        let outputs = orch.run(blank_tensor()).await;

        assert_eq!(
            backends(&outputs),
            vec![BackendId::Portable, BackendId::Accelerated]
        );
        assert!(outputs[0].output.elapsed_seconds >= 0.1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_backends_run_concurrently() {
        let delay = Duration::from_millis(200);
        let factory = MockFactory::new()
            .delayed(BackendId::Portable, delay)
            .delayed(BackendId::Accelerated, delay);
        let orch = orchestrator(factory, vec![1]).await;

        let start = Instant::now();
        let outputs = orch.run(blank_tensor()).await;
        assert!(outputs.iter().all(|o| !o.output.is_empty()));
        assert!(start.elapsed() < delay * 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_load_waits_for_in_flight_run() {
        let delay = Duration::from_millis(300);
        let factory = MockFactory::new()
            .delayed(BackendId::Portable, delay)
            .disabled(BackendId::Accelerated);
        let orch = orchestrator(factory, vec![7]).await;

        let runner = orch.clone();
        let run = tokio::spawn(async move { runner.run(blank_tensor()).await });
        while !orch.registry().is_locked() {
            tokio::task::yield_now().await;
        }

        let start = Instant::now();
        orch.registry().load_model(vec![9u8]).await;
        assert!(start.elapsed() >= Duration::from_millis(200));

        let outputs = run.await.unwrap();
        assert_eq!(outputs[0].output.values, vec![7.0]);
        assert_eq!(outputs[1].output.status, OutputStatus::Absent);

        let reloaded = orch.registry().session(BackendId::Portable).await.unwrap();
        assert_eq!(reloaded.forward(&blank_tensor()).unwrap(), vec![9.0]);
    }

    #[tokio::test]
    async fn test_one_failure_keeps_other_result() {
        let factory = MockFactory::new().forward(BackendId::Accelerated, MockForward::Fail);
        let orch = orchestrator(factory, vec![5, 6]).await;
        let outputs = orch.run(blank_tensor()).await;

        assert_eq!(outputs[0].output.values, vec![5.0, 6.0]);
        assert_eq!(outputs[1].output.status, OutputStatus::Failed);
        assert!(outputs[1].output.is_empty());
        assert_eq!(outputs[1].output.elapsed_seconds, 0.0);
    }

    #[tokio::test]
    async fn test_panicking_backend_becomes_empty() {
        let factory = MockFactory::new().forward(BackendId::Portable, MockForward::Panic);
        let orch = orchestrator(factory, vec![4]).await;
        let outputs = orch.run(blank_tensor()).await;

        assert_eq!(outputs[0].output.status, OutputStatus::Failed);
        assert_eq!(outputs[1].output.values, vec![4.0]);
    }

    #[tokio::test]
    async fn test_all_failing_still_returns_full_list() {
        let factory = MockFactory::new()
            .forward(BackendId::Portable, MockForward::Fail)
            .forward(BackendId::Accelerated, MockForward::Fail);
        let orch = orchestrator(factory, vec![1]).await;
        let outputs = orch.run(blank_tensor()).await;

        assert_eq!(outputs.len(), 2);
        assert!(all_present_failed(&outputs));
        assert!(outputs.iter().all(|o| o.output.is_empty()));
    }

    #[test]
    fn test_all_present_failed_needs_a_present_backend() {
        let absent = vec![
            BackendOutput::new(BackendId::Portable, RawOutput::absent()),
            BackendOutput::new(BackendId::Accelerated, RawOutput::absent()),
        ];
        assert!(!all_present_failed(&absent));

        let mixed = vec![
            BackendOutput::new(BackendId::Portable, RawOutput::absent()),
            BackendOutput::new(BackendId::Accelerated, RawOutput::failed()),
        ];
        assert!(all_present_failed(&mixed));
    }
}
