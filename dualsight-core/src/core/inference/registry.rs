//! Per-backend session storage.
//!
//! The registry owns at most one session per [`BackendId`]. Loading a model
//! builds a session for every enabled backend independently: a backend that
//! fails to build is logged and left empty without affecting the others.
//! The session map sits behind an async read/write lock so a load never
//! overlaps an in-flight run.

use super::session::{InferenceSession, ModelSource, SessionFactory};
use crate::domain::BackendId;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::error::Error as _;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, error, info, warn};

/// A session shared between the registry and in-flight dispatches.
pub type SharedSession = Arc<dyn InferenceSession>;

/// Session slot per backend, in fixed backend order.
pub type SessionMap = BTreeMap<BackendId, Option<SharedSession>>;

fn empty_map() -> SessionMap {
    BackendId::ALL.iter().map(|&backend| (backend, None)).collect()
}

/// Holds the most recent load result for each backend.
pub struct SessionRegistry {
    factory: Arc<dyn SessionFactory>,
    sessions: RwLock<SessionMap>,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    /// Creates a registry with every backend absent.
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            factory,
            sessions: RwLock::new(empty_map()),
        }
    }

    /// Builds a session per backend from `model`, replacing whatever was
    /// loaded before. Returns the backends that now hold a session.
    ///
    /// Waits for in-flight runs to finish before swapping sessions.
    pub async fn load_model(&self, model: impl Into<ModelSource>) -> Vec<BackendId> {
        let model = model.into();
        let mut sessions = self.sessions.write().await;
        info!(model = %model.describe(), "loading model on all backends");

        let attempts = BackendId::ALL.iter().map(|&backend| {
            let factory = Arc::clone(&self.factory);
            let model = model.clone();
            async move {
                if !factory.is_enabled(backend) {
                    debug!(backend = %backend, "backend disabled, not creating a session");
                    return (backend, None);
                }
                let created =
                    tokio::task::spawn_blocking(move || factory.create(backend, &model)).await;
                let session: Option<SharedSession> = match created {
                    Ok(Ok(session)) => {
                        info!(backend = %backend, "session ready");
                        Some(Arc::from(session))
                    }
                    Ok(Err(err)) => {
                        warn!(
                            backend = %backend,
                            error = %err,
                            cause = ?err.source().map(ToString::to_string),
                            "session creation failed, backend left empty"
                        );
                        None
                    }
                    Err(join_err) => {
                        error!(
                            backend = %backend,
                            error = %join_err,
                            "session creation task aborted, backend left empty"
                        );
                        None
                    }
                };
                (backend, session)
            }
        });

        let created = join_all(attempts).await;
        *sessions = created.into_iter().collect();

        let ready: Vec<BackendId> = loaded(&sessions);
        if ready.is_empty() {
            warn!("no backend could load the model");
        }
        ready
    }

    /// Backends that currently hold a session.
    pub async fn available_backends(&self) -> Vec<BackendId> {
        loaded(&*self.sessions.read().await)
    }

    /// The session loaded for `backend`, if any.
    pub async fn session(&self, backend: BackendId) -> Option<SharedSession> {
        self.sessions.read().await.get(&backend).cloned().flatten()
    }

    /// Drops every session.
    pub async fn clear(&self) {
        *self.sessions.write().await = empty_map();
        debug!("all sessions dropped");
    }

    /// Read access to the whole map; held for the duration of a run.
    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, SessionMap> {
        self.sessions.read().await
    }

    /// Whether a run or load currently holds the session map.
    #[cfg(test)]
    pub(crate) fn is_locked(&self) -> bool {
        self.sessions.try_write().is_err()
    }
}

fn loaded(sessions: &SessionMap) -> Vec<BackendId> {
    sessions
        .iter()
        .filter_map(|(backend, session)| session.as_ref().map(|_| *backend))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inference::testing::{MockFactory, blank_tensor};

    #[tokio::test]
    async fn test_new_registry_is_empty() {
        let registry = SessionRegistry::new(Arc::new(MockFactory::new()));
        assert!(registry.available_backends().await.is_empty());
        assert_eq!(registry.read().await.len(), BackendId::ALL.len());
        assert!(registry.session(BackendId::Portable).await.is_none());
    }

    #[tokio::test]
    async fn test_load_on_all_backends() {
        let factory = Arc::new(MockFactory::new());
        let registry = SessionRegistry::new(factory.clone());

        let ready = registry.load_model(vec![1u8, 2, 3]).await;
        assert_eq!(ready, vec![BackendId::Portable, BackendId::Accelerated]);
        assert_eq!(factory.creation_count(), 2);

        let session = registry.session(BackendId::Accelerated).await.unwrap();
        assert_eq!(session.backend(), BackendId::Accelerated);
    }

    #[tokio::test]
    async fn test_one_backend_failing_leaves_other_loaded() {
        let factory = MockFactory::new().unavailable(BackendId::Accelerated);
        let registry = SessionRegistry::new(Arc::new(factory));

        let ready = registry.load_model(vec![7u8]).await;
        assert_eq!(ready, vec![BackendId::Portable]);
        assert!(registry.session(BackendId::Accelerated).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_backend_is_not_built() {
        let factory = Arc::new(MockFactory::new().disabled(BackendId::Accelerated));
        let registry = SessionRegistry::new(factory.clone());

        registry.load_model(vec![1u8]).await;
        assert_eq!(factory.creation_count(), 1);
        assert_eq!(
            registry.available_backends().await,
            vec![BackendId::Portable]
        );
    }

    #[tokio::test]
    async fn test_reload_replaces_sessions() {
        let registry = SessionRegistry::new(Arc::new(MockFactory::new()));
        let tensor = blank_tensor();

        registry.load_model(vec![1u8, 2]).await;
        let first = registry.session(BackendId::Portable).await.unwrap();
        assert_eq!(first.forward(&tensor).unwrap(), vec![1.0, 2.0]);

        registry.load_model(vec![9u8]).await;
        let second = registry.session(BackendId::Portable).await.unwrap();
        assert_eq!(second.forward(&tensor).unwrap(), vec![9.0]);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_failed_reload_does_not_keep_old_session() {
        let factory = MockFactory::new().fails_after(BackendId::Accelerated, 1);
        let registry = SessionRegistry::new(Arc::new(factory));

        let ready = registry.load_model(vec![1u8]).await;
        assert_eq!(ready, vec![BackendId::Portable, BackendId::Accelerated]);

        let ready = registry.load_model(vec![2u8]).await;
        assert_eq!(ready, vec![BackendId::Portable]);
        assert!(registry.session(BackendId::Accelerated).await.is_none());
        assert_eq!(
            registry.available_backends().await,
            vec![BackendId::Portable]
        );
    }

    #[tokio::test]
    async fn test_clear_drops_sessions() {
        let registry = SessionRegistry::new(Arc::new(MockFactory::new()));
        registry.load_model(vec![1u8]).await;
        registry.clear().await;
        assert!(registry.available_backends().await.is_empty());
        assert_eq!(registry.read().await.len(), BackendId::ALL.len());
    }
}
