//! Auth Provider - wraps the hosted identity service
//!
//! Sign-in, sign-out, session retrieval/refresh and change
//! notification. The provider keeps the current session and a listener
//! registry; every transition delivers the authoritative current state
//! (`Some(session)` or `None`) to each listener, not a delta.

pub mod backend;
pub mod session;

pub use backend::{AuthBackend, HttpAuthBackend};
pub use session::{Credentials, RawSession, Session, map_session};

use crate::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info};

type Listener = Box<dyn Fn(Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct ListenerRegistry {
    entries: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    fn subscribe(&self, listener: Listener) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: u64) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(entry_id, _)| *entry_id != id);
    }

    /// Listeners run to completion, in registration order, before the
    /// next event is delivered.
    fn notify(&self, session: Option<&Session>) {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, listener) in entries.iter() {
            listener(session);
        }
    }
}

/// Handle returned by [`AuthProvider::on_auth_change`]; tears the
/// subscription down once.
pub struct AuthSubscription {
    id: u64,
    registry: Arc<ListenerRegistry>,
}

impl AuthSubscription {
    pub fn unsubscribe(self) {
        self.registry.unsubscribe(self.id);
    }
}

pub struct AuthProvider {
    backend: Arc<dyn AuthBackend>,
    current: RwLock<Option<Session>>,
    listeners: Arc<ListenerRegistry>,
}

impl AuthProvider {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            backend,
            current: RwLock::new(None),
            listeners: Arc::new(ListenerRegistry::default()),
        }
    }

    /// Sign in with email and password.
    ///
    /// Backend failures propagate unchanged. A backend success that
    /// carries no session is a defect signal and surfaces as
    /// [`Error::Auth`] rather than a null.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let raw = self
            .backend
            .password_sign_in(&credentials.email, &credentials.password)
            .await?;
        let raw = raw.ok_or_else(|| {
            Error::Auth("sign-in reported success but returned no session".to_string())
        })?;
        let session = map_session(raw)?;

        info!("Signed in as {}", session.email);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        self.listeners.notify(Some(&session));
        Ok(session)
    }

    /// Sign out. The backend is told first; only a successful logout
    /// clears the local session and notifies listeners.
    pub async fn sign_out(&self) -> Result<()> {
        let current = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(session) = current {
            self.backend.sign_out(&session.access_token).await?;
            info!("Signed out {}", session.email);
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.listeners.notify(None);
        Ok(())
    }

    /// The session as of the last transition, if any
    pub fn current_session(&self) -> Result<Option<Session>> {
        Ok(self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    /// Exchange the refresh token for a new session. `None` when signed
    /// out or when the session has no refresh token.
    pub async fn refresh_session(&self) -> Result<Option<Session>> {
        let refresh_token = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|s| s.refresh_token.clone());
        let Some(refresh_token) = refresh_token else {
            return Ok(None);
        };

        let Some(raw) = self.backend.refresh(&refresh_token).await? else {
            debug!("Refresh returned no session");
            return Ok(None);
        };
        let session = map_session(raw)?;

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        self.listeners.notify(Some(&session));
        Ok(Some(session))
    }

    /// Register a listener for auth transitions. Drop the returned
    /// subscription's `unsubscribe` to stop delivery.
    pub fn on_auth_change<F>(&self, listener: F) -> AuthSubscription
    where
        F: Fn(Option<&Session>) + Send + Sync + 'static,
    {
        let id = self.listeners.subscribe(Box::new(listener));
        AuthSubscription { id, registry: Arc::clone(&self.listeners) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Scripted backend: pops the next result per call
    #[derive(Default)]
    struct MockBackend {
        sign_in_results: Mutex<Vec<Result<Option<RawSession>>>>,
        refresh_results: Mutex<Vec<Result<Option<RawSession>>>>,
        sign_out_calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AuthBackend for MockBackend {
        async fn password_sign_in(&self, _email: &str, _password: &str) -> Result<Option<RawSession>> {
            self.sign_in_results.lock().unwrap().remove(0)
        }

        async fn sign_out(&self, access_token: &str) -> Result<()> {
            self.sign_out_calls.lock().unwrap().push(access_token.to_string());
            Ok(())
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<Option<RawSession>> {
            self.refresh_results.lock().unwrap().remove(0)
        }
    }

    fn raw_session(token: &str) -> RawSession {
        serde_json::from_value(serde_json::json!({
            "access_token": token,
            "refresh_token": "rt-1",
            "user": { "id": "u1", "email": "sam@example.com" }
        }))
        .unwrap()
    }

    fn credentials() -> Credentials {
        Credentials { email: "sam@example.com".to_string(), password: "hunter2".to_string() }
    }

    #[tokio::test]
    async fn test_sign_in_sets_session_and_notifies() {
        let backend = Arc::new(MockBackend::default());
        backend.sign_in_results.lock().unwrap().push(Ok(Some(raw_session("at-1"))));
        let provider = AuthProvider::new(backend);

        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
        let seen_in_listener = Arc::clone(&seen);
        let _sub = provider.on_auth_change(move |session| {
            seen_in_listener
                .lock()
                .unwrap()
                .push(session.map(|s| s.access_token.clone()));
        });

        let session = provider.sign_in(&credentials()).await.unwrap();
        assert_eq!(session.access_token, "at-1");
        assert_eq!(provider.current_session().unwrap().unwrap().access_token, "at-1");
        assert_eq!(seen.lock().unwrap().as_slice(), &[Some("at-1".to_string())]);
    }

    #[tokio::test]
    async fn test_sign_in_without_session_is_error() {
        let backend = Arc::new(MockBackend::default());
        backend.sign_in_results.lock().unwrap().push(Ok(None));
        let provider = AuthProvider::new(backend);

        let result = provider.sign_in(&credentials()).await;
        assert!(matches!(result, Err(Error::Auth(_))));
        assert!(provider.current_session().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_backend_error_propagates() {
        let backend = Arc::new(MockBackend::default());
        backend
            .sign_in_results
            .lock()
            .unwrap()
            .push(Err(Error::Auth("invalid credentials".to_string())));
        let provider = AuthProvider::new(backend);

        assert!(provider.sign_in(&credentials()).await.is_err());
    }

    #[tokio::test]
    async fn test_sign_out_clears_and_notifies_none() {
        let backend = Arc::new(MockBackend::default());
        backend.sign_in_results.lock().unwrap().push(Ok(Some(raw_session("at-1"))));
        let provider = AuthProvider::new(Arc::clone(&backend) as Arc<dyn AuthBackend>);

        provider.sign_in(&credentials()).await.unwrap();

        let seen: Arc<Mutex<Vec<bool>>> = Arc::default();
        let seen_in_listener = Arc::clone(&seen);
        let _sub = provider.on_auth_change(move |session| {
            seen_in_listener.lock().unwrap().push(session.is_some());
        });

        provider.sign_out().await.unwrap();
        assert!(provider.current_session().unwrap().is_none());
        assert_eq!(backend.sign_out_calls.lock().unwrap().as_slice(), &["at-1".to_string()]);
        assert_eq!(seen.lock().unwrap().as_slice(), &[false]);
    }

    #[tokio::test]
    async fn test_refresh_replaces_session() {
        let backend = Arc::new(MockBackend::default());
        backend.sign_in_results.lock().unwrap().push(Ok(Some(raw_session("at-1"))));
        backend.refresh_results.lock().unwrap().push(Ok(Some(raw_session("at-2"))));
        let provider = AuthProvider::new(backend);

        provider.sign_in(&credentials()).await.unwrap();
        let refreshed = provider.refresh_session().await.unwrap().unwrap();
        assert_eq!(refreshed.access_token, "at-2");
        assert_eq!(provider.current_session().unwrap().unwrap().access_token, "at-2");
    }

    #[tokio::test]
    async fn test_refresh_when_signed_out_is_none() {
        let provider = AuthProvider::new(Arc::new(MockBackend::default()));
        assert!(provider.refresh_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let backend = Arc::new(MockBackend::default());
        backend.sign_in_results.lock().unwrap().push(Ok(Some(raw_session("at-1"))));
        backend.sign_in_results.lock().unwrap().push(Ok(Some(raw_session("at-2"))));
        let provider = AuthProvider::new(backend);

        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
        let seen_in_listener = Arc::clone(&seen);
        let sub = provider.on_auth_change(move |session| {
            seen_in_listener
                .lock()
                .unwrap()
                .push(session.map(|s| s.access_token.clone()));
        });

        provider.sign_in(&credentials()).await.unwrap();
        sub.unsubscribe();
        provider.sign_in(&credentials()).await.unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
