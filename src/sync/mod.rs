//! Sync Connector - uploads queued local mutations to the remote store
//!
//! The external local-first sync engine schedules everything: it calls
//! [`SyncConnector::fetch_credentials`] to decide whether to run and
//! [`SyncConnector::upload_data`] once per upload cycle, serially.
//! Retry, backoff and partial-completion bookkeeping live in the
//! engine's durable queue, never here; the connector is a stateless
//! adapter.

pub mod batch;
pub mod remote;

pub use batch::{OperationKind, PendingBatch, PendingOperation, UploadQueue};
pub use remote::{HttpRemoteStore, RemoteStore};

use crate::auth::{AuthProvider, Session};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Bearer credential handed to the sync engine
#[derive(Debug, Clone)]
pub struct SyncCredentials {
    pub user_id: String,
    /// Equals the session's access token
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Where the connector looks up the current session
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>>;
}

#[async_trait]
impl SessionSource for AuthProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        AuthProvider::current_session(self)
    }
}

pub struct SyncConnector {
    sessions: Arc<dyn SessionSource>,
    remote: Arc<dyn RemoteStore>,
}

impl SyncConnector {
    pub fn new(sessions: Arc<dyn SessionSource>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { sessions, remote }
    }

    /// Credential fetch hook.
    ///
    /// `None` (not an error) when unauthenticated, signalling the
    /// engine to pause. A failing session lookup propagates as fatal.
    pub async fn fetch_credentials(&self) -> Result<Option<SyncCredentials>> {
        let Some(session) = self.sessions.current_session().await? else {
            debug!("No active session; sync paused");
            return Ok(None);
        };

        Ok(Some(SyncCredentials {
            user_id: session.user_id,
            token: session.access_token,
            expires_at: session.expires_at,
        }))
    }

    /// Upload hook: drain one pending batch.
    ///
    /// Operations replay against the remote store in original order.
    /// Any remote failure aborts the whole batch un-completed and
    /// re-raises, so the engine resubmits the same batch later. No
    /// pending batch is a no-op.
    pub async fn upload_data(&self, queue: &dyn UploadQueue) -> Result<()> {
        let Some(batch) = queue.next_batch().await? else {
            debug!("No pending batch");
            return Ok(());
        };

        debug!("Uploading batch {} ({} operations)", batch.id, batch.operations.len());
        for op in &batch.operations {
            match op.kind {
                OperationKind::Put => {
                    let row = op.data.as_ref().ok_or_else(|| {
                        Error::Parse(format!("put for {}/{} carries no row data", op.table, op.row_id))
                    })?;
                    self.remote.upsert(&op.table, &op.row_id, row).await?;
                }
                OperationKind::Patch => {
                    let fields = op.data.as_ref().ok_or_else(|| {
                        Error::Parse(format!("patch for {}/{} carries no field data", op.table, op.row_id))
                    })?;
                    self.remote.patch(&op.table, &op.row_id, fields).await?;
                }
                OperationKind::Delete => {
                    self.remote.delete(&op.table, &op.row_id).await?;
                }
            }
        }

        queue.complete(batch.id).await?;
        info!("Uploaded batch {} ({} operations)", batch.id, batch.operations.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockSessions {
        session: Option<Session>,
        fail: bool,
    }

    #[async_trait]
    impl SessionSource for MockSessions {
        async fn current_session(&self) -> Result<Option<Session>> {
            if self.fail {
                return Err(Error::Backend("session lookup failed".to_string()));
            }
            Ok(self.session.clone())
        }
    }

    /// Records every call; optionally fails on one operation kind
    #[derive(Default)]
    struct RecordingRemote {
        calls: Mutex<Vec<String>>,
        fail_on_delete: bool,
    }

    #[async_trait]
    impl RemoteStore for RecordingRemote {
        async fn upsert(&self, table: &str, id: &str, _row: &serde_json::Value) -> Result<()> {
            self.calls.lock().unwrap().push(format!("upsert {}/{}", table, id));
            Ok(())
        }

        async fn patch(&self, table: &str, id: &str, _fields: &serde_json::Value) -> Result<()> {
            self.calls.lock().unwrap().push(format!("patch {}/{}", table, id));
            Ok(())
        }

        async fn delete(&self, table: &str, id: &str) -> Result<()> {
            if self.fail_on_delete {
                return Err(Error::Backend("delete rejected".to_string()));
            }
            self.calls.lock().unwrap().push(format!("delete {}/{}", table, id));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockQueue {
        batch: Mutex<Option<PendingBatch>>,
        completed: Mutex<Vec<i64>>,
    }

    #[async_trait]
    impl UploadQueue for MockQueue {
        async fn next_batch(&self) -> Result<Option<PendingBatch>> {
            Ok(self.batch.lock().unwrap().clone())
        }

        async fn complete(&self, batch_id: i64) -> Result<()> {
            *self.batch.lock().unwrap() = None;
            self.completed.lock().unwrap().push(batch_id);
            Ok(())
        }
    }

    fn session_with_token(token: &str) -> Session {
        Session {
            user_id: "u1".to_string(),
            email: "sam@example.com".to_string(),
            display_name: None,
            avatar_url: None,
            timezone: None,
            access_token: token.to_string(),
            refresh_token: None,
            expires_at: None,
        }
    }

    fn crud_batch() -> PendingBatch {
        let ops = [
            (OperationKind::Put, Some(serde_json::json!({"title": "A"}))),
            (OperationKind::Patch, Some(serde_json::json!({"title": "A2"}))),
            (OperationKind::Delete, None),
        ];
        PendingBatch {
            id: 7,
            operations: ops
                .into_iter()
                .map(|(kind, data)| PendingOperation {
                    table: "tasks".to_string(),
                    row_id: "a".to_string(),
                    kind,
                    data,
                })
                .collect(),
        }
    }

    fn connector(session: Option<Session>, remote: Arc<RecordingRemote>) -> SyncConnector {
        SyncConnector::new(Arc::new(MockSessions { session, fail: false }), remote)
    }

    #[tokio::test]
    async fn test_fetch_credentials_unauthenticated() {
        let connector = connector(None, Arc::default());
        assert!(connector.fetch_credentials().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_credentials_token_matches_session() {
        let connector = connector(Some(session_with_token("at-9")), Arc::default());
        let creds = connector.fetch_credentials().await.unwrap().unwrap();
        assert_eq!(creds.token, "at-9");
        assert_eq!(creds.user_id, "u1");
    }

    #[tokio::test]
    async fn test_fetch_credentials_lookup_failure_is_fatal() {
        let connector = SyncConnector::new(
            Arc::new(MockSessions { session: None, fail: true }),
            Arc::new(RecordingRemote::default()),
        );
        assert!(connector.fetch_credentials().await.is_err());
    }

    #[tokio::test]
    async fn test_upload_replays_in_order_and_completes() {
        let remote = Arc::new(RecordingRemote::default());
        let queue = MockQueue::default();
        *queue.batch.lock().unwrap() = Some(crud_batch());

        let connector = connector(None, Arc::clone(&remote));
        connector.upload_data(&queue).await.unwrap();

        assert_eq!(
            remote.calls.lock().unwrap().as_slice(),
            &["upsert tasks/a", "patch tasks/a", "delete tasks/a"]
        );
        assert_eq!(queue.completed.lock().unwrap().as_slice(), &[7]);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_batch_pending() {
        let remote = Arc::new(RecordingRemote { fail_on_delete: true, ..Default::default() });
        let queue = MockQueue::default();
        *queue.batch.lock().unwrap() = Some(crud_batch());

        let connector = connector(None, Arc::clone(&remote));
        let result = connector.upload_data(&queue).await;

        assert!(matches!(result, Err(Error::Backend(_))));
        // Earlier operations ran, but the batch was never marked done
        assert_eq!(remote.calls.lock().unwrap().len(), 2);
        assert!(queue.completed.lock().unwrap().is_empty());
        assert!(queue.batch.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_queue_is_noop() {
        let remote = Arc::new(RecordingRemote::default());
        let queue = MockQueue::default();

        let connector = connector(None, Arc::clone(&remote));
        connector.upload_data(&queue).await.unwrap();

        assert!(remote.calls.lock().unwrap().is_empty());
        assert!(queue.completed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_without_payload_rejected() {
        let remote = Arc::new(RecordingRemote::default());
        let queue = MockQueue::default();
        *queue.batch.lock().unwrap() = Some(PendingBatch {
            id: 1,
            operations: vec![PendingOperation {
                table: "tasks".to_string(),
                row_id: "a".to_string(),
                kind: OperationKind::Put,
                data: None,
            }],
        });

        let connector = connector(None, Arc::clone(&remote));
        assert!(matches!(connector.upload_data(&queue).await, Err(Error::Parse(_))));
        assert!(queue.completed.lock().unwrap().is_empty());
    }
}
