//! Pending mutation batches
//!
//! The external sync engine owns the durable queue of local writes.
//! It hands the connector one batch per upload cycle through the
//! [`UploadQueue`] seam; retry state never lives on this side.

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of queued local mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Local row creation, replayed as an upsert
    Put,
    /// Local field update, replayed as a patch
    Patch,
    /// Local row deletion
    Delete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Put => "put",
            OperationKind::Patch => "patch",
            OperationKind::Delete => "delete",
        }
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "put" | "create" | "insert" => Ok(OperationKind::Put),
            "patch" | "update" => Ok(OperationKind::Patch),
            "delete" | "remove" => Ok(OperationKind::Delete),
            _ => Err(Error::Parse(format!("Unknown operation kind: {}", s))),
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One queued local mutation, keyed by table and row id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOperation {
    pub table: String,
    pub row_id: String,
    pub kind: OperationKind,
    /// Row payload for put, changed fields for patch, absent for delete
    pub data: Option<serde_json::Value>,
}

/// An ordered group of mutations uploaded in one attempt
#[derive(Debug, Clone)]
pub struct PendingBatch {
    pub id: i64,
    pub operations: Vec<PendingOperation>,
}

/// Handle over the engine's pending-mutation queue
#[async_trait]
pub trait UploadQueue: Send + Sync {
    /// The next batch awaiting upload, if any
    async fn next_batch(&self) -> Result<Option<PendingBatch>>;

    /// Mark a fully-uploaded batch complete so it is not retried
    async fn complete(&self, batch_id: i64) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [OperationKind::Put, OperationKind::Patch, OperationKind::Delete] {
            let parsed: OperationKind = kind.as_str().parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_kind_aliases() {
        assert_eq!(OperationKind::from_str("create").unwrap(), OperationKind::Put);
        assert_eq!(OperationKind::from_str("update").unwrap(), OperationKind::Patch);
        assert!(OperationKind::from_str("upsert").is_err());
    }
}
