use std::time::Duration;

use async_trait::async_trait;

use crate::model::{Domain, IconRef, RawResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Failed(String),
}

impl BackendError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// The narrow command boundary the session consumes. Index construction,
/// crawling, icon extraction and the assistant model all live behind it.
#[async_trait]
pub trait LauncherBackend: Send + Sync {
    /// Reports whether the domain already has an index. Never creates one.
    async fn index_exists(&self, domain: Domain) -> Result<bool, BackendError>;

    /// Creates the domain's index, or confirms an existing one.
    async fn ensure_index(&self, domain: Domain) -> Result<(), BackendError>;

    async fn search(&self, domain: Domain, query: &str) -> Result<Vec<RawResult>, BackendError>;

    async fn fetch_icon(&self, path: &str) -> Result<IconRef, BackendError>;

    async fn ask(&self, query: &str) -> Result<String, BackendError>;

    async fn open(&self, path: &str) -> Result<(), BackendError>;
}
