use crawl_core::{FailureKind, JobId};
use thiserror::Error;

/// Why a command against the crawl service did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrawlError {
    #[error("crawl service unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("{detail}")]
    RemoteRejected { detail: String },
    #[error("job {id} not found")]
    NotFound { id: JobId },
}

impl CrawlError {
    pub(crate) fn unavailable(message: impl Into<String>) -> Self {
        CrawlError::RemoteUnavailable(message.into())
    }

    pub(crate) fn rejected(detail: impl Into<String>) -> Self {
        CrawlError::RemoteRejected {
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            CrawlError::RemoteUnavailable(_) => FailureKind::RemoteUnavailable,
            CrawlError::RemoteRejected { .. } => FailureKind::RemoteRejected,
            CrawlError::NotFound { .. } => FailureKind::NotFound,
        }
    }

    /// Whether re-issuing the same command unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CrawlError::RemoteUnavailable(_))
    }
}
