use crate::{FailureKind, Freshness, JobAnalysis, JobId, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardView {
    pub jobs: Vec<JobRowView>,
    pub job_count: usize,
    pub freshness: Freshness,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub id: JobId,
    pub url: String,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Success,
    Error,
}

/// User-visible outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
    pub failure: Option<FailureKind>,
    /// Analysis attached to a successful details read.
    pub analysis: Option<JobAnalysis>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Success,
            message: message.into(),
            failure: None,
            analysis: None,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Error,
            message: message.into(),
            failure: Some(kind),
            analysis: None,
        }
    }

    pub fn with_analysis(mut self, analysis: JobAnalysis) -> Self {
        self.analysis = Some(analysis);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == NotifyLevel::Error
    }
}
