use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned by the crawl service.
pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Stopped,
    Done,
    Error,
}

impl JobStatus {
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Stopped => "stopped",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }

    pub fn permits(self, transition: Transition) -> bool {
        match transition {
            Transition::Start => self != JobStatus::Running,
            Transition::Stop => matches!(self, JobStatus::Running | JobStatus::Queued),
            // Accepted from any state; the crawl service decides.
            Transition::Reanalyze => true,
            Transition::MarkRunning => self == JobStatus::Queued,
            Transition::Complete | Transition::Fail => self == JobStatus::Running,
        }
    }

    /// Returns the status after `transition`, or `None` when the edge does not exist.
    pub fn apply(self, transition: Transition) -> Option<JobStatus> {
        self.permits(transition).then(|| transition.target())
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Edges of the job lifecycle. The first three are operator commands, the
/// rest are driven by the crawl engine behind the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Stop,
    Reanalyze,
    MarkRunning,
    Complete,
    Fail,
}

impl Transition {
    pub fn target(self) -> JobStatus {
        match self {
            Transition::Start | Transition::Reanalyze => JobStatus::Queued,
            Transition::Stop => JobStatus::Stopped,
            Transition::MarkRunning => JobStatus::Running,
            Transition::Complete => JobStatus::Done,
            Transition::Fail => JobStatus::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlJob {
    pub id: JobId,
    pub url: String,
    pub status: JobStatus,
}

impl CrawlJob {
    pub fn new(id: JobId, url: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id,
            url: url.into(),
            status,
        }
    }
}

/// Partial update for a single job; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub url: Option<String>,
    pub status: Option<JobStatus>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            url: None,
            status: Some(status),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.status.is_none()
    }

    /// Applies the patch and reports whether anything changed.
    pub(crate) fn apply_to(&self, job: &mut CrawlJob) -> bool {
        let mut changed = false;
        if let Some(url) = &self.url {
            if job.url != *url {
                job.url.clone_from(url);
                changed = true;
            }
        }
        if let Some(status) = self.status {
            if job.status != status {
                job.status = status;
                changed = true;
            }
        }
        changed
    }
}

/// Failure classes a lifecycle command can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Transport failure or timeout; retrying may succeed.
    RemoteUnavailable,
    /// The service refused the command; the input must change.
    RemoteRejected,
    /// The job no longer exists on the service; refreshing resolves it.
    NotFound,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::RemoteUnavailable => write!(f, "remote unavailable"),
            FailureKind::RemoteRejected => write!(f, "remote rejected"),
            FailureKind::NotFound => write!(f, "not found"),
        }
    }
}
