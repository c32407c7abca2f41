use crawl_core::{CrawlJob, JobAnalysis, JobId};

use crate::CrawlError;

/// The remote crawl service, owner of the canonical job state.
///
/// Lifecycle calls are idempotent and keyed by job id. The bulk calls take a
/// set of ids; the orchestrator always passes exactly one.
#[async_trait::async_trait]
pub trait CrawlService: Send + Sync {
    /// Full collection, most recently created first.
    async fn list_jobs(&self) -> Result<Vec<CrawlJob>, CrawlError>;

    async fn add_job(&self, url: &str) -> Result<CrawlJob, CrawlError>;

    async fn start_job(&self, id: JobId) -> Result<(), CrawlError>;

    async fn stop_job(&self, id: JobId) -> Result<(), CrawlError>;

    /// Unknown ids are ignored.
    async fn delete_jobs(&self, ids: &[JobId]) -> Result<(), CrawlError>;

    async fn reanalyze_jobs(&self, ids: &[JobId]) -> Result<(), CrawlError>;

    /// Results of a finished crawl. `Ok(None)` when the job exists but has no
    /// analysis yet; `NotFound` when the job itself is unknown.
    async fn get_analysis(&self, id: JobId) -> Result<Option<JobAnalysis>, CrawlError>;
}
