use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crawl_core::{normalize_url_for_dedupe, CrawlJob, JobAnalysis, JobId, JobStatus, Transition};
use crawl_logging::{crawl_debug, crawl_trace};

use crate::{CrawlError, CrawlService};

#[derive(Debug)]
struct LocalState {
    /// Most recently created first.
    jobs: Vec<CrawlJob>,
    analyses: HashMap<JobId, JobAnalysis>,
    next_id: JobId,
}

/// In-process stand-in for the crawl service.
///
/// Holds the canonical job list itself, assigns increasing ids and applies
/// the same lifecycle rules as the real service. Latency and outages can be
/// simulated, and the crawl engine's own progress is driven through
/// [`LocalCrawlService::advance`] and [`LocalCrawlService::set_status`].
#[derive(Debug)]
pub struct LocalCrawlService {
    state: Mutex<LocalState>,
    latency: Duration,
    available: AtomicBool,
}

impl Default for LocalCrawlService {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCrawlService {
    pub fn new() -> Self {
        Self::with_jobs(Vec::new())
    }

    /// Seeds the service with `jobs`, given most recent first.
    pub fn with_jobs(jobs: Vec<CrawlJob>) -> Self {
        let next_id = jobs.iter().map(|job| job.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(LocalState {
                jobs,
                analyses: HashMap::new(),
                next_id,
            }),
            latency: Duration::ZERO,
            available: AtomicBool::new(true),
        }
    }

    /// Delays every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// While unavailable every call fails with `RemoteUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    pub fn jobs(&self) -> Vec<CrawlJob> {
        self.lock().jobs.clone()
    }

    /// Forces a job's status, as the crawl engine would. Returns `false` for unknown ids.
    pub fn set_status(&self, id: JobId, status: JobStatus) -> bool {
        let mut state = self.lock();
        match state.jobs.iter_mut().find(|job| job.id == id) {
            Some(job) => {
                job.status = status;
                true
            }
            None => false,
        }
    }

    /// Records `analysis` for a job, as a finished crawl would. Returns `false` for unknown ids.
    pub fn set_analysis(&self, id: JobId, analysis: JobAnalysis) -> bool {
        let mut state = self.lock();
        if !state.jobs.iter().any(|job| job.id == id) {
            return false;
        }
        state.analyses.insert(id, analysis);
        true
    }

    /// Moves every queued job to running and every running job to done.
    /// A job reaching done gets a minimal analysis unless one was recorded.
    /// Returns the number of jobs that changed.
    pub fn advance(&self) -> usize {
        let mut guard = self.lock();
        let state = &mut *guard;
        let mut moved = 0;
        for job in state.jobs.iter_mut() {
            let transition = match job.status {
                JobStatus::Queued => Transition::MarkRunning,
                JobStatus::Running => Transition::Complete,
                JobStatus::Stopped | JobStatus::Done | JobStatus::Error => continue,
            };
            if let Some(next) = job.status.apply(transition) {
                crawl_trace!("Simulated crawl job {} {} -> {}", job.id, job.status, next);
                job.status = next;
                moved += 1;
                if next == JobStatus::Done {
                    let url = job.url.clone();
                    state
                        .analyses
                        .entry(job.id)
                        .or_insert_with(|| JobAnalysis::default().with_field("url", url));
                }
            }
        }
        moved
    }

    fn lock(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn round_trip(&self) -> Result<(), CrawlError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(CrawlError::unavailable("simulated outage"))
        }
    }

    fn transition(&self, id: JobId, transition: Transition) -> Result<(), CrawlError> {
        let mut state = self.lock();
        let job = state
            .jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or(CrawlError::NotFound { id })?;
        let next = job.status.apply(transition).ok_or_else(|| {
            CrawlError::rejected(format!(
                "cannot {} a job that is {}",
                verb(transition),
                job.status
            ))
        })?;
        job.status = next;
        Ok(())
    }
}

fn verb(transition: Transition) -> &'static str {
    match transition {
        Transition::Start => "start",
        Transition::Stop => "stop",
        Transition::Reanalyze => "reanalyze",
        Transition::MarkRunning => "run",
        Transition::Complete => "complete",
        Transition::Fail => "fail",
    }
}

#[async_trait::async_trait]
impl CrawlService for LocalCrawlService {
    async fn list_jobs(&self) -> Result<Vec<CrawlJob>, CrawlError> {
        self.round_trip().await?;
        Ok(self.jobs())
    }

    async fn add_job(&self, url: &str) -> Result<CrawlJob, CrawlError> {
        self.round_trip().await?;
        if url.trim().is_empty() {
            return Err(CrawlError::rejected("URL must not be empty."));
        }

        let key = normalize_url_for_dedupe(url);
        let mut state = self.lock();
        if state
            .jobs
            .iter()
            .any(|job| normalize_url_for_dedupe(&job.url) == key)
        {
            return Err(CrawlError::rejected("URL already submitted."));
        }

        let job = CrawlJob::new(state.next_id, url, JobStatus::Queued);
        state.next_id += 1;
        state.jobs.insert(0, job.clone());
        crawl_debug!("Simulated service created job {} for {}", job.id, job.url);
        Ok(job)
    }

    async fn start_job(&self, id: JobId) -> Result<(), CrawlError> {
        self.round_trip().await?;
        self.transition(id, Transition::Start)
    }

    async fn stop_job(&self, id: JobId) -> Result<(), CrawlError> {
        self.round_trip().await?;
        self.transition(id, Transition::Stop)
    }

    async fn delete_jobs(&self, ids: &[JobId]) -> Result<(), CrawlError> {
        self.round_trip().await?;
        let doomed: HashSet<JobId> = ids.iter().copied().collect();
        let mut state = self.lock();
        state.jobs.retain(|job| !doomed.contains(&job.id));
        state.analyses.retain(|id, _| !doomed.contains(id));
        Ok(())
    }

    async fn reanalyze_jobs(&self, ids: &[JobId]) -> Result<(), CrawlError> {
        self.round_trip().await?;
        let mut state = self.lock();
        // All or nothing: check every id before touching any job.
        if let Some(missing) = ids
            .iter()
            .copied()
            .find(|id| !state.jobs.iter().any(|job| job.id == *id))
        {
            return Err(CrawlError::NotFound { id: missing });
        }
        for job in state.jobs.iter_mut().filter(|job| ids.contains(&job.id)) {
            if let Some(next) = job.status.apply(Transition::Reanalyze) {
                job.status = next;
            }
        }
        Ok(())
    }

    async fn get_analysis(&self, id: JobId) -> Result<Option<JobAnalysis>, CrawlError> {
        self.round_trip().await?;
        let state = self.lock();
        if !state.jobs.iter().any(|job| job.id == id) {
            return Err(CrawlError::NotFound { id });
        }
        Ok(state.analyses.get(&id).cloned())
    }
}
