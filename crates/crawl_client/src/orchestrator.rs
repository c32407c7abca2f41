use std::future::Future;
use std::sync::Arc;

use crawl_core::{
    reconcile, reconcile_failure, Ack, Command, CrawlJob, Effect, JobAnalysis, JobId, JobStore,
    Notification, PolicyTable,
};
use crawl_logging::{crawl_debug, crawl_info, crawl_warn};

use crate::{CrawlError, CrawlService};

/// Issues lifecycle commands against the crawl service and keeps the job
/// store in line with the answers.
///
/// A command either fully applies to the store or leaves the job list
/// untouched and returns the error. Commands are not serialized against each
/// other; whichever answer settles last wins until the next refresh.
pub struct Orchestrator {
    service: Arc<dyn CrawlService>,
    store: Arc<JobStore>,
    policies: PolicyTable,
}

impl Orchestrator {
    pub fn new(service: Arc<dyn CrawlService>, store: Arc<JobStore>) -> Self {
        Self {
            service,
            store,
            policies: PolicyTable::default(),
        }
    }

    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = policies;
        self
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    pub fn list(&self) -> Vec<CrawlJob> {
        self.store.list()
    }

    pub async fn submit(&self, url: &str) -> Result<CrawlJob, CrawlError> {
        if url.trim().is_empty() {
            return Err(CrawlError::rejected("URL must not be empty."));
        }
        let command = Command::Submit {
            url: url.to_string(),
        };
        let job = self.remote(&command, self.service.add_job(url)).await?;
        self.settle(&command, Ack::Created(job.clone())).await;
        Ok(job)
    }

    pub async fn start(&self, id: JobId) -> Result<(), CrawlError> {
        let command = Command::Start(id);
        self.remote(&command, self.service.start_job(id)).await?;
        self.settle(&command, Ack::Accepted).await;
        Ok(())
    }

    pub async fn stop(&self, id: JobId) -> Result<(), CrawlError> {
        let command = Command::Stop(id);
        self.remote(&command, self.service.stop_job(id)).await?;
        self.settle(&command, Ack::Accepted).await;
        Ok(())
    }

    /// Deleting a job the service no longer knows succeeds and drops it locally.
    pub async fn delete(&self, id: JobId) -> Result<(), CrawlError> {
        let command = Command::Delete(id);
        let call = async {
            match self.service.delete_jobs(&[id]).await {
                Err(CrawlError::NotFound { .. }) => {
                    crawl_debug!("Job {} was already deleted", id);
                    Ok(())
                }
                other => other,
            }
        };
        self.remote(&command, call).await?;
        self.settle(&command, Ack::Accepted).await;
        Ok(())
    }

    /// Re-queues a crawl. Not restricted to finished jobs here; the service decides.
    pub async fn reanalyze(&self, id: JobId) -> Result<(), CrawlError> {
        let command = Command::Reanalyze(id);
        self.remote(&command, self.service.reanalyze_jobs(&[id])).await?;
        self.settle(&command, Ack::Accepted).await;
        Ok(())
    }

    /// Replaces the store with the service's listing; returns the job count.
    /// On failure the store keeps its last known contents.
    pub async fn refresh(&self) -> Result<usize, CrawlError> {
        let command = Command::Refresh;
        let jobs = self.remote(&command, self.service.list_jobs()).await?;
        let count = jobs.len();
        self.settle(&command, Ack::Listed(jobs)).await;
        crawl_debug!("Refreshed store with {} jobs", count);
        Ok(count)
    }

    /// Reads a job's analysis. The store is left as is unless the job is gone.
    pub async fn details(&self, id: JobId) -> Result<Option<JobAnalysis>, CrawlError> {
        let command = Command::Details(id);
        let analysis = self.remote(&command, self.service.get_analysis(id)).await?;
        self.settle(&command, Ack::Analysis(analysis.clone())).await;
        Ok(analysis)
    }

    /// Runs `command` and turns its outcome into a user-visible notification.
    pub async fn execute(&self, command: Command) -> Notification {
        let result = match &command {
            Command::Submit { url } => self.submit(url).await.map(|_| None),
            Command::Start(id) => self.start(*id).await.map(|()| None),
            Command::Stop(id) => self.stop(*id).await.map(|()| None),
            Command::Delete(id) => self.delete(*id).await.map(|()| None),
            Command::Reanalyze(id) => self.reanalyze(*id).await.map(|()| None),
            Command::Refresh => self.refresh().await.map(|_| None),
            Command::Details(id) => self.details(*id).await,
        };
        match result {
            Ok(Some(analysis)) => {
                Notification::success(success_message(&command)).with_analysis(analysis)
            }
            Ok(None) => match command {
                Command::Details(id) => {
                    Notification::success(format!("No analysis for job {id} yet."))
                }
                _ => Notification::success(success_message(&command)),
            },
            Err(err) => Notification::failure(err.kind(), failure_message(&command, &err)),
        }
    }

    async fn remote<T>(
        &self,
        command: &Command,
        call: impl Future<Output = Result<T, CrawlError>>,
    ) -> Result<T, CrawlError> {
        crawl_info!("Issuing {}", command);
        match call.await {
            Ok(value) => Ok(value),
            Err(err) => {
                crawl_warn!("{} failed: {}", command, err);
                self.apply(reconcile_failure(command, err.kind())).await;
                Err(err)
            }
        }
    }

    async fn settle(&self, command: &Command, ack: Ack) {
        let policy = self.policies.for_kind(command.kind());
        self.apply(reconcile(command, ack, policy)).await;
    }

    async fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Apply(op) => self.store.apply(op),
                Effect::Refetch { fallback } => match self.service.list_jobs().await {
                    Ok(jobs) => self.store.replace_all(jobs),
                    Err(err) => {
                        crawl_warn!("Refetch failed, keeping local projection: {}", err);
                        for op in fallback {
                            self.store.apply(op);
                        }
                    }
                },
            }
        }
    }
}

fn success_message(command: &Command) -> String {
    match command {
        Command::Submit { .. } => "URL added!".to_string(),
        Command::Start(id) => format!("Crawl {id} started."),
        Command::Stop(id) => format!("Crawl {id} stopped."),
        Command::Delete(id) => format!("URL {id} deleted."),
        Command::Reanalyze(id) => format!("Crawl {id} queued for reanalysis."),
        Command::Refresh => "Job list refreshed.".to_string(),
        Command::Details(id) => format!("Analysis for job {id}:"),
    }
}

fn failure_message(command: &Command, err: &CrawlError) -> String {
    match (command, err) {
        (Command::Submit { .. }, CrawlError::RemoteRejected { detail }) => detail.clone(),
        (Command::Submit { .. }, _) => format!("Failed to add URL: {err}"),
        (Command::Refresh, _) => format!("Failed to refresh job list: {err}"),
        (Command::Start(id), _) => format!("Failed to start crawl {id}: {err}"),
        (Command::Stop(id), _) => format!("Failed to stop crawl {id}: {err}"),
        (Command::Delete(id), _) => format!("Failed to delete URL {id}: {err}"),
        (Command::Reanalyze(id), _) => format!("Failed to reanalyze crawl {id}: {err}"),
        (Command::Details(id), _) => format!("Failed to load details for job {id}: {err}"),
    }
}
