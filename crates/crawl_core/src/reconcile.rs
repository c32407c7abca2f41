use crate::{
    Command, CrawlJob, Effect, FailureKind, JobAnalysis, JobPatch, ReconcilePolicy, StoreOp,
};

/// What the crawl service answered to a command that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// A job was created (submit).
    Created(CrawlJob),
    /// The full collection, in service order (refresh).
    Listed(Vec<CrawlJob>),
    /// The command was applied without a body.
    Accepted,
    /// A job's analysis was read; `None` while the crawl has not produced one.
    Analysis(Option<JobAnalysis>),
}

/// Pure reconciliation planner: turns a settled command into store effects.
pub fn reconcile(command: &Command, ack: Ack, policy: ReconcilePolicy) -> Vec<Effect> {
    let projection = match (command, ack) {
        (_, Ack::Listed(jobs)) => return vec![Effect::Apply(StoreOp::ReplaceAll(jobs))],
        (_, Ack::Analysis(_)) | (Command::Details(_), _) => return Vec::new(),
        (Command::Submit { .. }, Ack::Created(job)) => Some(StoreOp::Insert(job)),
        (Command::Delete(id), _) => Some(StoreOp::Remove(*id)),
        (command, _) => command
            .job_id()
            .zip(command.transition())
            .map(|(id, transition)| StoreOp::Patch {
                id,
                patch: JobPatch::status(transition.target()),
            }),
    };

    let Some(projection) = projection else {
        // Nothing to project locally; only the service knows the result.
        return vec![
            Effect::Apply(StoreOp::Invalidate),
            Effect::Refetch {
                fallback: Vec::new(),
            },
        ];
    };

    match policy {
        ReconcilePolicy::OptimisticPatch => vec![
            Effect::Apply(projection),
            Effect::Apply(StoreOp::Invalidate),
        ],
        ReconcilePolicy::InvalidateAndRefetch => vec![
            Effect::Apply(StoreOp::Invalidate),
            Effect::Refetch {
                fallback: vec![projection],
            },
        ],
    }
}

/// Store effects for a command that failed. The job list itself is never touched.
pub fn reconcile_failure(command: &Command, failure: FailureKind) -> Vec<Effect> {
    match failure {
        FailureKind::NotFound if command.job_id().is_some() => {
            vec![Effect::Apply(StoreOp::Invalidate)]
        }
        FailureKind::NotFound | FailureKind::RemoteUnavailable | FailureKind::RemoteRejected => {
            Vec::new()
        }
    }
}
