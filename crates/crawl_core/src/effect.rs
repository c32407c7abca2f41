use crate::{CrawlJob, JobId, JobPatch};

/// A single mutation of the job store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    ReplaceAll(Vec<CrawlJob>),
    Insert(CrawlJob),
    Patch { id: JobId, patch: JobPatch },
    Remove(JobId),
    Invalidate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Apply(StoreOp),
    /// Re-list the collection; apply `fallback` if the listing fails.
    Refetch { fallback: Vec<StoreOp> },
}
