use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::view_model::{DashboardView, JobRowView};
use crate::{CrawlJob, JobId, JobPatch, StoreOp};

/// How far the cached collection can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Nothing has been listed from the service yet.
    #[default]
    Unloaded,
    /// Matches the listing with this generation.
    Fresh { generation: u64 },
    /// Changed locally since the listing with this generation.
    Stale { generation: u64 },
}

impl Freshness {
    pub fn generation(self) -> u64 {
        match self {
            Freshness::Unloaded => 0,
            Freshness::Fresh { generation } | Freshness::Stale { generation } => generation,
        }
    }

    pub fn is_fresh(self) -> bool {
        matches!(self, Freshness::Fresh { .. })
    }
}

/// Consistent copy of the store contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub jobs: Vec<CrawlJob>,
    pub freshness: Freshness,
}

/// Client-side cache of the crawl service's jobs.
///
/// Every operation takes the lock once and leaves the collection whole, so a
/// reader sees either the state before or after a mutation, never a mix.
/// Ids are unique at all times.
#[derive(Debug, Default)]
pub struct JobStore {
    inner: RwLock<Snapshot>,
    dirty: AtomicBool,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs in display order; empty before the first load.
    pub fn list(&self) -> Vec<CrawlJob> {
        self.read(|snapshot| snapshot.jobs.clone())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.read(Snapshot::clone)
    }

    pub fn get(&self, id: JobId) -> Option<CrawlJob> {
        self.read(|snapshot| snapshot.jobs.iter().find(|job| job.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.read(|snapshot| snapshot.jobs.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn freshness(&self) -> Freshness {
        self.read(|snapshot| snapshot.freshness)
    }

    /// Replaces the whole collection with a service listing.
    ///
    /// Later entries repeating an id are dropped.
    pub fn replace_all(&self, jobs: Vec<CrawlJob>) {
        let mut seen = HashSet::with_capacity(jobs.len());
        let jobs: Vec<CrawlJob> = jobs.into_iter().filter(|job| seen.insert(job.id)).collect();
        self.write(|snapshot| {
            let generation = snapshot.freshness.generation() + 1;
            snapshot.jobs = jobs;
            snapshot.freshness = Freshness::Fresh { generation };
            true
        });
    }

    /// Updates one entry; returns `false` when the id is absent.
    pub fn patch(&self, id: JobId, patch: &JobPatch) -> bool {
        let mut found = false;
        self.write(|snapshot| match snapshot.jobs.iter_mut().find(|job| job.id == id) {
            Some(job) => {
                found = true;
                patch.apply_to(job)
            }
            None => false,
        });
        found
    }

    /// Removes one entry; returns `false` when the id is absent.
    pub fn remove(&self, id: JobId) -> bool {
        self.write(|snapshot| {
            let before = snapshot.jobs.len();
            snapshot.jobs.retain(|job| job.id != id);
            snapshot.jobs.len() != before
        })
    }

    /// Puts `job` at the head. An entry with the same id is replaced.
    /// Returns `true` when the id was new.
    pub fn insert(&self, job: CrawlJob) -> bool {
        let mut is_new = true;
        self.write(|snapshot| {
            if let Some(pos) = snapshot.jobs.iter().position(|existing| existing.id == job.id) {
                snapshot.jobs.remove(pos);
                is_new = false;
            }
            snapshot.jobs.insert(0, job);
            true
        });
        is_new
    }

    /// Marks the collection as no longer matching the service.
    pub fn invalidate(&self) {
        self.write(|snapshot| {
            let generation = snapshot.freshness.generation();
            let next = Freshness::Stale { generation };
            let changed = snapshot.freshness != next;
            snapshot.freshness = next;
            changed
        });
    }

    /// Drops all cached jobs and returns to the unloaded state.
    pub fn clear(&self) {
        self.write(|snapshot| {
            let changed = *snapshot != Snapshot::default();
            *snapshot = Snapshot::default();
            changed
        });
    }

    pub fn apply(&self, op: StoreOp) {
        match op {
            StoreOp::ReplaceAll(jobs) => self.replace_all(jobs),
            StoreOp::Insert(job) => {
                self.insert(job);
            }
            StoreOp::Patch { id, patch } => {
                self.patch(id, &patch);
            }
            StoreOp::Remove(id) => {
                self.remove(id);
            }
            StoreOp::Invalidate => self.invalidate(),
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    pub fn view(&self) -> DashboardView {
        let snapshot = self.snapshot();
        DashboardView {
            job_count: snapshot.jobs.len(),
            jobs: snapshot
                .jobs
                .iter()
                .map(|job| JobRowView {
                    id: job.id,
                    url: job.url.clone(),
                    status: job.status,
                })
                .collect(),
            freshness: snapshot.freshness,
            dirty: self.dirty.load(Ordering::Acquire),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }

    /// Runs `f` under the write lock; `f` reports whether it changed anything.
    fn write(&self, f: impl FnOnce(&mut Snapshot) -> bool) -> bool {
        let changed = {
            let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut *guard)
        };
        if changed {
            self.dirty.store(true, Ordering::Release);
        }
        changed
    }
}
