//! Crawl core: job model, client-side job store and the pure reconciliation planner.
mod analysis;
mod command;
mod dedupe;
mod effect;
mod job;
mod policy;
mod reconcile;
mod store;
mod view_model;

pub use analysis::JobAnalysis;
pub use command::{Command, CommandKind};
pub use dedupe::normalize_url_for_dedupe;
pub use effect::{Effect, StoreOp};
pub use job::{CrawlJob, FailureKind, JobId, JobPatch, JobStatus, Transition};
pub use policy::{PolicyTable, ReconcilePolicy};
pub use reconcile::{reconcile, reconcile_failure, Ack};
pub use store::{Freshness, JobStore, Snapshot};
pub use view_model::{DashboardView, JobRowView, Notification, NotifyLevel};
