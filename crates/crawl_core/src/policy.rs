use serde::{Deserialize, Serialize};

use crate::CommandKind;

/// How the store is brought in line with the service after a command succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcilePolicy {
    /// Apply the expected result locally and mark the store stale.
    OptimisticPatch,
    /// Mark the store stale and re-list the whole collection.
    InvalidateAndRefetch,
}

/// Per-command reconciliation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTable {
    pub submit: ReconcilePolicy,
    pub start: ReconcilePolicy,
    pub stop: ReconcilePolicy,
    pub delete: ReconcilePolicy,
    pub reanalyze: ReconcilePolicy,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            submit: ReconcilePolicy::OptimisticPatch,
            start: ReconcilePolicy::InvalidateAndRefetch,
            stop: ReconcilePolicy::OptimisticPatch,
            delete: ReconcilePolicy::OptimisticPatch,
            reanalyze: ReconcilePolicy::OptimisticPatch,
        }
    }
}

impl PolicyTable {
    pub fn uniform(policy: ReconcilePolicy) -> Self {
        Self {
            submit: policy,
            start: policy,
            stop: policy,
            delete: policy,
            reanalyze: policy,
        }
    }

    pub fn for_kind(&self, kind: CommandKind) -> ReconcilePolicy {
        match kind {
            CommandKind::Submit => self.submit,
            CommandKind::Start => self.start,
            CommandKind::Stop => self.stop,
            CommandKind::Delete => self.delete,
            CommandKind::Reanalyze => self.reanalyze,
            // A refresh is a refetch by definition.
            CommandKind::Refresh => ReconcilePolicy::InvalidateAndRefetch,
            // Reads plan no store effects; the value is never consulted.
            CommandKind::Details => ReconcilePolicy::OptimisticPatch,
        }
    }
}
