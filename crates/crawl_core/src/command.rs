use std::fmt;

use crate::{JobId, Transition};

/// Operator intents understood by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit { url: String },
    Start(JobId),
    Stop(JobId),
    Delete(JobId),
    Reanalyze(JobId),
    Refresh,
    /// Reads a job's analysis; never changes the store.
    Details(JobId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Submit,
    Start,
    Stop,
    Delete,
    Reanalyze,
    Refresh,
    Details,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Submit { .. } => CommandKind::Submit,
            Command::Start(_) => CommandKind::Start,
            Command::Stop(_) => CommandKind::Stop,
            Command::Delete(_) => CommandKind::Delete,
            Command::Reanalyze(_) => CommandKind::Reanalyze,
            Command::Refresh => CommandKind::Refresh,
            Command::Details(_) => CommandKind::Details,
        }
    }

    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Command::Start(id)
            | Command::Stop(id)
            | Command::Delete(id)
            | Command::Reanalyze(id)
            | Command::Details(id) => Some(*id),
            Command::Submit { .. } | Command::Refresh => None,
        }
    }

    /// Status edge this command requests, if it changes a job's status.
    pub fn transition(&self) -> Option<Transition> {
        match self {
            Command::Start(_) => Some(Transition::Start),
            Command::Stop(_) => Some(Transition::Stop),
            Command::Reanalyze(_) => Some(Transition::Reanalyze),
            Command::Submit { .. }
            | Command::Delete(_)
            | Command::Refresh
            | Command::Details(_) => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Submit { url } => write!(f, "submit url={url}"),
            Command::Start(id) => write!(f, "start id={id}"),
            Command::Stop(id) => write!(f, "stop id={id}"),
            Command::Delete(id) => write!(f, "delete id={id}"),
            Command::Reanalyze(id) => write!(f, "reanalyze id={id}"),
            Command::Refresh => write!(f, "refresh"),
            Command::Details(id) => write!(f, "details id={id}"),
        }
    }
}
