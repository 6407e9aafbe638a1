//! Lifecycle events fired by a task scheduler around each task.
//!
//! The string names are an external contract shared with the scheduler's
//! hook registry and must match it exactly.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named point in the scheduler's per-task processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookEvent {
    /// Fired immediately before a task runs. Receives the about-to-run task.
    TaskPreExecute,
    /// Fired immediately after a task finishes, whether it succeeded or not.
    /// Receives the just-finished task.
    TaskExecuted,
}

impl HookEvent {
    pub const ALL: [HookEvent; 2] = [HookEvent::TaskPreExecute, HookEvent::TaskExecuted];

    /// The registry name of this event.
    pub fn name(self) -> &'static str {
        match self {
            HookEvent::TaskPreExecute => "execute.task-pre-execute",
            HookEvent::TaskExecuted => "execute.task-executed1",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing a name that is not a known lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown hook event: {0:?}")]
pub struct UnknownHookEvent(pub String);

impl FromStr for HookEvent {
    type Err = UnknownHookEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookEvent::ALL
            .into_iter()
            .find(|event| event.name() == s)
            .ok_or_else(|| UnknownHookEvent(s.to_string()))
    }
}
