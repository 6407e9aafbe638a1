//! A minimal task loop that fires lifecycle events around each task.

use crate::events::HookEvent;
use crate::hooks::{Hook, HookRegistry, HookTable};
use std::future::Future;
use tracing::{trace, warn};

/// How a task's own work ended.
#[derive(Debug)]
pub enum TaskOutcome {
    Succeeded,
    Failed(anyhow::Error),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded)
    }
}

/// Runs tasks one at a time, firing `TaskPreExecute` before each and
/// `TaskExecuted` after each.
///
/// The loop owns its [`HookTable`] and is itself a [`HookRegistry`], so exit
/// checks can be installed on it directly.
pub struct TaskLoop<T> {
    hooks: HookTable<T>,
    executed: u64,
}

impl<T> TaskLoop<T> {
    pub fn new() -> Self {
        Self {
            hooks: HookTable::new(),
            executed: 0,
        }
    }

    /// Executes one task.
    ///
    /// `TaskExecuted` fires whether or not `work` succeeded; the work's
    /// result comes back as a [`TaskOutcome`]. An `Err` means a hook failed.
    /// If that was a `TaskPreExecute` hook, the task never ran.
    pub async fn execute<F, Fut>(&mut self, task: &T, work: F) -> anyhow::Result<TaskOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        self.hooks.fire(HookEvent::TaskPreExecute, task)?;

        trace!(index = self.executed, "Running task.");
        let outcome = match work().await {
            Ok(()) => TaskOutcome::Succeeded,
            Err(e) => {
                warn!(index = self.executed, error = %e, "Task failed.");
                TaskOutcome::Failed(e)
            }
        };
        self.executed += 1;

        self.hooks.fire(HookEvent::TaskExecuted, task)?;
        Ok(outcome)
    }

    /// Number of tasks executed so far, failed ones included.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    pub fn hooks(&self) -> &HookTable<T> {
        &self.hooks
    }
}

impl<T> Default for TaskLoop<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HookRegistry<T> for TaskLoop<T> {
    fn register_hook(&mut self, event: HookEvent, hook: Box<dyn Hook<T>>) {
        self.hooks.register_hook(event, hook);
    }
}
