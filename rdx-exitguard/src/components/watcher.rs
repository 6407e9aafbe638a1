//! Defines the watchers that decide, per lifecycle event, whether to exit.

use crate::common::EXIT_SUCCESS;
use crate::hooks::Hook;
use crate::terminate::Terminate;
use crate::time::Clock;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// A fallible check evaluated against the task that just ran.
pub type TaskCheck<T> = Box<dyn FnMut(&T) -> anyhow::Result<bool> + Send>;

/// Exits when a marker file appears. Meant for `TaskPreExecute`.
pub struct FileMarkerWatcher {
    path: PathBuf,
    exit: Arc<dyn Terminate>,
}

impl FileMarkerWatcher {
    pub fn new(path: impl Into<PathBuf>, exit: Arc<dyn Terminate>) -> Self {
        Self {
            path: path.into(),
            exit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> Hook<T> for FileMarkerWatcher {
    fn on_event(&mut self, _task: &T) -> anyhow::Result<()> {
        if self.path.exists() {
            info!(path = %self.path.display(), "Exit marker file found.");
            self.exit.terminate(EXIT_SUCCESS);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "exit-if-file-exists"
    }
}

/// Exits when a caller-supplied check returns `true`.
///
/// Errors from the check are returned as-is.
pub struct PredicateWatcher<T> {
    check: TaskCheck<T>,
    exit: Arc<dyn Terminate>,
}

impl<T> PredicateWatcher<T> {
    /// The check receives the task that just finished.
    pub fn new(check: TaskCheck<T>, exit: Arc<dyn Terminate>) -> Self {
        Self { check, exit }
    }

    /// The check is called with no arguments; the task is discarded.
    pub fn ignoring_task<F>(mut check: F, exit: Arc<dyn Terminate>) -> Self
    where
        F: FnMut() -> anyhow::Result<bool> + Send + 'static,
        T: 'static,
    {
        Self::new(Box::new(move |_task: &T| check()), exit)
    }
}

impl<T> Hook<T> for PredicateWatcher<T> {
    fn on_event(&mut self, task: &T) -> anyhow::Result<()> {
        if (self.check)(task)? {
            info!("Exit predicate returned true.");
            self.exit.terminate(EXIT_SUCCESS);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "exit-when"
    }
}

/// Exits once `limit` tasks have been executed.
///
/// The count never resets. A limit of zero or below exits on the first
/// event.
pub struct CounterWatcher {
    executed: i64,
    limit: i64,
    exit: Arc<dyn Terminate>,
}

impl CounterWatcher {
    pub fn new(limit: i64, exit: Arc<dyn Terminate>) -> Self {
        Self {
            executed: 0,
            limit,
            exit,
        }
    }

    pub fn executed(&self) -> i64 {
        self.executed
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

impl<T> Hook<T> for CounterWatcher {
    fn on_event(&mut self, _task: &T) -> anyhow::Result<()> {
        self.executed += 1;
        trace!(executed = self.executed, limit = self.limit, "Task counted.");
        if self.executed >= self.limit {
            info!(executed = self.executed, "Task limit reached.");
            self.exit.terminate(EXIT_SUCCESS);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "exit-after-n-tasks"
    }
}

/// Exits the first time it observes the clock at or past a fixed deadline.
///
/// The check only happens between tasks: the real overrun is however far
/// past the deadline the running task finishes.
pub struct DeadlineWatcher {
    deadline: DateTime<Utc>,
    clock: Arc<dyn Clock>,
    exit: Arc<dyn Terminate>,
}

impl DeadlineWatcher {
    pub fn new(deadline: DateTime<Utc>, clock: Arc<dyn Clock>, exit: Arc<dyn Terminate>) -> Self {
        Self {
            deadline,
            clock,
            exit,
        }
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }
}

impl<T> Hook<T> for DeadlineWatcher {
    fn on_event(&mut self, _task: &T) -> anyhow::Result<()> {
        let now = self.clock.now();
        if now >= self.deadline {
            info!(deadline = %self.deadline, %now, "Deadline passed.");
            self.exit.terminate(EXIT_SUCCESS);
        } else {
            debug!(remaining = %(self.deadline - now), "Deadline not reached.");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "exit-after-time"
    }
}
