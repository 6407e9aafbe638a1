//! The public entry point for installing exit checks.

use crate::components::watcher::{
    CounterWatcher, DeadlineWatcher, FileMarkerWatcher, PredicateWatcher,
};
use crate::config::{self, ConfigError, ExitLimits};
use crate::events::HookEvent;
use crate::hooks::HookRegistry;
use crate::terminate::{ProcessExit, Terminate};
use crate::time::{self, Clock, SystemClock};
use chrono::Duration;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// A wall-clock budget split into hours, minutes and seconds.
///
/// Components may be fractional or negative; only their sum matters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeLimit {
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl TimeLimit {
    pub fn new(hours: f64, minutes: f64, seconds: f64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    pub fn total_seconds(&self) -> f64 {
        self.seconds + 60.0 * self.minutes + 3600.0 * self.hours
    }

    pub fn span(&self) -> Duration {
        time::seconds_to_duration(self.total_seconds())
    }

    /// True when every component is zero.
    pub fn is_zero(&self) -> bool {
        self.hours == 0.0 && self.minutes == 0.0 && self.seconds == 0.0
    }
}

/// Renders the non-zero components, e.g. `1h30m` or `45s`.
impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0s");
        }
        for (value, unit) in [(self.hours, "h"), (self.minutes, "m"), (self.seconds, "s")] {
            if value != 0.0 {
                write!(f, "{value}{unit}")?;
            }
        }
        Ok(())
    }
}

/// Installs exit checks into a hook registry.
///
/// Each method registers exactly one hook and returns immediately. The
/// checks themselves run later, when the scheduler fires the event. Calling
/// a method twice installs two independent hooks.
#[derive(Clone)]
pub struct ExitGuard {
    exit: Arc<dyn Terminate>,
    clock: Arc<dyn Clock>,
}

impl ExitGuard {
    /// A guard that exits the real process and reads the system clock.
    pub fn new() -> Self {
        Self::with_parts(Arc::new(ProcessExit), Arc::new(SystemClock))
    }

    pub fn with_parts(exit: Arc<dyn Terminate>, clock: Arc<dyn Clock>) -> Self {
        Self { exit, clock }
    }

    /// Before each task, exit if `path` exists.
    ///
    /// A task that is already running is not interrupted.
    pub fn exit_if_file_exists<T, R>(&self, registry: &mut R, path: impl Into<PathBuf>)
    where
        R: HookRegistry<T> + ?Sized,
    {
        let watcher = FileMarkerWatcher::new(path, self.exit.clone());
        info!(path = %watcher.path().display(), "Installing exit marker check.");
        registry.register_hook(HookEvent::TaskPreExecute, Box::new(watcher));
    }

    /// After each task, call `check` with no arguments and exit if it
    /// returns `true`. Errors from `check` propagate to the scheduler.
    pub fn exit_when<T, R, F>(&self, registry: &mut R, check: F)
    where
        T: 'static,
        R: HookRegistry<T> + ?Sized,
        F: FnMut() -> anyhow::Result<bool> + Send + 'static,
    {
        info!("Installing exit predicate.");
        let watcher = PredicateWatcher::ignoring_task(check, self.exit.clone());
        registry.register_hook(HookEvent::TaskExecuted, Box::new(watcher));
    }

    /// Like [`exit_when`](Self::exit_when), but `check` receives the task
    /// that just finished.
    pub fn exit_when_task<T, R, F>(&self, registry: &mut R, check: F)
    where
        T: 'static,
        R: HookRegistry<T> + ?Sized,
        F: FnMut(&T) -> anyhow::Result<bool> + Send + 'static,
    {
        info!("Installing task exit predicate.");
        let watcher = PredicateWatcher::new(Box::new(check), self.exit.clone());
        registry.register_hook(HookEvent::TaskExecuted, Box::new(watcher));
    }

    /// Exit once `n` tasks have finished. `n <= 0` exits after the first.
    pub fn exit_after_n_tasks<T, R>(&self, registry: &mut R, n: i64)
    where
        R: HookRegistry<T> + ?Sized,
    {
        info!(max_tasks = n, "Installing task limit.");
        let watcher = CounterWatcher::new(n, self.exit.clone());
        registry.register_hook(HookEvent::TaskExecuted, Box::new(watcher));
    }

    /// Exit after the first task that finishes once `limit` has elapsed.
    ///
    /// The deadline is fixed now, at registration. It is only checked after
    /// each task, so the process can overrun it by up to one task's length;
    /// callers that need a hard ceiling should pass a smaller limit.
    pub fn exit_after_time<T, R>(&self, registry: &mut R, limit: TimeLimit)
    where
        R: HookRegistry<T> + ?Sized,
    {
        let deadline = time::saturating_add(self.clock.now(), limit.span());
        info!(%deadline, ?limit, "Installing deadline.");
        let watcher = DeadlineWatcher::new(deadline, self.clock.clone(), self.exit.clone());
        registry.register_hook(HookEvent::TaskExecuted, Box::new(watcher));
    }

    /// Installs the checks named by the `JUG_*` variables in `env`.
    ///
    /// See [`config::install_from_env`].
    pub fn configure_from_env<T, R>(
        &self,
        registry: &mut R,
        env: &HashMap<String, String>,
    ) -> Result<ExitLimits, ConfigError>
    where
        R: HookRegistry<T> + ?Sized,
    {
        config::install_from_env(self, registry, env)
    }

    /// Like [`configure_from_env`](Self::configure_from_env), reading a
    /// snapshot of the process environment.
    pub fn configure_from_process_env<T, R>(
        &self,
        registry: &mut R,
    ) -> Result<ExitLimits, ConfigError>
    where
        R: HookRegistry<T> + ?Sized,
    {
        self.configure_from_env(registry, &config::process_env())
    }
}

impl Default for ExitGuard {
    fn default() -> Self {
        Self::new()
    }
}
