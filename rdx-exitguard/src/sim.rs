//! A simulated workload for trying exit checks end to end.
//!
//! Tasks are timed sleeps run through a [`TaskLoop`]; whichever exit check
//! fires first ends the process.

use crate::engine::{TaskLoop, TaskOutcome};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Prefix for environment overrides, e.g. `EXITGUARD_SIM_TASK_COUNT`.
pub const ENV_PREFIX: &str = "EXITGUARD_SIM";

/// Settings for the simulated workload.
///
/// Loaded from an optional TOML file, with `EXITGUARD_SIM_*` environment
/// variables taking precedence.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SimConfig {
    /// How many tasks to run if nothing exits first.
    #[serde(default = "default_task_count")]
    pub task_count: u64,

    /// How long each task sleeps for.
    #[serde(default = "default_task_millis")]
    pub task_millis: u64,

    /// Make every Nth task fail. Failed tasks still count as executed.
    #[serde(default)]
    pub fail_every: Option<u64>,
}

fn default_task_count() -> u64 {
    10
}

fn default_task_millis() -> u64 {
    250
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            task_count: default_task_count(),
            task_millis: default_task_millis(),
            fail_every: None,
        }
    }
}

impl SimConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// One unit of simulated work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimTask {
    pub index: u64,
    pub name: String,
}

impl SimTask {
    pub fn new(index: u64) -> Self {
        Self {
            index,
            name: format!("task-{index:03}"),
        }
    }
}

impl fmt::Display for SimTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Runs the configured tasks in order and returns how many were executed.
///
/// Failing tasks are logged and the loop moves on; a failing hook stops it.
pub async fn run_simulation(
    config: &SimConfig,
    task_loop: &mut TaskLoop<SimTask>,
) -> anyhow::Result<u64> {
    let pause = Duration::from_millis(config.task_millis);
    for index in 1..=config.task_count {
        let task = SimTask::new(index);
        let fails = config.fail_every.is_some_and(|n| n > 0 && index % n == 0);
        let outcome = task_loop
            .execute(&task, || async move {
                tokio::time::sleep(pause).await;
                if fails {
                    anyhow::bail!("simulated failure");
                }
                Ok(())
            })
            .await?;

        match outcome {
            TaskOutcome::Succeeded => info!(task = %task, "Task done."),
            TaskOutcome::Failed(e) => warn!(task = %task, error = %e, "Task failed, continuing."),
        }
    }
    Ok(task_loop.executed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_settings_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "task_count = 3\nfail_every = 2").unwrap();

        let config = SimConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.task_count, 3);
        assert_eq!(config.task_millis, 250);
        assert_eq!(config.fail_every, Some(2));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SimConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn task_names_are_zero_padded() {
        assert_eq!(SimTask::new(7).to_string(), "task-007");
    }
}
