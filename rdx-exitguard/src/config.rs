//! Environment-driven configuration of exit checks.
//!
//! The following variables are read when present; absent ones are ignored.
//! A present variable is always parsed, even when empty.
//!
//! | variable | effect |
//! |---|---|
//! | `JUG_MAX_TASKS` | exit after this many tasks |
//! | `JUG_MAX_HOURS`, `JUG_MAX_MINUTES`, `JUG_MAX_SECONDS` | exit once their combined time has passed |
//! | `JUG_EXIT_IF_FILE_EXISTS` | exit before the next task once this path exists |
//!
//! The numeric variables must hold integers. The time limits are only
//! checked after each task completes, see
//! [`ExitGuard::exit_after_time`](crate::guard::ExitGuard::exit_after_time).

use crate::guard::{ExitGuard, TimeLimit};
use crate::hooks::HookRegistry;
use std::collections::HashMap;
use std::num::{IntErrorKind, ParseIntError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

pub const MAX_TASKS_VAR: &str = "JUG_MAX_TASKS";
pub const MAX_HOURS_VAR: &str = "JUG_MAX_HOURS";
pub const MAX_MINUTES_VAR: &str = "JUG_MAX_MINUTES";
pub const MAX_SECONDS_VAR: &str = "JUG_MAX_SECONDS";
pub const EXIT_FILE_VAR: &str = "JUG_EXIT_IF_FILE_EXISTS";

/// Errors raised while reading exit limits from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be an integer, got {value:?}")]
    InvalidInteger {
        var: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// What [`install_from_env`] installed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExitLimits {
    pub max_tasks: Option<i64>,
    pub time_limit: Option<TimeLimit>,
    pub exit_file: Option<PathBuf>,
}

impl ExitLimits {
    /// True when no check was installed.
    pub fn is_empty(&self) -> bool {
        self.max_tasks.is_none() && self.time_limit.is_none() && self.exit_file.is_none()
    }
}

/// Installs one watcher per recognised variable in `env`.
///
/// Variables are handled in a fixed order: task limit, time limit, exit
/// file. The three time variables produce at most one deadline, and none
/// at all when they are absent or all zero. On a parse error the
/// remaining variables are skipped, while checks installed by earlier ones
/// stay in the registry.
pub fn install_from_env<T, R>(
    guard: &ExitGuard,
    registry: &mut R,
    env: &HashMap<String, String>,
) -> Result<ExitLimits, ConfigError>
where
    R: HookRegistry<T> + ?Sized,
{
    let mut limits = ExitLimits::default();

    if let Some(n) = parse_int(env, MAX_TASKS_VAR)? {
        guard.exit_after_n_tasks(registry, n);
        limits.max_tasks = Some(n);
    }

    let hours = parse_int(env, MAX_HOURS_VAR)?.unwrap_or(0);
    let minutes = parse_int(env, MAX_MINUTES_VAR)?.unwrap_or(0);
    let seconds = parse_int(env, MAX_SECONDS_VAR)?.unwrap_or(0);
    if hours != 0 || minutes != 0 || seconds != 0 {
        let limit = TimeLimit::new(hours as f64, minutes as f64, seconds as f64);
        guard.exit_after_time(registry, limit);
        limits.time_limit = Some(limit);
    }

    if let Some(path) = env.get(EXIT_FILE_VAR) {
        guard.exit_if_file_exists(registry, path);
        limits.exit_file = Some(PathBuf::from(path));
    }

    debug!(?limits, "Exit limits read from environment.");
    Ok(limits)
}

/// A one-time snapshot of the process environment.
///
/// Non-UTF-8 names or values are converted lossily rather than skipped.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

/// Parses `var` as a decimal integer if it is set.
fn parse_int(env: &HashMap<String, String>, var: &'static str) -> Result<Option<i64>, ConfigError> {
    let Some(raw) = env.get(var) else {
        return Ok(None);
    };
    parse_decimal(raw)
        .map(Some)
        .map_err(|source| ConfigError::InvalidInteger {
            var,
            value: raw.clone(),
            source,
        })
}

/// Parses a decimal integer the way the `JUG_*` variables are written.
///
/// Surrounding whitespace is ignored, a leading sign is allowed and single
/// underscores may separate digits (`1_000`). Values beyond the `i64`
/// range clamp to its bounds; a clamped task count or deadline is never
/// reached anyway.
fn parse_decimal(text: &str) -> Result<i64, ParseIntError> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let separators_ok =
        !digits.starts_with('_') && !digits.ends_with('_') && !digits.contains("__");
    let cleaned = if separators_ok {
        trimmed.replace('_', "")
    } else {
        trimmed.to_string()
    };
    match cleaned.parse::<i64>() {
        Ok(n) => Ok(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(e),
        },
    }
}
