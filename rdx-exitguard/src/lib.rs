//! # Exitguard
//!
//! Early-termination checks for long-running task-execution loops.
//!
//! A scheduler runs discrete tasks one at a time and fires named lifecycle
//! events around each one. Exitguard installs small, stateful watchers on
//! those events that stop the process when an exit condition is met.
//!
//! ## Core Concepts
//!
//! - **Hook registry**: anything implementing [`hooks::HookRegistry`]. The
//!   scheduler owns it and fires [`events::HookEvent`]s into it. [`hooks::HookTable`]
//!   is a ready-made in-process implementation.
//! - **Watchers**: one per exit condition (marker file, predicate, task count,
//!   deadline). Each owns its private state and is checked only when its
//!   event fires; nothing polls in the background.
//! - **Injected capabilities**: termination ([`terminate::Terminate`]) and
//!   time ([`time::Clock`]) are handed to an [`guard::ExitGuard`], so hosts
//!   and tests can swap the real `process::exit` and wall clock.
//! - **Environment-driven**: the `JUG_MAX_TASKS`, `JUG_MAX_HOURS`,
//!   `JUG_MAX_MINUTES`, `JUG_MAX_SECONDS` and `JUG_EXIT_IF_FILE_EXISTS`
//!   variables install the matching watchers in one call.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use exitguard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut task_loop: TaskLoop<String> = TaskLoop::new();
//!     let guard = ExitGuard::new();
//!
//!     // Stop after three tasks, or as soon as `STOP` shows up.
//!     guard.exit_after_n_tasks(&mut task_loop, 3);
//!     guard.exit_if_file_exists(&mut task_loop, "STOP");
//!
//!     // Anything else comes from the environment.
//!     guard.configure_from_process_env(&mut task_loop)?;
//!
//!     for name in ["fetch", "parse", "index", "report"] {
//!         task_loop
//!             .execute(&name.to_string(), || async { Ok(()) })
//!             .await?;
//!     }
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Exitguard";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod guard;
pub mod hooks;
pub mod sim;
pub mod terminate;
pub mod time;

/// A prelude module for easy importing of the most common Exitguard types.
pub mod prelude {
    pub use crate::common::{HookId, EXIT_SUCCESS};
    pub use crate::config::{ConfigError, ExitLimits};
    pub use crate::engine::{TaskLoop, TaskOutcome};
    pub use crate::events::HookEvent;
    pub use crate::guard::{ExitGuard, TimeLimit};
    pub use crate::hooks::{Hook, HookRegistry, HookTable};
    pub use crate::terminate::{ExitLatch, ProcessExit, Terminate};
    pub use crate::time::{Clock, ManualClock, SystemClock};
}
