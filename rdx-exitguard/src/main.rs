use anyhow::Result;
use colored::Colorize;
use exitguard::prelude::*;
use exitguard::sim::{run_simulation, SimConfig, SimTask};
use exitguard::{ENGINE_NAME, VERSION};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `debug` or `exitguard=trace`.
const LOG_ENV: &str = "EXITGUARD_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // 2. Load the workload settings. The only argument is an optional TOML file.
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = SimConfig::load(config_path.as_deref())?;

    // 3. Install exit checks from the JUG_* variables.
    let mut task_loop: TaskLoop<SimTask> = TaskLoop::new();
    let guard = ExitGuard::new();
    let limits = guard.configure_from_process_env(&mut task_loop)?;

    print_banner(&config, &limits);

    // 4. Run until the tasks run out or an exit check ends the process.
    let executed = run_simulation(&config, &mut task_loop).await?;
    info!(executed, "All tasks finished without an exit check firing.");
    println!("{}", format!("Finished {executed} tasks.").green().bold());

    Ok(())
}

fn print_banner(config: &SimConfig, limits: &ExitLimits) {
    println!("{}", format!("{ENGINE_NAME} simulator v{VERSION}").cyan().bold());
    println!(
        "{}",
        format!(
            "  {} tasks x {}ms, failing every {}",
            config.task_count,
            config.task_millis,
            config
                .fail_every
                .map_or_else(|| "never".to_string(), |n| format!("{n}th"))
        )
        .dimmed()
    );

    if limits.is_empty() {
        println!("{}", "  no exit checks configured (set JUG_MAX_* or JUG_EXIT_IF_FILE_EXISTS)".yellow());
        return;
    }
    if let Some(n) = limits.max_tasks {
        println!("  {} after {n} tasks", "exit".yellow());
    }
    if let Some(limit) = limits.time_limit {
        println!("  {} after {limit}", "exit".yellow());
    }
    if let Some(path) = &limits.exit_file {
        println!("  {} once {} exists", "exit".yellow(), path.display());
    }
}
