use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use exitguard::config::ConfigError;
use exitguard::prelude::*;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

struct Harness {
    guard: ExitGuard,
    latch: Arc<ExitLatch>,
    clock: Arc<ManualClock>,
    table: HookTable<u32>,
}

impl Harness {
    fn new() -> Self {
        let latch = Arc::new(ExitLatch::new());
        let clock = Arc::new(ManualClock::starting_now());
        Self {
            guard: ExitGuard::with_parts(latch.clone(), clock.clone()),
            latch,
            clock,
            table: HookTable::new(),
        }
    }

    fn configure(&mut self, pairs: &[(&str, &str)]) -> Result<ExitLimits, ConfigError> {
        self.guard.configure_from_env(&mut self.table, &env(pairs))
    }

    fn finish_task(&mut self) {
        self.table.fire(HookEvent::TaskExecuted, &0).unwrap();
    }
}

#[test]
fn max_tasks_installs_a_single_counter() {
    let mut h = Harness::new();
    let limits = h.configure(&[("JUG_MAX_TASKS", "5")]).unwrap();

    assert_eq!(limits.max_tasks, Some(5));
    assert_eq!(limits.time_limit, None);
    assert_eq!(limits.exit_file, None);
    assert_eq!(h.table.names(HookEvent::TaskExecuted), vec!["exit-after-n-tasks"]);
    assert_eq!(h.table.count(HookEvent::TaskPreExecute), 0);

    for _ in 0..4 {
        h.finish_task();
    }
    assert!(!h.latch.is_tripped());
    h.finish_task();
    assert_eq!(h.latch.requested(), Some(EXIT_SUCCESS));
}

#[test]
fn all_zero_time_values_install_nothing() {
    let mut h = Harness::new();
    let limits = h
        .configure(&[("JUG_MAX_HOURS", "0"), ("JUG_MAX_MINUTES", "0")])
        .unwrap();

    assert!(limits.is_empty());
    assert!(h.table.is_empty());
}

#[test]
fn empty_environment_installs_nothing() {
    let mut h = Harness::new();
    assert!(h.configure(&[]).unwrap().is_empty());
    assert!(h.table.is_empty());
}

#[test]
fn time_values_combine_into_one_deadline() {
    let mut h = Harness::new();
    let limits = h
        .configure(&[
            ("JUG_MAX_HOURS", "1"),
            ("JUG_MAX_MINUTES", "30"),
            ("JUG_MAX_SECONDS", "15"),
        ])
        .unwrap();

    assert_eq!(limits.time_limit, Some(TimeLimit::new(1.0, 30.0, 15.0)));
    assert_eq!(h.table.names(HookEvent::TaskExecuted), vec!["exit-after-time"]);

    h.clock.advance(Duration::seconds(5414));
    h.finish_task();
    assert!(!h.latch.is_tripped());

    h.clock.advance(Duration::seconds(1));
    h.finish_task();
    assert!(h.latch.is_tripped());
}

#[test]
fn negative_time_sets_a_deadline_in_the_past() {
    let mut h = Harness::new();
    h.configure(&[("JUG_MAX_MINUTES", "-1")]).unwrap();
    h.finish_task();
    assert!(h.latch.is_tripped());
}

#[test]
fn exit_file_is_taken_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("stop now");
    let mut h = Harness::new();
    let limits = h
        .configure(&[("JUG_EXIT_IF_FILE_EXISTS", marker.to_str().unwrap())])
        .unwrap();

    assert_eq!(limits.exit_file, Some(PathBuf::from(&marker)));
    assert_eq!(h.table.names(HookEvent::TaskPreExecute), vec!["exit-if-file-exists"]);

    h.table.fire(HookEvent::TaskPreExecute, &1).unwrap();
    assert!(!h.latch.is_tripped());
    std::fs::write(&marker, "").unwrap();
    h.table.fire(HookEvent::TaskPreExecute, &2).unwrap();
    assert!(h.latch.is_tripped());
}

#[test]
fn bad_max_tasks_installs_nothing() {
    let mut h = Harness::new();
    let err = h
        .configure(&[
            ("JUG_MAX_TASKS", "abc"),
            ("JUG_MAX_SECONDS", "10"),
            ("JUG_EXIT_IF_FILE_EXISTS", "/tmp/stop"),
        ])
        .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::InvalidInteger { var: "JUG_MAX_TASKS", .. }
    ));
    assert!(h.table.is_empty());
}

#[test]
fn bad_time_value_keeps_earlier_checks_and_skips_later_ones() {
    let mut h = Harness::new();
    let err = h
        .configure(&[
            ("JUG_MAX_TASKS", "2"),
            ("JUG_MAX_HOURS", "1"),
            ("JUG_MAX_SECONDS", "soon"),
            ("JUG_EXIT_IF_FILE_EXISTS", "/tmp/stop"),
        ])
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "JUG_MAX_SECONDS must be an integer, got \"soon\""
    );
    assert_eq!(h.table.names(HookEvent::TaskExecuted), vec!["exit-after-n-tasks"]);
    assert_eq!(h.table.count(HookEvent::TaskPreExecute), 0);
}

#[test]
fn empty_value_is_set_and_fails_to_parse() {
    let mut h = Harness::new();
    assert!(h.configure(&[("JUG_MAX_HOURS", "")]).is_err());
}

#[test]
fn non_positive_max_tasks_exits_after_first_task() {
    let mut h = Harness::new();
    h.configure(&[("JUG_MAX_TASKS", "0")]).unwrap();
    h.finish_task();
    assert!(h.latch.is_tripped());
}

#[test]
fn every_variable_together() {
    let mut h = Harness::new();
    let limits = h
        .configure(&[
            ("JUG_MAX_TASKS", "3"),
            ("JUG_MAX_SECONDS", "30"),
            ("JUG_EXIT_IF_FILE_EXISTS", "STOP"),
            ("JUG_UNRELATED", "ignored"),
        ])
        .unwrap();

    assert_eq!(limits.max_tasks, Some(3));
    assert_eq!(limits.time_limit, Some(TimeLimit::new(0.0, 0.0, 30.0)));
    assert_eq!(limits.exit_file, Some(PathBuf::from("STOP")));
    assert_eq!(
        h.table.names(HookEvent::TaskExecuted),
        vec!["exit-after-n-tasks", "exit-after-time"]
    );
    assert_eq!(h.table.len(), 3);
}

#[test]
fn oversized_and_grouped_integers_still_configure() {
    let mut h = Harness::new();
    let limits = h
        .configure(&[
            ("JUG_MAX_TASKS", "99999999999999999999"),
            ("JUG_MAX_HOURS", "1_000_000_000_000_000_000_000"),
        ])
        .unwrap();

    assert_eq!(limits.max_tasks, Some(i64::MAX));
    assert_eq!(limits.time_limit, Some(TimeLimit::new(i64::MAX as f64, 0.0, 0.0)));
    assert_eq!(
        h.table.names(HookEvent::TaskExecuted),
        vec!["exit-after-n-tasks", "exit-after-time"]
    );

    h.clock.advance(Duration::days(365 * 1000));
    for _ in 0..10 {
        h.finish_task();
    }
    assert!(!h.latch.is_tripped());
}

#[test]
fn grouped_digits_set_the_task_limit() {
    let mut h = Harness::new();
    let limits = h.configure(&[("JUG_MAX_TASKS", "1_0")]).unwrap();
    assert_eq!(limits.max_tasks, Some(10));
}
