//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_habitrail"))
        .args(args)
        .env("HABITRAIL_HOME", home)
        .env_remove("HABITRAIL_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[test]
fn test_habit_add_and_list() {
    let home = TempDir::new().unwrap();
    let habit = run_json(home.path(), &["habit", "add", "Read", "--category", "study"]);
    assert_eq!(habit["name"], "Read");
    assert_eq!(habit["category"], "study");

    let list = run_json(home.path(), &["habit", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], habit["id"]);
}

#[test]
fn test_habit_done_and_undo() {
    let home = TempDir::new().unwrap();
    let habit = run_json(home.path(), &["habit", "add", "Run"]);
    let id = habit["id"].as_str().unwrap();

    let done = run_json(home.path(), &["habit", "done", id]);
    assert_eq!(done["streak"], 1);
    assert_eq!(done["best_streak"], 1);
    assert_eq!(done["completed_dates"][0], today());

    // A second "done" is a no-op.
    let again = run_json(home.path(), &["habit", "done", id]);
    assert_eq!(again["streak"], 1);

    let undone = run_json(home.path(), &["habit", "undo", id]);
    assert_eq!(undone["streak"], 0);
    assert_eq!(undone["best_streak"], 1);

    let streaks = run_json(home.path(), &["habit", "streak", id]);
    assert_eq!(streaks[0]["best_streak"], 1);
}

#[test]
fn test_missing_habit_is_an_error() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["habit", "show", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}

#[test]
fn test_invalid_date_is_rejected() {
    let home = TempDir::new().unwrap();
    let habit = run_json(home.path(), &["habit", "add", "Run"]);
    let id = habit["id"].as_str().unwrap();
    let (_, _, code) = run_cli(home.path(), &["habit", "done", id, "--date", "2024-2-30"]);
    assert_ne!(code, 0);
}

#[test]
fn test_reminder_check_fires_once_and_logs() {
    let home = TempDir::new().unwrap();
    run_json(
        home.path(),
        &["habit", "add", "Stretch", "--remind-at", "09:30", "--days", "1"],
    );

    // 2024-06-03 was a Monday.
    let fires = run_json(home.path(), &["remind", "check", "--at", "2024-06-03 09:30"]);
    assert_eq!(fires.as_array().unwrap().len(), 1);
    assert_eq!(fires[0]["title"], "Time for Stretch!");

    // A second run inside the same minute stays quiet.
    let again = run_json(home.path(), &["remind", "check", "--at", "2024-06-03 09:30"]);
    assert!(again.as_array().unwrap().is_empty());

    let tuesday = run_json(home.path(), &["remind", "check", "--at", "2024-06-04 09:30"]);
    assert!(tuesday.as_array().unwrap().is_empty());

    let log = run_json(home.path(), &["notify", "list"]);
    let titles: Vec<&str> = log
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"Reminder Set"));
    assert!(titles.contains(&"Time for Stretch!"));

    let (stdout, _, code) = run_cli(home.path(), &["notify", "read", "--all"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("2 notification(s) marked read"));
    let unread = run_json(home.path(), &["notify", "list", "--unread"]);
    assert!(unread.as_array().unwrap().is_empty());
}

#[test]
fn test_task_lifecycle() {
    let home = TempDir::new().unwrap();
    let task = run_json(
        home.path(),
        &["task", "add", "Pay rent", "--due", "2024-06-05", "--priority", "high"],
    );
    assert_eq!(task["priority"], "High");
    let id = task["id"].as_str().unwrap();

    let done = run_json(home.path(), &["task", "done", id]);
    assert_eq!(done["status"], "Completed");

    let due = run_json(home.path(), &["task", "list", "--due", "2024-06-05"]);
    assert_eq!(due.as_array().unwrap().len(), 1);

    let (_, _, code) = run_cli(home.path(), &["task", "delete", id]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(home.path(), &["task", "show", id]);
    assert_eq!(code, 1);
}

#[test]
fn test_focus_log_and_totals() {
    let home = TempDir::new().unwrap();
    let task = run_json(home.path(), &["task", "add", "Write report"]);
    let id = task["id"].as_str().unwrap();

    run_json(home.path(), &["focus", "log", id, "--minutes", "25"]);
    run_json(home.path(), &["focus", "log", id, "--kind", "short_break"]);

    let totals = run_json(home.path(), &["focus", "totals", "--range", "day"]);
    assert_eq!(totals["sessions"], 2);
    assert_eq!(totals["focus_minutes"], 25);
    assert_eq!(totals["short_break_minutes"], 5);
}

#[test]
fn test_journal_write_and_show() {
    let home = TempDir::new().unwrap();
    run_json(
        home.path(),
        &["journal", "write", "Good day", "--title", "Sunday", "--rating", "5", "--date", "2024-06-02"],
    );
    let entry = run_json(home.path(), &["journal", "show", "2024-06-02"]);
    assert_eq!(entry["title"], "Sunday");
    assert_eq!(entry["rating"], 5);

    let (_, _, code) = run_cli(home.path(), &["journal", "write", "x", "--rating", "9"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_get_set() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "reminders.tick_seconds"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "reminders.tick_seconds", "30"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "reminders.tick_seconds"]);
    assert_eq!(stdout.trim(), "30");

    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "ui.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("ui.nope"));
}

#[test]
fn test_import_legacy_file() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("export.json");
    std::fs::write(
        &file,
        r#"{"habits": {"legacy-1": {"name": "Meditate", "history": {"2024-06-01": true}}},
            "tasks": [{"id": "t1", "title": "Old task", "dueDate": "2024-06-01"}]}"#,
    )
    .unwrap();

    let summary = run_json(home.path(), &["import", file.to_str().unwrap()]);
    assert_eq!(summary["habits"], 1);
    assert_eq!(summary["tasks"], 1);

    let habit = run_json(home.path(), &["habit", "show", "legacy-1"]);
    assert_eq!(habit["name"], "Meditate");
}

#[test]
fn test_stats_summary() {
    let home = TempDir::new().unwrap();
    let habit = run_json(home.path(), &["habit", "add", "Run"]);
    run_json(home.path(), &["habit", "done", habit["id"].as_str().unwrap()]);
    let (_, stderr, code) = run_cli(home.path(), &["journal", "write", "Good run", "--rating", "5"]);
    assert_eq!(code, 0, "{stderr}");

    let stats = run_json(home.path(), &["stats"]);
    assert_eq!(stats["today"], today());
    assert_eq!(stats["overview"]["habits_done_today"], 1);
    assert_eq!(stats["day"]["success_rate"], 100);
    assert_eq!(stats["last_7_days"][6]["habits"], 1);
    assert_eq!(stats["consistency_30d"], 3);
    assert_eq!(stats["mood_trend"][9]["rating"], 5);
    assert_eq!(stats["mood_distribution"][0]["label"], "Rad");

    let (_, stderr, code) = run_cli(home.path(), &["stats", "--date", "not-a-date"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not-a-date"));
}

#[test]
fn test_export_then_import_into_fresh_home() {
    let home = TempDir::new().unwrap();
    let habit = run_json(home.path(), &["habit", "add", "Floss"]);
    run_json(home.path(), &["habit", "done", habit["id"].as_str().unwrap()]);
    run_json(home.path(), &["task", "add", "Pay rent", "--due", "2024-06-05"]);

    let file = home.path().join("backup.json");
    let written = run_json(home.path(), &["export", "--out", file.to_str().unwrap()]);
    assert_eq!(written["habits"], 1);
    assert_eq!(written["tasks"], 1);

    let stdout_backup = run_json(home.path(), &["export"]);
    assert_eq!(stdout_backup["format"], 1);

    let fresh = TempDir::new().unwrap();
    let restored = run_json(fresh.path(), &["import", file.to_str().unwrap()]);
    assert_eq!(restored["habits"], 1);
    assert_eq!(restored["tasks"], 1);

    let shown = run_json(fresh.path(), &["habit", "show", habit["id"].as_str().unwrap()]);
    assert_eq!(shown["streak"], 1);
    assert_eq!(shown["completed_dates"][0], today());
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("habitrail"));
}
