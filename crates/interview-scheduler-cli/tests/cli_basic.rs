//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a scratch directory.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

const EVENT: &str = r#"{
    "event_times": [{"start": "2024-03-02T09:00", "end": "2024-03-02T12:00"}],
    "companies": [
        {"name": "Acme", "rooms": [{
            "name": "Acme 1",
            "slots": [
                {"start": "2024-03-02T09:00", "end": "2024-03-02T09:30"},
                {"start": "2024-03-02T09:30", "end": "2024-03-02T10:00"}
            ],
            "candidates": ["1", "2"]
        }]}
    ],
    "attendees": [
        {"id": "1", "name": "Ann", "preferences": {"Acme": 1}},
        {"id": "2", "name": "Bob", "preferences": {"Acme": 1}}
    ]
}"#;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_interview-scheduler"))
        .args(args)
        .env("HOME", home)
        .env_remove("INTERVIEW_SCHEDULER_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn write_event(dir: &TempDir) -> String {
    let path = dir.path().join("event.json");
    std::fs::write(&path, EVENT).unwrap();
    path.to_string_lossy().to_string()
}

fn start_of(doc: &Value, attendee: &str) -> String {
    doc["assignments"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["attendee"] == attendee)
        .map(|a| a["start"].as_str().unwrap().to_string())
        .unwrap()
}

#[test]
fn test_run_fills_both_slots() {
    let home = TempDir::new().unwrap();
    let input = write_event(&home);

    let (stdout, stderr, code) = run_cli(home.path(), &["run", &input]);
    assert_eq!(code, 0, "run failed: {stderr}");

    let doc: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(doc["assignments"].as_array().unwrap().len(), 2);
    assert_eq!(doc["summary"]["filled_slots"], 2);
    assert_eq!(doc["summary"]["total_utility"], 2);
    assert!(stderr.contains("phase finished"));
}

#[test]
fn test_swap_exchanges_assignments() {
    let home = TempDir::new().unwrap();
    let input = write_event(&home);
    let scheduled = home.path().join("scheduled.json");
    let scheduled = scheduled.to_string_lossy().to_string();

    let (_, stderr, code) = run_cli(home.path(), &["run", &input, "-o", &scheduled]);
    assert_eq!(code, 0, "run failed: {stderr}");
    let before: Value = serde_json::from_str(&std::fs::read_to_string(&scheduled).unwrap()).unwrap();
    let ann_start = start_of(&before, "1");
    let bob_start = start_of(&before, "2");

    let (stdout, stderr, code) = run_cli(
        home.path(),
        &[
            "swap", &scheduled,
            "--room1", "Acme 1", "--start1", &ann_start, "--attendee1", "1",
            "--room2", "Acme 1", "--start2", &bob_start, "--attendee2", "2",
        ],
    );
    assert_eq!(code, 0, "swap failed: {stderr}");

    let after: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(start_of(&after, "1"), bob_start);
    assert_eq!(start_of(&after, "2"), ann_start);
}

#[test]
fn test_swap_with_wrong_occupant_fails() {
    let home = TempDir::new().unwrap();
    let input = write_event(&home);
    let scheduled = home.path().join("scheduled.json");
    let scheduled = scheduled.to_string_lossy().to_string();
    run_cli(home.path(), &["run", &input, "-o", &scheduled]);
    let before: Value = serde_json::from_str(&std::fs::read_to_string(&scheduled).unwrap()).unwrap();
    let ann_start = start_of(&before, "1");

    let (_, stderr, code) = run_cli(
        home.path(),
        &[
            "swap", &scheduled,
            "--room1", "Acme 1", "--start1", &ann_start, "--attendee1", "2",
            "--attendee2", "1",
        ],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("must be held by that attendee"));
}

#[test]
fn test_run_rejects_missing_file() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["run", "/nonexistent/event.json"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: failed to read"));
}

#[test]
fn test_slots_skip_breaks() {
    let home = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli(
        home.path(),
        &[
            "slots",
            "--start", "2024-03-02T09:00",
            "--end", "2024-03-02T11:00",
            "--length-minutes", "30",
            "--break", "2024-03-02T09:30,2024-03-02T10:00",
        ],
    );
    assert_eq!(code, 0, "slots failed: {stderr}");

    let spans: Value = serde_json::from_str(&stdout).unwrap();
    let starts: Vec<&str> = spans
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();
    assert_eq!(
        starts,
        vec!["2024-03-02T09:00:00", "2024-03-02T10:00:00", "2024-03-02T10:30:00"]
    );
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "scheduler.compact"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "true");

    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "scheduler.compact", "false"]);
    assert_eq!(code, 0, "set failed: {stderr}");

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "scheduler.compact"]);
    assert_eq!(stdout.trim(), "false");
    assert!(home
        .path()
        .join(".config/interview-scheduler/config.toml")
        .exists());
}

#[test]
fn test_config_unknown_key_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}
