//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an isolated data directory and verify
//! outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_eyegym"))
        .args(args)
        .env("EYEGYM_DATA_DIR", data_dir)
        .env_remove("EYEGYM_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_exercises_list() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["exercises", "list"]);
    assert_eq!(code, 0, "exercises list failed");

    let steps = json(&stdout);
    let steps = steps.as_array().unwrap();
    assert_eq!(steps.len(), 26);
    assert_eq!(steps[0]["index"], 0);
    assert!(steps[0]["narrationText"].is_string());
    assert!(steps.iter().all(|s| s["targetMs"].as_u64().unwrap_or(0) > 0));
}

#[test]
fn test_empty_history_and_stats() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["history", "list"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout), serde_json::json!([]));

    let (code, stdout, _) = run_cli(dir.path(), &["stats", "streak"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout)["streak"], 0);

    let (code, stdout, _) = run_cli(dir.path(), &["stats", "week"]);
    assert_eq!(code, 0);
    let week = json(&stdout);
    assert_eq!(week.as_array().unwrap().len(), 7);
    assert_eq!(
        week.as_array()
            .unwrap()
            .iter()
            .filter(|d| d["isToday"] == true)
            .count(),
        1
    );
}

#[test]
fn test_train_silent_records_history() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.json");
    std::fs::write(
        &script,
        r#"[{"id":"blink","kind":"static","name":"Blink","narrationText":"Blink","seconds":1}]"#,
    )
    .unwrap();

    let (code, stdout, stderr) = run_cli(
        dir.path(),
        &["train", "--silent", "--script", script.to_str().unwrap()],
    );
    assert_eq!(code, 0, "train failed: {stderr}");
    let entry = json(&stdout);
    assert_eq!(entry["status"], "completed");
    assert_eq!(entry["completedExercises"], 1);
    assert_eq!(entry["totalExercises"], 1);

    let (_, stdout, _) = run_cli(dir.path(), &["history", "list"]);
    let log = json(&stdout);
    assert_eq!(log.as_array().unwrap().len(), 1);
    assert_eq!(log[0]["id"], entry["id"]);

    let (_, stdout, _) = run_cli(dir.path(), &["stats", "streak"]);
    assert_eq!(json(&stdout)["streak"], 1);

    let (_, stdout, _) = run_cli(dir.path(), &["stats", "summary"]);
    assert_eq!(json(&stdout)["completed"], 1);

    let (code, stdout, _) = run_cli(dir.path(), &["history", "clear"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("history cleared"));
    let (_, stdout, _) = run_cli(dir.path(), &["history", "list"]);
    assert_eq!(json(&stdout), serde_json::json!([]));
}

#[cfg(unix)]
#[test]
fn test_train_interrupt_stops_session() {
    use std::process::Stdio;

    let dir = tempfile::tempdir().unwrap();
    let child = Command::new(env!("CARGO_BIN_EXE_eyegym"))
        .args(["train", "--silent"])
        .env("EYEGYM_DATA_DIR", dir.path())
        .env_remove("EYEGYM_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn train");

    std::thread::sleep(std::time::Duration::from_millis(1_500));
    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("Failed to send SIGINT");
    assert!(status.success());

    let output = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(0), "train failed: {stderr}");
    assert!(stderr.contains("stopping"));
    let entry = json(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(entry["status"], "stopped");
    assert_eq!(entry["totalExercises"], 26);

    let (_, stdout, _) = run_cli(dir.path(), &["history", "list"]);
    assert_eq!(json(&stdout)[0]["id"], entry["id"]);
}

#[test]
fn test_train_rejects_empty_script() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("empty.json");
    std::fs::write(&script, "[]").unwrap();

    let (code, _, stderr) = run_cli(
        dir.path(),
        &["train", "--silent", "--script", script.to_str().unwrap()],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_roundtrip() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "narration.rate"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1.0");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "session.ms_per_rep", "1500"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "session.ms_per_rep"]);
    assert_eq!(stdout.trim(), "1500");

    let (code, _, stderr) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no.such.key"));

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "narration.rate", "0"]);
    assert_eq!(code, 1);

    let (code, _, _) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "session.ms_per_rep"]);
    assert_eq!(stdout.trim(), "1000");
}

#[test]
fn test_reminders_set_and_plan() {
    let dir = tempfile::tempdir().unwrap();

    let (_, stdout, _) = run_cli(dir.path(), &["reminders", "show"]);
    let shown = json(&stdout);
    assert_eq!(shown["enabled"], false);
    assert_eq!(shown["timesPerDay"], 2);

    let (_, stdout, _) = run_cli(dir.path(), &["reminders", "plan"]);
    assert_eq!(json(&stdout)["notifications"], serde_json::json!([]));

    let (code, stdout, _) = run_cli(
        dir.path(),
        &[
            "reminders",
            "set",
            "--enable",
            "--times-per-day",
            "3",
            "--time",
            "08:15",
        ],
    );
    assert_eq!(code, 0);
    let saved = json(&stdout);
    assert_eq!(saved["times"].as_array().unwrap().len(), 3);
    assert_eq!(saved["times"][0]["hour"], 8);
    assert_eq!(saved["times"][2]["hour"], 12);

    let (_, stdout, _) = run_cli(dir.path(), &["reminders", "plan"]);
    let plan = json(&stdout);
    assert_eq!(plan["notifications"].as_array().unwrap().len(), 3);
    assert_eq!(plan["notifications"][0]["id"], 22000);

    let (_, stdout, _) = run_cli(dir.path(), &["reminders", "next"]);
    assert!(json(&stdout)["next"].is_string());

    let (code, _, _) = run_cli(dir.path(), &["reminders", "set", "--time", "25:00"]);
    assert_ne!(code, 0);
}
