//! Integration tests for the `availability` CLI binary.
//!
//! Each test copies the fixture data file to its own temporary path, runs the binary
//! against it, and checks stdout, exit status, and the rewritten data file.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const FIXTURE_WINDOW_ID: &str = "01JQ8ZK5Y3M4N6P7Q8R9S0T1V2";
const BEFORE_MONDAY: &str = "2026-03-16T07:00:00Z";

/// Helper: path to the data.json fixture.
fn fixture_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/data.json")
}

/// Helper: path to the bulk.json fixture.
fn bulk_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/bulk.json")
}

/// Helper: copy the fixture to a per-test temp file and return its path.
fn data_copy(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "availability-cli-{}-{}.json",
        name,
        std::process::id()
    ));
    std::fs::copy(fixture_path(), &path).expect("fixture must copy");
    path
}

/// Helper: a fresh data path that does not exist yet.
fn empty_data(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "availability-cli-{}-{}-empty.json",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn cli(data: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("availability").unwrap();
    cmd.env_remove("AVAILABILITY_NOW")
        .arg("--data")
        .arg(data)
        .args(["--now", BEFORE_MONDAY]);
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command should run");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn slot_times(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("slots array")
        .iter()
        .map(|s| s["time"].as_str().unwrap().to_string())
        .collect()
}

fn stored_windows(data: &PathBuf) -> Vec<Value> {
    let raw = std::fs::read_to_string(data).expect("data file must exist");
    let snapshot: Value = serde_json::from_str(&raw).unwrap();
    snapshot["windows"].as_array().unwrap().clone()
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slots_exclude_booked_hour() {
    let data = data_copy("slots");
    let slots = stdout_json(cli(&data).args(["slots", "--mentor", "mentor-1", "--date", "2026-03-16"]));

    // 10:00-11:00 is booked; the 11:30 session is cancelled.
    assert_eq!(slot_times(&slots), ["09:00", "09:30", "11:00", "11:30"]);
    assert!(slots
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["available"] == Value::Bool(true)));
    let _ = std::fs::remove_file(&data);
}

#[test]
fn slots_flag_occupied_when_asked() {
    let data = data_copy("slots-flag");
    let slots = stdout_json(cli(&data).args([
        "--flag-occupied",
        "slots",
        "--mentor",
        "mentor-1",
        "--date",
        "2026-03-16",
    ]));

    let flags: Vec<bool> = slots
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["available"].as_bool().unwrap())
        .collect();
    assert_eq!(flags, [true, true, false, false, true, true]);
    let _ = std::fs::remove_file(&data);
}

#[test]
fn slots_on_day_without_windows_are_empty() {
    let data = data_copy("slots-empty");
    let slots = stdout_json(cli(&data).args(["slots", "--mentor", "mentor-1", "--date", "2026-03-17"]));
    assert_eq!(slots, Value::Array(vec![]));
    let _ = std::fs::remove_file(&data);
}

#[test]
fn slots_reject_bad_date() {
    let data = data_copy("slots-bad-date");
    cli(&data)
        .args(["slots", "--mentor", "mentor-1", "--date", "16/03/2026"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("YYYY-MM-DD"));
    let _ = std::fs::remove_file(&data);
}

#[test]
fn slots_for_mentee_are_not_found() {
    let data = data_copy("slots-mentee");
    cli(&data)
        .args(["slots", "--mentor", "mentee-1", "--date", "2026-03-16"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not found"));
    let _ = std::fs::remove_file(&data);
}

#[test]
fn list_prints_owner_windows() {
    let data = data_copy("list");
    let windows = stdout_json(cli(&data).args(["list", "--owner", "mentor-1"]));
    let windows = windows.as_array().unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0]["startTime"], "09:00");
    assert_eq!(windows[0]["dayOfWeek"], 1);
    let _ = std::fs::remove_file(&data);
}

#[test]
fn mentor_listing_requires_mentor_role() {
    let data = data_copy("mentor");
    cli(&data)
        .args(["mentor", "--mentor", "mentor-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(FIXTURE_WINDOW_ID));
    cli(&data)
        .args(["mentor", "--mentor", "mentee-1"])
        .assert()
        .code(3);
    let _ = std::fs::remove_file(&data);
}

// ─────────────────────────────────────────────────────────────────────────────
// Mutations
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn create_writes_data_file() {
    let data = empty_data("create");
    let window = stdout_json(cli(&data).args([
        "create", "--owner", "admin-1", "--day", "3", "--start", "9:00", "--end", "10:30",
    ]));
    assert_eq!(window["startTime"], "09:00");
    assert_eq!(window["isRecurring"], true);

    let stored = stored_windows(&data);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["userId"], "admin-1");
    let _ = std::fs::remove_file(&data);
}

#[test]
fn create_one_off_window() {
    let data = empty_data("create-one-off");
    let window = stdout_json(cli(&data).args([
        "create", "--owner", "admin-1", "--day", "3", "--start", "09:00", "--end", "10:00",
        "--one-off",
    ]));
    assert_eq!(window["isRecurring"], false);
    let _ = std::fs::remove_file(&data);
}

#[test]
fn create_too_short_window_fails_with_validation_code() {
    let data = data_copy("create-short");
    cli(&data)
        .args([
            "create", "--owner", "mentor-1", "--day", "1", "--start", "13:00", "--end", "13:20",
        ])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("at least 30 minutes"));
    assert_eq!(stored_windows(&data).len(), 1);
    let _ = std::fs::remove_file(&data);
}

#[test]
fn strict_create_rejects_overlap_with_stored_window() {
    let data = data_copy("create-strict");
    cli(&data)
        .args([
            "--strict-overlaps",
            "create", "--owner", "mentor-1", "--day", "1", "--start", "11:00", "--end", "13:00",
        ])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("overlaps"));
    let _ = std::fs::remove_file(&data);
}

#[test]
fn bulk_from_file_replaces_windows() {
    let data = data_copy("bulk");
    let windows = stdout_json(cli(&data).args(["bulk", "--owner", "mentor-1", "-i", bulk_path()]));
    let windows = windows.as_array().unwrap();

    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0]["startTime"], "09:00");
    assert_eq!(windows[0]["isRecurring"], false);
    assert_eq!(windows[1]["startTime"], "13:00");
    assert!(!stored_windows(&data)
        .iter()
        .any(|w| w["id"] == FIXTURE_WINDOW_ID));
    let _ = std::fs::remove_file(&data);
}

#[test]
fn bulk_from_stdin_accepts_bare_array() {
    let data = data_copy("bulk-stdin");
    let windows = stdout_json(
        cli(&data)
            .args(["bulk", "--owner", "mentor-1"])
            .write_stdin(
                r#"[{"dayOfWeek":1,"startTime":"09:00","endTime":"10:00"},
                    {"dayOfWeek":1,"startTime":"10:00","endTime":"11:00"}]"#,
            ),
    );
    assert_eq!(windows.as_array().unwrap().len(), 2);
    let _ = std::fs::remove_file(&data);
}

#[test]
fn bulk_overlap_leaves_data_untouched() {
    let data = data_copy("bulk-overlap");
    let before = std::fs::read_to_string(&data).unwrap();
    cli(&data)
        .args(["bulk", "--owner", "mentor-1"])
        .write_stdin(
            r#"[{"dayOfWeek":1,"startTime":"09:00","endTime":"10:30"},
                {"dayOfWeek":1,"startTime":"10:00","endTime":"11:00"}]"#,
        )
        .assert()
        .code(4)
        .stderr(predicate::str::contains("cannot overlap"));
    assert_eq!(std::fs::read_to_string(&data).unwrap(), before);
    let _ = std::fs::remove_file(&data);
}

#[test]
fn bulk_rejects_empty_batch_and_garbage() {
    let data = data_copy("bulk-empty");
    cli(&data)
        .args(["bulk", "--owner", "mentor-1"])
        .write_stdin("[]")
        .assert()
        .code(4);
    cli(&data)
        .args(["bulk", "--owner", "mentor-1"])
        .write_stdin("not json")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("invalid bulk body"));
    let _ = std::fs::remove_file(&data);
}

#[test]
fn update_patches_fixture_window() {
    let data = data_copy("update");
    let window = stdout_json(cli(&data).args([
        "update", "--owner", "mentor-1", "--id", FIXTURE_WINDOW_ID, "--end", "10:00",
    ]));
    assert_eq!(window["startTime"], "09:00");
    assert_eq!(window["endTime"], "10:00");
    assert_eq!(window["updatedAt"], "2026-03-16T07:00:00Z");
    let _ = std::fs::remove_file(&data);
}

#[test]
fn delete_is_scoped_to_owner() {
    let data = data_copy("delete");
    cli(&data)
        .args(["delete", "--owner", "admin-1", "--id", FIXTURE_WINDOW_ID])
        .assert()
        .code(3);
    assert_eq!(stored_windows(&data).len(), 1);

    cli(&data)
        .args(["delete", "--owner", "mentor-1", "--id", FIXTURE_WINDOW_ID])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"deleted\": 1"));
    assert!(stored_windows(&data).is_empty());
    let _ = std::fs::remove_file(&data);
}

#[test]
fn delete_with_malformed_id_is_not_found() {
    let data = data_copy("delete-bad-id");
    cli(&data)
        .args(["delete", "--owner", "mentor-1", "--id", "not-a-ulid"])
        .assert()
        .code(3);
    let _ = std::fs::remove_file(&data);
}

#[test]
fn delete_all_reports_count_and_is_idempotent() {
    let data = data_copy("delete-all");
    cli(&data)
        .args(["delete-all", "--owner", "mentor-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"deleted\": 1"));
    cli(&data)
        .args(["delete-all", "--owner", "mentor-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"deleted\": 0"));
    let _ = std::fs::remove_file(&data);
}

#[test]
fn usage_error_keeps_clap_exit_code() {
    let data = data_copy("usage");
    cli(&data)
        .args(["create", "--owner", "mentor-1", "--day", "monday"])
        .assert()
        .code(2);
    cli(&data)
        .args(["create", "--owner", "mentor-1", "--day", "1", "--start", "13:00", "--end", "13:20"])
        .assert()
        .code(4);
    let _ = std::fs::remove_file(&data);
}

#[test]
fn save_replaces_data_file_without_leftover_temp() {
    let data = data_copy("atomic-save");
    let tmp = data.with_extension("json.tmp");
    let _ = std::fs::remove_file(&tmp);
    cli(&data)
        .args([
            "create", "--owner", "mentor-1", "--day", "2", "--start", "09:00", "--end", "10:00",
        ])
        .assert()
        .success();
    assert_eq!(stored_windows(&data).len(), 2);
    assert!(!tmp.exists());
    let _ = std::fs::remove_file(&data);
}

#[test]
fn corrupt_window_in_data_file_is_rejected() {
    let data = data_copy("corrupt-window");
    let raw = std::fs::read_to_string(&data).unwrap();
    let corrupt = raw.replace("\"endTime\": \"12:00\"", "\"endTime\": \"08:00\"");
    assert_ne!(raw, corrupt);
    std::fs::write(&data, &corrupt).unwrap();
    cli(&data)
        .args(["slots", "--mentor", "mentor-1", "--date", "2026-03-16"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse data file"))
        .stderr(predicate::str::contains("must be before"));
    assert_eq!(std::fs::read_to_string(&data).unwrap(), corrupt);
    let _ = std::fs::remove_file(&data);
}

#[test]
fn bad_now_fails_with_generic_code() {
    let data = data_copy("bad-now");
    Command::cargo_bin("availability")
        .unwrap()
        .arg("--data")
        .arg(&data)
        .args(["--now", "yesterday", "list", "--owner", "mentor-1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("RFC 3339"));
    let _ = std::fs::remove_file(&data);
}
