//! Integration tests for `pulse watch`.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

#[test]
fn test_watch_exits_on_end_of_input() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_pulse"))
        .arg("--settings")
        .arg(dir.path().join("settings.toml"))
        .args(["watch", "feed", "--command", "true", "--json"])
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute pulse watch");

    assert!(
        output.status.success(),
        "watch failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().expect("initial status line");
    let value: serde_json::Value = serde_json::from_str(first).expect("status line is JSON");
    assert_eq!(value["view"], "feed");
    assert!(value.get("state").is_some());
    assert!(value.get("retry_count").is_some());
}

#[test]
fn test_watch_quit_control() {
    let dir = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_pulse"))
        .arg("--settings")
        .arg(dir.path().join("settings.toml"))
        .args(["watch", "messages", "--command", "true", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn pulse watch");

    {
        let mut stdin = child.stdin.take().expect("stdin is piped");
        writeln!(stdin, "bogus").unwrap();
        writeln!(stdin, "hide").unwrap();
        writeln!(stdin, "quit").unwrap();
    }

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown control 'bogus'"));
}

#[test]
fn test_watch_rejects_unknown_view() {
    let output = Command::new(env!("CARGO_BIN_EXE_pulse"))
        .args(["watch", "timeline", "--command", "true"])
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute pulse watch");

    assert!(!output.status.success());
}
