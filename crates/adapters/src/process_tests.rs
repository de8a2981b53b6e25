// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::process::Command;

#[tokio::test]
async fn run_with_timeout_success() {
    let mut cmd = Command::new("echo");
    cmd.arg("hello");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "echo")
        .await
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
async fn run_with_timeout_nonzero_exit_is_not_an_error() {
    let cmd = Command::new("false");
    let output = run_with_timeout(cmd, Duration::from_secs(5), "false")
        .await
        .unwrap();
    assert!(!output.status.success());
}

#[tokio::test]
async fn run_with_timeout_io_error() {
    let cmd = Command::new("/nonexistent/binary");
    let result = run_with_timeout(cmd, Duration::from_secs(5), "nonexistent").await;
    assert!(matches!(result, Err(ProcessError::Spawn { .. })));
}

#[tokio::test]
async fn run_with_timeout_timeout_elapsed() {
    let mut cmd = Command::new("sleep");
    cmd.arg("10");
    let result = run_with_timeout(cmd, Duration::from_millis(100), "test sleep").await;
    match result {
        Err(ProcessError::Timeout { description, .. }) => assert_eq!(description, "test sleep"),
        other => panic!("expected timeout error, got {:?}", other),
    }
}

#[tokio::test]
async fn process_driver_reports_success_and_captures_command_string() {
    let driver = ProcessDriver::new();
    let result = driver
        .run("echo", &["hi".to_string()], None, Duration::from_secs(5))
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.stdout.trim(), "hi");
    assert_eq!(result.command, "echo hi");
}

#[tokio::test]
async fn process_driver_nonzero_exit_is_not_an_error() {
    let driver = ProcessDriver::new();
    let result = driver
        .run("false", &[], None, Duration::from_secs(5))
        .await
        .unwrap();
    assert!(!result.success);
}

#[test]
fn write_filelist_joins_paths_with_newlines() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![PathBuf::from("/ws/a.v"), PathBuf::from("/ws/b.v")];
    let out = write_filelist(dir.path(), "files.f", &paths).unwrap();
    let body = std::fs::read_to_string(out).unwrap();
    assert_eq!(body, "/ws/a.v\n/ws/b.v");
}
