//! Attempt Logger specs (§4.5, testable properties 14/15): `log-call`/
//! `log-result` append events and `show-attempt-log` reads back the derived
//! summary, including the change-tool attempt segmentation rule.

use crate::prelude::*;

#[test]
fn log_call_then_log_result_populates_the_first_attempt() {
    let home = TestHome::new();
    let session_id = create_session(&home, "attempt-first");

    let call_output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "log-call",
        "--source",
        "agent",
        "--tool",
        "linter_tool",
        "--tool-call-id",
        "c1",
    ]));
    assert!(call_output.status.success(), "log-call failed: {call_output:?}");

    let result_output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "log-result",
        "--source",
        "agent",
        "--tool",
        "linter_tool",
        "--result",
        "Syntax OK, no errors found",
        "--status",
        "success",
        "--tool-call-id",
        "c1",
    ]));
    assert!(result_output.status.success(), "log-result failed: {result_output:?}");

    let show_output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "show-attempt-log",
    ]));
    assert!(show_output.status.success());
    let summary = json(&show_output);
    assert_eq!(summary["attempt_count"], 1);
    assert_eq!(summary["attempts"][0]["rtl_lint"], "pass");
    assert_eq!(summary["final"]["success"], false);
}

#[test]
fn a_change_tool_call_after_a_checkpoint_starts_a_new_attempt() {
    let home = TestHome::new();
    let session_id = create_session(&home, "attempt-segmentation");

    let steps: &[&[&str]] = &[
        &["log-call", "--source", "agent", "--tool", "write_file", "--tool-call-id", "c1"],
        &[
            "log-result",
            "--source",
            "agent",
            "--tool",
            "write_file",
            "--result",
            "ok",
            "--status",
            "success",
            "--tool-call-id",
            "c1",
        ],
        &[
            "log-call",
            "--source",
            "agent",
            "--tool",
            "linter_tool",
            "--tool-call-id",
            "c2",
        ],
        &[
            "log-result",
            "--source",
            "agent",
            "--tool",
            "linter_tool",
            "--result",
            "Syntax OK",
            "--status",
            "success",
            "--tool-call-id",
            "c2",
        ],
        // write_file is a change tool; the prior attempt already reached a
        // checkpoint (the lint result above), so this opens attempt 2.
        &["log-call", "--source", "agent", "--tool", "write_file", "--tool-call-id", "c3"],
    ];
    for args in steps {
        let output = run(home.cmd().args(
            ["--output", "json", "--session", &session_id]
                .into_iter()
                .chain(args.iter().copied()),
        ));
        assert!(output.status.success(), "step {args:?} failed: {output:?}");
    }

    let show_output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "show-attempt-log",
    ]));
    let summary = json(&show_output);
    assert_eq!(summary["attempt_count"], 2);
    assert_eq!(summary["attempts"][0]["rtl_lint"], "pass");
}

#[test]
fn show_attempt_log_on_an_empty_workspace_reports_no_attempts() {
    let home = TestHome::new();
    let session_id = create_session(&home, "attempt-empty");

    let output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "show-attempt-log",
    ]));
    assert!(output.status.success());
    let body = json(&output);
    assert_eq!(body["attempts"].as_array().expect("attempts array").len(), 0);
}

#[test]
fn log_result_with_a_long_result_body_is_truncated_in_the_raw_event_journal() {
    let home = TestHome::new();
    let session_id = create_session(&home, "attempt-compaction");
    let long_result = "x".repeat(5_000);

    let call_output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "log-call",
        "--source",
        "agent",
        "--tool",
        "generate_report_tool",
        "--tool-call-id",
        "c1",
    ]));
    assert!(call_output.status.success());

    let result_output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "log-result",
        "--source",
        "agent",
        "--tool",
        "generate_report_tool",
        "--result",
        &long_result,
        "--status",
        "success",
        "--tool-call-id",
        "c1",
    ]));
    assert!(result_output.status.success());

    let workspace = session_workspace(&home, &session_id);
    let events_raw = std::fs::read_to_string(workspace.join("attempt_events.jsonl"))
        .expect("read attempt event journal");
    let last_line = events_raw.lines().last().expect("at least one event");
    let event: serde_json::Value = serde_json::from_str(last_line).expect("parse event json");
    let stored_result = event["result"].as_str().expect("result field");
    assert!(stored_result.len() < long_result.len());
    assert!(stored_result.contains("...(truncated)"));
}
