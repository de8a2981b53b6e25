//! Synthesis Job Manager spec (§4.4.3 step B / scenario E2): a run with no
//! design spec in the workspace and no `--clock-period-ns` fails the
//! constraints guardrail immediately and never reaches the containerized
//! flow, so this never needs a real `docker`/ORFS image to verify.

use crate::prelude::*;

fn write_rtl_source(home: &TestHome, session_id: &str, name: &str) {
    let path = session_workspace(home, session_id).join(name);
    std::fs::write(&path, "module counter(input clk, output reg [7:0] count);\nendmodule\n")
        .expect("write rtl source");
}

#[test]
fn start_synthesis_without_spec_or_clock_period_fails_constraints_guardrail() {
    let home = TestHome::new();
    let session_id = create_session(&home, "e2-no-constraints");
    write_rtl_source(&home, &session_id, "counter.v");

    let start_output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "start-synthesis",
        "--input-file",
        "counter.v",
        "--top-module",
        "counter",
        "--platform",
        "sky130hd",
    ]));
    assert!(start_output.status.success(), "start-synthesis failed: {start_output:?}");
    let start_body = json(&start_output);
    let job_id = start_body["job_id"].as_str().expect("job_id").to_string();

    let wait_output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "wait",
        &job_id,
        "--max-wait-sec",
        "20",
        "--poll-interval-sec",
        "1",
    ]));
    assert!(wait_output.status.success(), "wait failed: {wait_output:?}");
    let status = json(&wait_output);
    assert_eq!(status["status"], "failed");
    assert_eq!(status["auto_checks"]["constraints"], "fail");
    // The signoff/equiv guardrails never ran: the pipeline returned at
    // step B, before docker was ever invoked.
    assert_eq!(status["auto_checks"]["signoff"], "skip");
    assert!(status["check_notes"]
        .as_array()
        .expect("check_notes")
        .iter()
        .any(|n| n.as_str().unwrap_or_default().contains("no design spec found")));
}

#[test]
fn start_synthesis_clamps_an_out_of_range_timeout() {
    // No spec and no --clock-period-ns, same as the test above: the
    // detached worker fails the constraints guardrail immediately rather
    // than reaching the containerized flow, so this stays toolchain-free
    // while still exercising `allocate_run`'s timeout clamp on the
    // response the CLI prints back synchronously.
    let home = TestHome::new();
    let session_id = create_session(&home, "e2-timeout-clamp");
    write_rtl_source(&home, &session_id, "counter.v");

    let output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "start-synthesis",
        "--input-file",
        "counter.v",
        "--top-module",
        "counter",
        "--platform",
        "asap7",
        "--timeout-sec",
        "3",
    ]));
    assert!(output.status.success());
    let body = json(&output);
    assert!(body["timeout_sec"].as_u64().expect("timeout_sec") >= 60);
}
