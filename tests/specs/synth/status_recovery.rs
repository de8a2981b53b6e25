//! Synthesis Job Manager spec (§4.4.4, testable property 11): every
//! `get-status`/`wait`/`metrics` call is a fresh CLI process with an empty
//! in-process job map, so these always recover state from the on-disk run
//! index and `run_meta.json` rather than a live task handle.

use crate::prelude::*;

#[test]
fn get_status_for_an_unknown_job_id_reports_recovered_failure() {
    let home = TestHome::new();
    let session_id = create_session(&home, "unknown-job");

    let output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "get-status",
        "job_never_existed",
    ]));
    assert!(output.status.success(), "get-status itself should not error: {output:?}");
    let body = json(&output);
    assert_eq!(body["status"], "failed");
    assert!(body["check_notes"]
        .as_array()
        .expect("check_notes")
        .iter()
        .any(|n| n.as_str().unwrap_or_default().contains("Unknown job_id")));
}

#[test]
fn get_status_after_a_failed_run_is_recovered_from_the_disk_index() {
    let home = TestHome::new();
    let session_id = create_session(&home, "recover-from-disk");
    let workspace = session_workspace(&home, &session_id);
    std::fs::write(
        workspace.join("counter.v"),
        "module counter(input clk, output reg [7:0] count);\nendmodule\n",
    )
    .expect("write rtl source");

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
    let job_id = json(&start_output)["job_id"].as_str().expect("job_id").to_string();

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
    assert_eq!(json(&wait_output)["status"], "failed");

    // A brand-new process, with nothing in its own job map, must still
    // resolve this job id purely from `index.json` and `run_meta.json`.
    let recovered_output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "get-status",
        &job_id,
    ]));
    assert!(recovered_output.status.success());
    let recovered = json(&recovered_output);
    assert_eq!(recovered["status"], "failed");
    assert_eq!(recovered["recovered_from_index"], true);
}

#[test]
fn metrics_for_an_unknown_run_id_reports_an_error_status() {
    let home = TestHome::new();
    let session_id = create_session(&home, "metrics-unknown-run");

    let output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "metrics",
        "synth_9999",
    ]));
    assert!(output.status.success());
    let body = json(&output);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().expect("message").contains("synth_9999"));
}
