//! Stdcell Cache Manager specs (§4.1): `resolve-stdcell` before any
//! `bootstrap-stdcell` call must fail with the documented first-run hint,
//! never attempt a network fetch on its own.

use crate::prelude::*;

#[test]
fn resolve_stdcell_without_bootstrap_reports_first_run_hint() {
    let home = TestHome::new();
    let session_id = create_session(&home, "no-stdcell-yet");

    let output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "resolve-stdcell",
        "--platform",
        "sky130hd",
    ]));

    assert!(!output.status.success());
    let body = json(&output);
    let message = body["error"].as_str().expect("error field");
    assert!(
        message.contains("First-Run Standard-Cell Bootstrap"),
        "missing cache hint not found in: {message}"
    );
}

#[test]
fn resolve_stdcell_hint_differs_per_platform() {
    let home = TestHome::new();
    let session_id = create_session(&home, "stdcell-platforms");

    let asap7 = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "resolve-stdcell",
        "--platform",
        "asap7",
    ]));
    let sky130 = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "resolve-stdcell",
        "--platform",
        "sky130hd",
    ]));

    let asap7_msg = json(&asap7)["error"].as_str().expect("error").to_string();
    let sky130_msg = json(&sky130)["error"].as_str().expect("error").to_string();
    assert!(asap7_msg.contains("asap7"));
    assert!(sky130_msg.contains("sky130hd"));
}

#[test]
fn unrecognized_platform_is_rejected_by_argument_parsing() {
    let home = TestHome::new();
    let session_id = create_session(&home, "bad-platform");

    let output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "resolve-stdcell",
        "--platform",
        "totally-not-a-platform",
    ]));
    assert!(!output.status.success());
}
