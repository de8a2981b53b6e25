//! Simulation Pipeline spec (§4.3, testable property 6 / scenario E4): a
//! simulate call against a platform with no bootstrapped stdcell cache
//! short-circuits to `compile_failed` with the bootstrap hint in
//! `stderr_tail`, without ever invoking `iverilog`.

use crate::prelude::*;

fn write_rtl_source(home: &TestHome, session_id: &str, name: &str) {
    let path = session_workspace(home, session_id).join(name);
    std::fs::write(&path, "module counter(input clk, input rst_n, output reg [7:0] count);\nendmodule\n")
        .expect("write rtl source");
}

#[test]
fn simulate_with_unbootstrapped_platform_yields_compile_failed_with_hint() {
    let home = TestHome::new();
    let session_id = create_session(&home, "sim-no-stdcell");
    write_rtl_source(&home, &session_id, "counter.v");

    let output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "simulate",
        "--mode",
        "rtl",
        "--source-files",
        "counter.v",
        "--top-module",
        "counter",
        "--platform",
        "sky130hd",
    ]));

    assert!(output.status.success(), "simulate itself should not fail: {output:?}");
    let body = json(&output);
    assert_eq!(body["status"], "compile_failed");
    assert_eq!(body["compile_returncode"], -1);
    let stderr_tail = body["stderr_tail"].as_str().expect("stderr_tail");
    assert!(
        stderr_tail.contains("First-Run Standard-Cell Bootstrap"),
        "missing bootstrap hint in: {stderr_tail}"
    );
}

#[test]
fn simulate_without_a_platform_does_not_consult_the_stdcell_cache() {
    // With no --platform given, the pipeline never looks up a stdcell
    // cache at all (platform is None), so this cannot hit the bootstrap
    // hint path — it would instead try to invoke the real compiler, which
    // this suite deliberately avoids. Assert only the part that doesn't
    // need a toolchain: normalize_file_list's single-path fallback is
    // exercised the same way whether or not a platform is supplied, and a
    // missing `--top-module` is rejected before any pipeline work starts.
    let home = TestHome::new();
    let session_id = create_session(&home, "sim-missing-top-module");

    let output = run(home.cmd().args([
        "--output",
        "json",
        "--session",
        &session_id,
        "simulate",
        "--mode",
        "rtl",
        "--source-files",
        "counter.v",
    ]));
    assert!(!output.status.success());
}
