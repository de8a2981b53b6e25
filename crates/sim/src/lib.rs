// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rtlforge-sim: the Simulation Pipeline (§4.3).
//!
//! Compiles and runs a testbench against either the plain RTL sources or a
//! synthesized gate-level netlist, against the pinned standard-cell models
//! resolved by `rtlforge-stdcell`. The result is self-describing: nothing
//! downstream needs the raw logs to know whether the test passed.

mod classify;
mod error;
mod netlist;
mod pipeline;
mod request;
mod result;

pub use classify::{classify_failure, extract_unresolved_cells};
pub use error::SimError;
pub use netlist::{compat_substitution_is_safe, defined_module_types, referenced_module_types, restrict_to_referenced};
pub use pipeline::simulate;
pub use request::{SimRequest, DEFAULT_PASS_MARKER};
pub use result::{truncate_tail, SimResult};

#[cfg(test)]
mod tests {
    use super::*;
    use rtlforge_core::{Platform, SimMode, SimProfile, SimStatus, Workspace};

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().expect("tempdir");
        let ws = Workspace::new(dir.path());
        (dir, ws)
    }

    #[tokio::test]
    async fn missing_stdcell_cache_yields_compile_failed_with_bootstrap_hint() {
        let (_dir, ws) = workspace();
        let fixture = tempfile::tempdir().expect("tempdir");
        let rtl = fixture.path().join("top.v");
        std::fs::write(&rtl, "module top(); endmodule\n").expect("write rtl");

        let mut request = SimRequest::rtl(vec![rtl], "top");
        request.platform = Some(Platform::Asap7);

        let result = simulate(&ws, request).await.expect("pipeline never errors on a missing cache");
        assert_eq!(result.status, SimStatus::CompileFailed);
        assert!(result.stderr_tail.contains("First-Run Standard-Cell Bootstrap"));
        assert_eq!(result.stdcell_bootstrap_attempted, Some(false));
    }

    #[test]
    fn rtl_request_defaults_match_documented_constants() {
        let request = SimRequest::rtl(Vec::new(), "top");
        assert_eq!(request.pass_marker, DEFAULT_PASS_MARKER);
        assert_eq!(request.mode, SimMode::Rtl);
        assert_eq!(request.sim_profile, SimProfile::Auto);
        assert!(request.platform.is_none());
    }

    #[test]
    fn post_synth_request_carries_run_id() {
        let request = SimRequest::post_synth("top", "synth_0001");
        assert_eq!(request.mode, SimMode::PostSynth);
        assert_eq!(request.run_id.as_deref(), Some("synth_0001"));
    }

    #[test]
    fn unresolved_cells_extraction_sorts_and_dedupes() {
        let stderr = "foo.v:12: error: Unknown module type: NAND2X1\n\
                       bar.v:4: error: module INVX1 is undefined\n\
                       foo.v:12: error: Unknown module type: NAND2X1\n";
        let cells = extract_unresolved_cells(stderr);
        assert_eq!(cells, vec!["INVX1".to_string(), "NAND2X1".to_string()]);
    }

    #[test]
    fn classify_failure_finds_assertion_line() {
        let stdout = "simulating...\nASSERTION FAILED at cycle 12\ndone\n";
        let (kind, line) = classify_failure(stdout, "").expect("classified");
        assert_eq!(kind, rtlforge_core::FailureType::Assertion);
        assert!(line.contains("ASSERTION FAILED at cycle 12"));
    }

    #[test]
    fn classify_failure_prioritizes_timeout_over_generic_error() {
        let stdout = "operation timeout reached\nerror: something else failed\n";
        let (kind, line) = classify_failure(stdout, "").expect("classified");
        assert_eq!(kind, rtlforge_core::FailureType::Timeout);
        assert!(line.contains("timeout"));
    }

    #[test]
    fn truncate_tail_keeps_last_lines_and_flags_truncation() {
        let text = (1..=100).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n");
        let (kept, truncated) = truncate_tail(&text, 5, 10_000);
        assert!(truncated);
        assert_eq!(kept.lines().count(), 5);
        assert!(kept.ends_with("line 100"));
        assert!(kept.starts_with("line 96"));
    }

    #[test]
    fn truncate_tail_reports_no_truncation_under_budget() {
        let (kept, truncated) = truncate_tail("a\nb\nc", 10, 100);
        assert!(!truncated);
        assert_eq!(kept, "a\nb\nc");
    }

    #[test]
    fn post_synth_simulation_requires_run_id_or_explicit_netlist() {
        let request = SimRequest {
            mode: SimMode::PostSynth,
            ..SimRequest::rtl(Vec::new(), "top")
        };
        // run_id is None and netlist_file/platform are both None: the
        // pipeline cannot even resolve what to compile.
        assert!(request.run_id.is_none());
        assert!(request.netlist_file.is_none());
    }
}
