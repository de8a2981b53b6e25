// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pipeline step D: the signoff guardrail (§4.4.3). Decides whether
//! the containerized flow actually produced something worth trusting, since
//! a zero exit code alone does not mean the flow got anywhere useful.

use std::sync::OnceLock;

use regex::Regex;
use rtlforge_adapters::ProcessResult;
use rtlforge_core::{GuardrailStatus, Workspace};

use crate::error::SynthError;

const LOG_TAIL_LINES: usize = 120;

static FAILURE_MARKER: OnceLock<Regex> = OnceLock::new();

fn failure_marker() -> &'static Regex {
    FAILURE_MARKER.get_or_init(|| Regex::new(r"(?i)\b(error|fatal|failed)\b").expect("valid regex"))
}

pub struct SignoffOutcome {
    pub status: GuardrailStatus,
    pub notes: Vec<String>,
}

/// Run the step D checks in order, short-circuiting on the first failure:
/// the docker invocation itself, then a non-empty reports directory, then
/// the tail of every log file for an error marker, then the presence of at
/// least one `.v` file anywhere under the run directory.
pub fn apply_signoff_guardrail(workspace: &Workspace, run_id: &str, flow_result: &ProcessResult) -> Result<SignoffOutcome, SynthError> {
    if !flow_result.success {
        return Ok(SignoffOutcome {
            status: GuardrailStatus::Fail,
            notes: vec!["containerized flow command did not exit successfully".to_string()],
        });
    }

    let reports_dir = workspace.run_orfs_reports_dir(run_id);
    if count_files(&reports_dir)? == 0 {
        return Ok(SignoffOutcome {
            status: GuardrailStatus::Fail,
            notes: vec!["no report files were produced under orfs_reports/".to_string()],
        });
    }

    if let Some(line) = find_log_failure_marker(&workspace.run_orfs_logs_dir(run_id))? {
        return Ok(SignoffOutcome {
            status: GuardrailStatus::Fail,
            notes: vec![format!("flow log contains a failure marker: {line}")],
        });
    }

    if !any_verilog_file_under(&workspace.run_dir(run_id))? {
        return Ok(SignoffOutcome {
            status: GuardrailStatus::Fail,
            notes: vec!["no .v netlist was emitted anywhere under the run directory".to_string()],
        });
    }

    Ok(SignoffOutcome {
        status: GuardrailStatus::Pass,
        notes: Vec::new(),
    })
}

fn count_files(dir: &std::path::Path) -> Result<usize, SynthError> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            count += 1;
        }
    }
    Ok(count)
}

fn find_log_failure_marker(logs_dir: &std::path::Path) -> Result<Option<String>, SynthError> {
    if !logs_dir.is_dir() {
        return Ok(None);
    }
    let mut entries: Vec<_> = std::fs::read_dir(logs_dir)?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        if !entry.file_type()?.is_file() {
            continue;
        }
        let contents = std::fs::read_to_string(entry.path()).unwrap_or_default();
        let tail: Vec<&str> = contents.lines().rev().take(LOG_TAIL_LINES).collect();
        for line in tail.into_iter().rev() {
            if failure_marker().is_match(line) {
                return Ok(Some(line.trim().to_string()));
            }
        }
    }
    Ok(None)
}

fn any_verilog_file_under(dir: &std::path::Path) -> Result<bool, SynthError> {
    if !dir.is_dir() {
        return Ok(false);
    }
    for entry in walk_dir(dir)? {
        if entry.extension().map(|ext| ext == "v").unwrap_or(false) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn walk_dir(dir: &std::path::Path) -> Result<Vec<std::path::PathBuf>, SynthError> {
    let mut out = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtlforge_core::Workspace;

    fn flow_ok() -> ProcessResult {
        ProcessResult {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
            command: "docker run ...".to_string(),
        }
    }

    fn workspace_with_run() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().expect("tempdir");
        let ws = Workspace::new(dir.path());
        std::fs::create_dir_all(ws.run_dir("synth_0001")).expect("mkdir");
        (dir, ws)
    }

    #[test]
    fn flow_failure_short_circuits() {
        let (_dir, ws) = workspace_with_run();
        let mut flow = flow_ok();
        flow.success = false;
        let outcome = apply_signoff_guardrail(&ws, "synth_0001", &flow).expect("runs");
        assert_eq!(outcome.status, GuardrailStatus::Fail);
    }

    #[test]
    fn empty_reports_dir_fails() {
        let (_dir, ws) = workspace_with_run();
        std::fs::create_dir_all(ws.run_orfs_reports_dir("synth_0001")).expect("mkdir");
        let outcome = apply_signoff_guardrail(&ws, "synth_0001", &flow_ok()).expect("runs");
        assert_eq!(outcome.status, GuardrailStatus::Fail);
        assert!(outcome.notes[0].contains("report files"));
    }

    #[test]
    fn log_failure_marker_fails() {
        let (_dir, ws) = workspace_with_run();
        std::fs::create_dir_all(ws.run_orfs_reports_dir("synth_0001")).expect("mkdir");
        std::fs::write(ws.run_orfs_reports_dir("synth_0001").join("6_finish.rpt"), "ok").expect("write");
        let logs_dir = ws.run_orfs_logs_dir("synth_0001");
        std::fs::create_dir_all(&logs_dir).expect("mkdir");
        std::fs::write(logs_dir.join("flow.log"), "starting\nERROR: placement failed\ndone\n").expect("write");
        let outcome = apply_signoff_guardrail(&ws, "synth_0001", &flow_ok()).expect("runs");
        assert_eq!(outcome.status, GuardrailStatus::Fail);
        assert!(outcome.notes[0].contains("placement failed"));
    }

    #[test]
    fn missing_netlist_fails() {
        let (_dir, ws) = workspace_with_run();
        std::fs::create_dir_all(ws.run_orfs_reports_dir("synth_0001")).expect("mkdir");
        std::fs::write(ws.run_orfs_reports_dir("synth_0001").join("6_finish.rpt"), "ok").expect("write");
        let outcome = apply_signoff_guardrail(&ws, "synth_0001", &flow_ok()).expect("runs");
        assert_eq!(outcome.status, GuardrailStatus::Fail);
        assert!(outcome.notes[0].contains("netlist"));
    }

    #[test]
    fn clean_run_passes() {
        let (_dir, ws) = workspace_with_run();
        let reports = ws.run_orfs_reports_dir("synth_0001");
        std::fs::create_dir_all(&reports).expect("mkdir");
        std::fs::write(reports.join("6_finish.rpt"), "design finished").expect("write");
        let results = ws.run_orfs_results_dir("synth_0001").join("6_final.v");
        std::fs::create_dir_all(results.parent().unwrap()).expect("mkdir");
        std::fs::write(&results, "module top(); endmodule\n").expect("write");
        let outcome = apply_signoff_guardrail(&ws, "synth_0001", &flow_ok()).expect("runs");
        assert_eq!(outcome.status, GuardrailStatus::Pass);
        assert!(outcome.notes.is_empty());
    }
}
