// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pipeline step E: locate the netlist the flow produced (§4.4.3).
//! ORFS names its output differently across platforms and flow versions, so
//! rather than hard-coding a single expected path we rank every `.v` file
//! under the run directory and take the best match.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rtlforge_core::Workspace;

use crate::error::SynthError;

/// Score and return the most likely synthesized netlist under this run's
/// `orfs_results/` and `inputs/` directories, or `None` if no `.v` file
/// exists anywhere under the run.
pub fn locate_netlist(workspace: &Workspace, run_id: &str, top_module: &str) -> Result<Option<PathBuf>, SynthError> {
    let mut candidates = Vec::new();
    collect_verilog_files(&workspace.run_dir(run_id), &mut candidates)?;

    let top_lower = top_module.to_lowercase();
    let mut scored: Vec<(i32, SystemTime, PathBuf)> = Vec::with_capacity(candidates.len());
    for path in candidates {
        let mtime = path.metadata().and_then(|m| m.modified()).unwrap_or(SystemTime::UNIX_EPOCH);
        scored.push((score(&path, &top_lower), mtime, path));
    }

    scored.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    Ok(scored.pop().map(|(_, _, path)| path))
}

fn score(path: &Path, top_lower: &str) -> i32 {
    let name_lower = path.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default();
    let mut score = 0;
    if name_lower.contains("final") {
        score += 4;
    }
    if name_lower.contains("yosys") {
        score += 3;
    }
    if name_lower.contains(top_lower) {
        score += 2;
    }
    score
}

fn collect_verilog_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SynthError> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_verilog_files(&path, out)?;
        } else if path.extension().map(|ext| ext == "v").unwrap_or(false) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtlforge_core::Workspace;

    fn workspace_with_run() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().expect("tempdir");
        let ws = Workspace::new(dir.path());
        std::fs::create_dir_all(ws.run_dir("synth_0001")).expect("mkdir");
        (dir, ws)
    }

    #[test]
    fn no_verilog_files_returns_none() {
        let (_dir, ws) = workspace_with_run();
        let found = locate_netlist(&ws, "synth_0001", "counter").expect("runs");
        assert!(found.is_none());
    }

    #[test]
    fn prefers_final_yosys_netlist_over_input_copy() {
        let (_dir, ws) = workspace_with_run();
        let inputs = ws.run_inputs_dir("synth_0001");
        std::fs::create_dir_all(&inputs).expect("mkdir");
        std::fs::write(inputs.join("counter.v"), "module counter(); endmodule\n").expect("write");

        let results = ws.run_orfs_results_dir("synth_0001").join("sky130hd").join("counter").join("base");
        std::fs::create_dir_all(&results).expect("mkdir");
        let best = results.join("6_final.v");
        std::fs::write(&best, "module counter(); endmodule\n").expect("write");

        let found = locate_netlist(&ws, "synth_0001", "counter").expect("runs");
        assert_eq!(found, Some(best));
    }
}
