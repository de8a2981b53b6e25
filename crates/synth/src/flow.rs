// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pipeline step C: emit `config.mk` and run the containerized
//! OpenROAD flow, grounded on
//! `original_source/src/tools/run_synthesis.py`/`run_docker.py`.

use std::time::Duration;

use rtlforge_adapters::{ProcessDriver, ProcessError, ProcessResult};
use rtlforge_core::{Platform, Workspace};

use crate::error::SynthError;

const DOCKER_IMAGE: &str = "openroad/orfs:latest";
const CONTAINER_FLOW_CWD: &str = "/OpenROAD-flow-scripts/flow";
const CONTAINER_WORKSPACE: &str = "/workspace";

pub struct FlowInputs<'a> {
    pub top_module: &'a str,
    pub platform: Platform,
    /// Filenames (not paths) already copied under `<run_dir>/inputs/`.
    pub input_filenames: &'a [String],
    pub utilization: f64,
    pub aspect_ratio: f64,
    pub core_margin: f64,
}

/// Emit `<run_dir>/config.mk` with the environment the containerized flow
/// reads, mapping each input file onto its container path under the
/// workspace mount.
pub fn emit_config_mk(workspace: &Workspace, run_id: &str, inputs: &FlowInputs) -> Result<(), SynthError> {
    let container_files: Vec<String> = inputs
        .input_filenames
        .iter()
        .map(|name| format!("{CONTAINER_WORKSPACE}/inputs/{name}"))
        .collect();

    let content = format!(
        "export DESIGN_NAME = {}\n\
         export PLATFORM = {}\n\
         export VERILOG_FILES = {}\n\
         export SDC_FILE = {CONTAINER_WORKSPACE}/constraints.sdc\n\
         export CORE_UTILIZATION = {}\n\
         export CORE_ASPECT_RATIO = {}\n\
         export CORE_MARGIN = {}\n",
        inputs.top_module,
        inputs.platform.as_str(),
        container_files.join(" "),
        inputs.utilization,
        inputs.aspect_ratio,
        inputs.core_margin,
    );

    std::fs::write(workspace.run_config_mk_path(run_id), content)?;
    Ok(())
}

/// Run the containerized flow, mounting the run directory to `/workspace`
/// and the three output directories into the flow's own result/log/report
/// paths. A timeout is captured as a failed result, not an error: step D
/// (signoff) is what turns this into a terminal run failure.
pub async fn run_external_flow(workspace: &Workspace, run_id: &str, timeout: Duration) -> Result<ProcessResult, SynthError> {
    std::fs::create_dir_all(workspace.run_orfs_results_dir(run_id))?;
    std::fs::create_dir_all(workspace.run_orfs_logs_dir(run_id))?;
    std::fs::create_dir_all(workspace.run_orfs_reports_dir(run_id))?;

    let run_dir = workspace.run_dir(run_id);
    let volumes = [
        format!("{}:{CONTAINER_WORKSPACE}", run_dir.display()),
        format!(
            "{}:{CONTAINER_FLOW_CWD}/results",
            workspace.run_orfs_results_dir(run_id).display()
        ),
        format!("{}:{CONTAINER_FLOW_CWD}/logs", workspace.run_orfs_logs_dir(run_id).display()),
        format!(
            "{}:{CONTAINER_FLOW_CWD}/reports",
            workspace.run_orfs_reports_dir(run_id).display()
        ),
    ];

    let mut args = vec!["run".to_string(), "--rm".to_string()];
    for volume in &volumes {
        args.push("-v".to_string());
        args.push(volume.clone());
    }
    args.push("-w".to_string());
    args.push(CONTAINER_FLOW_CWD.to_string());
    args.push(DOCKER_IMAGE.to_string());
    args.push("bash".to_string());
    args.push("-c".to_string());
    args.push(format!("make -B DESIGN_CONFIG={CONTAINER_WORKSPACE}/config.mk"));

    let driver = ProcessDriver::new();
    match driver.run("docker", &args, None, timeout).await {
        Ok(result) => Ok(result),
        Err(ProcessError::Timeout { .. }) => Ok(ProcessResult {
            success: false,
            stdout: String::new(),
            stderr: "containerized flow command timed out".to_string(),
            command: render_command("docker", &args),
        }),
        Err(ProcessError::Spawn { source, .. }) => Err(SynthError::Io(source)),
    }
}

fn render_command(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().cloned());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtlforge_core::Workspace;

    #[test]
    fn emit_config_mk_maps_filenames_to_container_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ws = Workspace::new(dir.path());
        std::fs::create_dir_all(ws.run_dir("synth_0001")).expect("mkdir");

        let inputs = FlowInputs {
            top_module: "counter",
            platform: Platform::Sky130Hd,
            input_filenames: &["counter.v".to_string()],
            utilization: 35.0,
            aspect_ratio: 1.0,
            core_margin: 2.0,
        };
        emit_config_mk(&ws, "synth_0001", &inputs).expect("emit");

        let content = std::fs::read_to_string(ws.run_config_mk_path("synth_0001")).expect("read");
        assert!(content.contains("DESIGN_NAME = counter"));
        assert!(content.contains("PLATFORM = sky130hd"));
        assert!(content.contains("/workspace/inputs/counter.v"));
    }
}
