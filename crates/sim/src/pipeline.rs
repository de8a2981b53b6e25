// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The simulation pipeline's algorithm (§4.3 steps 1-6): resolve stdcell
//! inputs, compile, simulate, classify, truncate.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rtlforge_adapters::{write_filelist, ProcessDriver, ProcessError};
use rtlforge_core::{FailureType, Platform, SimMode, SimProfile, SimStatus, Workspace};

use crate::classify::{classify_failure, extract_unresolved_cells};
use crate::error::SimError;
use crate::netlist::{
    compat_substitution_is_safe, defined_module_types, referenced_module_types, restrict_to_referenced,
};
use crate::request::SimRequest;
use crate::result::{truncate_tail, SimResult};

const COMPILER: &str = "iverilog";
const SIMULATOR: &str = "vvp";
const COMPILED_ARTIFACT: &str = "sim.out";
const FILELIST_NAME: &str = "filelist.f";
const SCRATCH_DIRNAME: &str = "_sim_scratch";

/// Run one simulation per §4.3. Only returns `Err` for inputs the pipeline
/// cannot even attempt (bad arguments, an unresolvable run); every other
/// outcome, including a missing stdcell cache or a failed compile/sim
/// invocation, comes back as an `Ok(SimResult)` whose `status` says why.
pub async fn simulate(workspace: &Workspace, mut request: SimRequest) -> Result<SimResult, SimError> {
    if request.mode == SimMode::PostSynth {
        resolve_post_synth_inputs(workspace, &mut request)?;
    }

    if request.sim_profile == SimProfile::Auto {
        request.sim_profile = match request.platform {
            Some(Platform::Asap7) => SimProfile::Compat,
            _ => SimProfile::Pinned,
        };
    }

    let scratch_dir = workspace.root().join(SCRATCH_DIRNAME);
    std::fs::create_dir_all(&scratch_dir)?;

    let mut sources = request.source_files.clone();
    if let Some(netlist) = &request.netlist_file {
        sources.push(netlist.clone());
    }

    let stdcell_files = match request.platform {
        Some(platform) => match rtlforge_stdcell::resolve(workspace, platform) {
            Ok((files, _manifest)) => apply_stdcell_policy(platform, &request, &files, &scratch_dir)?,
            Err(rtlforge_stdcell::StdcellError::NotFound(hint)) => {
                return Ok(bootstrap_hint_result(&request, &hint));
            }
            Err(other) => return Err(SimError::NotFound(other.to_string())),
        },
        None => Vec::new(),
    };

    let mut all_sources = sources;
    all_sources.extend(stdcell_files);

    let mut include_dirs: BTreeSet<PathBuf> = BTreeSet::new();
    for path in &all_sources {
        if let Some(parent) = path.parent() {
            include_dirs.insert(parent.to_path_buf());
        }
    }

    let filelist_path = write_filelist(&scratch_dir, FILELIST_NAME, &all_sources)?;
    let artifact_path = scratch_dir.join(COMPILED_ARTIFACT);

    let mut compile_args = vec![
        "-g2012".to_string(),
        "-s".to_string(),
        request.top_module.clone(),
        "-o".to_string(),
        artifact_path.display().to_string(),
    ];
    for dir in &include_dirs {
        compile_args.push("-I".to_string());
        compile_args.push(dir.display().to_string());
    }
    compile_args.push("-f".to_string());
    compile_args.push(filelist_path.display().to_string());

    let driver = ProcessDriver::new();
    let compile_result = match driver.run(COMPILER, &compile_args, None, request.compile_timeout).await {
        Ok(result) => result,
        Err(ProcessError::Timeout { .. }) => {
            return Ok(timeout_result(&request, SimStatus::CompileFailed, render_command(COMPILER, &compile_args), None));
        }
        Err(ProcessError::Spawn { source, .. }) => return Err(SimError::Io(source)),
    };

    if !compile_result.success {
        let (stdout_tail, stdout_truncated) =
            truncate_tail(&compile_result.stdout, request.stdout_budget_lines, request.stdout_budget_chars);
        let (stderr_tail, stderr_truncated) =
            truncate_tail(&compile_result.stderr, request.stderr_budget_lines, request.stderr_budget_chars);
        let (failure_type, first_failure_line, first_failure_snippet) =
            classify(&compile_result.stdout, &compile_result.stderr);
        return Ok(SimResult {
            status: SimStatus::CompileFailed,
            compile_returncode: -1,
            sim_returncode: None,
            pass_marker_found: false,
            stdout_tail,
            stderr_tail,
            log_truncated: stdout_truncated || stderr_truncated,
            unresolved_cells: extract_unresolved_cells(&compile_result.stderr),
            mode: request.mode,
            sim_profile: request.sim_profile,
            compile_command: compile_result.command,
            sim_command: None,
            failure_type,
            first_failure_line,
            first_failure_snippet,
            stdcell_bootstrap_attempted: None,
            stdcell_bootstrap_result: None,
        });
    }

    let sim_args = vec![artifact_path.display().to_string()];
    let sim_result = match driver.run(SIMULATOR, &sim_args, None, request.sim_timeout).await {
        Ok(result) => result,
        Err(ProcessError::Timeout { .. }) => {
            return Ok(timeout_result(
                &request,
                SimStatus::SimFailed,
                compile_result.command,
                Some(render_command(SIMULATOR, &sim_args)),
            ));
        }
        Err(ProcessError::Spawn { source, .. }) => return Err(SimError::Io(source)),
    };

    let pass_marker_found = sim_result.stdout.contains(&request.pass_marker);
    let status = if !sim_result.success {
        SimStatus::SimFailed
    } else if pass_marker_found {
        SimStatus::TestPassed
    } else {
        SimStatus::TestFailed
    };

    let (stdout_tail, stdout_truncated) =
        truncate_tail(&sim_result.stdout, request.stdout_budget_lines, request.stdout_budget_chars);
    let (stderr_tail, stderr_truncated) =
        truncate_tail(&sim_result.stderr, request.stderr_budget_lines, request.stderr_budget_chars);

    let (failure_type, first_failure_line, first_failure_snippet) = if status == SimStatus::TestPassed {
        (None, None, None)
    } else {
        classify(&sim_result.stdout, &sim_result.stderr)
    };

    Ok(SimResult {
        status,
        compile_returncode: 0,
        sim_returncode: sim_result_code(&sim_result),
        pass_marker_found,
        stdout_tail,
        stderr_tail,
        log_truncated: stdout_truncated || stderr_truncated,
        unresolved_cells: Vec::new(),
        mode: request.mode,
        sim_profile: request.sim_profile,
        compile_command: compile_result.command,
        sim_command: Some(sim_result.command),
        failure_type,
        first_failure_line,
        first_failure_snippet,
        stdcell_bootstrap_attempted: None,
        stdcell_bootstrap_result: None,
    })
}

fn sim_result_code(result: &rtlforge_adapters::ProcessResult) -> Option<i32> {
    Some(if result.success { 0 } else { 1 })
}

fn classify(stdout: &str, stderr: &str) -> (Option<FailureType>, Option<String>, Option<String>) {
    match classify_failure(stdout, stderr) {
        Some((kind, line)) => {
            let snippet = build_snippet(stdout, stderr, &line);
            (Some(kind), Some(line), Some(snippet))
        }
        None => (None, None, None),
    }
}

fn build_snippet(stdout: &str, stderr: &str, matched_line: &str) -> String {
    let combined: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let Some(idx) = combined.iter().position(|line| *line == matched_line) else {
        return matched_line.to_string();
    };
    let end = (idx + 3).min(combined.len());
    let mut snippet = combined[idx..end].join("\n");
    if snippet.chars().count() > 400 {
        snippet = snippet.chars().take(400).collect();
    }
    snippet
}

fn render_command(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().cloned());
    parts.join(" ")
}

fn bootstrap_hint_result(request: &SimRequest, hint: &str) -> SimResult {
    let (stderr_tail, truncated) = truncate_tail(hint, request.stderr_budget_lines, request.stderr_budget_chars);
    SimResult {
        status: SimStatus::CompileFailed,
        compile_returncode: -1,
        sim_returncode: None,
        pass_marker_found: false,
        stdout_tail: String::new(),
        stderr_tail,
        log_truncated: truncated,
        unresolved_cells: Vec::new(),
        mode: request.mode,
        sim_profile: request.sim_profile,
        compile_command: String::new(),
        sim_command: None,
        failure_type: None,
        first_failure_line: None,
        first_failure_snippet: None,
        stdcell_bootstrap_attempted: Some(false),
        stdcell_bootstrap_result: Some("cache_missing".to_string()),
    }
}

fn timeout_result(request: &SimRequest, status: SimStatus, compile_command: String, sim_command: Option<String>) -> SimResult {
    let message = format!("{} phase exceeded its configured timeout", if sim_command.is_some() { "simulation" } else { "compile" });
    let (stderr_tail, truncated) = truncate_tail(&message, request.stderr_budget_lines, request.stderr_budget_chars);
    SimResult {
        status,
        compile_returncode: if sim_command.is_some() { 0 } else { -1 },
        sim_returncode: sim_command.as_ref().map(|_| -1),
        pass_marker_found: false,
        stdout_tail: String::new(),
        stderr_tail,
        log_truncated: truncated,
        unresolved_cells: Vec::new(),
        mode: request.mode,
        sim_profile: request.sim_profile,
        compile_command,
        sim_command,
        failure_type: Some(FailureType::Timeout),
        first_failure_line: Some(message),
        first_failure_snippet: None,
        stdcell_bootstrap_attempted: None,
        stdcell_bootstrap_result: None,
    }
}

fn resolve_post_synth_inputs(workspace: &Workspace, request: &mut SimRequest) -> Result<(), SimError> {
    if request.netlist_file.is_some() && request.platform.is_some() {
        return Ok(());
    }
    let run_id = request
        .run_id
        .as_ref()
        .ok_or_else(|| SimError::InvalidArgument("post_synth simulation requires run_id or explicit netlist_file/platform".to_string()))?
        .clone();
    let meta_path = workspace.run_meta_path(&run_id);
    let raw = std::fs::read_to_string(&meta_path)
        .map_err(|_| SimError::NotFound(format!("run metadata not found for run_id '{run_id}'")))?;
    let meta: serde_json::Value = serde_json::from_str(&raw)?;

    if request.netlist_file.is_none() {
        let netlist_path = meta
            .get("netlist_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SimError::NotFound(format!("run '{run_id}' has no netlist_path recorded")))?;
        request.netlist_file = Some(PathBuf::from(netlist_path));
    }
    if request.platform.is_none() {
        let platform_str = meta
            .get("platform")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SimError::NotFound(format!("run '{run_id}' has no platform recorded")))?;
        request.platform = Some(
            Platform::parse(platform_str)
                .ok_or_else(|| SimError::InvalidArgument(format!("unknown platform '{platform_str}' in run metadata")))?,
        );
    }
    Ok(())
}

fn apply_stdcell_policy(
    platform: Platform,
    request: &SimRequest,
    resolved: &[PathBuf],
    scratch_dir: &Path,
) -> Result<Vec<PathBuf>, SimError> {
    match platform {
        Platform::Sky130Hd => {
            let netlist_text = read_netlist_text(request)?;
            let referenced = referenced_module_types(&netlist_text);
            let restricted = restrict_to_referenced(rtlforge_stdcell::SKY130HD_MODULE_PREFIX, &referenced);
            if restricted.is_empty() {
                Ok(resolved.to_vec())
            } else {
                Ok(resolved
                    .iter()
                    .filter(|path| {
                        path.file_stem()
                            .and_then(|s| s.to_str())
                            .map(|name| restricted.contains(name))
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect())
            }
        }
        Platform::Asap7 => {
            if request.sim_profile != SimProfile::Compat {
                return Ok(resolved.to_vec());
            }
            let seq_path = resolved
                .iter()
                .find(|p| p.file_name().and_then(|n| n.to_str()) == Some(rtlforge_stdcell::ASAP7_SEQ_FILE));
            let Some(seq_path) = seq_path else {
                return Ok(resolved.to_vec());
            };

            let without_seq: Vec<PathBuf> = resolved.iter().filter(|p| *p != seq_path).cloned().collect();
            let mut contents: Vec<String> = Vec::with_capacity(without_seq.len());
            for path in &without_seq {
                contents.push(std::fs::read_to_string(path)?);
            }
            let models = rtlforge_stdcell::compat_models(platform);
            for model in models {
                contents.push(model.source.to_string());
            }
            let content_refs: Vec<&str> = contents.iter().map(|s| s.as_str()).collect();
            let defined = defined_module_types(content_refs);

            let netlist_text = read_netlist_text(request)?;
            if compat_substitution_is_safe(&netlist_text, &defined) {
                let compat_dir = scratch_dir.join("compat");
                std::fs::create_dir_all(&compat_dir)?;
                let mut with_compat = without_seq;
                for model in models {
                    let path = compat_dir.join(model.filename);
                    std::fs::write(&path, model.source)?;
                    with_compat.push(path);
                }
                Ok(with_compat)
            } else {
                Ok(resolved.to_vec())
            }
        }
    }
}

fn read_netlist_text(request: &SimRequest) -> Result<String, SimError> {
    let path = request
        .netlist_file
        .as_ref()
        .ok_or_else(|| SimError::InvalidArgument("post_synth simulation requires a netlist file".to_string()))?;
    Ok(std::fs::read_to_string(path)?)
}
