// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run allocation (§4.4.1): `next_run_id` scans `synth_runs/` for
//! `synth_NNNN` directories and reserves the next one via `mkdir`, so
//! concurrent callers race on directory creation rather than on a shared
//! counter.

use std::path::PathBuf;

use rtlforge_core::Workspace;

use crate::error::SynthError;

const RUN_PREFIX: &str = "synth_";

/// Allocate and create the next `synth_NNNN` run directory, starting at
/// `synth_0001`.
pub fn next_run_id(workspace: &Workspace) -> Result<(String, PathBuf), SynthError> {
    std::fs::create_dir_all(workspace.synth_runs_dir())?;
    loop {
        let next = scan_max_run_number(workspace)? + 1;
        let run_id = format!("{RUN_PREFIX}{next:04}");
        let dir = workspace.run_dir(&run_id);
        match std::fs::create_dir(&dir) {
            Ok(()) => return Ok((run_id, dir)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(SynthError::Io(e)),
        }
    }
}

fn scan_max_run_number(workspace: &Workspace) -> Result<u32, SynthError> {
    let dir = workspace.synth_runs_dir();
    let mut max = 0u32;
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(rest) = name.strip_prefix(RUN_PREFIX) {
            if let Ok(n) = rest.parse::<u32>() {
                max = max.max(n);
            }
        }
    }
    Ok(max)
}
