// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulation pipeline input contract (§4.3 "Inputs").

use std::path::PathBuf;
use std::time::Duration;

use rtlforge_core::{Platform, SimMode, SimProfile};

pub const DEFAULT_PASS_MARKER: &str = "TEST PASSED";
pub const DEFAULT_STDOUT_LINES: usize = 40;
pub const DEFAULT_STDOUT_CHARS: usize = 4000;
pub const DEFAULT_STDERR_LINES: usize = 40;
pub const DEFAULT_STDERR_CHARS: usize = 4000;
pub const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_SIM_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct SimRequest {
    pub source_files: Vec<PathBuf>,
    pub top_module: String,
    pub mode: SimMode,
    /// post_synth only: resolves `netlist_file`/`platform` from `run_meta.json`
    /// when either is absent.
    pub run_id: Option<String>,
    pub netlist_file: Option<PathBuf>,
    pub platform: Option<Platform>,
    pub pass_marker: String,
    pub sim_profile: SimProfile,
    pub stdout_budget_lines: usize,
    pub stdout_budget_chars: usize,
    pub stderr_budget_lines: usize,
    pub stderr_budget_chars: usize,
    pub compile_timeout: Duration,
    pub sim_timeout: Duration,
}

impl SimRequest {
    pub fn rtl(source_files: Vec<PathBuf>, top_module: impl Into<String>) -> Self {
        Self {
            source_files,
            top_module: top_module.into(),
            mode: SimMode::Rtl,
            run_id: None,
            netlist_file: None,
            platform: None,
            pass_marker: DEFAULT_PASS_MARKER.to_string(),
            sim_profile: SimProfile::Auto,
            stdout_budget_lines: DEFAULT_STDOUT_LINES,
            stdout_budget_chars: DEFAULT_STDOUT_CHARS,
            stderr_budget_lines: DEFAULT_STDERR_LINES,
            stderr_budget_chars: DEFAULT_STDERR_CHARS,
            compile_timeout: DEFAULT_COMPILE_TIMEOUT,
            sim_timeout: DEFAULT_SIM_TIMEOUT,
        }
    }

    pub fn post_synth(top_module: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            mode: SimMode::PostSynth,
            run_id: Some(run_id.into()),
            ..Self::rtl(Vec::new(), top_module)
        }
    }
}
