// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The simulation result (§3 "Simulation Result", §6.5 wire shape): a
//! self-describing record. A downstream reader never needs the original
//! log files to determine status.

use rtlforge_core::{FailureType, SimMode, SimProfile, SimStatus};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimResult {
    pub status: SimStatus,
    pub compile_returncode: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sim_returncode: Option<i32>,
    pub pass_marker_found: bool,
    pub stdout_tail: String,
    pub stderr_tail: String,
    pub log_truncated: bool,
    pub unresolved_cells: Vec<String>,
    pub mode: SimMode,
    pub sim_profile: SimProfile,
    pub compile_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sim_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_type: Option<FailureType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_failure_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_failure_snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdcell_bootstrap_attempted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdcell_bootstrap_result: Option<String>,
}

impl SimResult {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Truncate `text` to at most `max_lines` lines and `max_chars` characters
/// (tail-biased: keeps the *last* lines/chars, since failures tend to show
/// up near the end of a log). Sets `truncated` if either budget was hit.
pub fn truncate_tail(text: &str, max_lines: usize, max_chars: usize) -> (String, bool) {
    let lines: Vec<&str> = text.lines().collect();
    let line_truncated = lines.len() > max_lines;
    let kept_lines: Vec<&str> = if line_truncated {
        lines[lines.len() - max_lines..].to_vec()
    } else {
        lines
    };
    let joined = kept_lines.join("\n");

    let char_count = joined.chars().count();
    let char_truncated = char_count > max_chars;
    let result = if char_truncated {
        let skip = char_count - max_chars;
        joined.chars().skip(skip).collect()
    } else {
        joined
    };

    (result, line_truncated || char_truncated)
}
