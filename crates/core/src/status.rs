// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed status enums shared by the simulation pipeline, the synthesis job
//! manager, and everything that reports on them. Keeping these in core (not
//! duplicated per crate) is what lets a downstream reader match on a result
//! without reaching for string comparisons.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported standard-cell PDK platforms. Platform A (the high-speed library)
/// is `asap7`; platform B (the open-PDK library) is `sky130hd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Asap7,
    Sky130Hd,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Asap7 => "asap7",
            Platform::Sky130Hd => "sky130hd",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asap7" => Some(Platform::Asap7),
            "sky130hd" => Some(Platform::Sky130Hd),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Simulation mode: plain RTL, or gate-level simulation against a synthesized
/// netlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimMode {
    Rtl,
    PostSynth,
}

/// Which set of standard-cell models to compile against for post-synth
/// simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimProfile {
    Auto,
    Pinned,
    Compat,
}

/// Closed outcome of the simulation pipeline (§4.3). This is the tool's sole
/// success indicator; nothing downstream should need to re-derive it from
/// logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimStatus {
    CompileFailed,
    SimFailed,
    TestFailed,
    TestPassed,
}

/// How a failing simulation is classified, scanned from stdout/stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureType {
    Timeout,
    Fatal,
    Assertion,
    Generic,
}

/// How the constraints guardrail should behave when a design spec is present
/// but lacks a recognizable clock port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintsMode {
    Strict,
    Auto,
    Bypass,
}

impl Default for ConstraintsMode {
    fn default() -> Self {
        ConstraintsMode::Auto
    }
}

/// Outcome of one of the three synthesis guardrails (constraints / signoff /
/// equivalence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailStatus {
    Pass,
    Fail,
    Skip,
}

impl fmt::Display for GuardrailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GuardrailStatus::Pass => "pass",
            GuardrailStatus::Fail => "fail",
            GuardrailStatus::Skip => "skip",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle of a synthesis run/job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Queued => "queued",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_round_trips_through_str() {
        assert_eq!(Platform::parse("asap7"), Some(Platform::Asap7));
        assert_eq!(Platform::parse("sky130hd"), Some(Platform::Sky130Hd));
        assert_eq!(Platform::parse("bogus"), None);
        assert_eq!(Platform::Asap7.to_string(), "asap7");
    }

    #[test]
    fn run_status_terminal_classification() {
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
    }
}
