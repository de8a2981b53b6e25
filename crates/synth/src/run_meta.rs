// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persisted run record (§6.2 `run_meta.json`): written atomically at
//! well-defined points during the worker pipeline (after constraints, after
//! each guardrail, and at terminal state), and the sole source of truth a
//! restarted process uses to recover a run it no longer holds a live task
//! handle for.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rtlforge_core::{ConstraintsMode, GuardrailStatus, Platform, RunStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AutoChecks {
    pub constraints: GuardrailStatus,
    pub signoff: GuardrailStatus,
    pub equiv: GuardrailStatus,
}

impl Default for AutoChecks {
    fn default() -> Self {
        Self {
            constraints: GuardrailStatus::Skip,
            signoff: GuardrailStatus::Skip,
            equiv: GuardrailStatus::Skip,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SummaryMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_um2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wns_ns: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tns_ns: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_uw: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunMeta {
    pub run_id: String,
    pub job_id: String,
    pub created_at: DateTime<Utc>,
    pub status: RunStatus,
    pub platform: Platform,
    pub top_module: String,
    pub input_files: Vec<String>,
    pub clock_period_ns: f64,
    pub constraints_mode: ConstraintsMode,
    pub auto_checks: AutoChecks,
    pub check_notes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_stdout_tail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_stderr_tail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netlist_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_metrics: Option<SummaryMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_sec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equiv_note: Option<String>,
}

impl RunMeta {
    pub fn new(
        run_id: impl Into<String>,
        job_id: impl Into<String>,
        platform: Platform,
        top_module: impl Into<String>,
        input_files: Vec<String>,
        clock_period_ns: f64,
        constraints_mode: ConstraintsMode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            job_id: job_id.into(),
            created_at,
            status: RunStatus::Running,
            platform,
            top_module: top_module.into(),
            input_files,
            clock_period_ns,
            constraints_mode,
            auto_checks: AutoChecks::default(),
            check_notes: Vec::new(),
            docker_success: None,
            docker_command: None,
            docker_stdout_tail: None,
            docker_stderr_tail: None,
            netlist_path: None,
            summary_metrics: None,
            finished_at: None,
            elapsed_sec: None,
            next_action: None,
            equiv_note: None,
        }
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.check_notes.push(note.into());
    }

    /// Write `run_meta.json` atomically, per §5's "terminal write replaces
    /// the file atomically" (and non-terminal checkpoint writes use the
    /// same helper — a half-written checkpoint is no better than a
    /// half-written terminal record).
    pub fn save(&self, path: &std::path::Path) -> Result<(), crate::error::SynthError> {
        rtlforge_storage::write_json_atomic(path, self)?;
        Ok(())
    }

    /// Load a previously written `run_meta.json`, or `None` if the run
    /// directory has no such file yet (e.g. a reservation that crashed
    /// before step A completed).
    pub fn load(path: &std::path::Path) -> Result<Option<Self>, crate::error::SynthError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(crate::error::SynthError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run_meta.json");
        let meta = RunMeta::new(
            "synth_0001",
            "job_deadbeef01",
            Platform::Sky130Hd,
            "counter",
            vec!["counter.v".to_string()],
            10.0,
            ConstraintsMode::Auto,
            Utc::now(),
        );
        meta.save(&path).expect("save");
        let loaded = RunMeta::load(&path).expect("load").expect("present");
        assert_eq!(loaded.run_id, "synth_0001");
        assert_eq!(loaded.platform, Platform::Sky130Hd);
    }

    #[test]
    fn load_missing_file_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run_meta.json");
        assert!(RunMeta::load(&path).expect("load").is_none());
    }
}
