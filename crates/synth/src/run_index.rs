// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Run Index (§3 "Run Index"): per-workspace `index.json` listing every
//! run/job with `{run_id|job_id, status, updated_at}`, plus a `LATEST` file
//! holding the most recently created run_id. This is the ground truth a
//! restarted process uses to recover a run it no longer holds a live task
//! handle for (§4.4.4, §8 property 11).
//!
//! §9 leaves the ordering between the `LATEST` update and the `index.json`
//! write unspecified ("readers should treat the two as eventually
//! consistent"); this module writes `index.json` first, then `LATEST`,
//! without claiming atomicity across the pair.

use chrono::{DateTime, Utc};
use rtlforge_core::{RunStatus, Workspace};
use serde::{Deserialize, Serialize};

use crate::error::SynthError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunIndexEntry {
    pub run_id: String,
    pub job_id: String,
    pub status: RunStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunIndex {
    #[serde(default)]
    pub runs: Vec<RunIndexEntry>,
    #[serde(default)]
    pub jobs: Vec<RunIndexEntry>,
}

impl RunIndex {
    pub fn load(workspace: &Workspace) -> Result<Self, SynthError> {
        match std::fs::read_to_string(workspace.run_index_path()) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SynthError::Io(e)),
        }
    }

    /// Insert or replace the entry for this run in both `runs[]` and
    /// `jobs[]` (the same run/job pair is tracked under both lists per the
    /// documented shape).
    pub fn upsert(&mut self, entry: RunIndexEntry) {
        for list in [&mut self.runs, &mut self.jobs] {
            if let Some(existing) = list.iter_mut().find(|e: &&mut RunIndexEntry| e.run_id == entry.run_id) {
                *existing = entry.clone();
            } else {
                list.push(entry.clone());
            }
        }
    }

    pub fn find_by_job_id(&self, job_id: &str) -> Option<&RunIndexEntry> {
        self.jobs.iter().find(|e| e.job_id == job_id)
    }

    pub fn save(&self, workspace: &Workspace) -> Result<(), SynthError> {
        rtlforge_storage::write_json_atomic(&workspace.run_index_path(), self)?;
        Ok(())
    }
}

/// Record this run as the most recently created one.
pub fn update_latest(workspace: &Workspace, run_id: &str) -> Result<(), SynthError> {
    std::fs::write(workspace.run_latest_path(), run_id)?;
    Ok(())
}

pub fn read_latest(workspace: &Workspace) -> Result<Option<String>, SynthError> {
    match std::fs::read_to_string(workspace.run_latest_path()) {
        Ok(s) => Ok(Some(s.trim().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SynthError::Io(e)),
    }
}

/// Record a run's current status in the index and update `LATEST` in one
/// call, matching how the worker pipeline touches both after every state
/// transition (§5).
pub fn record_transition(
    workspace: &Workspace,
    run_id: &str,
    job_id: &str,
    status: RunStatus,
    updated_at: DateTime<Utc>,
) -> Result<(), SynthError> {
    let mut index = RunIndex::load(workspace)?;
    index.upsert(RunIndexEntry {
        run_id: run_id.to_string(),
        job_id: job_id.to_string(),
        status,
        updated_at,
    });
    index.save(workspace)?;
    update_latest(workspace, run_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().expect("tempdir");
        let ws = Workspace::new(dir.path());
        std::fs::create_dir_all(ws.synth_runs_dir()).expect("mkdir");
        (dir, ws)
    }

    #[test]
    fn record_transition_updates_index_and_latest() {
        let (_dir, ws) = workspace();
        record_transition(&ws, "synth_0001", "job_aaa", RunStatus::Running, Utc::now()).expect("record");
        record_transition(&ws, "synth_0002", "job_bbb", RunStatus::Completed, Utc::now()).expect("record");

        let index = RunIndex::load(&ws).expect("load");
        assert_eq!(index.runs.len(), 2);
        assert_eq!(read_latest(&ws).expect("latest"), Some("synth_0002".to_string()));
        assert_eq!(index.find_by_job_id("job_bbb").unwrap().status, RunStatus::Completed);
    }

    #[test]
    fn upsert_replaces_existing_entry_for_same_run() {
        let (_dir, ws) = workspace();
        record_transition(&ws, "synth_0001", "job_aaa", RunStatus::Running, Utc::now()).expect("record");
        record_transition(&ws, "synth_0001", "job_aaa", RunStatus::Completed, Utc::now()).expect("record");
        let index = RunIndex::load(&ws).expect("load");
        assert_eq!(index.runs.len(), 1);
        assert_eq!(index.runs[0].status, RunStatus::Completed);
    }
}
