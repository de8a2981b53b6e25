// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace path conventions.
//!
//! A `Workspace` wraps the one directory a session exclusively owns and
//! knows where every other component keeps its files inside it. It does not
//! own a lifecycle of its own distinct from its session: it exists once the
//! directory exists, and is gone once the directory is removed.

use std::path::{Path, PathBuf};

pub const STDCELL_ROOT_DIRNAME: &str = "_stdcells";
pub const SYNTH_RUNS_DIRNAME: &str = "synth_runs";
pub const ATTEMPT_EVENTS_FILENAME: &str = "attempt_events.jsonl";
pub const ATTEMPT_SUMMARY_FILENAME: &str = "attempt_log.json";
pub const DESIGN_METRICS_FILENAME: &str = "design_metrics.json";
pub const RUN_INDEX_FILENAME: &str = "index.json";
pub const RUN_LATEST_FILENAME: &str = "LATEST";
pub const RUN_META_FILENAME: &str = "run_meta.json";

/// A session's private directory, and the path conventions rooted in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn synth_runs_dir(&self) -> PathBuf {
        self.root.join(SYNTH_RUNS_DIRNAME)
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.synth_runs_dir().join(run_id)
    }

    pub fn run_index_path(&self) -> PathBuf {
        self.synth_runs_dir().join(RUN_INDEX_FILENAME)
    }

    pub fn run_latest_path(&self) -> PathBuf {
        self.synth_runs_dir().join(RUN_LATEST_FILENAME)
    }

    pub fn run_meta_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id).join(RUN_META_FILENAME)
    }

    pub fn run_inputs_dir(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id).join("inputs")
    }

    pub fn run_orfs_results_dir(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id).join("orfs_results")
    }

    pub fn run_orfs_logs_dir(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id).join("orfs_logs")
    }

    pub fn run_orfs_reports_dir(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id).join("orfs_reports")
    }

    pub fn run_constraints_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id).join("constraints.sdc")
    }

    pub fn run_config_mk_path(&self, run_id: &str) -> PathBuf {
        self.run_dir(run_id).join("config.mk")
    }

    pub fn stdcell_cache_dir(&self, platform: &str) -> PathBuf {
        self.root
            .join(STDCELL_ROOT_DIRNAME)
            .join(platform)
            .join("sim")
    }

    pub fn stdcell_manifest_path(&self, platform: &str) -> PathBuf {
        self.stdcell_cache_dir(platform).join("manifest.json")
    }

    pub fn attempt_events_path(&self) -> PathBuf {
        self.root.join(ATTEMPT_EVENTS_FILENAME)
    }

    pub fn attempt_summary_path(&self) -> PathBuf {
        self.root.join(ATTEMPT_SUMMARY_FILENAME)
    }

    pub fn design_metrics_path(&self) -> PathBuf {
        self.root.join(DESIGN_METRICS_FILENAME)
    }
}
