// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A standalone entry point into the worker pipeline (§4.4.3) for callers
//! that do not hold a long-lived [`crate::SynthesisManager`] in process —
//! chiefly the CLI, which is one OS process per invocation and so has
//! nowhere to keep an in-process job map between `start` and `get_status`.
//!
//! `run_to_completion` allocates no run itself: the caller (the CLI's
//! `synth start` command) reserves the run directory and writes the
//! initial `queued` `run_meta.json` before spawning this as a detached
//! child process, then returns immediately. Every subsequent `get_status`
//! call — from any process — reads `run_meta.json` and the run index off
//! disk, exactly the path §4.4.4 documents for a job the current process
//! never held a live task handle for.

use std::sync::Arc;

use rtlforge_core::{Clock, RunStatus, SystemClock, Workspace};

use crate::error::SynthError;
use crate::manager::{self, StartRequest};
use crate::run_index;
use crate::run_meta::RunMeta;

/// Run the full worker pipeline (steps A-H) for an already-allocated run,
/// to completion, using the real system clock. Never returns `Err` for a
/// run's own failures — those land as a terminal `run_meta.json` with
/// `status = failed`, per §7; `Err` is reserved for I/O failures so severe
/// the run's own bookkeeping could not be written at all.
pub async fn run_to_completion(
    workspace: Workspace,
    run_id: String,
    job_id: String,
    req: StartRequest,
) -> Result<(), SynthError> {
    let clock = SystemClock;
    let timeout_sec = req.timeout_sec;
    let meta_path = workspace.run_meta_path(&run_id);
    let meta = RunMeta::load(&meta_path)?
        .ok_or_else(|| SynthError::NotFound(format!("run_meta.json missing for '{run_id}' at worker start")))?;
    let shared_meta = Arc::new(parking_lot::Mutex::new(meta));

    {
        let mut m = shared_meta.lock();
        m.status = RunStatus::Running;
        m.save(&meta_path)?;
        run_index::record_transition(&workspace, &run_id, &job_id, RunStatus::Running, manager::epoch_to_datetime(clock.epoch_ms()))?;
    }

    if let Err(err) =
        manager::run_pipeline_inner(&workspace, &run_id, &job_id, &req, timeout_sec, &shared_meta, &clock).await
    {
        let finished_at = manager::epoch_to_datetime(clock.epoch_ms());
        let mut m = shared_meta.lock();
        m.status = RunStatus::Failed;
        m.push_note(format!("internal error: {err}"));
        m.finished_at = Some(finished_at);
        m.save(&meta_path)?;
        run_index::record_transition(&workspace, &run_id, &job_id, RunStatus::Failed, finished_at)?;
    }
    Ok(())
}
