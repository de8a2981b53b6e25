// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The synthesis job manager (§4.4): `start` submits a run to a bounded
//! worker pool and returns immediately; `get_status`/`wait` poll it,
//! rate-limited and backed off per job, falling back to the disk index when
//! a job is not (or no longer) held in process memory.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;
use rtlforge_core::{Clock, ConstraintsMode, GuardrailStatus, IdGen, Platform, RunStatus, Workspace, random_job_token};
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::error::SynthError;
use crate::flow::{self, FlowInputs};
use crate::metrics::{self, MetricsResponse};
use crate::netlist_locate::locate_netlist;
use crate::run_meta::RunMeta;
use crate::{allocate, constraints, equivalence, run_index, signoff};

const WORKER_POOL_SIZE: usize = 2;
const TIMEOUT_MIN_SEC: u64 = 60;
const TIMEOUT_HARD_CAP_SEC: u64 = 1200;
const POLL_MIN_INTERVAL_SEC: u64 = 1;
const POLL_BACKOFF_START_SEC: u64 = 30;
const POLL_BACKOFF_MAX_SEC: u64 = 600;
const STAGE_LOG_TAIL_LINES: usize = 40;

pub struct StartRequest {
    pub input_paths: Vec<PathBuf>,
    pub top_module: String,
    pub platform: Platform,
    pub clock_period_ns: Option<f64>,
    pub utilization: f64,
    pub aspect_ratio: f64,
    pub core_margin: f64,
    pub timeout_sec: u64,
    pub run_equiv: bool,
    pub constraints_mode: ConstraintsMode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StartResponse {
    pub job_id: String,
    pub run_id: String,
    pub status: RunStatus,
    pub stage: String,
    pub timeout_sec: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ArtifactsFound {
    pub gds: u64,
    pub def: u64,
    pub odb: u64,
    pub reports: u64,
    pub netlists: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusResponse {
    pub job_id: String,
    pub run_id: String,
    pub status: RunStatus,
    pub stage: String,
    pub elapsed_sec: f64,
    pub last_log_lines: Vec<String>,
    pub artifacts_found: ArtifactsFound,
    pub summary_metrics: crate::run_meta::SummaryMetrics,
    pub auto_checks: crate::run_meta::AutoChecks,
    pub check_notes: Vec<String>,
    pub next_action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_after_sec: Option<u64>,
    pub poll_hint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_sec: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timed_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovered_from_index: Option<bool>,
}

struct JobEntry {
    run_meta: Arc<parking_lot::Mutex<RunMeta>>,
    workspace: Workspace,
    _task: tokio::task::JoinHandle<()>,
}

struct PollCacheEntry {
    last_poll_at: Instant,
    backoff_next_sec: u64,
    response: StatusResponse,
}

/// Owns the in-process job map and poll cache for one host process. One
/// instance is shared (via `Arc`) across every `start`/`get_status`/`wait`
/// call the façade makes.
pub struct SynthesisManager<C: Clock, G: IdGen + 'static> {
    clock: C,
    id_gen: G,
    semaphore: Arc<Semaphore>,
    jobs: Arc<parking_lot::Mutex<HashMap<String, JobEntry>>>,
    poll_cache: Arc<parking_lot::Mutex<HashMap<String, PollCacheEntry>>>,
}

impl<C: Clock, G: IdGen + 'static> SynthesisManager<C, G> {
    pub fn new(clock: C, id_gen: G) -> Self {
        Self {
            clock,
            id_gen,
            semaphore: Arc::new(Semaphore::new(WORKER_POOL_SIZE)),
            jobs: Arc::new(parking_lot::Mutex::new(HashMap::new())),
            poll_cache: Arc::new(parking_lot::Mutex::new(HashMap::new())),
        }
    }

    /// Allocate a run, register it in the job map, and hand it to the
    /// worker pool. Returns as soon as the run directory and initial
    /// `run_meta.json` exist; the pipeline itself runs in the background.
    pub fn start(&self, workspace: Workspace, req: StartRequest) -> Result<StartResponse, SynthError> {
        let job_id = random_job_token(&self.id_gen);
        let (run_id, response) = allocate_run(&workspace, self.clock.epoch_ms(), job_id.clone(), &req)?;
        let timeout_sec = response.timeout_sec;

        let meta = RunMeta::load(&workspace.run_meta_path(&run_id))?
            .ok_or_else(|| SynthError::NotFound(format!("run_meta.json missing for '{run_id}' just after allocation")))?;
        let shared_meta = Arc::new(parking_lot::Mutex::new(meta));
        let task = tokio::task::spawn(run_pipeline(
            workspace.clone(),
            run_id.clone(),
            job_id.clone(),
            req,
            timeout_sec,
            Arc::clone(&shared_meta),
            Arc::clone(&self.semaphore),
            self.clock.clone(),
        ));

        self.jobs.lock().insert(
            job_id,
            JobEntry {
                run_meta: shared_meta,
                workspace,
                _task: task,
            },
        );

        Ok(response)
    }

    /// Poll the status of a job, consulting the in-process job map first and
    /// falling back to the disk index (§4.4.4).
    pub fn get_status(&self, workspace: &Workspace, job_id: &str) -> Result<StatusResponse, SynthError> {
        let live = self.jobs.lock().get(job_id).map(|entry| {
            (entry.run_meta.lock().clone(), entry.workspace.clone())
        });

        let Some((meta, job_workspace)) = live else {
            return self.recover_from_index(workspace, job_id);
        };

        if meta.status.is_terminal() {
            self.poll_cache.lock().remove(job_id);
            return Ok(self.build_response(&job_workspace, &meta, None));
        }

        let now = self.clock.now();
        let mut cache = self.poll_cache.lock();
        if let Some(entry) = cache.get(job_id) {
            let elapsed = now.saturating_duration_since(entry.last_poll_at);
            if elapsed < Duration::from_secs(POLL_MIN_INTERVAL_SEC) {
                let retry_after = Duration::from_secs(POLL_MIN_INTERVAL_SEC).saturating_sub(elapsed);
                let mut response = entry.response.clone();
                response.rate_limited = Some(true);
                response.retry_after_sec = Some(retry_after.as_secs().max(1));
                response.next_action = "wait/poll".to_string();
                return Ok(response);
            }
        }

        let backoff = cache
            .get(job_id)
            .map(|e| e.backoff_next_sec)
            .unwrap_or(POLL_BACKOFF_START_SEC);
        let response = self.build_response(&job_workspace, &meta, Some(backoff));
        let next_backoff = (backoff * 2).min(POLL_BACKOFF_MAX_SEC);
        cache.insert(
            job_id.to_string(),
            PollCacheEntry {
                last_poll_at: now,
                backoff_next_sec: next_backoff,
                response: response.clone(),
            },
        );
        Ok(response)
    }

    fn recover_from_index(&self, workspace: &Workspace, job_id: &str) -> Result<StatusResponse, SynthError> {
        let index = run_index::RunIndex::load(workspace)?;
        let Some(entry) = index.find_by_job_id(job_id) else {
            return Ok(StatusResponse {
                job_id: job_id.to_string(),
                run_id: String::new(),
                status: RunStatus::Failed,
                stage: "unknown".to_string(),
                elapsed_sec: 0.0,
                last_log_lines: Vec::new(),
                artifacts_found: ArtifactsFound::default(),
                summary_metrics: crate::run_meta::SummaryMetrics::default(),
                auto_checks: crate::run_meta::AutoChecks::default(),
                check_notes: vec!["Unknown job_id".to_string()],
                next_action: "submit a new synthesis job".to_string(),
                poll_after_sec: None,
                poll_hint: "job_id was never observed in this workspace".to_string(),
                rate_limited: None,
                retry_after_sec: None,
                timed_out: None,
                recovered_from_index: None,
            });
        };

        let run_id = entry.run_id.clone();
        match RunMeta::load(&workspace.run_meta_path(&run_id))? {
            Some(mut meta) => {
                if !meta.status.is_terminal() {
                    meta.push_note("recovered from disk index; live task handle is not available");
                }
                let mut response = self.build_response(workspace, &meta, None);
                response.recovered_from_index = Some(true);
                Ok(response)
            }
            None => Ok(StatusResponse {
                job_id: job_id.to_string(),
                run_id,
                status: RunStatus::Failed,
                stage: "unknown".to_string(),
                elapsed_sec: 0.0,
                last_log_lines: Vec::new(),
                artifacts_found: ArtifactsFound::default(),
                summary_metrics: crate::run_meta::SummaryMetrics::default(),
                auto_checks: crate::run_meta::AutoChecks::default(),
                check_notes: vec!["Unknown job_id".to_string()],
                next_action: "submit a new synthesis job".to_string(),
                poll_after_sec: None,
                poll_hint: "indexed run directory no longer has a run_meta.json".to_string(),
                rate_limited: None,
                retry_after_sec: None,
                timed_out: None,
                recovered_from_index: Some(true),
            }),
        }
    }

    fn build_response(&self, workspace: &Workspace, meta: &RunMeta, poll_after_sec: Option<u64>) -> StatusResponse {
        let (stage, last_log_lines) = compute_stage(workspace, &meta.run_id);
        let elapsed_sec = meta.elapsed_sec.unwrap_or_else(|| {
            let started = meta.created_at.timestamp_millis() as f64;
            let now = self.clock.epoch_ms() as f64;
            ((now - started) / 1000.0).max(0.0)
        });

        StatusResponse {
            job_id: meta.job_id.clone(),
            run_id: meta.run_id.clone(),
            status: meta.status,
            stage,
            elapsed_sec,
            last_log_lines,
            artifacts_found: count_artifacts(workspace, &meta.run_id),
            summary_metrics: meta.summary_metrics.clone().unwrap_or_default(),
            auto_checks: meta.auto_checks.clone(),
            check_notes: meta.check_notes.clone(),
            next_action: meta
                .next_action
                .clone()
                .unwrap_or_else(|| default_next_action(meta.status)),
            poll_after_sec,
            poll_hint: "poll get_status again after poll_after_sec, or call wait()".to_string(),
            rate_limited: None,
            retry_after_sec: None,
            timed_out: None,
            recovered_from_index: None,
        }
    }

    /// Poll until terminal, budget exhaustion, or the caller's requested
    /// wait window elapses, sleeping between polls for the larger of
    /// `retry_after_sec`, `poll_after_sec`, and `poll_interval_sec`.
    pub async fn wait(
        &self,
        workspace: &Workspace,
        job_id: &str,
        max_wait_sec: u64,
        poll_interval_sec: u64,
    ) -> Result<StatusResponse, SynthError> {
        let deadline = Instant::now() + Duration::from_secs(max_wait_sec);
        loop {
            let response = self.get_status(workspace, job_id)?;
            if response.status.is_terminal() {
                return Ok(response);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                let mut timed_out = response;
                timed_out.timed_out = Some(true);
                timed_out.next_action = "call wait() again; the job is still running".to_string();
                return Ok(timed_out);
            }

            let sleep_secs = [
                response.retry_after_sec.unwrap_or(0),
                response.poll_after_sec.unwrap_or(0),
                poll_interval_sec,
            ]
            .into_iter()
            .max()
            .unwrap_or(1)
            .max(1);
            let sleep_for = Duration::from_secs(sleep_secs).min(remaining);
            tokio::time::sleep(sleep_for).await;
        }
    }
}

pub(crate) fn default_next_action(status: RunStatus) -> String {
    match status {
        RunStatus::Queued | RunStatus::Running => "poll get_status or call wait()".to_string(),
        RunStatus::Completed => "review summary_metrics and netlist_path".to_string(),
        RunStatus::Failed => "inspect check_notes for the failing guardrail".to_string(),
    }
}

pub(crate) fn epoch_to_datetime(epoch_ms: u64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp_millis(epoch_ms as i64).unwrap_or_else(chrono::Utc::now)
}

/// Clamp a caller-requested timeout into `[TIMEOUT_MIN_SEC, TIMEOUT_HARD_CAP_SEC]`.
/// Exposed so callers that allocate a run without going through
/// [`SynthesisManager::start`] (the CLI's detached-worker path, see
/// [`crate::worker`]) clamp to the same bounds rather than duplicating them.
pub fn clamp_timeout_sec(requested: u64) -> u64 {
    requested.clamp(TIMEOUT_MIN_SEC, TIMEOUT_HARD_CAP_SEC)
}

/// Reserve the next run directory, write its initial `queued` `run_meta.json`,
/// and record the transition in the run index (§4.4.1–§4.4.2, the part of
/// step before the worker pipeline itself runs). Shared by
/// [`SynthesisManager::start`] (which then hands the run to its in-process
/// worker pool) and the CLI's `start-synthesis` command (which spawns a
/// detached child process instead, since a CLI invocation cannot keep a
/// `tokio::task` alive past its own exit).
pub fn allocate_run(
    workspace: &Workspace,
    epoch_ms: u64,
    job_id: String,
    req: &StartRequest,
) -> Result<(String, StartResponse), SynthError> {
    let (run_id, _run_dir) = allocate::next_run_id(workspace)?;
    let timeout_sec = clamp_timeout_sec(req.timeout_sec);
    let created_at = epoch_to_datetime(epoch_ms);
    let input_filenames: Vec<String> = req
        .input_paths
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect();

    let mut meta = RunMeta::new(
        &run_id,
        &job_id,
        req.platform,
        &req.top_module,
        input_filenames,
        req.clock_period_ns.unwrap_or(0.0),
        req.constraints_mode,
        created_at,
    );
    // §6.2 closes the persisted `run_meta.json` status to
    // `{running, completed, failed}`; `queued` is a response-only status
    // derived from "no task has picked this job up yet" and must never be
    // written to disk (the original never persists it either:
    // `examples/original_source/src/tools/synthesis_manager.py:490`).
    debug_assert_eq!(meta.status, RunStatus::Running);
    meta.save(&workspace.run_meta_path(&run_id))?;
    run_index::record_transition(workspace, &run_id, &job_id, RunStatus::Running, created_at)?;

    let response = StartResponse {
        job_id,
        run_id: run_id.clone(),
        status: RunStatus::Queued,
        stage: "unknown".to_string(),
        timeout_sec,
    };
    Ok((run_id, response))
}

fn stage_re() -> [(&'static Regex, &'static str); 6] {
    use std::sync::OnceLock;
    static ROUTE: OnceLock<Regex> = OnceLock::new();
    static CTS: OnceLock<Regex> = OnceLock::new();
    static PLACE: OnceLock<Regex> = OnceLock::new();
    static FLOORPLAN: OnceLock<Regex> = OnceLock::new();
    static SYNTH: OnceLock<Regex> = OnceLock::new();
    static FINAL: OnceLock<Regex> = OnceLock::new();
    [
        (
            ROUTE.get_or_init(|| Regex::new(r"(?i)global route|detailed route|route").expect("valid regex")),
            "route",
        ),
        (CTS.get_or_init(|| Regex::new(r"(?i)clock tree|cts").expect("valid regex")), "cts"),
        (PLACE.get_or_init(|| Regex::new(r"(?i)place").expect("valid regex")), "place"),
        (
            FLOORPLAN.get_or_init(|| Regex::new(r"(?i)floorplan").expect("valid regex")),
            "floorplan",
        ),
        (SYNTH.get_or_init(|| Regex::new(r"(?i)yosys|synth").expect("valid regex")), "synth"),
        (FINAL.get_or_init(|| Regex::new(r"(?i)finish|final").expect("valid regex")), "final"),
    ]
}

/// Regex the last ~40 lines of the most recently modified log file for
/// stage keywords (§4.4.4), returning `"unknown"` when no log exists yet.
fn compute_stage(workspace: &Workspace, run_id: &str) -> (String, Vec<String>) {
    let logs_dir = workspace.run_orfs_logs_dir(run_id);
    let Ok(entries) = std::fs::read_dir(&logs_dir) else {
        return ("unknown".to_string(), Vec::new());
    };

    let newest = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .max_by_key(|e| e.metadata().and_then(|m| m.modified()).ok());

    let Some(entry) = newest else {
        return ("unknown".to_string(), Vec::new());
    };

    let contents = std::fs::read_to_string(entry.path()).unwrap_or_default();
    let tail: Vec<String> = contents
        .lines()
        .rev()
        .take(STAGE_LOG_TAIL_LINES)
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let joined = tail.join("\n");

    for (re, stage) in stage_re() {
        if re.is_match(&joined) {
            return (stage.to_string(), tail);
        }
    }
    ("unknown".to_string(), tail)
}

fn count_artifacts(workspace: &Workspace, run_id: &str) -> ArtifactsFound {
    let run_dir = workspace.run_dir(run_id);
    let mut found = ArtifactsFound::default();
    let mut stack = vec![run_dir.clone()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else { continue };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                stack.push(path);
                continue;
            }
            match path.extension().and_then(|e| e.to_str()) {
                Some("gds") => found.gds += 1,
                Some("def") => found.def += 1,
                Some("odb") => found.odb += 1,
                Some("v") => found.netlists += 1,
                _ => {}
            }
        }
    }
    found.reports = std::fs::read_dir(workspace.run_orfs_reports_dir(run_id))
        .map(|entries| entries.filter_map(|e| e.ok()).filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false)).count() as u64)
        .unwrap_or(0);
    found
}

pub(crate) fn tail_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= max_lines {
        text.to_string()
    } else {
        lines[lines.len() - max_lines..].join("\n")
    }
}

#[tracing::instrument(skip_all, fields(run_id = %run_id, job_id = %job_id))]
#[allow(clippy::too_many_arguments)]
async fn run_pipeline<C: Clock>(
    workspace: Workspace,
    run_id: String,
    job_id: String,
    req: StartRequest,
    timeout_sec: u64,
    shared_meta: Arc<parking_lot::Mutex<RunMeta>>,
    semaphore: Arc<Semaphore>,
    clock: C,
) {
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => return,
    };

    if let Err(err) = run_pipeline_inner(&workspace, &run_id, &job_id, &req, timeout_sec, &shared_meta, &clock).await
    {
        tracing::warn!(%err, "synthesis pipeline aborted before reaching a terminal guardrail");
        let finished_at = epoch_to_datetime(clock.epoch_ms());
        let mut meta = shared_meta.lock();
        meta.status = RunStatus::Failed;
        meta.push_note(format!("internal error: {err}"));
        meta.finished_at = Some(finished_at);
        let _ = meta.save(&workspace.run_meta_path(&run_id));
        let _ = run_index::record_transition(&workspace, &run_id, &job_id, RunStatus::Failed, finished_at);
    }
}

pub(crate) async fn run_pipeline_inner<C: Clock>(
    workspace: &Workspace,
    run_id: &str,
    job_id: &str,
    req: &StartRequest,
    timeout_sec: u64,
    shared_meta: &Arc<parking_lot::Mutex<RunMeta>>,
    clock: &C,
) -> Result<(), SynthError> {
    {
        let mut meta = shared_meta.lock();
        meta.status = RunStatus::Running;
        meta.save(&workspace.run_meta_path(run_id))?;
        run_index::record_transition(workspace, run_id, job_id, RunStatus::Running, epoch_to_datetime(clock.epoch_ms()))?;
    }

    // Step A: copy inputs.
    let inputs_dir = workspace.run_inputs_dir(run_id);
    std::fs::create_dir_all(&inputs_dir)?;
    let mut input_filenames = Vec::with_capacity(req.input_paths.len());
    for src in &req.input_paths {
        let Some(filename) = src.file_name() else { continue };
        std::fs::copy(src, inputs_dir.join(filename))?;
        input_filenames.push(filename.to_string_lossy().to_string());
    }

    // Step B: constraints guardrail.
    let constraints_outcome = constraints::apply_constraints_guardrail(
        workspace,
        run_id,
        &req.top_module,
        req.clock_period_ns,
        req.constraints_mode,
    )?;
    {
        let mut meta = shared_meta.lock();
        meta.auto_checks.constraints = constraints_outcome.status;
        meta.check_notes.extend(constraints_outcome.notes.clone());
        if constraints_outcome.status == GuardrailStatus::Fail {
            return finalize(workspace, run_id, job_id, &mut meta, RunStatus::Failed, clock);
        }
        meta.save(&workspace.run_meta_path(run_id))?;
    }

    // Step C: run the containerized flow, mapping a spawn failure (docker
    // not installed) onto a synthetic failed result rather than raising —
    // per §7 the core never raises to the agent, and step D below is what
    // turns that into the terminal `failed` state.
    let flow_inputs = FlowInputs {
        top_module: &req.top_module,
        platform: req.platform,
        input_filenames: &input_filenames,
        utilization: req.utilization,
        aspect_ratio: req.aspect_ratio,
        core_margin: req.core_margin,
    };
    flow::emit_config_mk(workspace, run_id, &flow_inputs)?;
    let flow_result = match flow::run_external_flow(workspace, run_id, Duration::from_secs(timeout_sec)).await {
        Ok(result) => result,
        Err(err) => rtlforge_adapters::ProcessResult {
            success: false,
            stdout: String::new(),
            stderr: format!("failed to launch containerized flow: {err}"),
            command: "docker run ...".to_string(),
        },
    };
    {
        let mut meta = shared_meta.lock();
        meta.docker_success = Some(flow_result.success);
        meta.docker_command = Some(flow_result.command.clone());
        meta.docker_stdout_tail = Some(tail_lines(&flow_result.stdout, 40));
        meta.docker_stderr_tail = Some(tail_lines(&flow_result.stderr, 40));
        meta.save(&workspace.run_meta_path(run_id))?;
    }

    // Step D: signoff guardrail.
    let signoff_outcome = signoff::apply_signoff_guardrail(workspace, run_id, &flow_result)?;
    {
        let mut meta = shared_meta.lock();
        meta.auto_checks.signoff = signoff_outcome.status;
        meta.check_notes.extend(signoff_outcome.notes.clone());
        if signoff_outcome.status == GuardrailStatus::Fail {
            return finalize(workspace, run_id, job_id, &mut meta, RunStatus::Failed, clock);
        }
        meta.save(&workspace.run_meta_path(run_id))?;
    }

    // Step E: locate the netlist.
    let netlist_path = locate_netlist(workspace, run_id, &req.top_module)?;
    {
        let mut meta = shared_meta.lock();
        meta.netlist_path = netlist_path.clone();
        meta.save(&workspace.run_meta_path(run_id))?;
    }

    // Step F: optional equivalence check.
    if req.run_equiv {
        if let Some(netlist) = &netlist_path {
            if let Some(rtl_path) = input_filenames.first().map(|name| inputs_dir.join(name)) {
                let equiv_outcome =
                    equivalence::run_equivalence_check(&rtl_path, netlist, &req.top_module, Duration::from_secs(30))
                        .await?;
                let mut meta = shared_meta.lock();
                meta.auto_checks.equiv = equiv_outcome.status;
                meta.equiv_note = equiv_outcome.note;
                if equiv_outcome.status == GuardrailStatus::Fail {
                    return finalize(workspace, run_id, job_id, &mut meta, RunStatus::Failed, clock);
                }
                meta.save(&workspace.run_meta_path(run_id))?;
            }
        }
    }

    // Step G: metric extraction.
    if let MetricsResponse::Ok { metrics, .. } = metrics::extract(workspace, run_id)? {
        let mut meta = shared_meta.lock();
        meta.summary_metrics = Some(metrics);
        meta.save(&workspace.run_meta_path(run_id))?;
    }

    // Step H: terminal state.
    let mut meta = shared_meta.lock();
    let final_status = if flow_result.success
        && meta.auto_checks.constraints == GuardrailStatus::Pass
        && meta.auto_checks.signoff == GuardrailStatus::Pass
        && meta.auto_checks.equiv != GuardrailStatus::Fail
    {
        RunStatus::Completed
    } else {
        RunStatus::Failed
    };
    finalize(workspace, run_id, job_id, &mut meta, final_status, clock)
}

pub(crate) fn finalize<C: Clock>(
    workspace: &Workspace,
    run_id: &str,
    job_id: &str,
    meta: &mut RunMeta,
    status: RunStatus,
    clock: &C,
) -> Result<(), SynthError> {
    let finished_at = epoch_to_datetime(clock.epoch_ms());
    meta.status = status;
    meta.finished_at = Some(finished_at);
    meta.elapsed_sec = Some(((finished_at - meta.created_at).num_milliseconds() as f64 / 1000.0).max(0.0));
    meta.next_action = Some(default_next_action(status));
    meta.save(&workspace.run_meta_path(run_id))?;
    run_index::record_transition(workspace, run_id, job_id, status, finished_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtlforge_core::{FakeClock, SequentialIdGen};

    fn manager() -> SynthesisManager<FakeClock, SequentialIdGen> {
        SynthesisManager::new(FakeClock::new(1_700_000_000_000), SequentialIdGen::new("job"))
    }

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().expect("tempdir");
        let ws = Workspace::new(dir.path());
        std::fs::create_dir_all(ws.synth_runs_dir()).expect("mkdir");
        (dir, ws)
    }

    fn write_input(dir: &std::path::Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "module counter(input clk); endmodule\n").expect("write input");
        path
    }

    #[tokio::test]
    async fn start_clamps_timeout_and_registers_queued_run() {
        let (dir, ws) = workspace();
        let manager = manager();
        let input = write_input(dir.path(), "counter.v");

        let response = manager
            .start(
                ws.clone(),
                StartRequest {
                    input_paths: vec![input],
                    top_module: "counter".to_string(),
                    platform: Platform::Sky130Hd,
                    clock_period_ns: Some(10.0),
                    utilization: 35.0,
                    aspect_ratio: 1.0,
                    core_margin: 2.0,
                    timeout_sec: 5,
                    run_equiv: false,
                    constraints_mode: ConstraintsMode::Auto,
                },
            )
            .expect("start");

        assert_eq!(response.timeout_sec, TIMEOUT_MIN_SEC);
        assert_eq!(response.status, RunStatus::Queued);
        assert_eq!(response.run_id, "synth_0001");
        assert!(response.job_id.starts_with("job_"));
    }

    #[test]
    fn unknown_job_id_with_empty_index_is_failed() {
        let (_dir, ws) = workspace();
        let manager = manager();
        let response = manager.get_status(&ws, "job_doesnotexist").expect("get_status");
        assert_eq!(response.status, RunStatus::Failed);
        assert!(response.check_notes[0].contains("Unknown job_id"));
    }

    #[test]
    fn recovers_terminal_status_from_disk_index() {
        let (_dir, ws) = workspace();
        let manager = manager();
        std::fs::create_dir_all(ws.run_dir("synth_0001")).expect("mkdir");
        let meta = RunMeta::new(
            "synth_0001",
            "job_abc0000001",
            Platform::Asap7,
            "counter",
            vec!["counter.v".to_string()],
            10.0,
            ConstraintsMode::Auto,
            chrono::Utc::now(),
        );
        meta.save(&ws.run_meta_path("synth_0001")).expect("save");
        run_index::record_transition(&ws, "synth_0001", "job_abc0000001", RunStatus::Completed, chrono::Utc::now())
            .expect("record");

        let response = manager.get_status(&ws, "job_abc0000001").expect("get_status");
        assert_eq!(response.recovered_from_index, Some(true));
        assert_eq!(response.status, RunStatus::Completed);
    }

    #[test]
    fn default_next_action_varies_by_status() {
        assert!(default_next_action(RunStatus::Queued).contains("poll"));
        assert!(default_next_action(RunStatus::Completed).contains("metrics"));
        assert!(default_next_action(RunStatus::Failed).contains("check_notes"));
    }

    /// Insert a running job directly into the manager's in-process map,
    /// bypassing `start()` (which would hand it to the real worker pipeline
    /// and race against termination). Gives §8 properties 9/10 a job that
    /// stays non-terminal for as long as the test needs it to.
    fn insert_running_job(manager: &SynthesisManager<FakeClock, SequentialIdGen>, workspace: &Workspace, job_id: &str, run_id: &str) {
        let meta = RunMeta::new(
            run_id,
            job_id,
            Platform::Sky130Hd,
            "counter",
            vec!["counter.v".to_string()],
            10.0,
            ConstraintsMode::Auto,
            chrono::Utc::now(),
        );
        debug_assert_eq!(meta.status, RunStatus::Running);
        let task = tokio::task::spawn(std::future::pending::<()>());
        manager.jobs.lock().insert(
            job_id.to_string(),
            JobEntry {
                run_meta: Arc::new(parking_lot::Mutex::new(meta)),
                workspace: workspace.clone(),
                _task: task,
            },
        );
    }

    #[tokio::test]
    async fn poll_rate_limit_caches_second_call_within_min_interval() {
        let clock = FakeClock::new(1_700_000_000_000);
        let manager = SynthesisManager::new(clock.clone(), SequentialIdGen::new("job"));
        let (_dir, ws) = workspace();
        insert_running_job(&manager, &ws, "job_rate0001", "synth_0001");

        let first = manager.get_status(&ws, "job_rate0001").expect("first poll");
        assert_ne!(first.rate_limited, Some(true));

        let second = manager.get_status(&ws, "job_rate0001").expect("second poll");
        assert_eq!(second.rate_limited, Some(true));
        assert!(second.retry_after_sec.unwrap_or(0) > 0);
        assert_eq!(second.next_action, "wait/poll");
    }

    #[tokio::test]
    async fn poll_backoff_grows_and_caps_per_job() {
        let clock = FakeClock::new(1_700_000_000_000);
        let manager = SynthesisManager::new(clock.clone(), SequentialIdGen::new("job"));
        let (_dir, ws) = workspace();
        insert_running_job(&manager, &ws, "job_backoff01", "synth_0001");

        let mut observed = Vec::new();
        for _ in 0..6 {
            // Advance well past POLL_MIN_INTERVAL_SEC so each call is a
            // fresh poll rather than a rate-limited repeat.
            clock.advance(Duration::from_secs(POLL_BACKOFF_MAX_SEC));
            let response = manager.get_status(&ws, "job_backoff01").expect("poll");
            assert_ne!(response.rate_limited, Some(true));
            observed.push(response.poll_after_sec.expect("non-terminal job reports poll_after_sec"));
        }

        assert_eq!(observed[0], POLL_BACKOFF_START_SEC);
        for pair in observed.windows(2) {
            assert!(pair[1] >= pair[0], "backoff must never shrink: {observed:?}");
        }
        assert!(observed.iter().all(|v| *v <= POLL_BACKOFF_MAX_SEC));
        assert_eq!(*observed.last().unwrap(), POLL_BACKOFF_MAX_SEC);
    }
}
