// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synthesis Job Manager commands (§4.4): `start-synthesis`, `get-status`,
//! `wait`, `metrics`.
//!
//! A CLI invocation is one OS process per command, but
//! [`rtlforge_synth::SynthesisManager::start`] spawns an in-process
//! `tokio::task` that would die the instant this process exits. So
//! `start-synthesis` does the run allocation itself (the same
//! [`rtlforge_synth::allocate_run`] logic the manager uses) and then hands
//! the run off to a **detached child process** — this binary re-invoked
//! with the hidden `__synth-worker` subcommand — which runs the pipeline to
//! completion on its own and writes `run_meta.json` as it goes. Both
//! `get-status` and `wait` construct a fresh `SynthesisManager` per
//! invocation: its in-process job map is always empty (nothing was ever
//! `start()`-ed on *this* instance), so its public methods fall straight
//! through to the disk-based run index recovery path.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rtlforge_core::{ConstraintsMode, Platform, SystemClock, UuidIdGen, Workspace};
use rtlforge_synth::{allocate_run, metrics, StartRequest, SynthesisManager};

use crate::args::{parse_constraints_mode, parse_platform};
use crate::output::{print_json, OutputFormat};

const WORKER_SUBCOMMAND: &str = "__synth-worker";

#[derive(Args, Debug)]
pub struct StartArgs {
    #[arg(long = "input-file", required = true)]
    pub input_files: Vec<PathBuf>,
    #[arg(long)]
    pub top_module: String,
    #[arg(long, value_parser = parse_platform)]
    pub platform: Platform,
    #[arg(long)]
    pub clock_period_ns: Option<f64>,
    #[arg(long, default_value_t = 35.0)]
    pub utilization: f64,
    #[arg(long, default_value_t = 1.0)]
    pub aspect_ratio: f64,
    #[arg(long, default_value_t = 2.0)]
    pub core_margin: f64,
    #[arg(long, default_value_t = 600)]
    pub timeout_sec: u64,
    #[arg(long)]
    pub run_equiv: bool,
    #[arg(long, value_parser = parse_constraints_mode, default_value = "auto")]
    pub constraints_mode: ConstraintsMode,
}

#[derive(Args, Debug)]
pub struct JobArgs {
    pub job_id: String,
}

#[derive(Args, Debug)]
pub struct WaitArgs {
    pub job_id: String,
    #[arg(long, default_value_t = 60)]
    pub max_wait_sec: u64,
    #[arg(long, default_value_t = 3)]
    pub poll_interval_sec: u64,
}

#[derive(Args, Debug)]
pub struct MetricsArgs {
    pub run_id: String,
}

/// Hidden subcommand this binary re-invokes itself with as a detached
/// child; never shown in `--help`, never called directly by an agent.
#[derive(Args, Debug)]
pub struct WorkerArgs {
    #[arg(long)]
    pub workspace: PathBuf,
    #[arg(long)]
    pub run_id: String,
    #[arg(long)]
    pub job_id: String,
    #[arg(long = "input-file")]
    pub input_files: Vec<PathBuf>,
    #[arg(long)]
    pub top_module: String,
    #[arg(long, value_parser = parse_platform)]
    pub platform: Platform,
    #[arg(long)]
    pub clock_period_ns: Option<f64>,
    #[arg(long)]
    pub utilization: f64,
    #[arg(long)]
    pub aspect_ratio: f64,
    #[arg(long)]
    pub core_margin: f64,
    #[arg(long)]
    pub timeout_sec: u64,
    #[arg(long)]
    pub run_equiv: bool,
    #[arg(long, value_parser = parse_constraints_mode)]
    pub constraints_mode: ConstraintsMode,
}

fn to_request(
    input_files: Vec<PathBuf>,
    top_module: String,
    platform: Platform,
    clock_period_ns: Option<f64>,
    utilization: f64,
    aspect_ratio: f64,
    core_margin: f64,
    timeout_sec: u64,
    run_equiv: bool,
    constraints_mode: ConstraintsMode,
) -> StartRequest {
    StartRequest {
        input_paths: input_files,
        top_module,
        platform,
        clock_period_ns,
        utilization,
        aspect_ratio,
        core_margin,
        timeout_sec,
        run_equiv,
        constraints_mode,
    }
}

pub fn start(workspace: &Workspace, args: StartArgs, output: OutputFormat) -> Result<()> {
    let req = to_request(
        args.input_files.clone(),
        args.top_module.clone(),
        args.platform,
        args.clock_period_ns,
        args.utilization,
        args.aspect_ratio,
        args.core_margin,
        args.timeout_sec,
        args.run_equiv,
        args.constraints_mode,
    );
    let job_id = rtlforge_core::random_job_token(&UuidIdGen);
    let (run_id, response) = allocate_run(workspace, SystemClock.epoch_ms(), job_id.clone(), &req)?;

    spawn_worker(workspace, &run_id, &job_id, &args)?;

    match output {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Text => {
            println!("started job {job_id} (run {run_id}), timeout {}s", response.timeout_sec);
            Ok(())
        }
    }
}

fn spawn_worker(workspace: &Workspace, run_id: &str, job_id: &str, args: &StartArgs) -> Result<()> {
    let exe = std::env::current_exe().context("resolving this binary's own path")?;
    let mut cmd = std::process::Command::new(exe);
    cmd.arg(WORKER_SUBCOMMAND)
        .arg("--workspace")
        .arg(workspace.root())
        .arg("--run-id")
        .arg(run_id)
        .arg("--job-id")
        .arg(job_id)
        .arg("--top-module")
        .arg(&args.top_module)
        .arg("--platform")
        .arg(args.platform.as_str())
        .arg("--utilization")
        .arg(args.utilization.to_string())
        .arg("--aspect-ratio")
        .arg(args.aspect_ratio.to_string())
        .arg("--core-margin")
        .arg(args.core_margin.to_string())
        .arg("--timeout-sec")
        .arg(args.timeout_sec.to_string())
        .arg("--constraints-mode")
        .arg(constraints_mode_str(args.constraints_mode));
    if let Some(period) = args.clock_period_ns {
        cmd.arg("--clock-period-ns").arg(period.to_string());
    }
    if args.run_equiv {
        cmd.arg("--run-equiv");
    }
    for input in &args.input_files {
        cmd.arg("--input-file").arg(input);
    }
    cmd.stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());
    cmd.spawn().context("spawning detached synthesis worker process")?;
    Ok(())
}

fn constraints_mode_str(mode: ConstraintsMode) -> &'static str {
    match mode {
        ConstraintsMode::Strict => "strict",
        ConstraintsMode::Auto => "auto",
        ConstraintsMode::Bypass => "bypass",
    }
}

/// Entry point for the hidden `__synth-worker` subcommand: run the pipeline
/// to completion in this (now detached) process and exit.
pub async fn run_worker(args: WorkerArgs) -> Result<()> {
    let workspace = Workspace::new(args.workspace);
    let req = to_request(
        args.input_files,
        args.top_module,
        args.platform,
        args.clock_period_ns,
        args.utilization,
        args.aspect_ratio,
        args.core_margin,
        args.timeout_sec,
        args.run_equiv,
        args.constraints_mode,
    );
    rtlforge_synth::run_to_completion(workspace, args.run_id, args.job_id, req).await?;
    Ok(())
}

pub fn get_status(workspace: &Workspace, args: JobArgs, output: OutputFormat) -> Result<()> {
    let manager = SynthesisManager::new(SystemClock, UuidIdGen);
    let status = manager.get_status(workspace, &args.job_id)?;
    emit_status(&status, output)
}

pub async fn wait(workspace: &Workspace, args: WaitArgs, output: OutputFormat) -> Result<()> {
    let manager = SynthesisManager::new(SystemClock, UuidIdGen);
    let status = manager
        .wait(workspace, &args.job_id, args.max_wait_sec, args.poll_interval_sec)
        .await?;
    emit_status(&status, output)
}

fn emit_status(status: &rtlforge_synth::StatusResponse, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => print_json(status),
        OutputFormat::Text => {
            println!("{} [{}] stage={}", status.job_id, status.status, status.stage);
            println!("  {}", status.next_action);
            Ok(())
        }
    }
}

pub fn metrics_cmd(workspace: &Workspace, args: MetricsArgs, output: OutputFormat) -> Result<()> {
    let response = metrics::extract(workspace, &args.run_id)?;
    match output {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Text => {
            match &response {
                rtlforge_synth::MetricsResponse::Ok { complete, missing_fields, .. } => {
                    println!("metrics for {} (complete: {complete})", args.run_id);
                    if !missing_fields.is_empty() {
                        println!("  missing: {}", missing_fields.join(", "));
                    }
                }
                rtlforge_synth::MetricsResponse::Error { message, .. } => {
                    println!("error: {message}");
                }
            }
            Ok(())
        }
    }
}
