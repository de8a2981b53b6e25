// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rtlforge - the Tool Façade (§4.6) over the RTL synthesis job
//! orchestrator: one subcommand per tool the agent-facing surface exposes,
//! each printing a single JSON object in `--output json` mode. One OS
//! process per invocation; no daemon, no long-lived client connection.

mod args;
mod color;
mod commands;
mod home;
mod output;
mod poll;
mod table;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use commands::{attempt, session, sim, spec, stdcell, synth};
use home::{resolve_workspace, Home};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "rtlforge",
    version,
    about = "RTL synthesis job orchestrator and verification-pipeline control plane",
    styles = color::styles()
)]
struct Cli {
    #[arg(long, short = 'o', value_enum, global = true, default_value = "text")]
    output: OutputFormat,

    /// Operate directly on this workspace directory, bypassing session resolution.
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Resolve the workspace from this session id instead of `RTLFORGE_SESSION`.
    #[arg(long, global = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a session and its workspace directory.
    CreateSession(session::CreateArgs),
    /// List sessions with an existing workspace.
    ListSessions,
    /// Show one session's metadata.
    ShowSession(session::ShowArgs),
    /// Delete a session's workspace and metadata.
    DeleteSession(session::DeleteArgs),

    /// Render a design spec to `<module>_spec.yaml` from a JSON description.
    WriteSpec(spec::WriteArgs),
    /// Parse and validate a `<module>_spec.yaml`.
    LoadSpec(spec::LoadArgs),

    /// Fetch and pin standard-cell simulation models for a platform.
    BootstrapStdcell(stdcell::PlatformArgs),
    /// List the already-bootstrapped stdcell files for a platform.
    ResolveStdcell(stdcell::PlatformArgs),

    /// Run an RTL or post-synthesis simulation.
    Simulate(sim::SimulateArgs),

    /// Allocate a synthesis run and hand it to a detached worker process.
    StartSynthesis(synth::StartArgs),
    /// Poll a synthesis job's current status.
    GetStatus(synth::JobArgs),
    /// Block (with rate-limited polling) until a synthesis job reaches a terminal state.
    Wait(synth::WaitArgs),
    /// Extract timing/area/power metrics from a run's reports.
    Metrics(synth::MetricsArgs),

    /// Append a `tool_call` event to the attempt log.
    LogCall(attempt::LogCallArgs),
    /// Append a `tool_result` event to the attempt log.
    LogResult(attempt::LogResultArgs),
    /// Print the derived attempt log summary.
    ShowAttemptLog,

    /// Internal: run the synthesis pipeline to completion. Not part of the tool surface.
    #[command(name = "__synth-worker", hide = true)]
    SynthWorker(synth::WorkerArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        let output = Cli::try_parse()
            .map(|cli| cli.output)
            .unwrap_or_default();
        emit_error(&err, output);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = cli.output;

    // The hidden worker subcommand needs no session/workspace resolution:
    // its workspace is passed explicitly by the parent process.
    if let Commands::SynthWorker(args) = cli.command {
        return synth::run_worker(args).await;
    }

    let home = Home::discover()?;
    let workspace_ref = cli.workspace.as_deref();
    let session_ref = cli.session.as_deref();

    match cli.command {
        Commands::CreateSession(args) => session::create(&home, args, output),
        Commands::ListSessions => session::list(&home, output),
        Commands::ShowSession(args) => session::show(&home, args, output),
        Commands::DeleteSession(args) => session::delete(&home, args, output),

        Commands::WriteSpec(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            spec::write(&workspace, args, output)
        }
        Commands::LoadSpec(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            spec::load(&workspace, args, output)
        }

        Commands::BootstrapStdcell(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            stdcell::bootstrap(&workspace, args, output)
        }
        Commands::ResolveStdcell(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            stdcell::resolve(&workspace, args, output)
        }

        Commands::Simulate(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            sim::simulate(&workspace, args, output).await
        }

        Commands::StartSynthesis(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            synth::start(&workspace, args, output)
        }
        Commands::GetStatus(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            synth::get_status(&workspace, args, output)
        }
        Commands::Wait(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            synth::wait(&workspace, args, output).await
        }
        Commands::Metrics(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            synth::metrics_cmd(&workspace, args, output)
        }

        Commands::LogCall(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            attempt::call(&workspace, args, output)
        }
        Commands::LogResult(args) => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            attempt::result(&workspace, args, output)
        }
        Commands::ShowAttemptLog => {
            let workspace = resolve_workspace(&home, workspace_ref, session_ref)?;
            attempt::show(&workspace, output)
        }

        Commands::SynthWorker(_) => unreachable!("handled above"),
    }
}

/// Per §7, nothing in this tree is meant to surface as a raw panic or stack
/// trace to whatever agent is driving the façade; an error that escapes a
/// command still comes back as one structured JSON object.
fn emit_error(err: &anyhow::Error, output: OutputFormat) {
    match output {
        OutputFormat::Json => {
            let body = json!({"error": err.to_string()});
            println!("{}", serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string()));
        }
        OutputFormat::Text => {
            eprintln!("error: {err:#}");
        }
    }
}
