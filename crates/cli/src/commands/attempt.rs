// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attempt Logger commands (§4.5): `log-call`/`log-result` append to the
//! per-workspace event journal; `show-attempt-log` reads back the derived
//! summary that every call rebuilds from scratch.

use anyhow::{Context, Result};
use clap::Args;
use rtlforge_core::Workspace;
use rtlforge_storage::{log_call, log_result};
use serde_json::Value;

use crate::output::{print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct LogCallArgs {
    #[arg(long)]
    pub session_id: Option<String>,
    #[arg(long)]
    pub source: String,
    #[arg(long)]
    pub tool: String,
    /// JSON-encoded arguments, if any.
    #[arg(long)]
    pub arguments: Option<String>,
    #[arg(long)]
    pub tool_call_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct LogResultArgs {
    #[arg(long)]
    pub session_id: Option<String>,
    #[arg(long)]
    pub source: String,
    #[arg(long)]
    pub tool: String,
    #[arg(long)]
    pub result: Option<String>,
    #[arg(long)]
    pub status: String,
    #[arg(long)]
    pub error: Option<String>,
    #[arg(long)]
    pub tool_call_id: Option<String>,
    #[arg(long)]
    pub arguments: Option<String>,
}

pub fn call(workspace: &Workspace, args: LogCallArgs, output: OutputFormat) -> Result<()> {
    let arguments = parse_json_arg(args.arguments.as_deref())?;
    log_call(
        workspace,
        args.session_id.as_deref(),
        &args.source,
        &args.tool,
        arguments.as_ref(),
        args.tool_call_id.as_deref(),
    )?;
    ack(output)
}

pub fn result(workspace: &Workspace, args: LogResultArgs, output: OutputFormat) -> Result<()> {
    let arguments = parse_json_arg(args.arguments.as_deref())?;
    log_result(
        workspace,
        args.session_id.as_deref(),
        &args.source,
        &args.tool,
        args.result.as_deref(),
        &args.status,
        args.error.as_deref(),
        args.tool_call_id.as_deref(),
        arguments.as_ref(),
    )?;
    ack(output)
}

pub fn show(workspace: &Workspace, output: OutputFormat) -> Result<()> {
    let path = workspace.attempt_summary_path();
    let body: Value = if path.exists() {
        let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
    } else {
        serde_json::json!({"attempts": []})
    };
    match output {
        OutputFormat::Json => print_json(&body),
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
    }
}

fn parse_json_arg(raw: Option<&str>) -> Result<Option<Value>> {
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(s).context("parsing --arguments as JSON")?)),
        None => Ok(None),
    }
}

fn ack(output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => print_json(&serde_json::json!({"ok": true})),
        OutputFormat::Text => {
            println!("ok");
            Ok(())
        }
    }
}
