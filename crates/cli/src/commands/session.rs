// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session & Workspace Manager commands (§4.2): `create-session`,
//! `list-sessions`, `show-session`, `delete-session`.

use anyhow::{bail, Result};
use clap::Args;
use rtlforge_core::Session;
use serde_json::{json, Value};

use crate::home::Home;
use crate::output::{format_time_ago, print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Human-readable tag; sanitized to `[A-Za-z0-9_-]` to become the session id.
    pub tag: String,
    #[arg(long, default_value = "")]
    pub model_name: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub session_id: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub session_id: String,
}

pub fn create(home: &Home, args: CreateArgs, output: OutputFormat) -> Result<()> {
    let store = home.open_store()?;
    let session = store.create(&args.tag, &args.model_name)?;
    emit_one(&session, output)
}

pub fn list(home: &Home, output: OutputFormat) -> Result<()> {
    let store = home.open_store()?;
    let sessions = store.list()?;
    match output {
        OutputFormat::Json => print_json(&json!({
            "sessions": sessions.iter().map(session_to_json).collect::<Vec<_>>(),
        })),
        OutputFormat::Text => {
            if sessions.is_empty() {
                println!("no sessions");
                return Ok(());
            }
            let mut table = Table::new(vec![
                Column::left("SESSION"),
                Column::left("MODEL"),
                Column::muted("UPDATED"),
            ]);
            for s in &sessions {
                table.row(vec![
                    s.session_id.clone(),
                    s.model_name.clone(),
                    format_time_ago(s.updated_at.timestamp_millis().max(0) as u64),
                ]);
            }
            table.render(&mut std::io::stdout());
            Ok(())
        }
    }
}

pub fn show(home: &Home, args: ShowArgs, output: OutputFormat) -> Result<()> {
    let store = home.open_store()?;
    let Some(session) = store.metadata(&args.session_id)? else {
        bail!("unknown session: {}", args.session_id);
    };
    emit_one(&session, output)
}

pub fn delete(home: &Home, args: DeleteArgs, output: OutputFormat) -> Result<()> {
    let store = home.open_store()?;
    store.delete(&args.session_id)?;
    match output {
        OutputFormat::Json => print_json(&json!({"deleted": args.session_id})),
        OutputFormat::Text => {
            println!("deleted session {}", args.session_id);
            Ok(())
        }
    }
}

fn emit_one(session: &Session, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => print_json(&session_to_json(session)),
        OutputFormat::Text => {
            println!("{}", session.session_id);
            println!("  name:    {}", session.session_name);
            println!("  model:   {}", session.model_name);
            println!("  created: {}", session.created_at.to_rfc3339());
            println!("  tokens:  {}", session.usage.total_tokens());
            Ok(())
        }
    }
}

fn session_to_json(session: &Session) -> Value {
    json!({
        "session_id": session.session_id,
        "session_name": session.session_name,
        "model_name": session.model_name,
        "created_at": session.created_at.to_rfc3339(),
        "updated_at": session.updated_at.to_rfc3339(),
        "usage": {
            "input_tokens": session.usage.input_tokens,
            "output_tokens": session.usage.output_tokens,
            "cached_tokens": session.usage.cached_tokens,
            "total_tokens": session.usage.total_tokens(),
            "total_cost": session.usage.total_cost,
        },
    })
}
