// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The attempt logger (§4.5): an append-only JSONL event journal per
//! workspace, plus a derived `attempt_log.json` summary rebuilt from scratch
//! on every call. Grounded in `attempt_logger.py` — the segmentation rule,
//! compaction thresholds, and the cumulative pass/fail bookkeeping below
//! follow it exactly.

use std::collections::HashMap;
use std::fs;
use std::io::Write as _;

use rtlforge_core::Workspace;
use serde::Serialize;
use serde_json::{json, Value};

use crate::atomic::write_json_atomic;
use crate::StorageError;

/// Tools whose call marks the start of a new attempt, once the current one
/// has reached a checkpoint or seen a failure.
const CHANGE_TOOLS: &[&str] = &[
    "write_spec",
    "load_yaml_spec_file",
    "write_file",
    "edit_file_tool",
    "apply_patch_tool",
    "start_synthesis",
];

const STRING_COMPACT_THRESHOLD: usize = 300;
const STRING_PREVIEW_LEN: usize = 240;
const LIST_COMPACT_THRESHOLD: usize = 20;
const LIST_HEAD_LEN: usize = 5;
const MAX_DEPTH: u32 = 2;
const RESULT_MAX_LEN: usize = 4000;
const ERROR_MAX_LEN: usize = 2000;

/// Append a `tool_call` event and rebuild the summary.
#[allow(clippy::too_many_arguments)]
pub fn log_call(
    workspace: &Workspace,
    session_id: Option<&str>,
    source: &str,
    tool: &str,
    arguments: Option<&Value>,
    tool_call_id: Option<&str>,
) -> Result<(), StorageError> {
    let event = json!({
        "ts": now_rfc3339(),
        "event_type": "tool_call",
        "source": source,
        "session_id": session_id,
        "tool": tool,
        "tool_call_id": tool_call_id,
        "arguments": compact_value(arguments.unwrap_or(&Value::Object(Default::default())), 0),
    });
    append_event(workspace, &event)?;
    rebuild_summary(workspace, session_id)
}

/// Append a `tool_result` event and rebuild the summary.
#[allow(clippy::too_many_arguments)]
pub fn log_result(
    workspace: &Workspace,
    session_id: Option<&str>,
    source: &str,
    tool: &str,
    result: Option<&str>,
    status: &str,
    error: Option<&str>,
    tool_call_id: Option<&str>,
    arguments: Option<&Value>,
) -> Result<(), StorageError> {
    let event = json!({
        "ts": now_rfc3339(),
        "event_type": "tool_result",
        "source": source,
        "session_id": session_id,
        "tool": tool,
        "tool_call_id": tool_call_id,
        "status": status,
        "arguments": compact_value(arguments.unwrap_or(&Value::Object(Default::default())), 0),
        "result": compact_result(result.unwrap_or("")),
        "error": error.map(|e| truncate_chars(e, ERROR_MAX_LEN)),
    });
    append_event(workspace, &event)?;
    rebuild_summary(workspace, session_id)
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn append_event(workspace: &Workspace, event: &Value) -> Result<(), StorageError> {
    let path = workspace.attempt_events_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", serde_json::to_string(event)?)?;
    Ok(())
}

fn read_events(workspace: &Workspace) -> Vec<Value> {
    let path = workspace.attempt_events_path();
    let Ok(raw) = fs::read_to_string(&path) else {
        return Vec::new();
    };
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(|v| v.is_object())
        .collect()
}

fn compact_string(value: &str) -> Value {
    let preview = if value.chars().count() <= STRING_PREVIEW_LEN {
        value.to_string()
    } else {
        format!("{}...(truncated)", truncate_chars(value, STRING_PREVIEW_LEN))
    };
    json!({ "preview": preview, "length": value.chars().count() })
}

fn truncate_chars(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}

/// Recursively shrink a value for storage: long strings become a
/// preview+length pair, long lists become a head sample, and a handful of
/// keys known to carry large bodies (`content`, `target_text`,
/// `replacement_text`, `unified_diff`) are always compacted regardless of
/// length.
fn compact_value(value: &Value, depth: u32) -> Value {
    if depth > MAX_DEPTH {
        return Value::String("<truncated-depth>".to_string());
    }
    match value {
        Value::String(s) => {
            if s.chars().count() > STRING_COMPACT_THRESHOLD {
                compact_string(s)
            } else {
                value.clone()
            }
        }
        Value::Array(items) => {
            if items.len() > LIST_COMPACT_THRESHOLD {
                json!({
                    "type": "list",
                    "length": items.len(),
                    "head": items.iter().take(LIST_HEAD_LEN).map(|v| compact_value(v, depth + 1)).collect::<Vec<_>>(),
                })
            } else {
                Value::Array(items.iter().map(|v| compact_value(v, depth + 1)).collect())
            }
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                if matches!(k.as_str(), "content" | "target_text" | "replacement_text" | "unified_diff")
                    && v.is_string()
                {
                    out.insert(k.clone(), compact_string(v.as_str().unwrap_or_default()));
                } else {
                    out.insert(k.clone(), compact_value(v, depth + 1));
                }
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn compact_result(text: &str) -> String {
    if text.chars().count() <= RESULT_MAX_LEN {
        text.to_string()
    } else {
        format!("{}\n...(truncated)", truncate_chars(text, RESULT_MAX_LEN))
    }
}

#[derive(Debug, Clone, Serialize)]
struct Attempt {
    attempt: usize,
    change_type: String,
    changes: Vec<String>,
    rtl_lint: String,
    rtl_sim: String,
    synth_status: String,
    wns_ns: Option<f64>,
    tns_ns: Option<f64>,
    post_synth_sim: String,
    spec_match: String,
    started_at: String,
    ended_at: Option<String>,
    #[serde(skip)]
    has_checkpoint: bool,
    #[serde(skip)]
    had_failure: bool,
}

impl Attempt {
    fn new(number: usize, started_at: String) -> Self {
        Self {
            attempt: number,
            change_type: "unknown".to_string(),
            changes: Vec::new(),
            rtl_lint: "not_run".to_string(),
            rtl_sim: "not_run".to_string(),
            synth_status: "not_run".to_string(),
            wns_ns: None,
            tns_ns: None,
            post_synth_sim: "not_run".to_string(),
            spec_match: "unknown".to_string(),
            started_at,
            ended_at: None,
            has_checkpoint: false,
            had_failure: false,
        }
    }
}

struct PendingCall {
    tool: String,
    arguments: Value,
}

/// Rebuild `attempt_log.json` from the full event journal. Idempotent and
/// cheap enough to run after every single event: event volume per workspace
/// is small and this keeps the summary consistent even if a prior write was
/// interrupted.
fn rebuild_summary(workspace: &Workspace, session_id: Option<&str>) -> Result<(), StorageError> {
    let events = read_events(workspace);
    let mut attempts: Vec<Attempt> = Vec::new();
    let mut pending_calls: HashMap<String, PendingCall> = HashMap::new();
    let mut current: Option<usize> = None;

    let last_ts = events.last().map(event_ts).unwrap_or_else(now_rfc3339);

    for ev in &events {
        let Some(tool) = ev.get("tool").and_then(Value::as_str) else {
            continue;
        };
        let args = ev
            .get("arguments")
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        let tool_call_id = ev.get("tool_call_id").and_then(Value::as_str);
        let ts = event_ts(ev);
        let event_type = ev.get("event_type").and_then(Value::as_str).unwrap_or("");

        if event_type == "tool_call" {
            touch_attempt_for_call(&mut attempts, &mut current, tool, &ts);
            if let Some(id) = tool_call_id {
                pending_calls.insert(
                    id.to_string(),
                    PendingCall {
                        tool: tool.to_string(),
                        arguments: args,
                    },
                );
            }
            continue;
        }

        if event_type != "tool_result" {
            continue;
        }
        if current.is_none() {
            attempts.push(Attempt::new(attempts.len() + 1, ts.clone()));
            current = Some(attempts.len() - 1);
        }

        let mut resolved_tool = tool.to_string();
        let mut resolved_args = args;
        if let Some(id) = tool_call_id {
            if let Some(call) = pending_calls.remove(id) {
                resolved_tool = call.tool;
                resolved_args = call.arguments;
            }
        }

        let result_text = ev.get("result").and_then(Value::as_str);
        let status = ev
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_lowercase();

        let attempt = &mut attempts[current.expect("current set above")];
        apply_result(attempt, &resolved_tool, &resolved_args, result_text, &status);
    }

    if let Some(idx) = current {
        if attempts[idx].ended_at.is_none() {
            attempts[idx].ended_at = Some(last_ts);
        }
    }

    let (success, best_attempt) = cumulative_outcome(&attempts);

    let summary = json!({
        "session_id": session_id,
        "attempt_count": attempts.len(),
        "attempts": attempts,
        "final": {
            "success": success,
            "best_attempt": best_attempt,
        },
        "updated_at": now_rfc3339(),
    });

    write_json_atomic(&workspace.attempt_summary_path(), &summary)
}

fn event_ts(ev: &Value) -> String {
    ev.get("ts")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(now_rfc3339)
}

fn touch_attempt_for_call(attempts: &mut Vec<Attempt>, current: &mut Option<usize>, tool: &str, ts: &str) {
    match current {
        None => {
            attempts.push(Attempt::new(attempts.len() + 1, ts.to_string()));
            *current = Some(attempts.len() - 1);
        }
        Some(idx) => {
            let needs_new = CHANGE_TOOLS.contains(&tool)
                && (attempts[*idx].has_checkpoint || attempts[*idx].had_failure);
            if needs_new {
                attempts[*idx].ended_at = Some(ts.to_string());
                attempts.push(Attempt::new(attempts.len() + 1, ts.to_string()));
                *current = Some(attempts.len() - 1);
            }
        }
    }

    if CHANGE_TOOLS.contains(&tool) {
        let attempt = &mut attempts[current.expect("current set above")];
        if tool == "start_synthesis" {
            attempt.change_type = if attempt.change_type == "unknown" {
                "synth".to_string()
            } else {
                "both".to_string()
            };
        } else if attempt.change_type == "unknown" {
            attempt.change_type = "rtl".to_string();
        } else if attempt.change_type == "synth" {
            attempt.change_type = "both".to_string();
        }
        if attempt.changes.len() < 10 {
            attempt.changes.push(tool.to_string());
        }
    }
}

fn apply_result(attempt: &mut Attempt, tool: &str, args: &Value, result_text: Option<&str>, status: &str) {
    match tool {
        "linter_tool" => {
            let pass = result_text.unwrap_or_default().to_lowercase().contains("syntax ok");
            attempt.rtl_lint = if pass { "pass".to_string() } else { "fail".to_string() };
            attempt.has_checkpoint = true;
            attempt.had_failure |= !pass;
        }
        "simulation_tool" => {
            let arg_mode = args
                .get("mode")
                .and_then(Value::as_str)
                .unwrap_or("rtl")
                .to_lowercase();
            let (parsed_mode, sim_status) = extract_sim_status(result_text);
            let mode = if arg_mode == "rtl" || arg_mode == "post_synth" {
                arg_mode
            } else {
                parsed_mode
            };
            if mode == "post_synth" {
                attempt.post_synth_sim = sim_status.clone();
            } else {
                attempt.rtl_sim = sim_status.clone();
            }
            attempt.has_checkpoint = true;
            attempt.had_failure |= sim_status == "fail";
        }
        "start_synthesis" => {
            attempt.synth_status = if status == "success" {
                "running".to_string()
            } else {
                "failed".to_string()
            };
            attempt.had_failure |= status == "error";
        }
        "get_synthesis_metrics" => {
            let (wns, tns) = extract_synth_metrics(result_text);
            attempt.wns_ns = wns;
            attempt.tns_ns = tns;
            attempt.synth_status = "completed".to_string();
            attempt.has_checkpoint = true;
            if let (Some(w), Some(t)) = (wns, tns) {
                if w < 0.0 || t != 0.0 {
                    attempt.had_failure = true;
                }
            }
        }
        "generate_report_tool" => {
            attempt.has_checkpoint = true;
        }
        _ => {}
    }
}

fn parse_json_maybe(text: Option<&str>) -> Option<Value> {
    let raw = text?.trim();
    if raw.is_empty() {
        return None;
    }
    serde_json::from_str::<Value>(raw).ok().filter(Value::is_object)
}

fn status_from_text(text: Option<&str>) -> String {
    let raw = text.unwrap_or_default().to_lowercase();
    if raw.is_empty() {
        return "unknown".to_string();
    }
    if raw.contains("test_passed") || raw.contains("syntax ok") || raw.contains("success") {
        return "pass".to_string();
    }
    if raw.contains("error") || raw.contains("failed") || raw.contains("fail") {
        return "fail".to_string();
    }
    "unknown".to_string()
}

fn extract_sim_status(result_text: Option<&str>) -> (String, String) {
    if let Some(obj) = parse_json_maybe(result_text) {
        let mode = obj
            .get("mode")
            .and_then(Value::as_str)
            .unwrap_or("rtl")
            .to_string();
        let status = obj
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_lowercase();
        if status == "test_passed" {
            return (mode, "pass".to_string());
        }
        if status.contains("fail") {
            return (mode, "fail".to_string());
        }
        return (mode, "unknown".to_string());
    }
    ("rtl".to_string(), status_from_text(result_text))
}

fn extract_synth_metrics(result_text: Option<&str>) -> (Option<f64>, Option<f64>) {
    let Some(obj) = parse_json_maybe(result_text) else {
        return (None, None);
    };
    let wns = obj.get("wns_ns").and_then(Value::as_f64);
    let tns = obj.get("tns_ns").and_then(Value::as_f64);
    (wns, tns)
}

fn cumulative_outcome(attempts: &[Attempt]) -> (bool, Option<usize>) {
    let mut seen_rtl_pass = false;
    let mut seen_post_pass = false;
    let mut best_attempt = None;
    for a in attempts {
        if a.rtl_sim == "pass" {
            seen_rtl_pass = true;
        }
        if a.post_synth_sim == "pass" {
            seen_post_pass = true;
        }
        if best_attempt.is_none() && seen_rtl_pass && seen_post_pass {
            best_attempt = Some(a.attempt);
        }
    }
    (seen_rtl_pass && seen_post_pass, best_attempt)
}
