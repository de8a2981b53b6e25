// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pipeline step G / the `metrics()` tool (§4.4.5, §6.4, §6.6): a
//! single versioned regex parser over `6_finish.rpt` and `synth_stat.txt`,
//! grounded in `original_source/src/tools/metrics.py`. Every datum carries
//! the source path it came from so a consumer can audit where it was read.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use rtlforge_core::Workspace;
use serde::Serialize;

use crate::error::SynthError;
use crate::run_meta::{RunMeta, SummaryMetrics};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Violations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_slew: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cap: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fanout: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MetricSources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_um2: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_count: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wns_ns: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tns_ns: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_uw: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum MetricsResponse {
    #[serde(rename = "ok")]
    Ok {
        run_id: String,
        top_module: String,
        platform: String,
        metrics: SummaryMetrics,
        violations: Violations,
        sources: MetricSources,
        complete: bool,
        missing_fields: Vec<String>,
        parse_notes: Vec<String>,
    },
    #[serde(rename = "error")]
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        run_id: Option<String>,
        complete: bool,
    },
}

const PRIMARY_FIELDS: [&str; 5] = ["area_um2", "cell_count", "wns_ns", "tns_ns", "power_uw"];

fn wns_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?mi)^\s*wns\s+max\s+([0-9.eE+-]+)").expect("valid regex"))
}

fn tns_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?mi)^\s*tns\s+max\s+([0-9.eE+-]+)").expect("valid regex"))
}

fn violation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?mi)(setup|hold|max slew|max cap|max fanout) violation count\s+(\d+)").expect("valid regex")
    })
}

fn power_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*Total\s+[0-9.eE+-]+\s+[0-9.eE+-]+\s+[0-9.eE+-]+\s+([0-9.eE+-]+)\s+100\b")
            .expect("valid regex")
    })
}

fn area_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?mi)Chip area for module .*:\s*([0-9.]+)").expect("valid regex"))
}

fn cell_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*(\d+)\s+[0-9.eE+-]+\s+cells\b").expect("valid regex"))
}

/// Parse `metrics()`'s two source documents (§4.4.5) out of every file
/// found under `orfs_reports/` and `orfs_logs/`, keyed by filename rather
/// than a single hardcoded path since the flow's report layout can vary.
pub fn extract(workspace: &Workspace, run_id: &str) -> Result<MetricsResponse, SynthError> {
    let run_meta_path = workspace.run_meta_path(run_id);
    let Some(run_meta) = RunMeta::load(&run_meta_path)? else {
        return Ok(MetricsResponse::Error {
            message: format!("run directory for '{run_id}' could not be resolved"),
            run_id: Some(run_id.to_string()),
            complete: false,
        });
    };

    let mut metrics = SummaryMetrics::default();
    let mut violations = Violations::default();
    let mut sources = MetricSources::default();
    let mut parse_notes = Vec::new();

    let mut files = Vec::new();
    collect_files(&workspace.run_orfs_reports_dir(run_id), &mut files)?;
    collect_files(&workspace.run_orfs_logs_dir(run_id), &mut files)?;

    for path in &files {
        let Ok(text) = std::fs::read_to_string(path) else {
            continue;
        };
        parse_finish_report(&text, path, &mut metrics, &mut violations, &mut sources);
        parse_synth_stat(&text, path, &mut metrics, &mut sources);
    }

    if files.is_empty() {
        parse_notes.push("no report or log files found under orfs_reports/ or orfs_logs/".to_string());
    }

    let missing_fields: Vec<String> = PRIMARY_FIELDS
        .iter()
        .filter(|f| !field_present(&metrics, f))
        .map(|f| f.to_string())
        .collect();
    let complete = missing_fields.is_empty();

    Ok(MetricsResponse::Ok {
        run_id: run_id.to_string(),
        top_module: run_meta.top_module,
        platform: run_meta.platform.as_str().to_string(),
        metrics,
        violations,
        sources,
        complete,
        missing_fields,
        parse_notes,
    })
}

fn field_present(metrics: &SummaryMetrics, field: &str) -> bool {
    match field {
        "area_um2" => metrics.area_um2.is_some(),
        "cell_count" => metrics.cell_count.is_some(),
        "wns_ns" => metrics.wns_ns.is_some(),
        "tns_ns" => metrics.tns_ns.is_some(),
        "power_uw" => metrics.power_uw.is_some(),
        _ => false,
    }
}

fn parse_finish_report(
    text: &str,
    path: &Path,
    metrics: &mut SummaryMetrics,
    violations: &mut Violations,
    sources: &mut MetricSources,
) {
    if metrics.wns_ns.is_none() {
        if let Some(cap) = wns_re().captures(text) {
            if let Ok(v) = cap[1].parse::<f64>() {
                metrics.wns_ns = Some(v);
                sources.wns_ns = Some(path.to_path_buf());
            }
        }
    }
    if metrics.tns_ns.is_none() {
        if let Some(cap) = tns_re().captures(text) {
            if let Ok(v) = cap[1].parse::<f64>() {
                metrics.tns_ns = Some(v);
                sources.tns_ns = Some(path.to_path_buf());
            }
        }
    }
    for cap in violation_re().captures_iter(text) {
        let Ok(count) = cap[2].parse::<u64>() else { continue };
        match cap[1].to_lowercase().as_str() {
            "setup" => violations.setup = Some(count),
            "hold" => violations.hold = Some(count),
            "max slew" => violations.max_slew = Some(count),
            "max cap" => violations.max_cap = Some(count),
            "max fanout" => violations.max_fanout = Some(count),
            _ => {}
        }
    }
    if metrics.power_uw.is_none() {
        if let Some(cap) = power_re().captures(text) {
            if let Ok(watts) = cap[1].parse::<f64>() {
                metrics.power_uw = Some(watts * 1.0e6);
                sources.power_uw = Some(path.to_path_buf());
            }
        }
    }
}

fn parse_synth_stat(text: &str, path: &Path, metrics: &mut SummaryMetrics, sources: &mut MetricSources) {
    if metrics.area_um2.is_none() {
        if let Some(cap) = area_re().captures(text) {
            if let Ok(v) = cap[1].parse::<f64>() {
                metrics.area_um2 = Some(v);
                sources.area_um2 = Some(path.to_path_buf());
            }
        }
    }
    if metrics.cell_count.is_none() {
        if let Some(cap) = cell_count_re().captures(text) {
            if let Ok(v) = cap[1].parse::<u64>() {
                metrics.cell_count = Some(v);
                sources.cell_count = Some(path.to_path_buf());
            }
        }
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SynthError> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtlforge_core::{ConstraintsMode, Platform};

    fn workspace_with_run() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().expect("tempdir");
        let ws = Workspace::new(dir.path());
        std::fs::create_dir_all(ws.run_orfs_reports_dir("synth_0001")).expect("mkdir");
        std::fs::create_dir_all(ws.run_orfs_logs_dir("synth_0001")).expect("mkdir");
        let meta = RunMeta::new(
            "synth_0001",
            "job_aaa",
            Platform::Sky130Hd,
            "counter",
            vec!["counter.v".to_string()],
            10.0,
            ConstraintsMode::Auto,
            chrono::Utc::now(),
        );
        meta.save(&ws.run_meta_path("synth_0001")).expect("save meta");
        (dir, ws)
    }

    #[test]
    fn extracts_documented_fixture_values() {
        let (_dir, ws) = workspace_with_run();
        let finish = "wns max -0.31\n\
                      tns max 0.0\n\
                      setup violation count 3\n\
                      hold violation count 0\n\
                      Group                Count Violations\n\
                      Internal       0.0010    0.0020    0.0005  0.0027500  100\n\
                      Leakage        0.0000    0.0000    0.0000  0.0000000  100\n\
                      Total          0.0010    0.0020    0.0005  0.0027500  100\n";
        std::fs::write(ws.run_orfs_reports_dir("synth_0001").join("6_finish.rpt"), finish).expect("write");

        let stat = "Chip area for module 'counter': 7332.032\n\
                     \n\
                     \t814    1.0 cells\n";
        std::fs::write(ws.run_orfs_reports_dir("synth_0001").join("synth_stat.txt"), stat).expect("write");

        let response = extract(&ws, "synth_0001").expect("extract");
        match response {
            MetricsResponse::Ok {
                metrics,
                violations,
                complete,
                ..
            } => {
                assert_eq!(metrics.area_um2, Some(7332.032));
                assert_eq!(metrics.cell_count, Some(814));
                assert_eq!(violations.setup, Some(3));
                assert!((metrics.power_uw.unwrap() - 2750.0).abs() < 1e-6);
                assert!(complete);
            }
            MetricsResponse::Error { message, .. } => panic!("expected ok, got error: {message}"),
        }
    }

    #[test]
    fn missing_run_returns_error_status() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ws = Workspace::new(dir.path());
        let response = extract(&ws, "synth_9999").expect("extract never raises");
        assert!(matches!(response, MetricsResponse::Error { .. }));
    }

    #[test]
    fn partial_reports_mark_missing_fields() {
        let (_dir, ws) = workspace_with_run();
        std::fs::write(
            ws.run_orfs_reports_dir("synth_0001").join("6_finish.rpt"),
            "wns max -0.1\n",
        )
        .expect("write");
        let response = extract(&ws, "synth_0001").expect("extract");
        match response {
            MetricsResponse::Ok {
                complete,
                missing_fields,
                ..
            } => {
                assert!(!complete);
                assert!(missing_fields.contains(&"area_um2".to_string()));
                assert!(!missing_fields.contains(&"wns_ns".to_string()));
            }
            MetricsResponse::Error { message, .. } => panic!("expected ok, got error: {message}"),
        }
    }
}
