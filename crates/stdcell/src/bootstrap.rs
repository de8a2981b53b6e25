// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressed, pinned-source bootstrap of stdcell simulation models
//! (§4.1 `bootstrap`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use rtlforge_adapters::{fetch_and_extract_tarball, fetch_raw_file};
use rtlforge_core::{Platform, Workspace};
use tracing::{info, warn};

use crate::error::StdcellError;
use crate::manifest::{Manifest, SourceDescriptor};
use crate::sources;

#[derive(Debug, Clone, serde::Serialize)]
pub struct BootstrapResult {
    pub platform: String,
    pub cache_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub file_count: usize,
}

/// `bootstrap(workspace, platform)` (§4.1). Deterministic across reruns:
/// every previously cached `*.v` at the top of `sim/` is removed before
/// repopulating.
pub fn bootstrap(workspace: &Workspace, platform: Platform) -> Result<BootstrapResult, StdcellError> {
    let cache_dir = workspace.stdcell_cache_dir(platform.as_str());
    std::fs::create_dir_all(&cache_dir)?;
    clear_top_level_v_files(&cache_dir)?;

    let sources = match platform {
        Platform::Asap7 => bootstrap_asap7(&cache_dir)?,
        Platform::Sky130Hd => bootstrap_sky130hd(&cache_dir)?,
    };

    let found = count_v_files(&cache_dir)?;
    if found == 0 {
        return Err(StdcellError::NotFound(format!(
            "bootstrap completed but produced no .v files for platform '{platform}'"
        )));
    }

    let now = chrono::Utc::now();
    let manifest = Manifest::from_cache_dir(platform.as_str(), source_image_for(platform), sources, &cache_dir, now)?;
    let manifest_path = workspace.stdcell_manifest_path(platform.as_str());
    manifest.write(&manifest_path)?;

    info!(platform = %platform, file_count = found, "stdcell bootstrap complete");

    Ok(BootstrapResult {
        platform: platform.as_str().to_string(),
        cache_dir,
        manifest_path,
        file_count: found,
    })
}

fn source_image_for(platform: Platform) -> &'static str {
    match platform {
        Platform::Asap7 => sources::ASAP7_FLOW_REPO_RAW,
        Platform::Sky130Hd => sources::SKY130HD_TARBALL_URL,
    }
}

pub(crate) fn clear_top_level_v_files(cache_dir: &Path) -> std::io::Result<()> {
    if !cache_dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(cache_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "v") {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn count_v_files(dir: &Path) -> std::io::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    Ok(std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "v"))
        .count())
}

/// Platform A: raw files at pinned git revisions, preferring the flow repo
/// and falling back to the library repo per file.
fn bootstrap_asap7(cache_dir: &Path) -> Result<BTreeMap<String, SourceDescriptor>, StdcellError> {
    let mut sources_report: BTreeMap<String, SourceDescriptor> = BTreeMap::new();
    let flow = sources_report
        .entry("asap7_flow_repo".to_string())
        .or_default();
    let _ = flow;

    for filename in sources::ASAP7_REQUIRED_FILES {
        let primary_url = format!("{}/{}", sources::ASAP7_FLOW_REPO_RAW, filename);
        let mut resolved = try_fetch(
            &mut sources_report,
            "asap7_flow_repo",
            &primary_url,
            filename,
        )?;

        if resolved.is_none() {
            let fallback_url = format!("{}/{}", sources::ASAP7_LIB_REPO_RAW, filename);
            resolved = try_fetch(
                &mut sources_report,
                "asap7_lib_repo",
                &fallback_url,
                filename,
            )?;
        }

        if let Some(bytes) = resolved {
            std::fs::write(cache_dir.join(filename), bytes)?;
        } else {
            warn!(file = %filename, "asap7 stdcell file unavailable from any pinned source");
        }
    }

    Ok(sources_report)
}

fn try_fetch(
    report: &mut BTreeMap<String, SourceDescriptor>,
    source_key: &str,
    url: &str,
    filename: &str,
) -> Result<Option<Vec<u8>>, StdcellError> {
    let entry = report.entry(source_key.to_string()).or_default();
    entry.attempted.push(filename.to_string());
    match fetch_raw_file(url, rtlforge_adapters::fetch::RAW_FILE_TIMEOUT) {
        Ok(Some(bytes)) => Ok(Some(bytes)),
        Ok(None) => {
            report
                .entry(source_key.to_string())
                .or_default()
                .failed
                .push(format!("{filename}: not found"));
            Ok(None)
        }
        Err(e) => {
            report
                .entry(source_key.to_string())
                .or_default()
                .failed
                .push(format!("{filename}: {e}"));
            Ok(None)
        }
    }
}

/// Platform B: a pinned source tarball's `cells/` and `models/` trees,
/// flattened into `sim/` with includes rewritten.
fn bootstrap_sky130hd(cache_dir: &Path) -> Result<BTreeMap<String, SourceDescriptor>, StdcellError> {
    let mut sources_report: BTreeMap<String, SourceDescriptor> = BTreeMap::new();
    let entry = sources_report.entry("sky130hd_tarball".to_string()).or_default();
    entry.attempted.push(sources::SKY130HD_TARBALL_URL.to_string());

    let extract_root = cache_dir.join(".tmp_extract");
    if extract_root.exists() {
        std::fs::remove_dir_all(&extract_root)?;
    }
    std::fs::create_dir_all(&extract_root)?;

    let extract_result = fetch_and_extract_tarball(
        sources::SKY130HD_TARBALL_URL,
        &extract_root,
        Duration::from_secs(60),
    );

    if let Err(e) = extract_result {
        sources_report
            .entry("sky130hd_tarball".to_string())
            .or_default()
            .failed
            .push(e.to_string());
        let _ = std::fs::remove_dir_all(&extract_root);
        return Ok(sources_report);
    }

    let archive_root = find_archive_root(&extract_root)?;
    copy_cells(&archive_root.join("cells"), cache_dir)?;
    copy_models(&archive_root.join("models"), cache_dir)?;

    std::fs::remove_dir_all(&extract_root)?;
    Ok(sources_report)
}

/// GitHub's `/archive/<sha>.tar.gz` wraps everything in a single
/// `<repo>-<sha>/` directory; find it (or fall back to the extraction root
/// itself, for test fixtures that don't nest).
fn find_archive_root(extract_root: &Path) -> std::io::Result<PathBuf> {
    if extract_root.join("cells").exists() || extract_root.join("models").exists() {
        return Ok(extract_root.to_path_buf());
    }
    for entry in std::fs::read_dir(extract_root)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() && (path.join("cells").exists() || path.join("models").exists()) {
            return Ok(path);
        }
    }
    Ok(extract_root.to_path_buf())
}

/// For each cell directory, copy wrapper `.v` files matching the
/// size-numbered naming pattern; for the unsized base cell, prefer
/// `.functional.v`, fall back to `.behavioral.v`. Rewrite relative
/// `` `include "../models/foo/bar.v" `` to flat `` `include "bar.v" ``.
pub(crate) fn copy_cells(cells_dir: &Path, dest: &Path) -> Result<(), StdcellError> {
    if !cells_dir.exists() {
        return Ok(());
    }
    let sized_re = Regex::new(r"^.+__\w+_\d+\.v$").expect("valid regex");

    for cell_dir in sorted_subdirs(cells_dir)? {
        let mut unsized_functional: Option<PathBuf> = None;
        let mut unsized_behavioral: Option<PathBuf> = None;

        for entry in std::fs::read_dir(&cell_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".v") {
                continue;
            }

            if name.ends_with(".functional.v") {
                unsized_functional = Some(path.clone());
                continue;
            }
            if name.ends_with(".behavioral.v") {
                unsized_behavioral = Some(path.clone());
                continue;
            }
            if sized_re.is_match(name) {
                copy_rewritten(&path, &dest.join(name))?;
            }
        }

        if let Some(src) = unsized_functional.or(unsized_behavioral) {
            let base_name = strip_variant_suffix(&src);
            copy_rewritten(&src, &dest.join(base_name))?;
        }
    }
    Ok(())
}

/// For each model directory, copy every `.v` file except test benches,
/// symbol views, and blackbox stubs.
pub(crate) fn copy_models(models_dir: &Path, dest: &Path) -> Result<(), StdcellError> {
    if !models_dir.exists() {
        return Ok(());
    }
    for model_dir in sorted_subdirs(models_dir)? {
        for entry in std::fs::read_dir(&model_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".v") {
                continue;
            }
            if name.ends_with(".tb.v") || name.ends_with(".symbol.v") || name.ends_with(".blackbox.v") {
                continue;
            }
            copy_rewritten(&path, &dest.join(name))?;
        }
    }
    Ok(())
}

fn sorted_subdirs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    subdirs.sort();
    Ok(subdirs)
}

fn strip_variant_suffix(path: &Path) -> String {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.replace(".functional.v", ".v").replace(".behavioral.v", ".v")
}

/// Copy `src` to `dest`, rewriting any `` `include "../models/x/y.v" `` to
/// `` `include "y.v" `` since every cell now lives flat in `sim/`.
fn copy_rewritten(src: &Path, dest: &Path) -> Result<(), StdcellError> {
    let content = std::fs::read_to_string(src)?;
    let include_re = Regex::new(r#"`include\s+"([^"]+)""#).expect("valid regex");
    let rewritten = include_re.replace_all(&content, |caps: &regex::Captures| {
        let path = &caps[1];
        let basename = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path);
        format!("`include \"{basename}\"")
    });
    std::fs::write(dest, rewritten.as_bytes())?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    pub use super::{clear_top_level_v_files, copy_cells, copy_models};
}
