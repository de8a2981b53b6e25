// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `resolve(workspace, platform)` (§4.1): the platform-specific file
//! selection policy applied to an already-bootstrapped cache.

use std::path::PathBuf;

use rtlforge_core::{Platform, Workspace};

use crate::error::StdcellError;
use crate::manifest::Manifest;
use crate::sources;

pub fn resolve(workspace: &Workspace, platform: Platform) -> Result<(Vec<PathBuf>, Manifest), StdcellError> {
    let sim_dir = workspace.stdcell_cache_dir(platform.as_str());
    let manifest_path = workspace.stdcell_manifest_path(platform.as_str());

    if !sim_dir.exists() {
        return Err(missing_cache_error(workspace, platform));
    }

    let manifest = Manifest::load(&manifest_path)?.ok_or_else(|| missing_cache_error(workspace, platform))?;

    let mut files: Vec<PathBuf> = std::fs::read_dir(&sim_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "v"))
        .filter(|p| keep_for_platform(p, platform))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(missing_cache_error(workspace, platform));
    }

    Ok((files, manifest))
}

fn keep_for_platform(path: &std::path::Path, platform: Platform) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    match platform {
        Platform::Asap7 => !sources::ASAP7_RESOLVE_EXCLUDE.contains(&name),
        Platform::Sky130Hd => name.starts_with(sources::SKY130HD_MODULE_PREFIX),
    }
}

/// `bootstrap_hint` is surfaced verbatim in simulation `stderr_tail` per
/// §6.5/testable property 6: it must name the bootstrap entry point and
/// contain the phrase "First-Run Standard-Cell Bootstrap".
pub fn bootstrap_hint(workspace: &Workspace, platform: Platform) -> String {
    format!(
        "First-Run Standard-Cell Bootstrap required: no cached models for platform '{platform}'. \
         Run `rtlforge bootstrap-stdcell --workspace {} --platform {platform}` to populate {}.",
        workspace.root().display(),
        workspace.stdcell_cache_dir(platform.as_str()).display(),
    )
}

fn missing_cache_error(workspace: &Workspace, platform: Platform) -> StdcellError {
    StdcellError::NotFound(bootstrap_hint(workspace, platform))
}
