// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stdcell cache manifest (§3 "Stdcell Cache Entry", §4.1 "Manifest").

use std::path::Path;

use rtlforge_adapters::sha256_file;
use serde::{Deserialize, Serialize};

use crate::error::StdcellError;

pub const SOURCE_POLICY: &str = "pinned_only";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFileEntry {
    pub name: String,
    pub sha256: String,
}

/// Records provenance of one of the pinned sources consulted during
/// bootstrap, and any failures encountered reaching it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempted: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub platform: String,
    pub source_image: String,
    #[serde(default = "default_policy")]
    pub source_policy: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub sources: std::collections::BTreeMap<String, SourceDescriptor>,
    pub files: Vec<ManifestFileEntry>,
}

fn default_policy() -> String {
    SOURCE_POLICY.to_string()
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Option<Self>, StdcellError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn write(&self, path: &Path) -> Result<(), StdcellError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(self)?;
        std::fs::write(path, body)?;
        Ok(())
    }

    /// Build a manifest by hashing every `.v` file currently in `sim_dir`.
    pub fn from_cache_dir(
        platform: &str,
        source_image: &str,
        sources: std::collections::BTreeMap<String, SourceDescriptor>,
        sim_dir: &Path,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Self, StdcellError> {
        let mut files = Vec::new();
        let mut entries: Vec<_> = std::fs::read_dir(sim_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "v"))
            .collect();
        entries.sort();
        for path in entries {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let sha256 = sha256_file(&path)?;
            files.push(ManifestFileEntry { name, sha256 });
        }
        Ok(Self {
            platform: platform.to_string(),
            source_image: source_image.to_string(),
            source_policy: SOURCE_POLICY.to_string(),
            created_at: now,
            updated_at: now,
            sources,
            files,
        })
    }
}
