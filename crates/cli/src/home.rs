// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where the CLI keeps its state across invocations: the session store's
//! SQLite database and the root that every session's workspace directory
//! lives under. One OS process per invocation means there is no long-lived
//! "daemon home" to hold this open — every command re-opens it.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rtlforge_core::Workspace;
use rtlforge_storage::SessionStore;

const HOME_ENV: &str = "RTLFORGE_HOME";
const SESSION_ENV: &str = "RTLFORGE_SESSION";

pub struct Home {
    root: PathBuf,
}

impl Home {
    /// Resolve the on-disk home: `RTLFORGE_HOME` if set, else
    /// `<data dir>/rtlforge`, matching the original system's plain
    /// environment-variable configuration convention (no config file).
    pub fn discover() -> Result<Self> {
        let root = if let Ok(dir) = std::env::var(HOME_ENV) {
            PathBuf::from(dir)
        } else {
            let base = dirs::data_dir().context("could not determine a platform data directory")?;
            base.join("rtlforge")
        };
        std::fs::create_dir_all(&root)
            .with_context(|| format!("creating rtlforge home at {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn db_path(&self) -> PathBuf {
        self.root.join("sessions.db")
    }

    fn sessions_root(&self) -> PathBuf {
        self.root.join("sessions")
    }

    pub fn open_store(&self) -> Result<SessionStore> {
        Ok(SessionStore::open(&self.db_path(), self.sessions_root())?)
    }
}

/// Resolve the active workspace a command should operate on (§4.6):
/// an explicit `--workspace` path wins outright; otherwise fall back to
/// `--session`/`RTLFORGE_SESSION` resolved against the session store,
/// mirroring the active-session environment binding the session switcher
/// sets in the original tool surface.
pub fn resolve_workspace(
    home: &Home,
    workspace_override: Option<&Path>,
    session_override: Option<&str>,
) -> Result<Workspace> {
    if let Some(path) = workspace_override {
        return Ok(Workspace::new(path.to_path_buf()));
    }

    let session_id = session_override
        .map(str::to_string)
        .or_else(|| std::env::var(SESSION_ENV).ok());

    let Some(session_id) = session_id else {
        bail!("no workspace resolvable: pass --workspace, --session, or set {SESSION_ENV}");
    };

    let store = home.open_store()?;
    if store.metadata(&session_id)?.is_none() {
        bail!("unknown session: {session_id}");
    }
    Ok(store.workspace(&session_id))
}
