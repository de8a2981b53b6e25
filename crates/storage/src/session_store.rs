// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Store (§4.2): per-session workspace directories plus SQLite
//! metadata (tokens, cost, timestamps).
//!
//! Grounded on `original_source/src/utils/session_manager.py`'s
//! `SessionManager`: the `session_metadata` table shape, the idempotent
//! column migration on open, and the three-table checkpoint cleanup on
//! delete.

use chrono::Utc;
use parking_lot::Mutex;
use rtlforge_core::{sanitize_tag, CoreError, Session, UsageCounters, Workspace};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::StorageError;

/// Checkpoint tables, keyed by `thread_id`, that are best-effort cleaned up
/// when a session is deleted. These predate this codebase (LangGraph
/// checkpointing); older workspaces may not have them at all.
const CHECKPOINT_TABLES: [&str; 3] = ["checkpoints", "checkpoint_writes", "checkpoint_blobs"];

pub struct SessionStore {
    conn: Mutex<Connection>,
    sessions_root: PathBuf,
}

impl SessionStore {
    pub fn open(db_path: &Path, sessions_root: PathBuf) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&sessions_root)?;

        let conn = Connection::open(db_path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS session_metadata (
                session_id TEXT PRIMARY KEY,
                model_name TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                input_tokens INTEGER NOT NULL DEFAULT 0,
                output_tokens INTEGER NOT NULL DEFAULT 0,
                cached_tokens INTEGER NOT NULL DEFAULT 0,
                total_cost REAL NOT NULL DEFAULT 0.0
            )",
        )?;
        migrate_columns(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            sessions_root,
        })
    }

    pub fn workspace_path(&self, session_id: &str) -> PathBuf {
        self.sessions_root.join(session_id)
    }

    /// Create a new session: sanitize the tag, create its workspace
    /// directory, and insert a zeroed metadata row.
    pub fn create(&self, tag: &str, model_name: &str) -> Result<Session, CoreError> {
        let session_id = sanitize_tag(tag);
        if session_id.is_empty() {
            return Err(CoreError::InvalidArgument(format!(
                "tag '{tag}' sanitizes to an empty session id"
            )));
        }

        let workspace_dir = self.workspace_path(&session_id);
        if workspace_dir.exists() {
            return Err(CoreError::AlreadyExists(format!(
                "session workspace already exists: {}",
                workspace_dir.display()
            )));
        }
        std::fs::create_dir_all(&workspace_dir).map_err(CoreError::Io)?;

        let now = Utc::now();
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO session_metadata (session_id, session_name, model_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![session_id, tag, model_name, now.to_rfc3339()],
        )
        .map_err(StorageError::from)
        .map_err(CoreError::from)?;

        Ok(Session {
            session_id,
            session_name: tag.to_string(),
            model_name: model_name.to_string(),
            created_at: now,
            updated_at: now,
            usage: UsageCounters::default(),
        })
    }

    /// List sessions whose workspace directory still exists on disk,
    /// ordered by `updated_at` (then `created_at`) descending.
    pub fn list(&self) -> Result<Vec<Session>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT session_id, session_name, model_name, created_at, updated_at,
                    input_tokens, output_tokens, cached_tokens, total_cost
             FROM session_metadata
             ORDER BY updated_at DESC, created_at DESC",
        )?;
        let rows = stmt.query_map([], row_to_session)?;

        let mut sessions = Vec::new();
        for row in rows {
            let session = row?;
            if self.workspace_path(&session.session_id).exists() {
                sessions.push(session);
            }
        }
        Ok(sessions)
    }

    pub fn metadata(&self, session_id: &str) -> Result<Option<Session>, StorageError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT session_id, session_name, model_name, created_at, updated_at,
                    input_tokens, output_tokens, cached_tokens, total_cost
             FROM session_metadata WHERE session_id = ?1",
            params![session_id],
            row_to_session,
        )
        .optional()
        .map_err(StorageError::from)
    }

    pub fn update_stats(
        &self,
        session_id: &str,
        usage: &UsageCounters,
    ) -> Result<(), CoreError> {
        let conn = self.conn.lock();
        let updated = conn
            .execute(
                "UPDATE session_metadata
                 SET input_tokens = ?2, output_tokens = ?3, cached_tokens = ?4,
                     total_cost = ?5, updated_at = ?6
                 WHERE session_id = ?1",
                params![
                    session_id,
                    usage.input_tokens,
                    usage.output_tokens,
                    usage.cached_tokens,
                    usage.total_cost,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(StorageError::from)?;

        if updated == 0 {
            return Err(CoreError::NotFound(format!("unknown session: {session_id}")));
        }
        Ok(())
    }

    /// Remove the workspace directory, the metadata row, and best-effort
    /// any checkpoint rows keyed by `thread_id = session_id`.
    pub fn delete(&self, session_id: &str) -> Result<(), CoreError> {
        let workspace_dir = self.workspace_path(session_id);
        if workspace_dir.exists() {
            std::fs::remove_dir_all(&workspace_dir).map_err(CoreError::Io)?;
        }

        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM session_metadata WHERE session_id = ?1",
            params![session_id],
        )
        .map_err(StorageError::from)
        .map_err(CoreError::from)?;

        for table in CHECKPOINT_TABLES {
            let sql = format!("DELETE FROM {table} WHERE thread_id = ?1");
            if let Err(e) = conn.execute(&sql, params![session_id]) {
                warn!(table, error = %e, "checkpoint table cleanup skipped (likely absent)");
            }
        }
        Ok(())
    }

    pub fn clear_all(&self) -> Result<(), StorageError> {
        let ids: Vec<String> = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare("SELECT session_id FROM session_metadata")?;
            stmt.query_map([], |r| r.get(0))?
                .collect::<Result<_, _>>()?
        };
        for id in ids {
            self.delete(&id).map_err(|e| match e {
                CoreError::Io(io) => StorageError::Io(io),
                other => StorageError::Core(other),
            })?;
        }
        Ok(())
    }

    pub fn workspace(&self, session_id: &str) -> Workspace {
        Workspace::new(self.workspace_path(session_id))
    }
}

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;
    Ok(Session {
        session_id: row.get(0)?,
        session_name: row.get(1)?,
        model_name: row.get(2)?,
        created_at: parse_rfc3339(&created_at),
        updated_at: parse_rfc3339(&updated_at),
        usage: UsageCounters {
            input_tokens: row.get(5)?,
            output_tokens: row.get(6)?,
            cached_tokens: row.get(7)?,
            total_cost: row.get(8)?,
        },
    })
}

fn parse_rfc3339(s: &str) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Idempotently add columns that older databases may be missing.
fn migrate_columns(conn: &Connection) -> Result<(), StorageError> {
    let mut stmt = conn.prepare("PRAGMA table_info(session_metadata)")?;
    let existing: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<_, _>>()?;

    if !existing.iter().any(|c| c == "session_name") {
        conn.execute(
            "ALTER TABLE session_metadata ADD COLUMN session_name TEXT NOT NULL DEFAULT ''",
            [],
        )?;
    }
    if !existing.iter().any(|c| c == "updated_at") {
        conn.execute(
            "ALTER TABLE session_metadata ADD COLUMN updated_at TEXT NOT NULL DEFAULT ''",
            [],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store() -> (SessionStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(&dir.path().join("sessions.db"), dir.path().join("ws"))
            .unwrap();
        (store, dir)
    }

    #[test]
    fn create_sanitizes_tag_and_creates_workspace() {
        let (store, _dir) = open_store();
        let session = store.create("my cool session!", "claude").unwrap();
        assert_eq!(session.session_id, "mycoolsession");
        assert!(store.workspace_path("mycoolsession").exists());
    }

    #[test]
    fn create_rejects_empty_sanitized_tag() {
        let (store, _dir) = open_store();
        let err = store.create("***", "claude").unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn create_rejects_duplicate_workspace() {
        let (store, _dir) = open_store();
        store.create("dup", "claude").unwrap();
        let err = store.create("dup", "claude").unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists(_)));
    }

    #[test]
    fn delete_removes_workspace_and_row() {
        let (store, _dir) = open_store();
        store.create("gone", "claude").unwrap();
        store.delete("gone").unwrap();
        assert!(!store.workspace_path("gone").exists());
        assert!(store.metadata("gone").unwrap().is_none());
    }

    #[test]
    fn list_only_includes_sessions_with_existing_workspace() {
        let (store, _dir) = open_store();
        store.create("a", "claude").unwrap();
        store.create("b", "claude").unwrap();
        std::fs::remove_dir_all(store.workspace_path("a")).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].session_id, "b");
    }

    #[test]
    fn update_stats_bumps_counters_and_rejects_unknown_session() {
        let (store, _dir) = open_store();
        store.create("s", "claude").unwrap();
        let usage = UsageCounters {
            input_tokens: 100,
            output_tokens: 50,
            cached_tokens: 10,
            total_cost: 1.23,
        };
        store.update_stats("s", &usage).unwrap();
        let meta = store.metadata("s").unwrap().unwrap();
        assert_eq!(meta.usage.total_tokens(), 150);

        let err = store.update_stats("missing", &usage).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
