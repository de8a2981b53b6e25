// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identity and metadata.
//!
//! A session owns exactly one workspace directory. The session_id is the
//! sanitized tag the caller supplied, so it doubles as the directory name.

/// Cumulative token/cost counters tracked per session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageCounters {
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cached_tokens: i64,
    pub total_cost: f64,
}

impl UsageCounters {
    pub fn total_tokens(&self) -> i64 {
        self.input_tokens + self.output_tokens + self.cached_tokens
    }
}

/// Session metadata row, mirrored 1:1 in the `session_metadata` SQLite table.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub session_id: String,
    pub session_name: String,
    pub model_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub usage: UsageCounters,
}

/// Sanitize a caller-supplied tag down to `[A-Za-z0-9_-]`, which is what
/// becomes the session_id and the workspace directory name.
pub fn sanitize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
