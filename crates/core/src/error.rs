// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy.
//!
//! Nothing in this tree raises through to the agent-facing tool boundary:
//! every domain failure either maps onto one of these variants or gets
//! folded into a status field on the result it produced. `CoreError` exists
//! for the layers below the façade; the façade itself never lets a `Result`
//! surface as anything other than a structured JSON body.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("external tool failed: {0}")]
    ExternalFailure(String),

    #[error("guardrail failed: {0}")]
    GuardrailFailure(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }
}
