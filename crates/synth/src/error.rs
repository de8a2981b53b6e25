// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the synthesis job manager. Per §7, a run's own
//! failures are recorded as terminal `run_meta.json` state, not propagated
//! as exceptions; this enum is reserved for requests the manager cannot
//! even accept (bad arguments, an unknown job, an unreadable index).

use rtlforge_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rtlforge_storage::StorageError),

    #[error("spec error: {0}")]
    Spec(#[from] rtlforge_spec::SpecError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<SynthError> for CoreError {
    fn from(err: SynthError) -> Self {
        match err {
            SynthError::InvalidArgument(m) => CoreError::InvalidArgument(m),
            SynthError::NotFound(m) => CoreError::NotFound(m),
            SynthError::Io(e) => CoreError::Io(e),
            SynthError::Core(e) => e,
            other => CoreError::ExternalFailure(other.to_string()),
        }
    }
}
