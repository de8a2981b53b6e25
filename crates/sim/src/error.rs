// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the simulation pipeline. Per §7, none of these ever
//! cross the façade boundary as an exception: [`crate::pipeline::simulate`]
//! catches everything it can turn into a domain [`crate::SimResult`] and
//! only returns `Err` for inputs it cannot even attempt to run (bad
//! arguments, an unresolvable run directory).

use rtlforge_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SimError> for CoreError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::InvalidArgument(m) => CoreError::InvalidArgument(m),
            SimError::NotFound(m) => CoreError::NotFound(m),
            SimError::Io(e) => CoreError::Io(e),
            other => CoreError::ExternalFailure(other.to_string()),
        }
    }
}
