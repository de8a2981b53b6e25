// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the standard-cell cache manager.

use rtlforge_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StdcellError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("{0}")]
    NotFound(String),

    #[error("fetch failed: {0}")]
    Fetch(#[from] rtlforge_adapters::FetchError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StdcellError> for CoreError {
    fn from(err: StdcellError) -> Self {
        match err {
            StdcellError::NotFound(msg) => CoreError::NotFound(msg),
            StdcellError::UnsupportedPlatform(p) => {
                CoreError::InvalidArgument(format!("unsupported platform: {p}"))
            }
            other => CoreError::ExternalFailure(other.to_string()),
        }
    }
}
