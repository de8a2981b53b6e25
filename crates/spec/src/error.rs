// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("empty yaml content")]
    Empty,
    #[error("unrecognized port direction: {0}")]
    InvalidDirection(String),
    #[error("invalid spec: {0}")]
    Invalid(String),
    #[error(transparent)]
    Core(#[from] rtlforge_core::CoreError),
}

impl From<SpecError> for rtlforge_core::CoreError {
    fn from(err: SpecError) -> Self {
        match err {
            SpecError::Core(e) => e,
            SpecError::InvalidDirection(_) | SpecError::Empty | SpecError::Invalid(_) => {
                rtlforge_core::CoreError::InvalidArgument(err.to_string())
            }
            other => rtlforge_core::CoreError::ExternalFailure(other.to_string()),
        }
    }
}
