// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the external I/O the hard core depends on: running external
//! binaries (the compiler/simulator, the containerized synthesis flow, the
//! equivalence checker) and fetching pinned standard-cell sources.
//!
//! The conversational agent runtime, its provider adapters, and any
//! HTTP/WebSocket front-end are out of scope per §1 — this crate only
//! contains the collaborators the hard core itself drives.

pub mod fetch;
pub mod process;

pub use fetch::{fetch_and_extract_tarball, fetch_raw_file, sha256_file, FetchError};
pub use process::{run_with_timeout, write_filelist, ProcessDriver, ProcessError, ProcessResult};
