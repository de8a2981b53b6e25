// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rtlforge-stdcell: the Standard-Cell Cache Manager (§4.1).
//!
//! Content-addressed, pinned-source bootstrap of simulation models for the
//! two supported PDK platforms, a deterministic file-selection policy for
//! `resolve`, and the behavioral compatibility models used to work around
//! vendor sequential-library simulation quirks.

mod bootstrap;
mod compat;
mod error;
mod manifest;
mod resolve;
mod sources;

pub use bootstrap::{bootstrap, BootstrapResult};
pub use compat::{compat_models, CompatModel};
pub use error::StdcellError;
pub use manifest::{Manifest, ManifestFileEntry, SourceDescriptor, SOURCE_POLICY};
pub use resolve::{bootstrap_hint, resolve};
pub use sources::{ASAP7_SEQ_FILE, SKY130HD_MODULE_PREFIX};
