// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rtlforge-core: shared identifiers, clock, error taxonomy, and data model
//! for the RTL workflow automation hard core.

pub mod clock;
pub mod error;
pub mod id;
pub mod ids;
pub mod path_safety;
pub mod session;
pub mod spec_model;
pub mod status;
pub mod time_fmt;
pub mod workspace;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::CoreError;
pub use id::{random_job_token, IdGen, SequentialIdGen, ShortId, UuidIdGen};
pub use ids::{JobId, RunId, SessionId};
pub use path_safety::{resolve_within, PathSafetyError};
pub use session::{sanitize_tag, Session, UsageCounters};
pub use spec_model::{DesignSpec, PortDirection, PortSpec, PortWidth};
pub use status::{
    ConstraintsMode, FailureType, GuardrailStatus, Platform, RunStatus, SimMode, SimProfile,
    SimStatus,
};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
pub use workspace::Workspace;
