// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rtlforge-synth: the Synthesis Job Manager (§4.4), the heart of the
//! system. `SynthesisManager::start` allocates a run and submits it to a
//! bounded worker pool; `get_status`/`wait` poll it with per-job rate
//! limiting and exponential backoff, recovering terminal state from the
//! on-disk run index when a job is no longer held in process memory.
//!
//! The worker pipeline itself (§4.4.3, steps A-H) is assembled from the
//! sibling modules in call order: [`allocate`] reserves the run directory,
//! [`constraints`] is the guardrail that can fail a run before any external
//! tool runs, [`flow`] drives the containerized synthesis flow,
//! [`signoff`] and [`equivalence`] are the remaining guardrails,
//! [`netlist_locate`] ranks the flow's output, and [`metrics`] parses the
//! reports it leaves behind. [`run_meta`] and [`run_index`] are the
//! persisted records that make all of this recoverable after a restart.

pub mod allocate;
pub mod constraints;
pub mod equivalence;
mod error;
pub mod flow;
mod manager;
pub mod metrics;
pub mod netlist_locate;
pub mod run_index;
pub mod run_meta;
pub mod signoff;
pub mod worker;

pub use allocate::next_run_id;
pub use constraints::{apply_constraints_guardrail, ConstraintsOutcome};
pub use equivalence::{run_equivalence_check, EquivalenceOutcome};
pub use error::SynthError;
pub use flow::{emit_config_mk, run_external_flow, FlowInputs};
pub use manager::{
    allocate_run, clamp_timeout_sec, ArtifactsFound, StartRequest, StartResponse, StatusResponse, SynthesisManager,
};
pub use metrics::{MetricSources, MetricsResponse, Violations};
pub use netlist_locate::locate_netlist;
pub use run_index::{read_latest, record_transition, RunIndex, RunIndexEntry};
pub use run_meta::{AutoChecks, RunMeta, SummaryMetrics};
pub use signoff::{apply_signoff_guardrail, SignoffOutcome};
pub use worker::run_to_completion;
