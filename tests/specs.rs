//! Behavioral specifications for the `rtlforge` CLI.
//!
//! These tests are black-box: they invoke the built binary and verify
//! stdout, stderr, exit codes, and the on-disk state it leaves behind.
//! None of these exercise a real `iverilog`/`vvp`/`docker` toolchain: every
//! scenario here either short-circuits before reaching an external tool
//! (a guardrail failure, a missing stdcell cache) or only touches
//! CLI-surface concerns (sessions, specs, the attempt log) that never do.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/session/lifecycle.rs"]
mod session_lifecycle;

#[path = "specs/spec/validation.rs"]
mod spec_validation;

#[path = "specs/stdcell/bootstrap_required.rs"]
mod stdcell_bootstrap_required;

#[path = "specs/sim/bootstrap_hint.rs"]
mod sim_bootstrap_hint;

#[path = "specs/synth/constraints_guardrail.rs"]
mod synth_constraints_guardrail;

#[path = "specs/synth/status_recovery.rs"]
mod synth_status_recovery;

#[path = "specs/attempt/log_and_summarize.rs"]
mod attempt_log_and_summarize;
