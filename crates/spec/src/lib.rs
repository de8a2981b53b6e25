// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rtlforge-spec: the Spec Manager (§4.7).
//!
//! Parses and validates the YAML design spec, and renders it back out to a
//! Verilog module signature and an SDC clock constraint. The data shape
//! itself lives in `rtlforge_core::spec_model` so collaborators that only
//! need to read an already-parsed `DesignSpec` (the simulation pipeline,
//! the synthesis constraints guardrail) don't have to depend on the YAML
//! parser.

mod error;
mod parse;
mod render;
mod validate;

pub use error::SpecError;
pub use parse::{load_yaml_file, parse_yaml_spec};
pub use render::{save_yaml_file, to_yaml};
pub use validate::{is_valid, validate, ValidationError, ValidationWarning};
