// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec validation (§3 invariants), grounded on
//! `original_source/src/tools/spec_manager.py::validate_spec`.
//!
//! Errors and warnings are kept distinct: a missing clock port is a
//! warning here (the Spec Manager doesn't know the caller's
//! `constraints_mode`), while the constraints guardrail (§4.4.3 step B)
//! is what turns that same condition into a hard failure under
//! `constraints_mode = strict`.

use std::collections::HashSet;
use std::fmt;

use rtlforge_core::DesignSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning(pub String);

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate a [`DesignSpec`] against the invariants in §3: non-empty
/// letter-led module name, at least one uniquely-named port with a
/// recognized direction, and a positive clock period. Clock-port absence
/// and an empty description are warnings, not failures.
pub fn validate(spec: &DesignSpec) -> (Vec<ValidationError>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if spec.module_name.is_empty() {
        errors.push(ValidationError("module name is required".to_string()));
    } else if !spec.module_name.chars().next().is_some_and(|c| c.is_alphabetic()) {
        errors.push(ValidationError("module name must start with a letter".to_string()));
    }

    if spec.description.is_empty() {
        warnings.push(ValidationWarning("description is empty".to_string()));
    }

    if spec.ports.is_empty() {
        errors.push(ValidationError("at least one port is required".to_string()));
    } else {
        let mut seen = HashSet::new();
        for port in &spec.ports {
            if port.name.is_empty() {
                errors.push(ValidationError("port name cannot be empty".to_string()));
            } else if !seen.insert(port.name.as_str()) {
                errors.push(ValidationError(format!("duplicate port name: {}", port.name)));
            }
        }
        if !spec.has_clock_port() {
            warnings.push(ValidationWarning(
                "no clock port detected (expected 'clk' or 'clock')".to_string(),
            ));
        }
    }

    if spec.clock_period_ns <= 0.0 {
        errors.push(ValidationError("clock period must be positive".to_string()));
    } else if spec.clock_period_ns < 1.0 {
        warnings.push(ValidationWarning(format!(
            "very aggressive clock period: {}ns",
            spec.clock_period_ns
        )));
    }

    (errors, warnings)
}

pub fn is_valid(spec: &DesignSpec) -> bool {
    validate(spec).0.is_empty()
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
