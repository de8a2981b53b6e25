// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pipeline step F: the optional equivalence check (§4.4.3), run
//! only when the caller asked for `run_equiv=true`. Drives `yosys` through
//! an `equiv_make; equiv_simple; equiv_status -assert` script comparing the
//! RTL against the located netlist.

use std::time::Duration;

use rtlforge_adapters::{ProcessDriver, ProcessError};
use rtlforge_core::GuardrailStatus;

use crate::error::SynthError;

const OUTPUT_TAIL_CHARS: usize = 400;

pub struct EquivalenceOutcome {
    pub status: GuardrailStatus,
    pub note: Option<String>,
}

/// Run the equivalence check between `rtl_path` and `netlist_path` for
/// `top_module`. Returns `Skip` rather than an error when `yosys` is not on
/// `PATH`, since equivalence is advisory and its absence should not fail an
/// otherwise-signed-off run.
pub async fn run_equivalence_check(
    rtl_path: &std::path::Path,
    netlist_path: &std::path::Path,
    top_module: &str,
    timeout: Duration,
) -> Result<EquivalenceOutcome, SynthError> {
    let script = format!(
        "read_verilog {rtl}; rename {top} gold; \
         read_verilog {netlist}; rename {top} gate; \
         equiv_make gold gate equiv; hierarchy -top equiv; \
         equiv_simple; equiv_status -assert",
        rtl = rtl_path.display(),
        netlist = netlist_path.display(),
        top = top_module,
    );
    let args = vec!["-p".to_string(), script];

    let driver = ProcessDriver::new();
    match driver.run("yosys", &args, None, timeout).await {
        Ok(result) if result.success => Ok(EquivalenceOutcome { status: GuardrailStatus::Pass, note: None }),
        Ok(result) => {
            let mut combined = result.stdout;
            combined.push('\n');
            combined.push_str(&result.stderr);
            Ok(EquivalenceOutcome {
                status: GuardrailStatus::Fail,
                note: Some(tail_chars(&combined, OUTPUT_TAIL_CHARS)),
            })
        }
        Err(ProcessError::Spawn { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(EquivalenceOutcome {
                status: GuardrailStatus::Skip,
                note: Some("yosys is not installed; equivalence check skipped".to_string()),
            })
        }
        Err(ProcessError::Timeout { .. }) => Ok(EquivalenceOutcome {
            status: GuardrailStatus::Fail,
            note: Some("equivalence check timed out".to_string()),
        }),
        Err(other) => Err(SynthError::InvalidArgument(other.to_string())),
    }
}

fn tail_chars(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        text.to_string()
    } else {
        chars[chars.len() - max_chars..].iter().collect()
    }
}
