// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pipeline step B: the constraints guardrail (§4.4.3).

use std::path::{Path, PathBuf};

use rtlforge_core::{ConstraintsMode, GuardrailStatus, Workspace};

use crate::error::SynthError;

pub struct ConstraintsOutcome {
    pub status: GuardrailStatus,
    pub notes: Vec<String>,
}

/// Load the most recently modified `*_spec.yaml` in the workspace (if any)
/// and derive `constraints.sdc` for this run, per the branching in §4.4.3
/// step B. Never invokes an external tool; a `fail` outcome is the worker's
/// signal to transition the run to `failed` immediately.
pub fn apply_constraints_guardrail(
    workspace: &Workspace,
    run_id: &str,
    top_module: &str,
    clock_period_ns: Option<f64>,
    constraints_mode: ConstraintsMode,
) -> Result<ConstraintsOutcome, SynthError> {
    let sdc_path = workspace.run_constraints_path(run_id);

    match find_most_recent_spec(workspace)? {
        None => match clock_period_ns.filter(|period| *period > 0.0) {
            Some(period) => {
                write_guarded_clock_sdc(&sdc_path, "clk", period)?;
                Ok(ConstraintsOutcome {
                    status: GuardrailStatus::Pass,
                    notes: vec![
                        "no design spec found in workspace; generated a guarded clock constraint on 'clk'"
                            .to_string(),
                    ],
                })
            }
            None => Ok(ConstraintsOutcome {
                status: GuardrailStatus::Fail,
                notes: vec!["no design spec found and no clock_period_ns provided".to_string()],
            }),
        },
        Some(spec_path) => {
            let spec = rtlforge_spec::load_yaml_file(&spec_path)?;

            if spec.module_name != top_module {
                return Ok(ConstraintsOutcome {
                    status: GuardrailStatus::Fail,
                    notes: vec![format!(
                        "spec module '{}' does not match requested top_module '{}'",
                        spec.module_name, top_module
                    )],
                });
            }

            if !spec.has_clock_port() {
                return match constraints_mode {
                    ConstraintsMode::Strict => Ok(ConstraintsOutcome {
                        status: GuardrailStatus::Fail,
                        notes: vec![
                            "spec has no recognizable clock port ('clk'/'clock'/'clk_i'); \
                             switch constraints_mode to 'auto' or 'bypass' to proceed"
                                .to_string(),
                        ],
                    }),
                    ConstraintsMode::Auto | ConstraintsMode::Bypass => {
                        let port = spec.ports.first().map(|p| p.name.as_str()).unwrap_or("clk");
                        let period = clock_period_ns.unwrap_or(spec.clock_period_ns);
                        write_guarded_clock_sdc(&sdc_path, port, period)?;
                        Ok(ConstraintsOutcome {
                            status: GuardrailStatus::Pass,
                            notes: vec![format!(
                                "no clock port detected; falling back to port '{port}' at {period}ns \
                                 under constraints_mode={constraints_mode:?}"
                            )],
                        })
                    }
                };
            }

            std::fs::write(&sdc_path, format!("{}\n", spec.generate_sdc()))?;
            Ok(ConstraintsOutcome {
                status: GuardrailStatus::Pass,
                notes: Vec::new(),
            })
        }
    }
}

fn write_guarded_clock_sdc(path: &Path, port: &str, period_ns: f64) -> Result<(), SynthError> {
    let body = format!(
        "set ports [get_ports {{{port}}}]\n\
         if {{[llength $ports] > 0}} {{\n  \
         create_clock -period {period_ns} -name clk $ports\n\
         }}\n"
    );
    std::fs::write(path, body)?;
    Ok(())
}

fn find_most_recent_spec(workspace: &Workspace) -> Result<Option<PathBuf>, SynthError> {
    let mut best: Option<(PathBuf, std::time::SystemTime)> = None;
    for entry in std::fs::read_dir(workspace.root())? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with("_spec.yaml") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        let is_newer = best.as_ref().map(|(_, t)| modified > *t).unwrap_or(true);
        if is_newer {
            best = Some((entry.path(), modified));
        }
    }
    Ok(best.map(|(path, _)| path))
}
