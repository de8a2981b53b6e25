// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec Manager commands (§4.7): `write-spec` renders a design spec to the
//! module's YAML file; `load-spec` parses and validates one back.
//!
//! [`rtlforge_core::DesignSpec`] deliberately has no `Deserialize` (only the
//! YAML parser in `rtlforge-spec` is meant to construct one, so every parsed
//! spec goes through the same validation path); `write-spec` instead takes a
//! small JSON shape with the same field names and builds a `DesignSpec` by
//! hand, the same way `rtlforge_spec::render` builds its YAML mapping by hand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use rtlforge_core::{resolve_within, DesignSpec, PortSpec, Workspace};
use rtlforge_spec::{load_yaml_file, save_yaml_file, validate};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::output::{print_json, OutputFormat};

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Path (workspace-relative) to a JSON file describing the spec.
    pub input_json_path: String,
    /// Path (workspace-relative) the rendered YAML is written to.
    pub output_path: String,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Path (workspace-relative) to the `<module>_spec.yaml` file.
    pub spec_path: String,
}

/// The JSON shape `write-spec` accepts; field names mirror
/// [`DesignSpec`] so callers can round-trip `load-spec`'s JSON output back
/// through `write-spec`.
#[derive(Debug, Deserialize)]
struct SpecInput {
    module_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tech_node: String,
    clock_period_ns: f64,
    ports: Vec<PortSpec>,
    #[serde(default)]
    parameters: serde_json::Map<String, Value>,
    #[serde(default)]
    module_signature: String,
    #[serde(default)]
    behavioral_description: String,
    #[serde(default)]
    sample_io: serde_json::Map<String, Value>,
}

pub fn write(workspace: &Workspace, args: WriteArgs, output: OutputFormat) -> Result<()> {
    let input_path = resolve_within(workspace.root(), &args.input_json_path)?;
    let output_path = resolve_within(workspace.root(), &args.output_path)?;

    let raw = std::fs::read_to_string(&input_path)
        .with_context(|| format!("reading spec input at {}", input_path.display()))?;
    let input: SpecInput = serde_json::from_str(&raw).context("parsing spec input JSON")?;

    let mut spec = DesignSpec {
        module_name: input.module_name,
        description: input.description,
        tech_node: input.tech_node,
        clock_period_ns: input.clock_period_ns,
        ports: input.ports,
        parameters: input.parameters,
        module_signature: input.module_signature,
        behavioral_description: input.behavioral_description,
        sample_io: input.sample_io,
        created_at: Utc::now(),
    };
    if spec.module_signature.is_empty() {
        spec.module_signature = spec.generate_module_signature();
    }

    let (errors, warnings) = validate(&spec);
    save_yaml_file(&spec, &output_path)?;

    emit(&spec, &output_path, &errors, &warnings, output)
}

pub fn load(workspace: &Workspace, args: LoadArgs, output: OutputFormat) -> Result<()> {
    let spec_path = resolve_within(workspace.root(), &args.spec_path)?;
    let spec = load_yaml_file(&spec_path)?;
    let (errors, warnings) = validate(&spec);
    emit(&spec, &spec_path, &errors, &warnings, output)
}

fn emit(
    spec: &DesignSpec,
    path: &PathBuf,
    errors: &[rtlforge_spec::ValidationError],
    warnings: &[rtlforge_spec::ValidationWarning],
    output: OutputFormat,
) -> Result<()> {
    let body = json!({
        "path": path.display().to_string(),
        "valid": errors.is_empty(),
        "errors": errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "warnings": warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "spec": spec_to_json(spec),
    });
    match output {
        OutputFormat::Json => print_json(&body),
        OutputFormat::Text => {
            println!("{} ({})", spec.module_name, path.display());
            println!("  valid: {}", errors.is_empty());
            for e in errors {
                println!("  error:   {e}");
            }
            for w in warnings {
                println!("  warning: {w}");
            }
            Ok(())
        }
    }
}

fn spec_to_json(spec: &DesignSpec) -> Value {
    json!({
        "module_name": spec.module_name,
        "description": spec.description,
        "tech_node": spec.tech_node,
        "clock_period_ns": spec.clock_period_ns,
        "ports": spec.ports,
        "parameters": spec.parameters,
        "module_signature": spec.module_signature,
        "behavioral_description": spec.behavioral_description,
        "sample_io": spec.sample_io,
        "created_at": spec.created_at.to_rfc3339(),
    })
}
