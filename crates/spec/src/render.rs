// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serializing a [`DesignSpec`] back to the YAML wire format (§6.1
//! `<module>_spec.yaml`), grounded on
//! `original_source/src/tools/spec_manager.py::to_yaml_dict`. Key order is
//! written explicitly rather than left to a derive so the emitted file
//! matches the source's field order, `created_at` always last.

use std::path::Path;

use rtlforge_core::{DesignSpec, PortSpec, PortWidth};
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::SpecError;

fn port_to_mapping(port: &PortSpec) -> Value {
    let mut map = Mapping::new();
    map.insert(Value::String("name".to_string()), Value::String(port.name.clone()));
    map.insert(
        Value::String("direction".to_string()),
        Value::String(port.direction.as_str().to_string()),
    );
    map.insert(Value::String("type".to_string()), Value::String(port.r#type.clone()));

    match &port.width {
        Some(PortWidth::Literal(w)) if *w > 1 => {
            map.insert(Value::String("width".to_string()), Value::Number((*w).into()));
        }
        Some(PortWidth::Symbolic(expr)) => {
            map.insert(Value::String("width".to_string()), Value::String(expr.clone()));
        }
        _ => {}
    }

    if !port.description.is_empty() {
        map.insert(
            Value::String("description".to_string()),
            Value::String(port.description.clone()),
        );
    }
    Value::Mapping(map)
}

/// Render a [`DesignSpec`] as a YAML document.
pub fn to_yaml(spec: &DesignSpec) -> Result<String, SpecError> {
    let mut inner = Mapping::new();
    inner.insert(
        Value::String("description".to_string()),
        Value::String(spec.description.clone()),
    );
    inner.insert(
        Value::String("tech_node".to_string()),
        Value::String(spec.tech_node.clone()),
    );
    inner.insert(
        Value::String("clock_period".to_string()),
        Value::String(format!("{}ns", spec.clock_period_ns)),
    );
    inner.insert(
        Value::String("ports".to_string()),
        Value::Sequence(spec.ports.iter().map(port_to_mapping).collect()),
    );

    if !spec.parameters.is_empty() {
        let params = serde_json::Value::Object(spec.parameters.clone());
        inner.insert(Value::String("parameters".to_string()), json_to_yaml(&params));
    }
    if !spec.module_signature.is_empty() {
        inner.insert(
            Value::String("module_signature".to_string()),
            Value::String(spec.module_signature.clone()),
        );
    }
    if !spec.behavioral_description.is_empty() {
        inner.insert(
            Value::String("behavioral_description".to_string()),
            Value::String(spec.behavioral_description.clone()),
        );
    }
    if !spec.sample_io.is_empty() {
        let sample_io = serde_json::Value::Object(spec.sample_io.clone());
        inner.insert(Value::String("sample_io".to_string()), json_to_yaml(&sample_io));
    }
    inner.insert(
        Value::String("created_at".to_string()),
        Value::String(spec.created_at.to_rfc3339()),
    );

    let mut document = Mapping::new();
    document.insert(Value::String(spec.module_name.clone()), Value::Mapping(inner));

    serde_yaml::to_string(&Value::Mapping(document)).map_err(SpecError::from)
}

fn json_to_yaml(value: &serde_json::Value) -> Value {
    serde_yaml::to_value(value).unwrap_or(Value::Null)
}

/// Write a spec's YAML rendering to `path`.
pub fn save_yaml_file(spec: &DesignSpec, path: &Path) -> Result<(), SpecError> {
    debug!(path = %path.display(), module = %spec.module_name, "writing design spec");
    let content = to_yaml(spec)?;
    std::fs::write(path, content)?;
    Ok(())
}
