// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YAML spec parsing (§4.7), grounded on
//! `original_source/src/tools/spec_manager.py::parse_yaml_spec`.
//!
//! A spec file has exactly one top-level key: the module name. Everything
//! else lives under it.

use std::path::Path;

use chrono::{DateTime, Utc};
use rtlforge_core::{DesignSpec, PortDirection, PortSpec, PortWidth};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::SpecError;

#[derive(Debug, Deserialize)]
struct RawPort {
    #[serde(default)]
    name: String,
    #[serde(default = "default_direction")]
    direction: String,
    #[serde(default = "default_port_type", rename = "type")]
    r#type: String,
    #[serde(default)]
    width: Option<Value>,
    #[serde(default)]
    description: String,
}

fn default_direction() -> String {
    "input".to_string()
}

fn default_port_type() -> String {
    "logic".to_string()
}

#[derive(Debug, Default, Deserialize)]
struct RawSpecBody {
    #[serde(default)]
    description: String,
    #[serde(default = "default_tech_node")]
    tech_node: String,
    #[serde(default = "default_clock_period")]
    clock_period: Value,
    #[serde(default)]
    ports: Vec<RawPort>,
    #[serde(default)]
    parameters: serde_yaml::Mapping,
    #[serde(default)]
    module_signature: String,
    #[serde(default)]
    behavioral_description: String,
    #[serde(default)]
    sample_io: Option<serde_yaml::Mapping>,
    #[serde(default)]
    sample_usage: Option<serde_yaml::Mapping>,
    #[serde(default)]
    created_at: Option<String>,
}

fn default_tech_node() -> String {
    "SkyWater 130HD".to_string()
}

fn default_clock_period() -> Value {
    Value::String("10ns".to_string())
}

/// Parse a YAML spec document into a [`DesignSpec`].
pub fn parse_yaml_spec(yaml_content: &str) -> Result<DesignSpec, SpecError> {
    if yaml_content.trim().is_empty() {
        return Err(SpecError::Empty);
    }
    let document: serde_yaml::Mapping = serde_yaml::from_str(yaml_content)?;
    let (key, value) = document.into_iter().next().ok_or(SpecError::Empty)?;
    let module_name = key
        .as_str()
        .ok_or_else(|| SpecError::Invalid("top-level key must be a string".to_string()))?
        .to_string();

    let body: RawSpecBody = serde_yaml::from_value(value)?;

    let clock_period_ns = parse_clock_period(&body.clock_period)?;

    let mut ports = Vec::with_capacity(body.ports.len());
    for raw in body.ports {
        ports.push(to_port_spec(raw)?);
    }

    let parameters = mapping_to_json_map(&body.parameters)?;
    let sample_io = body
        .sample_io
        .or(body.sample_usage)
        .map(|m| mapping_to_json_map(&m))
        .transpose()?
        .unwrap_or_default();

    let created_at = body
        .created_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Ok(DesignSpec {
        module_name,
        description: body.description,
        tech_node: body.tech_node,
        clock_period_ns,
        ports,
        parameters,
        module_signature: body.module_signature,
        behavioral_description: body.behavioral_description,
        sample_io,
        created_at,
    })
}

/// Load a spec from disk.
pub fn load_yaml_file(path: &Path) -> Result<DesignSpec, SpecError> {
    debug!(path = %path.display(), "loading design spec");
    let content = std::fs::read_to_string(path)?;
    parse_yaml_spec(&content)
}

fn parse_clock_period(value: &Value) -> Result<f64, SpecError> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim().trim_end_matches("ns").trim();
            trimmed
                .parse::<f64>()
                .map_err(|_| SpecError::Invalid(format!("invalid clock_period: {s}")))
        }
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| SpecError::Invalid("invalid clock_period".to_string())),
        _ => Err(SpecError::Invalid(
            "clock_period must be a string or number".to_string(),
        )),
    }
}

fn to_port_spec(raw: RawPort) -> Result<PortSpec, SpecError> {
    let direction = match raw.direction.to_ascii_lowercase().as_str() {
        "input" => PortDirection::Input,
        "output" => PortDirection::Output,
        "inout" => PortDirection::Inout,
        other => return Err(SpecError::InvalidDirection(other.to_string())),
    };

    let width = raw.width.and_then(|v| match v {
        Value::Number(n) => n.as_u64().map(|u| PortWidth::Literal(u as u32)),
        Value::String(s) => Some(PortWidth::Symbolic(s)),
        _ => None,
    });

    Ok(PortSpec {
        name: raw.name,
        direction,
        r#type: raw.r#type,
        width,
        description: raw.description,
    })
}

fn mapping_to_json_map(
    mapping: &serde_yaml::Mapping,
) -> Result<serde_json::Map<String, serde_json::Value>, SpecError> {
    let value = serde_json::to_value(mapping)
        .map_err(|e| SpecError::Invalid(format!("could not convert mapping to JSON: {e}")))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Ok(serde_json::Map::new()),
    }
}
