// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The design spec data model: a parsed YAML module description.
//!
//! Parsing, validation, and on-disk (de)serialization live in `rtlforge-spec`;
//! this module only defines the shape so that crates which just need to read
//! a resolved `DesignSpec` (the simulation pipeline, the synthesis guardrail)
//! don't have to depend on the YAML parser.

use serde::{Deserialize, Serialize};

/// Port direction, as written in the YAML spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
    Inout,
}

impl PortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
            PortDirection::Inout => "inout",
        }
    }
}

/// A port's bit width: either a literal integer, or a symbolic Verilog
/// expression (e.g. `"WIDTH-1:0"`) used when the module is parameterized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortWidth {
    Literal(u32),
    Symbolic(String),
}

impl PortWidth {
    /// Render the `[msb:0]` (or `[expr]`) prefix used in a module signature,
    /// empty for a scalar (width 1) literal port.
    pub fn signature_prefix(&self) -> String {
        match self {
            PortWidth::Literal(w) if *w > 1 => format!("[{}:0] ", w - 1),
            PortWidth::Literal(_) => String::new(),
            PortWidth::Symbolic(expr) => format!("[{}] ", expr),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    pub direction: PortDirection,
    #[serde(default = "default_port_type")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<PortWidth>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

fn default_port_type() -> String {
    "logic".to_string()
}

impl PortSpec {
    pub fn is_clock_candidate(&self) -> bool {
        self.direction == PortDirection::Input
            && matches!(self.name.to_ascii_lowercase().as_str(), "clk" | "clock" | "clk_i")
    }
}

/// A fully parsed design specification: the single top-level YAML key names
/// the module.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignSpec {
    pub module_name: String,
    pub description: String,
    pub tech_node: String,
    pub clock_period_ns: f64,
    pub ports: Vec<PortSpec>,
    pub parameters: serde_json::Map<String, serde_json::Value>,
    pub module_signature: String,
    pub behavioral_description: String,
    pub sample_io: serde_json::Map<String, serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl DesignSpec {
    /// The port chosen as the clock for SDC generation: the first port named
    /// `clk`/`clock`/`clk_i`, if any.
    pub fn clock_port(&self) -> Option<&PortSpec> {
        self.ports.iter().find(|p| p.is_clock_candidate())
    }

    pub fn has_clock_port(&self) -> bool {
        self.clock_port().is_some()
    }

    /// Build the Verilog module signature, unless one was supplied verbatim
    /// in the spec.
    pub fn generate_module_signature(&self) -> String {
        if !self.module_signature.is_empty() {
            return self.module_signature.clone();
        }

        let param_str = if self.parameters.is_empty() {
            String::new()
        } else {
            let params: Vec<String> = self
                .parameters
                .iter()
                .map(|(k, v)| format!("parameter {} = {}", k, v))
                .collect();
            format!(" #(\n    {}\n)", params.join(",\n    "))
        };

        let port_lines: Vec<String> = self
            .ports
            .iter()
            .map(|p| {
                let width = p.width.as_ref().map(|w| w.signature_prefix()).unwrap_or_default();
                format!("    {} {} {}{}", p.direction.as_str(), p.r#type, width, p.name)
            })
            .collect();

        format!(
            "module {}{} (\n{}\n);",
            self.module_name,
            param_str,
            port_lines.join(",\n")
        )
    }

    /// Build the SDC constraint string: `create_clock -period <f> [get_ports <clk>]`.
    pub fn generate_sdc(&self) -> String {
        let clock_port = self
            .clock_port()
            .map(|p| p.name.as_str())
            .unwrap_or("clk");
        format!(
            "create_clock -period {} [get_ports {}]",
            self.clock_period_ns, clock_port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec() -> DesignSpec {
        DesignSpec {
            module_name: "counter".to_string(),
            description: "4-bit counter".to_string(),
            tech_node: "SkyWater 130HD".to_string(),
            clock_period_ns: 10.0,
            ports: vec![
                PortSpec {
                    name: "clk".to_string(),
                    direction: PortDirection::Input,
                    r#type: "logic".to_string(),
                    width: None,
                    description: String::new(),
                },
                PortSpec {
                    name: "count".to_string(),
                    direction: PortDirection::Output,
                    r#type: "logic".to_string(),
                    width: Some(PortWidth::Literal(4)),
                    description: String::new(),
                },
            ],
            parameters: serde_json::Map::new(),
            module_signature: String::new(),
            behavioral_description: String::new(),
            sample_io: serde_json::Map::new(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn clock_port_detection() {
        let spec = sample_spec();
        assert!(spec.has_clock_port());
        assert_eq!(spec.clock_port().unwrap().name, "clk");
    }

    #[test]
    fn generate_sdc_uses_detected_clock_and_period() {
        let spec = sample_spec();
        assert_eq!(
            spec.generate_sdc(),
            "create_clock -period 10 [get_ports clk]"
        );
    }

    #[test]
    fn generate_module_signature_includes_width_bracket() {
        let spec = sample_spec();
        let sig = spec.generate_module_signature();
        assert!(sig.contains("module counter ("));
        assert!(sig.contains("[3:0] count"));
    }

    #[test]
    fn port_width_symbolic_renders_as_is() {
        let width = PortWidth::Symbolic("WIDTH-1:0".to_string());
        assert_eq!(width.signature_prefix(), "[WIDTH-1:0] ");
    }
}
