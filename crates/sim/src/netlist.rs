// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Netlist scanning helpers for the stdcell substitution decisions in §4.3
//! step 1: whether it's safe to swap the asap7 sequential library for the
//! bundled compatibility models, and which sky130hd files a gate-level
//! simulation actually needs.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

fn instance_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^\s*([A-Za-z_][A-Za-z0-9_]*)\s+[A-Za-z_][A-Za-z0-9_$\[\]]*\s*\(")
            .expect("valid regex")
    })
}

fn module_decl_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^\s*module\s+([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex"))
}

const VERILOG_KEYWORDS: &[&str] = &[
    "module", "endmodule", "input", "output", "inout", "wire", "reg", "assign", "always",
    "initial", "begin", "end", "if", "else", "parameter", "localparam", "function",
    "endfunction", "task", "endtask", "generate", "endgenerate", "case", "endcase", "posedge",
    "negedge", "specify", "endspecify", "supply0", "supply1",
];

/// Every module-type name a gate-level netlist instantiates, excluding
/// Verilog keywords that the instance regex can incidentally match.
pub fn referenced_module_types(netlist: &str) -> BTreeSet<String> {
    instance_pattern()
        .captures_iter(netlist)
        .map(|caps| caps[1].to_string())
        .filter(|name| !VERILOG_KEYWORDS.contains(&name.as_str()))
        .collect()
}

/// Every module name declared (`module NAME ...`) across `contents`.
pub fn defined_module_types<'a>(contents: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    contents
        .into_iter()
        .flat_map(|text| module_decl_pattern().captures_iter(text).map(|c| c[1].to_string()))
        .collect()
}

/// §4.3 step 1's asap7 compat-profile safety check: substituting the
/// sequential library for the compat models is safe only if every module
/// type the netlist references is still defined without it.
pub fn compat_substitution_is_safe(netlist: &str, defined_without_seq: &BTreeSet<String>) -> bool {
    referenced_module_types(netlist)
        .iter()
        .all(|name| defined_without_seq.contains(name))
}

/// §4.3 step 1's sky130hd restriction: when the netlist references any
/// module under the library prefix, narrow the include list to just those
/// files; an empty result means "no restriction, keep the full set".
pub fn restrict_to_referenced(prefix: &str, referenced: &BTreeSet<String>) -> BTreeSet<String> {
    referenced.iter().filter(|name| name.starts_with(prefix)).cloned().collect()
}
