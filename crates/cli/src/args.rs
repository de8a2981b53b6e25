// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argument parsing helpers shared across subcommands: the polymorphic
//! file-list normalization (§4.6) and local `FromStr`-style parsers for the
//! status enums that, unlike [`rtlforge_core::Platform`], don't carry one.

use rtlforge_core::{ConstraintsMode, Platform, SimMode, SimProfile};

pub fn parse_platform(raw: &str) -> Result<Platform, String> {
    Platform::parse(raw).ok_or_else(|| format!("unrecognized platform: {raw}"))
}

/// Normalize a tool-call argument that may arrive as a JSON array of
/// strings (`'["a.v", "b.v"]'`) or as a single bare path (`"a.v"`).
/// Agents calling the façade are inconsistent about which shape they send;
/// every command that takes a file list accepts both.
pub fn normalize_file_list(raw: &str) -> Vec<String> {
    if let Ok(values) = serde_json::from_str::<Vec<String>>(raw) {
        return values;
    }
    vec![raw.to_string()]
}

pub fn parse_sim_mode(raw: &str) -> Result<SimMode, String> {
    match raw {
        "rtl" => Ok(SimMode::Rtl),
        "post_synth" | "post-synth" => Ok(SimMode::PostSynth),
        other => Err(format!("unrecognized sim mode: {other}")),
    }
}

pub fn parse_sim_profile(raw: &str) -> Result<SimProfile, String> {
    match raw {
        "auto" => Ok(SimProfile::Auto),
        "pinned" => Ok(SimProfile::Pinned),
        "compat" => Ok(SimProfile::Compat),
        other => Err(format!("unrecognized sim profile: {other}")),
    }
}

pub fn parse_constraints_mode(raw: &str) -> Result<ConstraintsMode, String> {
    match raw {
        "strict" => Ok(ConstraintsMode::Strict),
        "auto" => Ok(ConstraintsMode::Auto),
        "bypass" => Ok(ConstraintsMode::Bypass),
        other => Err(format!("unrecognized constraints mode: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_file_list_parses_json_array() {
        assert_eq!(
            normalize_file_list(r#"["a.v", "b.v"]"#),
            vec!["a.v".to_string(), "b.v".to_string()]
        );
    }

    #[test]
    fn normalize_file_list_wraps_bare_path() {
        assert_eq!(normalize_file_list("a.v"), vec!["a.v".to_string()]);
    }

    #[test]
    fn normalize_file_list_wraps_non_array_json() {
        assert_eq!(normalize_file_list("42"), vec!["42".to_string()]);
    }

    #[test]
    fn parse_sim_mode_accepts_both_spellings() {
        assert!(matches!(parse_sim_mode("post_synth"), Ok(SimMode::PostSynth)));
        assert!(matches!(parse_sim_mode("post-synth"), Ok(SimMode::PostSynth)));
        assert!(parse_sim_mode("bogus").is_err());
    }

    #[test]
    fn parse_constraints_mode_round_trips_known_values() {
        assert!(matches!(parse_constraints_mode("strict"), Ok(ConstraintsMode::Strict)));
        assert!(matches!(parse_constraints_mode("auto"), Ok(ConstraintsMode::Auto)));
        assert!(matches!(parse_constraints_mode("bypass"), Ok(ConstraintsMode::Bypass)));
    }
}
