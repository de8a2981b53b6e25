// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compile-error cell extraction and failure-type classification (§4.3
//! steps 3 and 5).

use regex::Regex;
use rtlforge_core::FailureType;
use std::sync::OnceLock;

fn unresolved_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"Unknown module type:\s*([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex"),
            Regex::new(r"module\s+([A-Za-z_][A-Za-z0-9_]*)\s+is undefined").expect("valid regex"),
            Regex::new(r"Unresolved module(?:\s+reference)?:?\s+([A-Za-z_][A-Za-z0-9_]*)")
                .expect("valid regex"),
        ]
    })
}

/// Extract unresolved cell/module names from compiler stderr (§4.3 step 3,
/// testable property 3), sorted and deduplicated.
pub fn extract_unresolved_cells(stderr: &str) -> Vec<String> {
    let mut found = std::collections::BTreeSet::new();
    for pattern in unresolved_patterns() {
        for caps in pattern.captures_iter(stderr) {
            found.insert(caps[1].to_string());
        }
    }
    found.into_iter().collect()
}

struct ClassifierRule {
    kind: FailureType,
    pattern: &'static str,
}

fn classifier_rules() -> &'static [(FailureType, Regex)] {
    static RULES: OnceLock<Vec<(FailureType, Regex)>> = OnceLock::new();
    RULES.get_or_init(|| {
        let defs = [
            ClassifierRule {
                kind: FailureType::Timeout,
                pattern: r"(?i)timeout",
            },
            ClassifierRule {
                kind: FailureType::Fatal,
                pattern: r"(?i)(\$fatal|\bfatal\b)",
            },
            ClassifierRule {
                kind: FailureType::Assertion,
                pattern: r"(?i)\b(assert|assertion)\b",
            },
            ClassifierRule {
                kind: FailureType::Generic,
                pattern: r"(?i)\b(error|fail)\b",
            },
        ];
        defs.into_iter()
            .map(|d| (d.kind, Regex::new(d.pattern).expect("valid regex")))
            .collect()
    })
}

/// Classify a failing simulation by scanning stdout then stderr for the
/// documented keyword families, in priority order (§4.3 step 5). Returns
/// the failure type and the first matching line, if any.
pub fn classify_failure(stdout: &str, stderr: &str) -> Option<(FailureType, String)> {
    let combined: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    for (kind, pattern) in classifier_rules() {
        for line in &combined {
            if pattern.is_match(line) {
                return Some((*kind, line.to_string()));
            }
        }
    }
    None
}
