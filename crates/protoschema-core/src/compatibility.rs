//! Compatibility checker: classifies a schema diff against an allow-list
//!
//! Every [`NodeDiff`] between two versions whose kind is not explicitly
//! allowed is a violation. An empty violation list means the new version
//! may replace the old one.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::diff::{DiffKind, NodeDiff};
use crate::parser::ast::File;
use crate::parser::parse;
use crate::Result;

/// Allow-list driven compatibility gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityChecker {
    allowed: BTreeSet<DiffKind>,
}

impl CompatibilityChecker {
    pub fn new(allowed: impl IntoIterator<Item = DiffKind>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Nothing is allowed: any difference is a violation
    pub fn strict() -> Self {
        Self::new([])
    }

    pub fn is_allowed(&self, kind: DiffKind) -> bool {
        self.allowed.contains(&kind)
    }

    pub fn allowed(&self) -> impl Iterator<Item = DiffKind> + '_ {
        self.allowed.iter().copied()
    }

    /// Violations only
    pub fn check(&self, before: &File, after: &File) -> Vec<NodeDiff> {
        self.report(before, after).violations
    }

    /// Full classification of every difference
    pub fn report(&self, before: &File, after: &File) -> CompatibilityReport {
        let mut report = CompatibilityReport::default();
        for diff in before.diff(after) {
            if self.is_allowed(diff.kind) {
                report.allowed.push(diff);
            } else {
                debug!(kind = %diff.kind, scope = %diff.scope, "compatibility violation");
                report.violations.push(diff);
            }
        }
        debug!(
            violations = report.violations.len(),
            allowed = report.allowed.len(),
            "checked compatibility"
        );
        report
    }

    /// Parse both texts, then check them
    ///
    /// # Errors
    /// The first `ParseError` of either text; `before` is parsed first.
    pub fn check_sources(&self, before: &str, after: &str) -> Result<CompatibilityReport> {
        let before = parse(before)?;
        let after = parse(after)?;
        Ok(self.report(&before, &after))
    }
}

impl Default for CompatibilityChecker {
    /// New top-level messages are the only non-breaking change
    fn default() -> Self {
        Self::new([DiffKind::MessageAdded])
    }
}

/// Outcome of a compatibility check
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompatibilityReport {
    pub violations: Vec<NodeDiff>,
    pub allowed: Vec<NodeDiff>,
}

impl CompatibilityReport {
    pub fn is_compatible(&self) -> bool {
        self.violations.is_empty()
    }
}

impl std::fmt::Display for CompatibilityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for violation in &self.violations {
            writeln!(f, "error [{}]", violation)?;
        }
        for allowed in &self.allowed {
            writeln!(f, "allowed [{}]", allowed)?;
        }
        if self.is_compatible() {
            write!(f, "compatible ({} allowed changes)", self.allowed.len())
        } else {
            write!(f, "incompatible: {} violation(s)", self.violations.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    const BEFORE: &str = r#"
syntax = "proto3";
package shop;

message Order {
    string id = 1;
    Status status = 2;
}

enum Status {
    STATUS_UNSPECIFIED = 0;
    STATUS_OPEN = 1;
}
"#;

    fn check(after: &str) -> CompatibilityReport {
        CompatibilityChecker::default()
            .check_sources(BEFORE, after)
            .unwrap()
    }

    #[test]
    fn test_message_added_is_compatible() {
        let after = format!("{}\nmessage Refund {{ string order_id = 1; }}\n", BEFORE);
        let report = check(&after);
        assert!(report.is_compatible());
        assert_eq!(report.allowed.len(), 1);
        assert_eq!(report.allowed[0].kind, DiffKind::MessageAdded);
    }

    #[test]
    fn test_message_removed_is_violation() {
        let after = BEFORE.replace("message Order {\n    string id = 1;\n    Status status = 2;\n}", "");
        let report = check(&after);
        assert!(!report.is_compatible());
        assert_eq!(report.violations[0].kind, DiffKind::MessageRemoved);
    }

    #[test]
    fn test_enum_value_renamed_is_violation() {
        let after = BEFORE.replace("STATUS_OPEN", "STATUS_ACTIVE");
        let violations = CompatibilityChecker::default()
            .check(&parse(BEFORE).unwrap(), &parse(&after).unwrap());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, DiffKind::EnumValueNameChanged);
        assert_eq!(violations[0].scope, "Status");
    }

    #[test]
    fn test_identical_and_reformatted_are_compatible() {
        assert!(check(BEFORE).is_compatible());
        let reformatted = format!("// header\n{}", BEFORE.replace("    ", "\t"));
        let report = check(&reformatted);
        assert!(report.is_compatible());
        assert!(report.allowed.is_empty());
    }

    #[test]
    fn test_strict_rejects_additions() {
        let after = format!("{}\nmessage Refund {{}}\n", BEFORE);
        let report = CompatibilityChecker::strict()
            .check_sources(BEFORE, &after)
            .unwrap();
        assert_eq!(report.violations.len(), 1);
    }

    #[test]
    fn test_custom_allow_list() {
        let checker = CompatibilityChecker::new([DiffKind::MessageAdded, DiffKind::EnumValueAdded]);
        assert!(checker.is_allowed(DiffKind::EnumValueAdded));
        assert!(!checker.is_allowed(DiffKind::FieldRemoved));

        let after = BEFORE.replace("STATUS_OPEN = 1;", "STATUS_OPEN = 1;\n    STATUS_CLOSED = 2;");
        assert!(checker.check_sources(BEFORE, &after).unwrap().is_compatible());
        assert!(!CompatibilityChecker::default()
            .check_sources(BEFORE, &after)
            .unwrap()
            .is_compatible());
    }

    #[test]
    fn test_check_sources_propagates_parse_errors() {
        let err = CompatibilityChecker::default()
            .check_sources(BEFORE, "message Foo {}")
            .unwrap_err();
        assert_eq!(err, ParseError::MissingSyntax);
    }

    #[test]
    fn test_report_display() {
        let after = BEFORE.replace("STATUS_OPEN", "STATUS_ACTIVE");
        let text = check(&after).to_string();
        assert!(text.contains("error [enum_value_name_changed in Status"));
        assert!(text.ends_with("incompatible: 1 violation(s)"));
    }

    #[test]
    fn test_report_serializes_kinds_as_snake_case() {
        let after = format!("{}\nmessage Refund {{}}\n", BEFORE);
        let json = serde_json::to_value(check(&after)).unwrap();
        assert_eq!(json["allowed"][0]["kind"], "message_added");
        assert_eq!(json["violations"], serde_json::json!([]));
    }

    #[test]
    fn test_check_determinism_100_iterations() {
        let after = BEFORE.replace("string id = 1;", "int64 id = 1;");
        let first = check(&after);
        for i in 0..100 {
            assert_eq!(first, check(&after), "Determinism failure at iteration {}", i);
        }
    }
}
