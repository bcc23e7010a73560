//! Validation rules for common patterns
//!
//! Each rule inspects one value (or one pair of values) and reports into the
//! context instead of returning early.

use super::{Constraint, ValidationContext};
use crate::dsl::RunInstanceCount;
use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;

/// Host limit on identifier length.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 255;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-][A-Za-z0-9_\-.]*$").expect("name pattern compiles"));

/// Returns true if `name` is a well-formed identifier no longer than `max_len`.
#[must_use]
pub fn is_valid_name(name: &str, max_len: usize) -> bool {
    name.len() <= max_len && NAME_PATTERN.is_match(name)
}

/// Validates that a required string field is not empty
pub fn check_required(ctx: &mut ValidationContext, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        ctx.report(field, Constraint::RequiredField, format!("{field} is required"));
        return false;
    }
    true
}

/// Validates that a name is present and follows the identifier syntax
pub fn check_name(ctx: &mut ValidationContext, field: &str, name: Option<&str>) {
    let Some(name) = name else {
        ctx.report(field, Constraint::RequiredField, format!("{field} is required"));
        return;
    };
    if !check_required(ctx, field, name) {
        return;
    }

    let max = ctx.max_name_length();
    if name.len() > max {
        ctx.report(
            field,
            Constraint::NameSyntax,
            format!("'{name}' is too long: max {max} characters, got {}", name.len()),
        );
    } else if !NAME_PATTERN.is_match(name) {
        ctx.report(
            field,
            Constraint::NameSyntax,
            format!("'{name}' may only contain letters, digits, '-', '_' and '.', and must not start with '.'"),
        );
    }
}

/// Validates a run instance count
pub fn check_run_instance_count(
    ctx: &mut ValidationContext,
    field: &str,
    count: Option<&RunInstanceCount>,
) {
    let Some(count) = count.filter(|count| !count.is_valid()) else {
        return;
    };
    let reason = match count {
        RunInstanceCount::Count(n) => format!("must not be negative, got {n}"),
        other => format!("expected a non-negative integer or \"all\", got \"{other}\""),
    };
    ctx.report(field, Constraint::RunInstanceCount, reason);
}

/// Validates that two optional fields are not set at the same time
pub fn check_exclusive(
    ctx: &mut ValidationContext,
    field: &str,
    other: &str,
    field_set: bool,
    other_set: bool,
) {
    if field_set && other_set {
        ctx.report(
            field,
            Constraint::MutuallyExclusive,
            format!("{field} and {other} are mutually exclusive, set only one of them"),
        );
    }
}

/// Validates that keys are unique within a collection
///
/// Each repeated key is reported once, however often it repeats.
pub fn check_unique_keys<'a, I>(ctx: &mut ValidationContext, field: &str, keys: I)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = AHashSet::new();
    let mut reported = AHashSet::new();
    for key in keys {
        if !seen.insert(key) && reported.insert(key) {
            ctx.report(
                field,
                Constraint::DuplicateKey,
                format!("'{key}' appears more than once"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("build", true)]
    #[case("build-and_test.1", true)]
    #[case("_private", true)]
    #[case(".hidden", false)]
    #[case("has space", false)]
    #[case("", false)]
    #[case("ümlaut", false)]
    fn test_is_valid_name(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_valid_name(name, DEFAULT_MAX_NAME_LENGTH), expected);
    }

    #[test]
    fn test_check_name_missing() {
        let mut ctx = ValidationContext::new();
        check_name(&mut ctx, "name", None);
        let violations = ctx.into_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, Constraint::RequiredField);
    }

    #[test]
    fn test_check_name_too_long() {
        let mut ctx = ValidationContext::with_max_name_length(4);
        check_name(&mut ctx, "name", Some("build"));
        let violations = ctx.into_violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, Constraint::NameSyntax);
        assert!(violations[0].reason.contains("too long"));
    }

    #[test]
    fn test_check_required_blank() {
        let mut ctx = ValidationContext::new();
        assert!(!check_required(&mut ctx, "path", "   "));
        assert!(check_required(&mut ctx, "path", "out/report.html"));
        assert_eq!(ctx.violations().len(), 1);
    }

    #[rstest]
    #[case(Some(RunInstanceCount::Count(0)), 0)]
    #[case(Some(RunInstanceCount::Count(3)), 0)]
    #[case(Some(RunInstanceCount::All), 0)]
    #[case(None, 0)]
    #[case(Some(RunInstanceCount::Count(-2)), 1)]
    #[case(Some(RunInstanceCount::Other("some".to_string())), 1)]
    fn test_check_run_instance_count(#[case] count: Option<RunInstanceCount>, #[case] expected: usize) {
        let mut ctx = ValidationContext::new();
        check_run_instance_count(&mut ctx, "run_instance_count", count.as_ref());
        assert_eq!(ctx.violations().len(), expected);
    }

    #[test]
    fn test_check_run_instance_count_reasons() {
        let mut ctx = ValidationContext::new();
        check_run_instance_count(&mut ctx, "run_instance_count", Some(&RunInstanceCount::Count(-4)));
        check_run_instance_count(&mut ctx, "run_instance_count", Some(&RunInstanceCount::from("twice")));

        let violations = ctx.into_violations();
        assert_eq!(violations[0].reason, "must not be negative, got -4");
        assert_eq!(violations[1].reason, "expected a non-negative integer or \"all\", got \"twice\"");
    }

    #[test]
    fn test_check_exclusive() {
        let mut ctx = ValidationContext::new();
        check_exclusive(&mut ctx, "a", "b", true, false);
        check_exclusive(&mut ctx, "a", "b", false, false);
        assert!(ctx.is_valid());

        check_exclusive(&mut ctx, "a", "b", true, true);
        assert_eq!(ctx.violations().len(), 1);
        assert_eq!(ctx.violations()[0].constraint, Constraint::MutuallyExclusive);
    }

    #[test]
    fn test_check_unique_keys_reports_each_key_once() {
        let mut ctx = ValidationContext::new();
        check_unique_keys(&mut ctx, "properties", ["a", "b", "a", "a", "b", "c"]);
        let violations = ctx.into_violations();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].reason.contains("'a'"));
        assert!(violations[1].reason.contains("'b'"));
        assert!(violations.iter().all(|v| v.is_duplicate_key()));
    }
}
