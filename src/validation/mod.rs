//! Constraint engine.
//!
//! Every configurable entity implements [`Validate`] by walking its own
//! fields in declaration order and handing each value to a rule from
//! [`rules`]. Rules never stop the walk: they record a [`Violation`] in the
//! shared [`ValidationContext`], so one pass yields the complete, stably
//! ordered list of problems in a job graph.

pub mod rules;

use serde::Serialize;
use std::fmt;

/// Catalogue of the constraints the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// A required field is missing or empty
    RequiredField,
    /// A name does not follow the host identifier syntax
    NameSyntax,
    /// `run_instance_count` is neither a non-negative integer nor `"all"`
    RunInstanceCount,
    /// Two fields that must not be set together are both set
    MutuallyExclusive,
    /// The same key appears twice in a keyed collection
    DuplicateKey,
}

/// Whether a constraint looks at one field or at several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintClass {
    /// Type or range check on a single field
    Field,
    /// Check spanning several fields or nested entities
    CrossField,
}

impl Constraint {
    /// All constraints, in the order they are documented.
    pub const ALL: [Constraint; 5] = [
        Self::RequiredField,
        Self::NameSyntax,
        Self::RunInstanceCount,
        Self::MutuallyExclusive,
        Self::DuplicateKey,
    ];

    /// Stable identifier used in reports.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::RequiredField => "required-field",
            Self::NameSyntax => "name-syntax",
            Self::RunInstanceCount => "run-instance-count",
            Self::MutuallyExclusive => "mutually-exclusive",
            Self::DuplicateKey => "duplicate-key",
        }
    }

    /// Class of the constraint.
    #[must_use]
    pub fn class(self) -> ConstraintClass {
        match self {
            Self::RequiredField | Self::NameSyntax | Self::RunInstanceCount => {
                ConstraintClass::Field
            }
            Self::MutuallyExclusive | Self::DuplicateKey => ConstraintClass::CrossField,
        }
    }

    /// One-line description of the rule.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::RequiredField => "field must be present and non-empty",
            Self::NameSyntax => {
                "names use letters, digits, '-', '_' and '.', do not start with '.', and respect the length limit"
            }
            Self::RunInstanceCount => "run instance count is a non-negative integer or \"all\"",
            Self::MutuallyExclusive => "elastic_profile_id and resources cannot both be set",
            Self::DuplicateKey => "keys are unique within their collection",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single broken rule, located by its field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted path of the offending field, e.g. `job.tasks[0].command_line`
    pub path: String,
    /// Rule that was broken
    pub constraint: Constraint,
    /// Human-readable reason
    pub reason: String,
}

impl Violation {
    /// Creates a violation.
    pub fn new(path: impl Into<String>, constraint: Constraint, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            constraint,
            reason: reason.into(),
        }
    }

    /// Returns true for the duplicate-key class of violations.
    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        self.constraint == Constraint::DuplicateKey
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.path, self.reason, self.constraint)
    }
}

/// Trait for entities the constraint engine can walk
pub trait Validate {
    /// Reports every violation of this entity and its children into `ctx`.
    fn validate(&self, ctx: &mut ValidationContext);

    /// Runs a fresh pass with default limits and returns what it found.
    fn violations(&self) -> Vec<Violation> {
        let mut ctx = ValidationContext::new();
        self.validate(&mut ctx);
        ctx.into_violations()
    }
}

/// Path stack and violation accumulator for one validation pass
#[derive(Debug)]
pub struct ValidationContext {
    path: Vec<String>,
    violations: Vec<Violation>,
    max_name_length: usize,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationContext {
    /// Creates a context with the default name-length limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_name_length(rules::DEFAULT_MAX_NAME_LENGTH)
    }

    /// Creates a context with a custom name-length limit.
    #[must_use]
    pub fn with_max_name_length(max_name_length: usize) -> Self {
        Self {
            path: Vec::new(),
            violations: Vec::new(),
            max_name_length,
        }
    }

    /// Longest accepted name.
    #[must_use]
    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    /// Pushes a path component
    pub fn push(&mut self, component: impl Into<String>) {
        self.path.push(component.into());
    }

    /// Pops a path component
    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Gets the current path as a string
    #[must_use]
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Runs `f` with `component` pushed onto the path.
    pub fn scoped<F>(&mut self, component: impl Into<String>, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push(component);
        f(self);
        self.pop();
    }

    /// Records a violation on `field` below the current path.
    pub fn report(&mut self, field: &str, constraint: Constraint, reason: impl Into<String>) {
        let path = match (self.path.is_empty(), field.is_empty()) {
            (true, _) => field.to_string(),
            (false, true) => self.path(),
            (false, false) => format!("{}.{field}", self.path()),
        };
        self.violations.push(Violation::new(path, constraint, reason));
    }

    /// Violations recorded so far.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns true when nothing has been reported.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consumes the context, returning its violations.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_context() {
        let ctx = ValidationContext::new();
        assert_eq!(ctx.path(), "");
        assert!(ctx.is_valid());
        assert_eq!(ctx.max_name_length(), rules::DEFAULT_MAX_NAME_LENGTH);
    }

    #[test]
    fn test_validation_context_with_path() {
        let mut ctx = ValidationContext::new();
        ctx.push("job");
        ctx.push("tasks[0]");
        assert_eq!(ctx.path(), "job.tasks[0]");
        ctx.pop();
        assert_eq!(ctx.path(), "job");
    }

    #[test]
    fn test_scoped_restores_path() {
        let mut ctx = ValidationContext::new();
        ctx.scoped("job", |ctx| {
            ctx.scoped("tabs[1]", |ctx| {
                ctx.report("name", Constraint::RequiredField, "name is required");
            });
            ctx.report("", Constraint::MutuallyExclusive, "both set");
        });

        assert_eq!(ctx.path(), "");
        let paths: Vec<_> = ctx.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, ["job.tabs[1].name", "job"]);
    }

    #[test]
    fn test_report_at_root() {
        let mut ctx = ValidationContext::new();
        ctx.report("name", Constraint::NameSyntax, "bad");
        assert_eq!(ctx.into_violations()[0].path, "name");
    }

    #[test]
    fn test_constraint_classes() {
        assert_eq!(Constraint::RequiredField.class(), ConstraintClass::Field);
        assert_eq!(Constraint::RunInstanceCount.class(), ConstraintClass::Field);
        assert_eq!(Constraint::DuplicateKey.class(), ConstraintClass::CrossField);
        assert_eq!(Constraint::MutuallyExclusive.class(), ConstraintClass::CrossField);
    }

    #[test]
    fn test_constraint_catalogue_is_described() {
        for constraint in Constraint::ALL {
            assert!(!constraint.code().is_empty());
            assert!(!constraint.description().is_empty());
            assert_eq!(constraint.to_string(), constraint.code());
        }
    }

    #[test]
    fn test_violation_display() {
        let violation = Violation::new("job.properties", Constraint::DuplicateKey, "'version' repeated");
        assert_eq!(
            violation.to_string(),
            "job.properties: 'version' repeated [duplicate-key]"
        );
        assert!(violation.is_duplicate_key());
    }
}
