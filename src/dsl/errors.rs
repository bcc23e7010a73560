//! Error types for the configuration DSL

use crate::validation::Violation;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while building or finalizing a configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DslError {
    /// A single field failed its local structural constraint
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig {
        /// Wire name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Finalize found one or more violations
    #[error("Validation failed: {0}")]
    ValidationFailed(Violations),

    /// The secrets backend refused a value
    #[error("Secrets backend rejected '{key}': {reason}")]
    Secrets {
        /// Key of the rejected property.
        key: String,
        /// Reason given by the backend.
        reason: String,
    },

    /// Rendering the document failed
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl DslError {
    /// Shorthand for [`DslError::InvalidConfig`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Violations carried by a [`DslError::ValidationFailed`], empty otherwise.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::ValidationFailed(violations) => violations.as_slice(),
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for DslError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for DslError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Ordered list of violations reported by one finalize pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// Returns the violations in traversal order.
    #[must_use]
    pub fn as_slice(&self) -> &[Violation] {
        &self.0
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the violations.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self(violations)
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.0.len())?;
        for violation in &self.0 {
            write!(f, "; {violation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Constraint;

    #[test]
    fn test_invalid_config_display() {
        let err = DslError::invalid("timeout", "must not be negative, got -1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'timeout': must not be negative, got -1"
        );
        assert!(err.violations().is_empty());
    }

    #[test]
    fn test_validation_failed_lists_every_violation() {
        let violations = Violations::from(vec![
            Violation::new("job.name", Constraint::RequiredField, "name is required"),
            Violation::new("job.tabs", Constraint::DuplicateKey, "'logs' appears more than once"),
        ]);
        let err = DslError::ValidationFailed(violations);

        let message = err.to_string();
        assert!(message.contains("2 violation(s)"));
        assert!(message.contains("job.name"));
        assert!(message.contains("'logs'"));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_secrets_error_names_key() {
        let err = DslError::Secrets {
            key: "TOKEN".to_string(),
            reason: "vault sealed".to_string(),
        };
        assert!(err.to_string().contains("TOKEN"));
        assert!(err.to_string().contains("vault sealed"));
    }
}
