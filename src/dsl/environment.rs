//! Environment variable handling for jobs.
//!
//! Variables are kept in insertion order so rendered documents are
//! reproducible. Setting an existing key replaces its value (and its
//! plain/encrypted intent) in place.

use super::config_property::{self, ConfigProperty};
use super::errors::DslError;
use crate::validation::{Validate, ValidationContext, rules};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

/// Ordered environment variable collection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvironmentVariables {
    vars: Vec<ConfigProperty>,
}

impl EnvironmentVariables {
    /// Creates a new empty environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites a variable.
    ///
    /// A new key is appended; an existing key keeps its position.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `key` is empty.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        encrypted: bool,
    ) -> Result<&mut Self, DslError> {
        let property = ConfigProperty::new(key, value, encrypted)?;
        match self.vars.iter().position(|var| var.is(property.key())) {
            Some(index) => {
                tracing::trace!(key = property.key(), "overwriting environment variable");
                self.vars[index] = property;
            }
            None => self.vars.push(property),
        }
        Ok(self)
    }

    /// Gets a variable by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigProperty> {
        config_property::find(&self.vars, key)
    }

    /// Returns an iterator over all variables, in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, ConfigProperty> {
        self.vars.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, ConfigProperty> {
        self.vars.iter_mut()
    }

    /// Returns the number of variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if the environment is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<'a> IntoIterator for &'a EnvironmentVariables {
    type Item = &'a ConfigProperty;
    type IntoIter = std::slice::Iter<'a, ConfigProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Wire form of one variable: `{name, value | encrypted_value}`
struct Entry<'a>(&'a ConfigProperty);

impl Serialize for Entry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize_as(serializer, "EnvironmentVariable", "name")
    }
}

impl Serialize for EnvironmentVariables {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.vars.len()))?;
        for var in &self.vars {
            seq.serialize_element(&Entry(var))?;
        }
        seq.end()
    }
}

impl Validate for EnvironmentVariables {
    fn validate(&self, ctx: &mut ValidationContext) {
        for var in &self.vars {
            ctx.scoped(format!("environment_variables[{}]", var.key()), |ctx| {
                var.validate(ctx);
            });
        }
        rules::check_unique_keys(
            ctx,
            "environment_variables",
            self.vars.iter().map(ConfigProperty::key),
        );
    }
}
