//! Base for every configurable object: a name plus environment variables.

use super::environment::EnvironmentVariables;
use super::errors::DslError;
use crate::validation::{Validate, ValidationContext, rules};
use serde::Serialize;

/// Name and environment shared by every configurable object
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NamedEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(skip_serializing_if = "EnvironmentVariables::is_empty")]
    environment_variables: EnvironmentVariables,
}

impl NamedEntity {
    /// Creates an unnamed entity; the name is expected to be set later.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a named entity.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `name` is empty.
    pub fn named(name: impl Into<String>) -> Result<Self, DslError> {
        let mut entity = Self::new();
        entity.set_name(name)?;
        Ok(entity)
    }

    /// Entity name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the name once.
    ///
    /// The identifier syntax is only checked at finalize.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `name` is empty or a different
    /// name was already set.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), DslError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DslError::invalid("name", "name cannot be empty"));
        }
        match &self.name {
            Some(current) if *current != name => Err(DslError::invalid(
                "name",
                format!("name is already '{current}' and cannot be changed to '{name}'"),
            )),
            _ => {
                self.name = Some(name);
                Ok(())
            }
        }
    }

    /// Environment variables, in insertion order.
    #[must_use]
    pub fn environment_variables(&self) -> &EnvironmentVariables {
        &self.environment_variables
    }

    pub(crate) fn environment_variables_mut(&mut self) -> &mut EnvironmentVariables {
        &mut self.environment_variables
    }
}

impl Validate for NamedEntity {
    fn validate(&self, ctx: &mut ValidationContext) {
        rules::check_name(ctx, "name", self.name());
        self.environment_variables.validate(ctx);
    }
}

/// Access to the [`NamedEntity`] embedded in a configurable object
pub trait Named {
    /// Embedded entity.
    fn entity(&self) -> &NamedEntity;

    /// Embedded entity, mutably.
    fn entity_mut(&mut self) -> &mut NamedEntity;

    /// Name, if set.
    fn name(&self) -> Option<&str> {
        self.entity().name()
    }

    /// Sets the name once.
    ///
    /// # Errors
    ///
    /// See [`NamedEntity::set_name`].
    fn set_name(&mut self, name: impl Into<String>) -> Result<&mut Self, DslError> {
        self.entity_mut().set_name(name)?;
        Ok(self)
    }

    /// Environment variables, in insertion order.
    fn environment_variables(&self) -> &EnvironmentVariables {
        self.entity().environment_variables()
    }

    /// Inserts or overwrites an environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `key` is empty.
    fn set_environment_variable(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        encrypted: bool,
    ) -> Result<&mut Self, DslError> {
        self.entity_mut()
            .environment_variables_mut()
            .set(key, value, encrypted)?;
        Ok(self)
    }

    /// Inserts or overwrites a plain environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `key` is empty.
    fn environment_variable(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, DslError> {
        self.set_environment_variable(key, value, false)
    }

    /// Inserts or overwrites an encrypted environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `key` is empty.
    fn secure_environment_variable(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, DslError> {
        self.set_environment_variable(key, value, true)
    }
}

impl Named for NamedEntity {
    fn entity(&self) -> &NamedEntity {
        self
    }

    fn entity_mut(&mut self) -> &mut NamedEntity {
        self
    }
}
