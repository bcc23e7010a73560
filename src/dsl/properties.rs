//! Properties published by a job, extracted from XML artifacts

#![allow(clippy::return_self_not_must_use)]

use super::collection::{Collection, Element, require};
use super::errors::DslError;
use crate::validation::{Validate, ValidationContext, rules};
use serde::Serialize;

/// Properties of a job; names are unique and never overwritten
pub type Properties = Collection<Property>;

/// A value read with an XPath expression from an artifact file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Artifact file to read from
    pub source: String,
    /// XPath selecting the value
    pub xpath: String,
}

impl Property {
    /// Exact name match
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

impl Validate for Property {
    fn validate(&self, ctx: &mut ValidationContext) {
        rules::check_name(ctx, "name", Some(&self.name));
        rules::check_required(ctx, "source", &self.source);
        rules::check_required(ctx, "xpath", &self.xpath);
    }
}

impl Element for Property {
    const FIELD: &'static str = "properties";

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl Collection<Property> {
    /// Adds a property
    ///
    /// Adding a name twice keeps both entries; finalize reports the
    /// duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if any field is empty.
    pub fn property(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        xpath: impl Into<String>,
    ) -> Result<&mut Property, DslError> {
        let property = Property {
            name: name.into(),
            source: source.into(),
            xpath: xpath.into(),
        };
        require("name", &property.name)?;
        require("source", &property.source)?;
        require("xpath", &property.xpath)?;
        tracing::trace!(name = %property.name, "adding property");
        Ok(self.push(property))
    }

    /// Finds the first property called `name`
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Property> {
        self.iter().find(|property| property.is(name))
    }
}
