//! Custom tabs shown on the job detail page

#![allow(clippy::return_self_not_must_use)]

use super::collection::{Collection, Element, require};
use super::errors::DslError;
use crate::validation::{Validate, ValidationContext, rules};
use serde::Serialize;

/// Tabs of a job; names are unique
pub type Tabs = Collection<Tab>;

/// A tab rendering a file from the job's artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    /// Tab title
    pub name: String,
    /// Artifact path to display
    pub path: String,
}

impl Tab {
    /// Changes the artifact path
    pub fn path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = path.into();
        self
    }
}

impl Validate for Tab {
    fn validate(&self, ctx: &mut ValidationContext) {
        rules::check_name(ctx, "name", Some(&self.name));
        rules::check_required(ctx, "path", &self.path);
    }
}

impl Element for Tab {
    const FIELD: &'static str = "tabs";

    fn unique_key(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl Collection<Tab> {
    /// Adds a tab
    ///
    /// A repeated name is accepted here and reported at finalize.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `name` or `path` is empty.
    pub fn tab(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<&mut Tab, DslError> {
        let tab = Tab {
            name: name.into(),
            path: path.into(),
        };
        require("name", &tab.name)?;
        require("path", &tab.path)?;
        tracing::trace!(name = %tab.name, "adding tab");
        Ok(self.push(tab))
    }

    /// Finds a tab by name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Tab> {
        self.iter().find(|tab| tab.name == name)
    }
}
