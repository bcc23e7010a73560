//! Rendering of finalized jobs into wire documents
//!
//! A [`Document`] holds a shared borrow of a validated [`Job`], so the job
//! cannot change between validation and serialization.

use super::config::DocumentFormat;
use crate::dsl::{DslError, Job, JobField, SecretsBackend};
use serde_json::Value;

/// A validated job, ready to serialize
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    job: &'a Job,
    format: DocumentFormat,
}

impl<'a> Document<'a> {
    pub(crate) fn new(job: &'a Job, format: DocumentFormat) -> Self {
        Self { job, format }
    }

    /// The validated job
    #[must_use]
    pub fn job(&self) -> &'a Job {
        self.job
    }

    /// Format used by [`Document::render`]
    #[must_use]
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Returns a copy rendering in `format`
    #[must_use]
    pub fn with_format(self, format: DocumentFormat) -> Self {
        Self { format, ..self }
    }

    /// Returns true if `field` is at its default and left out of the output
    #[must_use]
    pub fn is_default(&self, field: JobField) -> bool {
        self.job.is_default(field)
    }

    /// Fields left out of the output, in declaration order
    #[must_use]
    pub fn omitted_fields(&self) -> Vec<JobField> {
        JobField::ALL
            .into_iter()
            .filter(|field| self.is_default(*field))
            .collect()
    }

    /// Converts the job to a JSON value
    ///
    /// # Errors
    ///
    /// Returns [`DslError::Serialization`] if serialization fails.
    pub fn to_value(&self) -> Result<Value, DslError> {
        Ok(serde_json::to_value(self.job)?)
    }

    /// Renders pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns [`DslError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String, DslError> {
        Ok(serde_json::to_string_pretty(self.job)?)
    }

    /// Renders YAML
    ///
    /// # Errors
    ///
    /// Returns [`DslError::Serialization`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String, DslError> {
        Ok(serde_yaml::to_string(self.job)?)
    }

    /// Renders in the configured format
    ///
    /// # Errors
    ///
    /// Returns [`DslError::Serialization`] if serialization fails.
    pub fn render(&self) -> Result<String, DslError> {
        tracing::debug!(format = %self.format, "rendering document");
        match self.format {
            DocumentFormat::Json => self.to_json(),
            DocumentFormat::Yaml => self.to_yaml(),
        }
    }

    /// Renders after passing every property value through `backend`
    ///
    /// The borrowed job is left untouched.
    ///
    /// # Errors
    ///
    /// Fails if the backend rejects a value or serialization fails.
    pub fn render_sealed<B>(&self, backend: &B) -> Result<String, DslError>
    where
        B: SecretsBackend + ?Sized,
    {
        let mut sealed = self.job.clone();
        sealed.try_for_each_property(|property| {
            let stored = property.at_rest(backend)?;
            property.set_value(stored);
            Ok(())
        })?;
        Document::new(&sealed, self.format).render()
    }
}
