//! Job definition and builder

#![allow(clippy::return_self_not_must_use)]

use super::artifacts::Artifacts;
use super::collection::{Collection, Configure};
use super::config_property::ConfigProperty;
use super::errors::DslError;
use super::named::{Named, NamedEntity};
use super::properties::Properties;
use super::tabs::Tabs;
use super::tasks::Tasks;
use super::types::RunInstanceCount;
use crate::infrastructure::{Config, Document};
use crate::validation::{Validate, ValidationContext, Violation, rules};
use serde::Serialize;
use std::fmt;

/// Fields of a job as they appear in the rendered document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobField {
    /// Job name
    Name,
    /// Environment variables
    EnvironmentVariables,
    /// Number of agents to run on
    RunInstanceCount,
    /// Hung-job timeout in minutes
    Timeout,
    /// Elastic agent profile
    ElasticProfileId,
    /// Static agent resources
    Resources,
    /// Custom tabs
    Tabs,
    /// Published artifacts
    Artifacts,
    /// Tasks
    Tasks,
    /// Published properties
    Properties,
}

impl JobField {
    /// Every field, in declaration order
    pub const ALL: [JobField; 10] = [
        Self::Name,
        Self::EnvironmentVariables,
        Self::RunInstanceCount,
        Self::Timeout,
        Self::ElasticProfileId,
        Self::Resources,
        Self::Tabs,
        Self::Artifacts,
        Self::Tasks,
        Self::Properties,
    ];

    /// Key of the field in the wire document
    #[must_use]
    pub fn wire_key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::EnvironmentVariables => "environment_variables",
            Self::RunInstanceCount => "run_instance_count",
            Self::Timeout => "timeout",
            Self::ElasticProfileId => "elastic_profile_id",
            Self::Resources => "resources",
            Self::Tabs => "tabs",
            Self::Artifacts => "artifacts",
            Self::Tasks => "tasks",
            Self::Properties => "properties",
        }
    }
}

impl fmt::Display for JobField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// A unit of work: tasks plus the artifacts, tabs and properties they
/// publish, and hints on where to run them.
///
/// Fields are only reachable through the job's own methods. Validation of
/// cross-field rules is deferred to [`Job::finalize`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Job {
    #[serde(flatten)]
    entity: NamedEntity,

    #[serde(skip_serializing_if = "Option::is_none")]
    run_instance_count: Option<RunInstanceCount>,

    #[serde(skip_serializing_if = "is_zero")]
    timeout: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    elastic_profile_id: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    resources: Vec<String>,

    #[serde(skip_serializing_if = "Collection::is_empty")]
    tabs: Tabs,

    #[serde(skip_serializing_if = "Collection::is_empty")]
    artifacts: Artifacts,

    #[serde(skip_serializing_if = "Collection::is_empty")]
    tasks: Tasks,

    #[serde(skip_serializing_if = "Collection::is_empty")]
    properties: Properties,
}

impl Job {
    /// Creates an unnamed job; set the name before finalizing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a named job
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `name` is empty.
    pub fn named(name: impl Into<String>) -> Result<Self, DslError> {
        Ok(Self {
            entity: NamedEntity::named(name)?,
            ..Self::default()
        })
    }

    /// Creates a named job and applies `block` to it right away
    ///
    /// # Errors
    ///
    /// Fails if the name is empty or the block fails.
    pub fn with<F>(name: impl Into<String>, block: F) -> Result<Self, DslError>
    where
        F: FnOnce(&mut Job) -> Result<(), DslError>,
    {
        let mut job = Self::named(name)?;
        job.configure(block)?;
        Ok(job)
    }

    fn label(&self) -> &str {
        self.name().unwrap_or("<unnamed>")
    }

    /// Configures the tasks of this job
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the block.
    pub fn tasks<F>(&mut self, block: F) -> Result<&Tasks, DslError>
    where
        F: FnOnce(&mut Tasks) -> Result<(), DslError>,
    {
        tracing::trace!(job = self.label(), "configuring tasks");
        Ok(&*self.tasks.configure(block)?)
    }

    /// Configures the artifacts of this job
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the block.
    pub fn artifacts<F>(&mut self, block: F) -> Result<&Artifacts, DslError>
    where
        F: FnOnce(&mut Artifacts) -> Result<(), DslError>,
    {
        tracing::trace!(job = self.label(), "configuring artifacts");
        Ok(&*self.artifacts.configure(block)?)
    }

    /// Configures the tabs of this job
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the block.
    pub fn tabs<F>(&mut self, block: F) -> Result<&Tabs, DslError>
    where
        F: FnOnce(&mut Tabs) -> Result<(), DslError>,
    {
        tracing::trace!(job = self.label(), "configuring tabs");
        Ok(&*self.tabs.configure(block)?)
    }

    /// Configures the properties of this job
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the block.
    pub fn properties<F>(&mut self, block: F) -> Result<&Properties, DslError>
    where
        F: FnOnce(&mut Properties) -> Result<(), DslError>,
    {
        tracing::trace!(job = self.label(), "configuring properties");
        Ok(&*self.properties.configure(block)?)
    }

    /// Sets the number of agents to run on: a count, or `"all"`
    pub fn set_run_instance_count(&mut self, count: impl Into<RunInstanceCount>) -> &mut Self {
        self.run_instance_count = Some(count.into());
        self
    }

    /// Sets the hung-job timeout in minutes; `0` disables it
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `minutes` is negative.
    pub fn set_timeout(&mut self, minutes: i64) -> Result<&mut Self, DslError> {
        self.timeout = u64::try_from(minutes)
            .map_err(|_| DslError::invalid("timeout", format!("must not be negative, got {minutes}")))?;
        Ok(self)
    }

    /// Runs the job on the given elastic agent profile
    pub fn set_elastic_profile_id(&mut self, profile_id: impl Into<String>) -> &mut Self {
        self.elastic_profile_id = Some(profile_id.into());
        self
    }

    /// Replaces the resource tags; repeated tags are kept once
    pub fn set_resources<I, S>(&mut self, resources: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources.clear();
        for resource in resources {
            self.add_resource(resource);
        }
        self
    }

    /// Adds one resource tag unless already present
    pub fn add_resource(&mut self, resource: impl Into<String>) -> &mut Self {
        let resource = resource.into();
        if !self.resources.contains(&resource) {
            self.resources.push(resource);
        }
        self
    }

    /// Run instance count, if set
    #[must_use]
    pub fn run_instance_count(&self) -> Option<&RunInstanceCount> {
        self.run_instance_count.as_ref()
    }

    /// Timeout in minutes; `0` when disabled
    #[must_use]
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    /// Elastic profile id, if set
    #[must_use]
    pub fn elastic_profile_id(&self) -> Option<&str> {
        self.elastic_profile_id.as_deref()
    }

    /// Resource tags, in insertion order
    #[must_use]
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Configured tasks
    #[must_use]
    pub fn task_list(&self) -> &Tasks {
        &self.tasks
    }

    /// Configured artifacts
    #[must_use]
    pub fn artifact_list(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Configured tabs
    #[must_use]
    pub fn tab_list(&self) -> &Tabs {
        &self.tabs
    }

    /// Configured properties
    #[must_use]
    pub fn property_list(&self) -> &Properties {
        &self.properties
    }

    /// Returns true if `field` holds its default value and can be omitted
    #[must_use]
    pub fn is_default(&self, field: JobField) -> bool {
        match field {
            JobField::Name => self.entity.name().is_none(),
            JobField::EnvironmentVariables => self.entity.environment_variables().is_empty(),
            JobField::RunInstanceCount => self.run_instance_count.is_none(),
            JobField::Timeout => self.timeout == 0,
            JobField::ElasticProfileId => self.elastic_profile_id.is_none(),
            JobField::Resources => self.resources.is_empty(),
            JobField::Tabs => self.tabs.is_empty(),
            JobField::Artifacts => self.artifacts.is_empty(),
            JobField::Tasks => self.tasks.is_empty(),
            JobField::Properties => self.properties.is_empty(),
        }
    }

    /// Runs the constraint engine with limits from `config`
    #[must_use]
    pub fn violations_with(&self, config: &Config) -> Vec<Violation> {
        let mut ctx = ValidationContext::with_max_name_length(config.max_name_length);
        self.validate(&mut ctx);
        ctx.into_violations()
    }

    /// Validates the whole job with default settings
    ///
    /// # Errors
    ///
    /// Returns [`DslError::ValidationFailed`] with every violation found.
    pub fn finalize(&self) -> Result<Document<'_>, DslError> {
        self.finalize_with(&Config::default())
    }

    /// Validates the whole job and, on success, returns a document borrowing it
    ///
    /// The job cannot be changed while the document is alive.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::ValidationFailed`] with every violation found.
    #[tracing::instrument(skip_all, fields(job = self.label()))]
    pub fn finalize_with(&self, config: &Config) -> Result<Document<'_>, DslError> {
        let violations = self.violations_with(config);
        tracing::debug!(violations = violations.len(), "finalized job");
        if violations.is_empty() {
            Ok(Document::new(self, config.document_format))
        } else {
            Err(DslError::ValidationFailed(violations.into()))
        }
    }

    /// Visits every [`ConfigProperty`] of the job, stopping at the first error.
    pub(crate) fn try_for_each_property<F>(&mut self, mut f: F) -> Result<(), DslError>
    where
        F: FnMut(&mut ConfigProperty) -> Result<(), DslError>,
    {
        for var in self.entity.environment_variables_mut().iter_mut() {
            f(var)?;
        }
        for task in self.tasks.iter_mut() {
            for property in task.configuration_mut().into_iter().flatten() {
                f(property)?;
            }
        }
        for artifact in self.artifacts.iter_mut() {
            for property in artifact.configuration_mut().into_iter().flatten() {
                f(property)?;
            }
        }
        Ok(())
    }
}

impl Named for Job {
    fn entity(&self) -> &NamedEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut NamedEntity {
        &mut self.entity
    }
}

impl Configure for Job {}

impl Validate for Job {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.scoped("job", |ctx| {
            self.entity.validate(ctx);

            rules::check_run_instance_count(
                ctx,
                JobField::RunInstanceCount.wire_key(),
                self.run_instance_count.as_ref(),
            );

            if let Some(profile_id) = &self.elastic_profile_id {
                rules::check_required(ctx, JobField::ElasticProfileId.wire_key(), profile_id);
            }
            rules::check_exclusive(
                ctx,
                JobField::ElasticProfileId.wire_key(),
                JobField::Resources.wire_key(),
                self.elastic_profile_id.is_some(),
                !self.resources.is_empty(),
            );
            for (index, resource) in self.resources.iter().enumerate() {
                rules::check_required(ctx, &format!("resources[{index}]"), resource);
            }

            self.tabs.validate(ctx);
            self.artifacts.validate(ctx);
            self.tasks.validate(ctx);
            self.properties.validate(ctx);
        });
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Job({}): {} tasks, {} artifacts",
            self.label(),
            self.tasks.len(),
            self.artifacts.len()
        )
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod job_tests;
