//! Task types executed by a job
//!
//! Tasks run in the order they were added; the same task may appear more
//! than once.

#![allow(clippy::return_self_not_must_use)]

use super::collection::{Collection, Element, Structural, build_child, require};
use super::config_property::{self, ConfigProperty};
use super::errors::DslError;
use super::types::RunIf;
use crate::validation::{Validate, ValidationContext, rules};
use serde::Serialize;

/// Ordered task list of a job
pub type Tasks = Collection<Task>;

/// A single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    /// Runs a command on the agent
    Exec(ExecTask),
    /// Fetches an artifact published by an upstream job
    FetchArtifact(FetchArtifactTask),
    /// Runs a task provided by a plugin
    Plugin(PluginTask),
}

impl Task {
    /// Short name of the task type
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Exec(_) => "exec",
            Self::FetchArtifact(_) => "fetch_artifact",
            Self::Plugin(_) => "plugin",
        }
    }

    /// Condition under which this task runs
    #[must_use]
    pub fn condition(&self) -> RunIf {
        match self {
            Self::Exec(task) => task.run_if,
            Self::FetchArtifact(task) => task.run_if,
            Self::Plugin(task) => task.run_if,
        }
    }

    /// Sets the run condition
    pub fn run_if(&mut self, run_if: RunIf) -> &mut Self {
        match self {
            Self::Exec(task) => task.run_if = run_if,
            Self::FetchArtifact(task) => task.run_if = run_if,
            Self::Plugin(task) => task.run_if = run_if,
        }
        self
    }

    pub(crate) fn configuration_mut(&mut self) -> Option<&mut Vec<ConfigProperty>> {
        match self {
            Self::Plugin(task) => Some(&mut task.configuration),
            Self::Exec(_) | Self::FetchArtifact(_) => None,
        }
    }
}

impl Validate for Task {
    fn validate(&self, ctx: &mut ValidationContext) {
        match self {
            Self::Exec(task) => task.validate(ctx),
            Self::FetchArtifact(task) => task.validate(ctx),
            Self::Plugin(task) => task.validate(ctx),
        }
    }
}

impl Element for Task {
    const FIELD: &'static str = "tasks";
}

/// Command execution task
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExecTask {
    /// Command followed by its arguments
    pub command_line: Vec<String>,

    /// Directory to run in, relative to the agent sandbox
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    /// Run condition
    #[serde(skip_serializing_if = "RunIf::is_default")]
    pub run_if: RunIf,

    /// Command run when the job is cancelled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_cancel: Option<Box<ExecTask>>,
}

impl ExecTask {
    /// Replaces the command line with `words`
    pub fn command_line<I, S>(&mut self, words: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command_line = words.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the command line by splitting `line` like a POSIX shell
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `line` has unbalanced quotes.
    pub fn command(&mut self, line: &str) -> Result<&mut Self, DslError> {
        let words = shell_words::split(line)
            .map_err(|err| DslError::invalid("command_line", format!("cannot parse '{line}': {err}")))?;
        Ok(self.command_line(words))
    }

    /// Appends one argument
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.command_line.push(arg.into());
        self
    }

    /// Sets the working directory
    pub fn working_dir(&mut self, dir: impl Into<String>) -> &mut Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Sets the run condition
    pub fn run_if(&mut self, run_if: RunIf) -> &mut Self {
        self.run_if = run_if;
        self
    }

    /// Configures the command run on cancellation
    ///
    /// # Errors
    ///
    /// Fails if the block fails or leaves the command line empty.
    pub fn on_cancel<F>(&mut self, block: F) -> Result<&mut Self, DslError>
    where
        F: FnOnce(&mut ExecTask) -> Result<(), DslError>,
    {
        self.on_cancel = Some(Box::new(build_child(block)?));
        Ok(self)
    }
}

impl Structural for ExecTask {
    fn check_structure(&self) -> Result<(), DslError> {
        require("command_line", self.command_line.first().map_or("", String::as_str))
    }
}

impl Validate for ExecTask {
    fn validate(&self, ctx: &mut ValidationContext) {
        let command = self.command_line.first().map_or("", String::as_str);
        rules::check_required(ctx, "command_line", command);
        if let Some(on_cancel) = &self.on_cancel {
            ctx.scoped("on_cancel", |ctx| on_cancel.validate(ctx));
        }
    }
}

/// Task that fetches an artifact from an upstream job
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FetchArtifactTask {
    /// Upstream pipeline path; the current pipeline when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,

    /// Stage that published the artifact
    pub stage: String,

    /// Job that published the artifact
    pub job: String,

    /// Artifact path within the upstream job
    pub source: String,

    /// Whether `source` is a single file rather than a directory
    pub is_file: bool,

    /// Destination directory, relative to the agent sandbox
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Run condition
    #[serde(skip_serializing_if = "RunIf::is_default")]
    pub run_if: RunIf,
}

impl FetchArtifactTask {
    /// Sets the upstream pipeline path
    pub fn pipeline(&mut self, pipeline: impl Into<String>) -> &mut Self {
        self.pipeline = Some(pipeline.into());
        self
    }

    /// Sets the upstream stage
    pub fn stage(&mut self, stage: impl Into<String>) -> &mut Self {
        self.stage = stage.into();
        self
    }

    /// Sets the upstream job
    pub fn job(&mut self, job: impl Into<String>) -> &mut Self {
        self.job = job.into();
        self
    }

    /// Fetches a single file
    pub fn file(&mut self, source: impl Into<String>) -> &mut Self {
        self.source = source.into();
        self.is_file = true;
        self
    }

    /// Fetches a directory
    pub fn directory(&mut self, source: impl Into<String>) -> &mut Self {
        self.source = source.into();
        self.is_file = false;
        self
    }

    /// Sets the destination directory
    pub fn destination(&mut self, destination: impl Into<String>) -> &mut Self {
        self.destination = Some(destination.into());
        self
    }

    /// Sets the run condition
    pub fn run_if(&mut self, run_if: RunIf) -> &mut Self {
        self.run_if = run_if;
        self
    }
}

impl Structural for FetchArtifactTask {
    fn check_structure(&self) -> Result<(), DslError> {
        require("stage", &self.stage)?;
        require("job", &self.job)?;
        require("source", &self.source)
    }
}

impl Validate for FetchArtifactTask {
    fn validate(&self, ctx: &mut ValidationContext) {
        rules::check_required(ctx, "stage", &self.stage);
        rules::check_required(ctx, "job", &self.job);
        rules::check_required(ctx, "source", &self.source);
    }
}

/// Task implemented by a plugin
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PluginTask {
    /// Plugin identifier
    pub plugin_id: String,

    /// Plugin version
    pub version: String,

    /// Plugin settings; keys must be unique
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configuration: Vec<ConfigProperty>,

    /// Run condition
    #[serde(skip_serializing_if = "RunIf::is_default")]
    pub run_if: RunIf,
}

impl PluginTask {
    /// Sets the plugin identifier
    pub fn id(&mut self, plugin_id: impl Into<String>) -> &mut Self {
        self.plugin_id = plugin_id.into();
        self
    }

    /// Sets the plugin version
    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = version.into();
        self
    }

    /// Adds a plain setting
    ///
    /// Repeated keys are kept and reported at finalize.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `key` is empty.
    pub fn property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, DslError> {
        self.configuration.push(ConfigProperty::plain(key, value)?);
        Ok(self)
    }

    /// Adds an encrypted setting
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `key` is empty.
    pub fn secure_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, DslError> {
        self.configuration.push(ConfigProperty::encrypted(key, value)?);
        Ok(self)
    }

    /// Looks up a setting by key
    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&ConfigProperty> {
        config_property::find(&self.configuration, key)
    }

    /// Sets the run condition
    pub fn run_if(&mut self, run_if: RunIf) -> &mut Self {
        self.run_if = run_if;
        self
    }
}

impl Structural for PluginTask {
    fn check_structure(&self) -> Result<(), DslError> {
        require("plugin_id", &self.plugin_id)?;
        require("version", &self.version)
    }
}

impl Validate for PluginTask {
    fn validate(&self, ctx: &mut ValidationContext) {
        rules::check_required(ctx, "plugin_id", &self.plugin_id);
        rules::check_required(ctx, "version", &self.version);
        validate_configuration(ctx, &self.configuration);
    }
}

/// Checks each setting and the uniqueness of their keys.
pub(crate) fn validate_configuration(ctx: &mut ValidationContext, configuration: &[ConfigProperty]) {
    for (index, property) in configuration.iter().enumerate() {
        ctx.scoped(format!("configuration[{index}]"), |ctx| property.validate(ctx));
    }
    rules::check_unique_keys(ctx, "configuration", configuration.iter().map(ConfigProperty::key));
}

impl Collection<Task> {
    /// Adds a command execution task
    ///
    /// # Errors
    ///
    /// Fails if the block fails or leaves the command line empty.
    pub fn exec<F>(&mut self, block: F) -> Result<&mut Task, DslError>
    where
        F: FnOnce(&mut ExecTask) -> Result<(), DslError>,
    {
        let task = build_child(block)?;
        tracing::trace!(command = ?task.command_line, "adding exec task");
        Ok(self.push(Task::Exec(task)))
    }

    /// Adds an exec task from a shell-style command string
    ///
    /// # Errors
    ///
    /// Fails if `line` cannot be split or is empty.
    pub fn shell(&mut self, line: &str) -> Result<&mut Task, DslError> {
        self.exec(|exec| exec.command(line).map(|_| ()))
    }

    /// Adds a fetch-artifact task
    ///
    /// # Errors
    ///
    /// Fails if the block fails or leaves stage, job or source empty.
    pub fn fetch_artifact<F>(&mut self, block: F) -> Result<&mut Task, DslError>
    where
        F: FnOnce(&mut FetchArtifactTask) -> Result<(), DslError>,
    {
        let task = build_child(block)?;
        tracing::trace!(stage = %task.stage, job = %task.job, "adding fetch_artifact task");
        Ok(self.push(Task::FetchArtifact(task)))
    }

    /// Adds a plugin task
    ///
    /// # Errors
    ///
    /// Fails if the block fails or leaves the plugin id or version empty.
    pub fn plugin<F>(&mut self, block: F) -> Result<&mut Task, DslError>
    where
        F: FnOnce(&mut PluginTask) -> Result<(), DslError>,
    {
        let task = build_child(block)?;
        tracing::trace!(plugin_id = %task.plugin_id, "adding plugin task");
        Ok(self.push(Task::Plugin(task)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::Configure;
    use crate::validation::Constraint;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exec_task() {
        let mut tasks = Tasks::new();
        tasks
            .exec(|e| {
                e.command_line(["make", "build"]).working_dir("src");
                Ok(())
            })
            .unwrap()
            .run_if(RunIf::Any);

        let Task::Exec(exec) = &tasks.items()[0] else {
            panic!("Expected exec task");
        };
        assert_eq!(exec.command_line, ["make", "build"]);
        assert_eq!(exec.working_dir.as_deref(), Some("src"));
        assert_eq!(tasks.items()[0].condition(), RunIf::Any);
    }

    #[test]
    fn test_exec_requires_command() {
        let mut tasks = Tasks::new();
        let err = tasks.exec(|_| Ok(())).unwrap_err();
        assert!(matches!(err, DslError::InvalidConfig { ref field, .. } if field == "command_line"));
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_shell_splits_words() {
        let mut tasks = Tasks::new();
        tasks.shell(r#"bash -c "echo 'hello world'""#).unwrap();

        let Task::Exec(exec) = &tasks.items()[0] else {
            panic!("Expected exec task");
        };
        assert_eq!(exec.command_line, ["bash", "-c", "echo 'hello world'"]);
    }

    #[test]
    fn test_shell_unbalanced_quotes() {
        let mut tasks = Tasks::new();
        let err = tasks.shell("echo 'oops").unwrap_err();
        assert!(matches!(err, DslError::InvalidConfig { .. }));
    }

    #[test]
    fn test_on_cancel() {
        let mut tasks = Tasks::new();
        tasks
            .exec(|e| {
                e.command_line(["./deploy.sh"]);
                e.on_cancel(|c| {
                    c.command_line(["./rollback.sh"]);
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        let Task::Exec(exec) = &tasks.items()[0] else {
            panic!("Expected exec task");
        };
        assert_eq!(exec.on_cancel.as_ref().unwrap().command_line, ["./rollback.sh"]);
    }

    #[test]
    fn test_fetch_artifact_task() {
        let mut tasks = Tasks::new();
        tasks
            .fetch_artifact(|f| {
                f.pipeline("upstream").stage("build").job("compile").file("target/app.jar");
                Ok(())
            })
            .unwrap();

        assert_eq!(tasks.items()[0].kind(), "fetch_artifact");
        assert!(tasks.fetch_artifact(|f| {
            f.stage("build").job("compile");
            Ok(())
        })
        .is_err());
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_exec_args_append_to_command_line() {
        let mut tasks = Tasks::new();
        tasks
            .exec(|e| {
                e.command("cargo test")?.arg("--workspace").arg("--no-fail-fast");
                Ok(())
            })
            .unwrap();

        let Task::Exec(exec) = &tasks.items()[0] else {
            panic!("Expected exec task");
        };
        assert_eq!(exec.command_line, ["cargo", "test", "--workspace", "--no-fail-fast"]);
    }

    #[test]
    fn test_fetch_artifact_directory_overrides_file() {
        let mut tasks = Tasks::new();
        tasks
            .fetch_artifact(|f| {
                f.stage("build").job("compile").file("target/app.jar").directory("target/lib");
                Ok(())
            })
            .unwrap();

        let Task::FetchArtifact(fetch) = &tasks.items()[0] else {
            panic!("Expected fetch_artifact task");
        };
        assert_eq!(fetch.source, "target/lib");
        assert!(!fetch.is_file);
    }

    #[test]
    fn test_plugin_task_configuration() {
        let mut tasks = Tasks::new();
        tasks
            .plugin(|p| {
                p.id("script-executor").version("1");
                p.property("script", "./run.sh")?;
                p.secure_property("token", "AES:abc")?;
                Ok(())
            })
            .unwrap();

        let Task::Plugin(plugin) = &tasks.items()[0] else {
            panic!("Expected plugin task");
        };
        assert_eq!(plugin.setting("script").map(ConfigProperty::value), Some("./run.sh"));
        assert!(plugin.setting("token").unwrap().is_encrypted());
        assert!(tasks.violations().is_empty());
    }

    #[test]
    fn test_plugin_duplicate_setting_reported_at_finalize() {
        let mut tasks = Tasks::new();
        tasks
            .plugin(|p| {
                p.id("x").version("1");
                p.property("a", "1")?.property("a", "2")?;
                Ok(())
            })
            .unwrap();

        let violations = tasks.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, Constraint::DuplicateKey);
        assert_eq!(violations[0].path, "tasks[0].configuration");
    }

    #[test]
    fn test_tasks_may_repeat() {
        let mut tasks = Tasks::new();
        tasks
            .configure(|t| {
                t.shell("make")?;
                t.shell("make")?;
                Ok(())
            })
            .unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.violations().is_empty());
    }

    #[test]
    fn test_mutation_after_add_is_caught_at_finalize() {
        let mut tasks = Tasks::new();
        if let Task::Exec(exec) = tasks.shell("make").unwrap() {
            exec.command_line.clear();
        }

        let violations = tasks.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "tasks[0].command_line");
    }

    #[test]
    fn test_task_wire_shape() {
        let mut tasks = Tasks::new();
        tasks.shell("make test").unwrap();
        assert_eq!(
            serde_json::to_value(&tasks).unwrap(),
            serde_json::json!([{"type": "exec", "command_line": ["make", "test"]}])
        );
    }
}
