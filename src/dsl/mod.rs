//! Job configuration domain types and builders

pub mod artifacts;
pub mod collection;
pub mod config_property;
pub mod environment;
pub mod errors;
pub mod job;
pub mod named;
pub mod properties;
pub mod tabs;
pub mod tasks;
pub mod types;


// Re-export public types from submodules
pub use artifacts::{Artifact, Artifacts, ExternalArtifact, FileArtifact};
pub use collection::{Collection, Configure, Element};
pub use config_property::{ConfigProperty, Passthrough, PropertyKind, SecretsBackend};
pub use environment::EnvironmentVariables;
pub use errors::{DslError, Violations};
pub use job::{Job, JobField};
pub use named::{Named, NamedEntity};
pub use properties::{Properties, Property};
pub use tabs::{Tab, Tabs};
pub use tasks::{ExecTask, FetchArtifactTask, PluginTask, Task, Tasks};
pub use types::{RunIf, RunInstanceCount};
