//! Prelude module for common imports

// Re-export macros
pub use crate::{command_line, job};

// Re-export all DSL types with full paths
pub use crate::dsl::artifacts::{Artifact, Artifacts, ExternalArtifact, FileArtifact};
pub use crate::dsl::collection::{Collection, Configure};
pub use crate::dsl::config_property::{ConfigProperty, Passthrough, PropertyKind, SecretsBackend};
pub use crate::dsl::environment::EnvironmentVariables;
pub use crate::dsl::errors::DslError;
pub use crate::dsl::job::{Job, JobField};
pub use crate::dsl::named::Named;
pub use crate::dsl::properties::{Properties, Property};
pub use crate::dsl::tabs::{Tab, Tabs};
pub use crate::dsl::tasks::{ExecTask, FetchArtifactTask, PluginTask, Task, Tasks};
pub use crate::dsl::types::{RunIf, RunInstanceCount};

// Re-export validation and rendering
pub use crate::infrastructure::{Config, Document, DocumentFormat};
pub use crate::validation::{Constraint, Validate, Violation};
