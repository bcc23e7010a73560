//! # configrepo-dsl - A job configuration DSL in Rust
//!
//! Describes CI jobs (tasks, artifacts, tabs, properties, environment and
//! agent placement) with nested builder blocks, validates the whole graph
//! once at the end and renders it as a JSON or YAML document.
//!
//! ## Quick Start
//!
//! ```
//! use configrepo_dsl::prelude::*;
//!
//! let job = job!("build", |job| {
//!     job.tasks(|tasks| tasks.shell("cargo build --release").map(|_| ()))?;
//!     job.artifacts(|artifacts| {
//!         artifacts.build(|a| {
//!             a.source("target/release");
//!             Ok(())
//!         })?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//!
//! let document = job.finalize()?;
//! assert!(document.render()?.contains("target/release"));
//! # Ok::<(), configrepo_dsl::DslError>(())
//! ```
//!
//! ## Features
//!
//! - **Scoped blocks**: each block only sees the collection it configures
//! - **Deferred validation**: every broken rule is reported at once, with a path
//! - **Secure values**: encrypted settings never leak through `Display`
//! - **Stable output**: fields at their default are left out of the document

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod macros;

pub mod dsl;
pub mod infrastructure;
pub mod validation;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use dsl::{
    Artifact, Artifacts, ConfigProperty, Configure, DslError, EnvironmentVariables, Job, JobField,
    Named, Properties, RunIf, RunInstanceCount, SecretsBackend, Tabs, Task, Tasks,
};
pub use infrastructure::{Config, Document, DocumentFormat, init_logging};
pub use validation::{Constraint, Validate, Violation};

/// Version of the configrepo-dsl crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
