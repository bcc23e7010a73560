//! Artifacts published by a job

#![allow(clippy::return_self_not_must_use)]

use super::collection::{Collection, Element, Structural, build_child, require};
use super::config_property::{self, ConfigProperty};
use super::errors::DslError;
use super::tasks::validate_configuration;
use crate::validation::{Validate, ValidationContext, rules};
use serde::Serialize;

/// Artifacts of a job; the same entry may be declared more than once
pub type Artifacts = Collection<Artifact>;

/// One published artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Artifact {
    /// Build output stored on the server
    Build(FileArtifact),
    /// Test reports stored on the server and parsed for results
    Test(FileArtifact),
    /// Artifact pushed to an external store by a plugin
    External(ExternalArtifact),
}

impl Artifact {
    /// Short name of the artifact type
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Build(_) => "build",
            Self::Test(_) => "test",
            Self::External(_) => "external",
        }
    }

    pub(crate) fn configuration_mut(&mut self) -> Option<&mut Vec<ConfigProperty>> {
        match self {
            Self::External(artifact) => Some(&mut artifact.configuration),
            Self::Build(_) | Self::Test(_) => None,
        }
    }
}

impl Validate for Artifact {
    fn validate(&self, ctx: &mut ValidationContext) {
        match self {
            Self::Build(artifact) | Self::Test(artifact) => artifact.validate(ctx),
            Self::External(artifact) => artifact.validate(ctx),
        }
    }
}

impl Element for Artifact {
    const FIELD: &'static str = "artifacts";
}

/// Build or test artifact copied from the agent sandbox
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FileArtifact {
    /// File or directory in the sandbox
    pub source: String,

    /// Destination on the server, relative to the artifact root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl FileArtifact {
    /// Sets the source path
    pub fn source(&mut self, source: impl Into<String>) -> &mut Self {
        self.source = source.into();
        self
    }

    /// Sets the destination path
    pub fn destination(&mut self, destination: impl Into<String>) -> &mut Self {
        self.destination = Some(destination.into());
        self
    }
}

impl Structural for FileArtifact {
    fn check_structure(&self) -> Result<(), DslError> {
        require("source", &self.source)
    }
}

impl Validate for FileArtifact {
    fn validate(&self, ctx: &mut ValidationContext) {
        rules::check_required(ctx, "source", &self.source);
    }
}

/// Artifact published to an external artifact store
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExternalArtifact {
    /// Artifact identifier
    pub id: String,

    /// Identifier of the artifact store
    pub store_id: String,

    /// Store-specific settings; keys must be unique
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configuration: Vec<ConfigProperty>,
}

impl ExternalArtifact {
    /// Sets the artifact identifier
    pub fn id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = id.into();
        self
    }

    /// Sets the artifact store identifier
    pub fn store_id(&mut self, store_id: impl Into<String>) -> &mut Self {
        self.store_id = store_id.into();
        self
    }

    /// Adds a plain setting
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
}

impl Structural for ExternalArtifact {
    fn check_structure(&self) -> Result<(), DslError> {
        require("id", &self.id)?;
        require("store_id", &self.store_id)
    }
}

impl Validate for ExternalArtifact {
    fn validate(&self, ctx: &mut ValidationContext) {
        rules::check_required(ctx, "id", &self.id);
        rules::check_required(ctx, "store_id", &self.store_id);
        validate_configuration(ctx, &self.configuration);
    }
}

impl Collection<Artifact> {
    /// Adds a build artifact
    ///
    /// # Errors
    ///
    /// Fails if the block fails or leaves the source empty.
    pub fn build<F>(&mut self, block: F) -> Result<&mut Artifact, DslError>
    where
        F: FnOnce(&mut FileArtifact) -> Result<(), DslError>,
    {
        let artifact = build_child(block)?;
        tracing::trace!(source = %artifact.source, "adding build artifact");
        Ok(self.push(Artifact::Build(artifact)))
    }

    /// Adds a test artifact
    ///
    /// # Errors
    ///
    /// Fails if the block fails or leaves the source empty.
    pub fn test<F>(&mut self, block: F) -> Result<&mut Artifact, DslError>
    where
        F: FnOnce(&mut FileArtifact) -> Result<(), DslError>,
    {
        let artifact = build_child(block)?;
        tracing::trace!(source = %artifact.source, "adding test artifact");
        Ok(self.push(Artifact::Test(artifact)))
    }

    /// Adds an external artifact
    ///
    /// # Errors
    ///
    /// Fails if the block fails or leaves the id or store id empty.
    pub fn external<F>(&mut self, block: F) -> Result<&mut Artifact, DslError>
    where
        F: FnOnce(&mut ExternalArtifact) -> Result<(), DslError>,
    {
        let artifact = build_child(block)?;
        tracing::trace!(id = %artifact.id, store_id = %artifact.store_id, "adding external artifact");
        Ok(self.push(Artifact::External(artifact)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Constraint;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_and_test_artifacts() {
        let mut artifacts = Artifacts::new();
        artifacts
            .build(|a| {
                a.source("target/release/app").destination("bin");
                Ok(())
            })
            .unwrap();
        artifacts
            .test(|a| {
                a.source("target/junit");
                Ok(())
            })
            .unwrap();

        let kinds: Vec<_> = artifacts.iter().map(Artifact::kind).collect();
        assert_eq!(kinds, ["build", "test"]);
        assert!(artifacts.violations().is_empty());
    }

    #[test]
    fn test_source_is_required() {
        let mut artifacts = Artifacts::new();
        let err = artifacts.build(|_| Ok(())).unwrap_err();
        assert!(matches!(err, DslError::InvalidConfig { ref field, .. } if field == "source"));
    }

    #[test]
    fn test_repeated_entries_are_allowed() {
        let mut artifacts = Artifacts::new();
        for _ in 0..2 {
            artifacts
                .build(|a| {
                    a.source("dist");
                    Ok(())
                })
                .unwrap();
        }
        assert_eq!(artifacts.len(), 2);
        assert!(artifacts.violations().is_empty());
    }

    #[test]
    fn test_external_artifact() {
        let mut artifacts = Artifacts::new();
        artifacts
            .external(|a| {
                a.id("image").store_id("dockerhub");
                a.property("Image", "app")?.secure_property("Password", "AES:p")?;
                Ok(())
            })
            .unwrap();

        let Artifact::External(external) = &artifacts.items()[0] else {
            panic!("Expected external artifact");
        };
        assert_eq!(external.setting("Image").map(ConfigProperty::value), Some("app"));
        assert!(external.setting("Tag").is_none());
    }

    #[test]
    fn test_external_artifact_requires_store() {
        let mut artifacts = Artifacts::new();
        let err = artifacts
            .external(|a| {
                a.id("image");
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, DslError::InvalidConfig { ref field, .. } if field == "store_id"));
    }

    #[test]
    fn test_external_duplicate_setting() {
        let mut artifacts = Artifacts::new();
        artifacts
            .external(|a| {
                a.id("image").store_id("s");
                a.property("Tag", "1")?.secure_property("Tag", "2")?;
                Ok(())
            })
            .unwrap();

        let violations = artifacts.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, Constraint::DuplicateKey);
    }

    #[test]
    fn test_artifact_wire_shape() {
        let mut artifacts = Artifacts::new();
        artifacts
            .test(|a| {
                a.source("reports").destination("junit");
                Ok(())
            })
            .unwrap();
        assert_eq!(
            serde_json::to_value(&artifacts).unwrap(),
            serde_json::json!([{"type": "test", "source": "reports", "destination": "junit"}])
        );
    }
}
